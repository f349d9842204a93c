//! "Add to home screen" prompt.
//!
//! The platform hands us its install event once. It is held as a single-use
//! token: [`InstallPrompt::install`] takes it out of the slot, so a second
//! click cannot prompt again.

use std::cell::RefCell;
use std::fmt;

use crate::reactive::Observable;

/// What the user chose in the platform dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed(String),
}

impl InstallOutcome {
    pub fn from_platform(outcome: &str) -> Self {
        if outcome == "accepted" {
            InstallOutcome::Accepted
        } else {
            InstallOutcome::Dismissed(outcome.to_string())
        }
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Accepted => write!(f, "accepted"),
            InstallOutcome::Dismissed(other) => write!(f, "{other}"),
        }
    }
}

pub type OutcomeCallback = Box<dyn FnOnce(InstallOutcome)>;

/// A captured platform install event.
pub trait DeferredPrompt {
    /// Show the platform dialog; `on_choice` receives the user's answer.
    fn prompt(self: Box<Self>, on_choice: OutcomeCallback);
}

/// Holds the captured event and drives the install toast.
pub struct InstallPrompt {
    token: RefCell<Option<Box<dyn DeferredPrompt>>>,
    pub toast_visible: Observable<bool>,
}

impl Default for InstallPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallPrompt {
    pub fn new() -> Self {
        Self {
            token: RefCell::new(None),
            toast_visible: Observable::new(false),
        }
    }

    /// Keep the event and show the toast. A later event replaces an unused
    /// earlier one.
    pub fn capture(&self, event: Box<dyn DeferredPrompt>) {
        *self.token.borrow_mut() = Some(event);
        self.toast_visible.set(true);
    }

    pub fn is_armed(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Hide the toast and forward to the platform dialog.
    ///
    /// Returns `false` if there is no captured event (already used).
    pub fn install(&self) -> bool {
        self.toast_visible.set(false);
        let Some(token) = self.token.borrow_mut().take() else {
            return false;
        };
        token.prompt(Box::new(|outcome| match outcome {
            InstallOutcome::Accepted => log::info!("User accepted the install prompt"),
            InstallOutcome::Dismissed(_) => {
                log::info!("User dismissed the install prompt ({outcome})")
            }
        }));
        true
    }

    /// Hide the toast and drop the event unused.
    pub fn dismiss(&self) {
        self.toast_visible.set(false);
        self.token.borrow_mut().take();
    }
}
