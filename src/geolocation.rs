//! "Center on me" control.

use std::cell::Cell;

use crate::error::GeolocationError;
use crate::model::Position;

/// Completion callback of a position request.
pub type PositionCallback = Box<dyn FnOnce(Result<Position, GeolocationError>)>;

/// One-shot position lookups.
pub trait Geolocator {
    fn current_position(&self, done: PositionCallback);
}

/// Visual state of the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenterControlState {
    #[default]
    Idle,
    /// A position request is in flight.
    Pending,
}

impl CenterControlState {
    /// CSS class of the control button.
    pub fn class_name(self) -> &'static str {
        match self {
            CenterControlState::Idle => "center-button",
            CenterControlState::Pending => "center-button pending",
        }
    }
}

/// Tracks the control state across a request.
#[derive(Debug, Default)]
pub struct CenterControl {
    state: Cell<CenterControlState>,
}

impl CenterControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CenterControlState {
        self.state.get()
    }

    /// Enter `Pending`. Returns `false` if a request is already in flight.
    pub fn begin(&self) -> bool {
        if self.state.get() == CenterControlState::Pending {
            return false;
        }
        self.state.set(CenterControlState::Pending);
        true
    }

    /// Back to `Idle`, yielding the position only on success.
    pub fn finish(&self, result: Result<Position, GeolocationError>) -> Option<Position> {
        self.state.set(CenterControlState::Idle);
        match result {
            Ok(position) => Some(position),
            Err(e) => {
                log::debug!("center on me failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_returns_to_idle() {
        let control = CenterControl::new();
        assert!(control.begin());
        assert_eq!(control.state(), CenterControlState::Pending);
        let pos = control.finish(Ok(Position::new(38.7, -9.1)));
        assert_eq!(pos, Some(Position::new(38.7, -9.1)));
        assert_eq!(control.state(), CenterControlState::Idle);
    }

    #[test]
    fn test_failure_is_swallowed() {
        let control = CenterControl::new();
        control.begin();
        assert_eq!(control.finish(Err(GeolocationError::PermissionDenied)), None);
        assert_eq!(control.state(), CenterControlState::Idle);
    }

    #[test]
    fn test_no_overlapping_requests() {
        let control = CenterControl::new();
        assert!(control.begin());
        assert!(!control.begin());
    }

    #[test]
    fn test_class_names() {
        assert_eq!(CenterControlState::Idle.class_name(), "center-button");
        assert_eq!(
            CenterControlState::Pending.class_name(),
            "center-button pending"
        );
    }
}
