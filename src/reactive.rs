//! Single-threaded observable cells.
//!
//! ```
//! use placemap::reactive::{Observable, computed};
//!
//! let count = Observable::new(2);
//! let weak = count.downgrade();
//! let doubled = computed(&[&count], move || weak.get_or_default() * 2);
//!
//! count.set(5);
//! assert_eq!(doubled.get(), 10);
//! ```
//!
//! Propagation is push-based and synchronous: `set` runs every subscriber
//! before returning, in subscription order. Derived cells built with
//! [`computed`] subscribe to their dependencies when created, so declaring
//! them in dependency order yields one topological pass per change.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle returned by `subscribe`, used to detach a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
    next_id: Cell<u64>,
}

/// A shared state cell that notifies subscribers when its value changes.
pub struct Observable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable")
            .field(&*self.inner.value.borrow())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Current value (cloned).
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        self.notify();
    }

    /// Store `value` and notify subscribers even when it equals the current
    /// one. Returns the previous value.
    pub fn replace(&self, value: T) -> T {
        let previous = self.inner.value.replace(value);
        self.notify();
        previous
    }

    /// Modify the value in place, notifying subscribers if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Register a subscriber called with the new value after every change.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    /// Subscribe, then immediately run `f` with the current value.
    pub fn subscribe_and_update(&self, f: impl Fn(&T) + 'static) -> SubscriptionId {
        let f: Subscriber<T> = Rc::new(f);
        let handler = Rc::clone(&f);
        let id = self.subscribe(move |value| handler(value));
        let current = self.get();
        f(&current);
        id
    }

    /// Detach a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn downgrade(&self) -> WeakObservable<T> {
        WeakObservable {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn notify(&self) {
        let value = self.get();
        // Snapshot so subscribers may (un)subscribe while being notified.
        let subscribers: Vec<Subscriber<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();
        for subscriber in subscribers {
            subscriber(&value);
        }
    }
}

/// Non-owning handle to an [`Observable`], used inside subscribers to avoid
/// reference cycles between cells.
pub struct WeakObservable<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Clone for WeakObservable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> WeakObservable<T> {
    pub fn upgrade(&self) -> Option<Observable<T>> {
        self.inner.upgrade().map(|inner| Observable { inner })
    }

    pub fn get(&self) -> Option<T> {
        self.upgrade().map(|o| o.get())
    }

    pub fn get_or_default(&self) -> T
    where
        T: Default,
    {
        self.get().unwrap_or_default()
    }
}

/// Anything a computed cell can depend on.
pub trait Dependency {
    fn on_change(&self, f: Rc<dyn Fn()>) -> SubscriptionId;
}

impl<T: Clone + PartialEq + 'static> Dependency for Observable<T> {
    fn on_change(&self, f: Rc<dyn Fn()>) -> SubscriptionId {
        self.subscribe(move |_| f())
    }
}

/// Create a cell whose value is `f()`, re-evaluated whenever any of `deps`
/// changes.
///
/// `f` should only hold weak handles to its inputs; the dependencies own the
/// refresh closure and the computed cell is referenced weakly from it.
pub fn computed<T, F>(deps: &[&dyn Dependency], f: F) -> Observable<T>
where
    T: Clone + PartialEq + 'static,
    F: Fn() -> T + 'static,
{
    let cell = Observable::new(f());
    let target = cell.downgrade();
    let refresh: Rc<dyn Fn()> = Rc::new(move || {
        if let Some(cell) = target.upgrade() {
            cell.set(f());
        }
    });
    for dep in deps {
        dep.on_change(Rc::clone(&refresh));
    }
    cell
}

/// A one-shot boolean: starts lowered, can be raised exactly once.
#[derive(Clone, Default)]
pub struct Flag(Observable<bool>);

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Flag").field(&self.is_raised()).finish()
    }
}

impl Flag {
    pub fn new() -> Self {
        Self(Observable::new(false))
    }

    pub fn is_raised(&self) -> bool {
        self.0.get()
    }

    /// Raise the flag. Returns `false` if it was already raised.
    pub fn raise(&self) -> bool {
        if self.is_raised() {
            return false;
        }
        self.0.set(true);
        true
    }

    /// Run `f` once when the flag is raised (immediately if it already is).
    pub fn on_raise(&self, f: impl FnOnce() + 'static) {
        if self.is_raised() {
            f();
            return;
        }
        let pending: RefCell<Option<Box<dyn FnOnce()>>> = RefCell::new(Some(Box::new(f)));
        self.0.subscribe(move |raised| {
            if *raised {
                let f = pending.borrow_mut().take();
                if let Some(f) = f {
                    f();
                }
            }
        });
    }

    pub fn subscribe(&self, f: impl Fn(&bool) + 'static) -> SubscriptionId {
        self.0.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.0.unsubscribe(id)
    }
}

impl Dependency for Flag {
    fn on_change(&self, f: Rc<dyn Fn()>) -> SubscriptionId {
        self.0.on_change(f)
    }
}
