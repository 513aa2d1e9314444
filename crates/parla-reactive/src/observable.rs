#![forbid(unsafe_code)]

//! Replay-last observable with synchronous change notification.
//!
//! # Design
//!
//! [`Observable<T>`] keeps an optional "last published" value in shared,
//! reference-counted storage (`Rc<RefCell<..>>`). `publish` replaces the
//! value and calls every live subscriber in registration order before
//! returning. `subscribe` delivers the current value to the new callback
//! immediately, so late subscribers never miss the state they attach to.
//!
//! # Performance
//!
//! | Operation     | Complexity                 |
//! |---------------|----------------------------|
//! | `get()`       | O(1) + clone of `T`        |
//! | `publish()`   | O(S) where S = subscribers |
//! | `subscribe()` | O(1) amortized + replay    |
//!
//! # Failure Modes
//!
//! - **Re-entrant publish**: callbacks run outside any internal borrow, so a
//!   subscriber may publish again. The nested publish completes (and
//!   notifies) before the outer loop resumes with the remaining callbacks,
//!   which still receive the value the outer publish was delivering.
//! - **Subscriber leak**: `Subscription` guards that are never dropped keep
//!   their callbacks alive. Dead weak references are pruned during
//!   `notify()`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A subscriber callback stored as a strong `Rc` internally, handed out
/// as `Weak` to the observable.
type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: Option<T>,
    version: u64,
    /// Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared cell holding the last published value.
///
/// Cloning an `Observable` creates a new handle to the **same** inner state:
/// both handles see the same value and share subscribers.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each `publish`.
/// 2. Subscribers are notified in registration order.
/// 3. Dead subscribers (dropped [`Subscription`] guards) are pruned lazily.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

// Manual Clone: shares the same Rc.
impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create an observable that has not published anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value: None,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Create an observable that already holds `value`.
    ///
    /// The initial version is 0 and no subscribers are registered.
    #[must_use]
    pub fn with_value(value: T) -> Self {
        let obs = Self::new();
        obs.inner.borrow_mut().value = Some(value);
        obs
    }

    /// Clone of the last published value, if any.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }

    /// Access the last published value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.inner.borrow().value.as_ref())
    }

    /// Store `value` and notify every live subscriber in registration order.
    pub fn publish(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.value = Some(value.clone());
            inner.version += 1;
        }
        self.notify(&value);
    }

    /// Subscribe to published values.
    ///
    /// If a value has already been published, `callback` is invoked with it
    /// before this method returns. Returns a [`Subscription`] guard; dropping
    /// it unsubscribes the callback.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let current = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.push(Rc::downgrade(&strong));
            inner.value.clone()
        };
        if let Some(value) = current {
            strong(&value);
        }
        // Wrap in a holder that can be type-erased as `dyn Any`,
        // since `Rc<dyn Fn(&T)>` itself cannot coerce to `Rc<dyn Any>`.
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of `publish` calls so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of registered subscribers (including dead ones not yet
    /// pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Whether two handles share the same inner state.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn notify(&self, value: &T) {
        // Collect live callbacks first so no borrow is held during calls.
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };
        tracing::trace!(subscribers = callbacks.len(), "observable notify");
        for cb in &callbacks {
            cb(value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` drops the strong `Rc` to the callback, so the
/// `Weak` in the observable's subscriber list fails to upgrade from then on.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
