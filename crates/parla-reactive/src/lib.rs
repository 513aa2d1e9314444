#![forbid(unsafe_code)]

//! Change-notification primitives for parla.
//!
//! - [`Observable`]: a shared cell holding the last published value and
//!   notifying subscriber callbacks synchronously.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`MemoCache`]: keyed registry of shared handles so that repeated
//!   requests for the same derived stream return the same handle.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscribers are stored as `Weak` function pointers and cleaned up lazily
//! during notification.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. A new subscriber receives the current value (if any) before
//!    `subscribe` returns.
//! 3. Every `publish` notifies, even when the value did not change.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.

pub mod memo;
pub mod observable;

pub use memo::MemoCache;
pub use observable::{Observable, Subscription};
