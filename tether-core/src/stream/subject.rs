//! Subject Implementation
//!
//! A Subject is a multicast stream: every value pushed with `next` is
//! delivered to every active observer, in subscription order.
//!
//! # Delivery
//!
//! 1. The list of observers is snapshotted under a read lock.
//!
//! 2. The lock is released and each observer is called in turn. Observers
//!    may therefore subscribe, unsubscribe or push new values re-entrantly.
//!
//! 3. Before each call the observer's registration is checked, so an
//!    observer disposed part-way through a delivery is never called again,
//!    not even for the value being delivered.
//!
//! 4. The first observer error stops the delivery and is returned to the
//!    caller of `next`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::subscription::{Subscription, SubscriptionId};
use super::{Observable, Observer, Sink};
use crate::error::Result;

struct Registration<T> {
    id: SubscriptionId,
    active: AtomicBool,
    observer: Observer<T>,
}

/// A multicast stream that can also be used as a [`Sink`].
///
/// # Example
///
/// ```rust,ignore
/// let subject = Subject::new();
/// let subscription = subject.subscribe(observer(|value: &i32| {
///     println!("got {value}");
///     Ok(())
/// }))?;
///
/// subject.next(1)?; // prints "got 1"
/// subscription.unsubscribe();
/// subject.next(2)?; // prints nothing
/// ```
pub struct Subject<T> {
    observers: Arc<RwLock<Vec<Arc<Registration<T>>>>>,
}

impl<T> Subject<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Deliver `value` to every active observer.
    pub fn next(&self, value: T) -> Result<()> {
        let snapshot: SmallVec<[Arc<Registration<T>>; 4]> =
            self.observers.read().iter().cloned().collect();

        for registration in snapshot {
            if registration.active.load(Ordering::SeqCst) {
                (registration.observer)(&value)?;
            }
        }
        Ok(())
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl<T> Observable<T> for Subject<T>
where
    T: Send + Sync + 'static,
{
    fn subscribe(&self, observer: Observer<T>) -> Result<Subscription> {
        let id = SubscriptionId::new();
        let registration = Arc::new(Registration {
            id,
            active: AtomicBool::new(true),
            observer,
        });
        self.observers.write().push(Arc::clone(&registration));

        let observers = Arc::clone(&self.observers);
        Ok(Subscription::new(id, move || {
            registration.active.store(false, Ordering::SeqCst);
            observers.write().retain(|r| r.id != id);
        }))
    }
}

impl<T> Sink<T> for Subject<T>
where
    T: Send + Sync + 'static,
{
    fn next(&self, value: T) -> Result<()> {
        Subject::next(self, value)
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            observers: Arc::clone(&self.observers),
        }
    }
}

impl<T> Default for Subject<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("observer_count", &self.observers.read().len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
