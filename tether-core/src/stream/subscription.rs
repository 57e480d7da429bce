//! Subscription handles.
//!
//! A Subscription represents one active link between a stream and an
//! observer. Disposing it runs the stream's teardown exactly once.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Unique identifier for a subscription.
///
/// Streams use this to find the observer a subscription refers to when it
/// is disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Generate a new unique subscription ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

type Teardown = Box<dyn FnOnce() + Send>;

enum LinkState {
    Active(Teardown),
    Disposed,
}

/// A disposable handle to one active subscription.
///
/// `unsubscribe` may be called any number of times; only the first call
/// runs the teardown. Dropping the handle unsubscribes it.
#[must_use = "dropping a Subscription unsubscribes it"]
pub struct Subscription {
    id: SubscriptionId,
    state: Mutex<LinkState>,
}

impl Subscription {
    /// Create an active subscription that runs `teardown` when disposed.
    pub fn new<F>(id: SubscriptionId, teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id,
            state: Mutex::new(LinkState::Active(Box::new(teardown))),
        }
    }

    /// A subscription that is already closed.
    pub fn closed() -> Self {
        Self {
            id: SubscriptionId::new(),
            state: Mutex::new(LinkState::Disposed),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Dispose the subscription.
    ///
    /// Runs the teardown on the first call and does nothing afterwards.
    pub fn unsubscribe(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), LinkState::Disposed);
        // The lock is released before the teardown runs so a teardown may
        // touch this handle again.
        if let LinkState::Active(teardown) = previous {
            teardown();
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.state.lock(), LinkState::Disposed)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Several subscriptions disposed together.
#[derive(Debug, Default)]
#[must_use = "dropping a SubscriptionGroup unsubscribes every member"]
pub struct SubscriptionGroup {
    members: Vec<Subscription>,
}

impl SubscriptionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.members.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Dispose every member. Safe to call more than once.
    pub fn unsubscribe(&self) {
        for member in &self.members {
            member.unsubscribe();
        }
    }

    /// True once every member has been disposed.
    pub fn is_closed(&self) -> bool {
        self.members.iter().all(Subscription::is_closed)
    }
}

impl FromIterator<Subscription> for SubscriptionGroup {
    fn from_iter<I: IntoIterator<Item = Subscription>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
