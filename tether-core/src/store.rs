//! Stores
//!
//! A store holds application state and exposes it as a stream of
//! snapshots through [`Store::select`]. The binders use nothing else.
//!
//! [`StateStore`] keeps the latest snapshot and replays it to every new
//! subscriber before forwarding later changes. Sets and subscribes are
//! serialized by one emit lock, so a replay never delivers a snapshot older
//! than one the subscriber has already seen.

use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use crate::error::Result;
use crate::stream::{Observable, Observer, Subject, Subscription};

/// Source of state snapshots.
pub trait Store<S>: Send + Sync {
    /// A stream of snapshots of the store's state.
    fn select(&self) -> Arc<dyn Observable<S>>;
}

/// A store holding one value of `S`.
///
/// Clones share the same state and the same subscribers.
///
/// # Example
///
/// ```rust,ignore
/// let store = StateStore::new(AppState::default());
/// store.update(|s| AppState { count: s.count + 1, ..s.clone() })?;
/// ```
pub struct StateStore<S> {
    current: Arc<RwLock<S>>,
    changes: Subject<S>,
    // Re-entrant so subscribers may set or subscribe during delivery.
    emit: Arc<ReentrantMutex<()>>,
}

impl<S> StateStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(initial: S) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
            changes: Subject::new(),
            emit: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// A clone of the current snapshot.
    pub fn get(&self) -> S {
        self.current.read().clone()
    }

    /// Replace the state and emit the new snapshot.
    ///
    /// The state is stored before subscribers run, so a subscriber error
    /// does not roll it back. The first subscriber error is returned.
    pub fn set(&self, state: S) -> Result<()> {
        let _emit = self.emit.lock();
        *self.current.write() = state.clone();
        self.changes.next(state)
    }

    /// Compute the next state from the current one and emit it.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&S) -> S,
    {
        let _emit = self.emit.lock();
        let next = {
            let guard = self.current.read();
            f(&guard)
        };
        self.set(next)
    }

    /// Number of active snapshot subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.changes.observer_count()
    }
}

impl<S> Observable<S> for StateStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, observer: Observer<S>) -> Result<Subscription> {
        let _emit = self.emit.lock();
        let subscription = self.changes.subscribe(Arc::clone(&observer))?;
        let snapshot = self.get();
        // Dropping the subscription on a failed replay releases it.
        observer(&snapshot)?;
        Ok(subscription)
    }
}

impl<S> Store<S> for StateStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn select(&self) -> Arc<dyn Observable<S>> {
        Arc::new(self.clone())
    }
}

impl<S> Clone for StateStore<S> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            changes: self.changes.clone(),
            emit: Arc::clone(&self.emit),
        }
    }
}

impl<S> std::fmt::Debug for StateStore<S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("current", &*self.current.read())
            .field("changes", &self.changes)
            .finish()
    }
}
