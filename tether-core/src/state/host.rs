//! State hosts.
//!
//! A [`StateHost`] is the mutable state slot of one component instance, as
//! provided by the rendering framework. The binders only ever request
//! updates through [`StateHost::set_state`]; whether the host applies them
//! immediately or batches them is up to the host.
//!
//! [`ComponentState`] is a host that applies every update immediately.
//! Updates are serialized: each one reads the previous state, applies and
//! writes back under one update lock, so updates racing on different
//! threads never lose each other's fields.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{ReentrantMutex, RwLock};

use super::record::{Patch, Record};
use crate::error::Result;

/// Function of (previous state, props) producing the next state.
pub type Updater = Box<dyn FnOnce(&Record, &Record) -> Result<Record> + Send>;

/// A requested change to a component's state.
pub enum StateUpdate {
    /// Replace the whole state.
    Replace(Record),

    /// Compute the next state from the previous state and the props.
    With(Updater),
}

impl StateUpdate {
    pub fn with<F>(f: F) -> Self
    where
        F: FnOnce(&Record, &Record) -> Result<Record> + Send + 'static,
    {
        Self::With(Box::new(f))
    }

    /// Shallow-merge `patch` into the previous state.
    pub fn merge(patch: Patch) -> Self {
        Self::with(move |prev, _props| Ok(prev.clone().merged(&patch)))
    }

    /// Resolve the update against the given previous state and props.
    pub fn apply(self, prev: &Record, props: &Record) -> Result<Record> {
        match self {
            Self::Replace(next) => Ok(next),
            Self::With(f) => f(prev, props),
        }
    }
}

impl std::fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace(record) => f.debug_tuple("Replace").field(record).finish(),
            Self::With(_) => f.write_str("With(..)"),
        }
    }
}

/// The mutable state slot of one component instance.
pub trait StateHost: Send + Sync + 'static {
    /// The props the component was created with.
    fn props(&self) -> Record;

    /// A snapshot of the current state.
    fn state(&self) -> Record;

    /// Request a state change.
    ///
    /// An error from an updater function is returned here and the state is
    /// left as it was.
    fn set_state(&self, update: StateUpdate) -> Result<()>;
}

/// A state host that applies every update as soon as it is requested.
pub struct ComponentState {
    props: RwLock<Record>,
    state: RwLock<Record>,
    updates: AtomicUsize,
    // Re-entrant so an updater may request a nested update on this host.
    update_lock: ReentrantMutex<()>,
}

impl ComponentState {
    pub fn new(props: Record) -> Self {
        Self::with_state(props, Record::new())
    }

    pub fn with_state(props: Record, state: Record) -> Self {
        Self {
            props: RwLock::new(props),
            state: RwLock::new(state),
            updates: AtomicUsize::new(0),
            update_lock: ReentrantMutex::new(()),
        }
    }

    /// Number of updates applied so far.
    ///
    /// Each applied update corresponds to one re-render request in a real
    /// rendering framework.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Replace the props, as a parent re-render would.
    pub fn set_props(&self, props: Record) {
        *self.props.write() = props;
    }
}

impl StateHost for ComponentState {
    fn props(&self) -> Record {
        self.props.read().clone()
    }

    fn state(&self) -> Record {
        self.state.read().clone()
    }

    fn set_state(&self, update: StateUpdate) -> Result<()> {
        // Held from the read of `prev` to the write of `next`. The state
        // and props locks are free while the updater runs.
        let _update = self.update_lock.lock();
        let prev = self.state();
        let props = self.props();
        let next = update.apply(&prev, &props)?;

        *self.state.write() = next;
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for ComponentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentState")
            .field("props", &*self.props.read())
            .field("state", &*self.state.read())
            .field("update_count", &self.update_count())
            .finish()
    }
}
