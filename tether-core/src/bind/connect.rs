//! Connect Implementation
//!
//! `connect` wraps a presentational component so that its props are always
//! the union of its own props, the state projected from a store, and its
//! normalized action props.
//!
//! # How a Connected Component Works
//!
//! 1. The component is created unbound. Nothing is subscribed yet.
//!
//! 2. On mount, the factory options and the instance overrides are resolved
//!    into one store, one projection and one action map. The action map is
//!    normalized once and kept for the lifetime of the instance.
//!
//! 3. The component subscribes to the store's snapshots. Every snapshot is
//!    projected into a patch and merged into local state, one merge per
//!    emission.
//!
//! 4. On unmount, the binding gate is closed and the subscription disposed.
//!    An emission that still reaches the observer afterwards is ignored.
//!
//! The gate stays locked from the disposed check until the merge has been
//! applied. Unmount takes the same lock, so it waits for a merge already in
//! flight on another thread and no merge can start once it returns. The lock
//! is re-entrant so a projection may push to the store it is bound to.
//!
//! A component that has been unmounted cannot be mounted again; create a
//! new instance instead.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::actions::{normalize_actions, ActionMap, ActionProps, Callback};
use crate::error::{Error, Result};
use crate::state::{ComponentState, Patch, Record, StateHost, StateUpdate};
use crate::store::Store;
use crate::stream::{observer, Observable, Subscription};

/// Maps a store snapshot to the part of a component's state it feeds.
pub struct Projection<S> {
    project: Arc<dyn Fn(&S) -> Result<Patch> + Send + Sync>,
}

impl<S> Projection<S>
where
    S: 'static,
{
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&S) -> Patch + Send + Sync + 'static,
    {
        Self {
            project: Arc::new(move |snapshot: &S| Ok(f(snapshot))),
        }
    }

    /// A projection that may fail. Errors propagate to the emitter of the
    /// snapshot and the patch is not applied.
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn(&S) -> Result<Patch> + Send + Sync + 'static,
    {
        Self { project: Arc::new(f) }
    }

    /// The projection used when none is configured: always an empty patch.
    pub fn empty() -> Self {
        Self::new(|_| Patch::new())
    }

    pub fn project(&self, snapshot: &S) -> Result<Patch> {
        (self.project)(snapshot)
    }
}

impl<S> Clone for Projection<S> {
    fn clone(&self) -> Self {
        Self {
            project: Arc::clone(&self.project),
        }
    }
}

impl<S> std::fmt::Debug for Projection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Projection(..)")
    }
}

/// Options accepted by [`connect`] and, with the same shape, by each
/// instance as overrides.
///
/// Every field is optional. Values are immutable once built; instance
/// overrides are combined with the factory options by [`ConnectOptions::resolve`].
pub struct ConnectOptions<S> {
    store: Option<Arc<dyn Store<S>>>,
    action_map: Option<ActionMap>,
    map_state_to_props: Option<Projection<S>>,
}

impl<S> ConnectOptions<S>
where
    S: 'static,
{
    pub fn new() -> Self {
        Self {
            store: None,
            action_map: None,
            map_state_to_props: None,
        }
    }

    pub fn store<T>(self, store: T) -> Self
    where
        T: Store<S> + 'static,
    {
        self.shared_store(Arc::new(store))
    }

    pub fn shared_store(mut self, store: Arc<dyn Store<S>>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn action_map(mut self, action_map: ActionMap) -> Self {
        self.action_map = Some(action_map);
        self
    }

    pub fn map_state_to_props(mut self, projection: Projection<S>) -> Self {
        self.map_state_to_props = Some(projection);
        self
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Combine these factory options with per-instance `overrides`.
    ///
    /// Exactly one of the two must carry a store. The projection and action
    /// map come from the overrides when present, else from the factory
    /// options, else they are empty.
    pub fn resolve(&self, overrides: &ConnectOptions<S>) -> Result<ResolvedOptions<S>> {
        let store = match (&overrides.store, &self.store) {
            (Some(_), Some(_)) => return Err(Error::ConflictingStores),
            (Some(store), None) | (None, Some(store)) => Arc::clone(store),
            (None, None) => return Err(Error::MissingStore),
        };

        let projection = overrides
            .map_state_to_props
            .clone()
            .or_else(|| self.map_state_to_props.clone())
            .unwrap_or_else(Projection::empty);

        let action_map = overrides
            .action_map
            .clone()
            .or_else(|| self.action_map.clone())
            .unwrap_or_default();

        Ok(ResolvedOptions {
            store,
            projection,
            action_map,
        })
    }
}

impl<S> Clone for ConnectOptions<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            action_map: self.action_map.clone(),
            map_state_to_props: self.map_state_to_props.clone(),
        }
    }
}

impl<S: 'static> Default for ConnectOptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> From<Arc<dyn Store<S>>> for ConnectOptions<S> {
    fn from(store: Arc<dyn Store<S>>) -> Self {
        Self::new().shared_store(store)
    }
}

impl<S> std::fmt::Debug for ConnectOptions<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("store", &self.store.is_some())
            .field("action_map", &self.action_map)
            .field("map_state_to_props", &self.map_state_to_props.is_some())
            .finish()
    }
}

/// The configuration a component binds with, after resolution.
pub struct ResolvedOptions<S> {
    pub store: Arc<dyn Store<S>>,
    pub projection: Projection<S>,
    pub action_map: ActionMap,
}

/// The props handed to a presentational component on render.
pub struct RenderProps<'a> {
    data: Record,
    actions: &'a ActionProps,
}

impl RenderProps<'_> {
    /// Own props overlaid by local state. Fields named like an action are
    /// shadowed by that action and do not appear here.
    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn action(&self, prop: &str) -> Option<&Callback> {
        self.actions.get(prop)
    }

    pub fn actions(&self) -> &ActionProps {
        self.actions
    }

    pub fn invoke(&self, prop: &str, args: &[Value]) -> Result<()> {
        self.actions.invoke(prop, args)
    }
}

/// A component that renders from props alone.
pub trait Presentational: Send + Sync {
    type Output;

    fn render(&self, props: &RenderProps<'_>) -> Self::Output;
}

impl<F, O> Presentational for F
where
    F: Fn(&RenderProps<'_>) -> O + Send + Sync,
{
    type Output = O;

    fn render(&self, props: &RenderProps<'_>) -> O {
        self(props)
    }
}

/// Mount and unmount hooks driven by the rendering framework.
pub trait Lifecycle {
    /// Called once, before the first render.
    fn on_mount(&mut self) -> Result<()>;

    /// Called once when the component goes away. Extra calls are no-ops.
    fn on_unmount(&mut self);
}

/// Wrap `inner` so that instances bind to a store on mount.
///
/// `options` may also be built from a bare store with
/// `ConnectOptions::from(store)`.
pub fn connect<C, S>(inner: C, options: ConnectOptions<S>) -> Connector<C, S>
where
    C: Presentational,
    S: Send + Sync + 'static,
{
    Connector {
        inner: Arc::new(inner),
        options,
    }
}

/// Produces connected instances of one presentational component.
pub struct Connector<C, S> {
    inner: Arc<C>,
    options: ConnectOptions<S>,
}

impl<C, S> Connector<C, S>
where
    C: Presentational,
    S: Send + Sync + 'static,
{
    /// Create an instance that uses the factory options as they are.
    pub fn instance(&self, props: Record) -> ConnectedComponent<C, S> {
        self.instance_with(props, ConnectOptions::new())
    }

    /// Create an instance with per-instance option overrides.
    pub fn instance_with(&self, props: Record, overrides: ConnectOptions<S>) -> ConnectedComponent<C, S> {
        ConnectedComponent {
            inner: Arc::clone(&self.inner),
            options: self.options.clone(),
            overrides,
            host: Arc::new(ComponentState::new(props)),
            phase: Phase::Unbound,
            gate: Arc::new(ReentrantMutex::new(Cell::new(BindingState::Active))),
            subscription: None,
            actions: ActionProps::default(),
        }
    }

    pub fn options(&self) -> &ConnectOptions<S> {
        &self.options
    }
}

impl<C, S> Clone for Connector<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            options: self.options.clone(),
        }
    }
}

/// Lifecycle phase of a connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, not yet mounted.
    Unbound,

    /// Mounted and subscribed to its store.
    Bound,

    /// Unmounted. Terminal.
    Unmounted,
}

/// Checked before every merge, so a late emission never lands after unmount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    Active,
    Disposed,
}

/// One instance of a connected component.
pub struct ConnectedComponent<C, S> {
    inner: Arc<C>,
    options: ConnectOptions<S>,
    overrides: ConnectOptions<S>,
    host: Arc<ComponentState>,
    phase: Phase,
    gate: Arc<ReentrantMutex<Cell<BindingState>>>,
    subscription: Option<Subscription>,
    actions: ActionProps,
}

impl<C, S> ConnectedComponent<C, S>
where
    C: Presentational,
    S: Send + Sync + 'static,
{
    /// Render the inner component with own props, local state and actions.
    pub fn render(&self) -> C::Output {
        let mut data = self.host.props().merged(&Patch::from(self.host.state()));
        for name in self.actions.names() {
            data.remove(name);
        }
        self.inner.render(&RenderProps {
            data,
            actions: &self.actions,
        })
    }
}

impl<C, S> ConnectedComponent<C, S> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_bound(&self) -> bool {
        self.phase == Phase::Bound
    }

    /// A snapshot of the local state merged from the store.
    pub fn state(&self) -> Record {
        self.host.state()
    }

    pub fn props(&self) -> Record {
        self.host.props()
    }

    /// The local state slot, for use with the ad-hoc binders.
    pub fn host(&self) -> &Arc<ComponentState> {
        &self.host
    }

    /// Normalized action props. Empty until mounted.
    pub fn actions(&self) -> &ActionProps {
        &self.actions
    }

    fn teardown(&mut self) {
        match self.phase {
            Phase::Unmounted => {
                trace!("connected component already unmounted");
                return;
            }
            Phase::Unbound => debug!("connected component discarded before mount"),
            Phase::Bound => {
                // Blocks until a merge in flight on another thread is applied.
                self.gate.lock().set(BindingState::Disposed);
                if let Some(subscription) = self.subscription.take() {
                    subscription.unsubscribe();
                }
                debug!("connected component unmounted");
            }
        }
        self.phase = Phase::Unmounted;
    }
}

impl<C, S> Lifecycle for ConnectedComponent<C, S>
where
    C: Presentational,
    S: Send + Sync + 'static,
{
    fn on_mount(&mut self) -> Result<()> {
        match self.phase {
            Phase::Unbound => {}
            Phase::Bound => return Err(Error::AlreadyMounted),
            Phase::Unmounted => return Err(Error::Remounted),
        }

        let resolved = self.options.resolve(&self.overrides).map_err(|err| {
            warn!(error = %err, "rejecting mount of connected component");
            err
        })?;
        let actions = normalize_actions(&resolved.action_map);

        let gate = Arc::clone(&self.gate);
        let host = Arc::downgrade(&self.host);
        let projection = resolved.projection;
        let on_snapshot = observer(move |snapshot: &S| {
            let state = gate.lock();
            if state.get() == BindingState::Disposed {
                trace!("ignoring snapshot delivered after unmount");
                return Ok(());
            }
            let Some(host) = host.upgrade() else {
                return Ok(());
            };

            let patch = projection.project(snapshot)?;
            trace!(fields = patch.len(), "merging projected patch");
            host.set_state(StateUpdate::merge(patch))
        });

        let subscription = resolved.store.select().subscribe(on_snapshot)?;

        debug!(
            instance_store = self.overrides.has_store(),
            actions = actions.len(),
            "connected component mounted"
        );
        self.actions = actions;
        self.subscription = Some(subscription);
        self.phase = Phase::Bound;
        Ok(())
    }

    fn on_unmount(&mut self) {
        self.teardown();
    }
}

impl<C, S> Drop for ConnectedComponent<C, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<C, S> std::fmt::Debug for ConnectedComponent<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedComponent")
            .field("phase", &self.phase)
            .field("state", &self.host.state())
            .field("actions", &self.actions)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::actions::Action;
    use crate::store::StateStore;
    use crate::stream::{Observer, SubscriptionId};
    use parking_lot::Mutex;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use serde_json::json;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Debug, Clone, Default)]
    struct Counter {
        count: i64,
        name: Option<String>,
    }

    fn count_projection() -> Projection<Counter> {
        Projection::new(|s: &Counter| Patch::field("count", s.count))
    }

    fn render_data(props: &RenderProps<'_>) -> Record {
        props.data().clone()
    }

    fn click_once(props: &RenderProps<'_>) -> bool {
        props.invoke("onClick", &[]).unwrap();
        props.get("onClick").is_none()
    }

    #[test]
    fn mount_merges_current_and_later_snapshots() {
        let store = StateStore::new(Counter { count: 1, name: None });
        let connector = connect(
            render_data,
            ConnectOptions::new()
                .store(store.clone())
                .map_state_to_props(count_projection()),
        );

        let mut component = connector.instance(Record::new().with("label", "clicks"));
        component.on_mount().unwrap();
        assert_eq!(component.state().get("count"), Some(&json!(1)));

        store.update(|s| Counter { count: 2, ..s.clone() }).unwrap();
        assert_eq!(component.state().get("count"), Some(&json!(2)));
        assert_eq!(component.host().update_count(), 2);

        let rendered = component.render();
        assert_eq!(rendered.get("label"), Some(&json!("clicks")));
        assert_eq!(rendered.get("count"), Some(&json!(2)));
    }

    #[test]
    fn unmentioned_fields_survive_later_patches() {
        let store = StateStore::new(Counter { count: 0, name: Some("x".into()) });
        let projection = Projection::new(|s: &Counter| match &s.name {
            Some(name) => Patch::field("name", name.as_str()),
            None => Patch::field("count", s.count),
        });
        let connector = connect(
            render_data,
            ConnectOptions::new().store(store.clone()).map_state_to_props(projection),
        );

        let mut component = connector.instance(Record::new());
        component.on_mount().unwrap();
        store.set(Counter { count: 1, name: None }).unwrap();
        store.set(Counter { count: 2, name: None }).unwrap();

        let state = component.state();
        assert_eq!(state.get("count"), Some(&json!(2)));
        assert_eq!(state.get("name"), Some(&json!("x")));
    }

    #[test]
    fn both_stores_fail_the_mount() {
        let factory = StateStore::new(Counter::default());
        let instance = StateStore::new(Counter::default());
        let connector = connect(render_data, ConnectOptions::new().store(factory.clone()));

        let mut component =
            connector.instance_with(Record::new(), ConnectOptions::new().store(instance.clone()));
        let err = component.on_mount().unwrap_err();

        assert!(matches!(err, Error::ConflictingStores));
        assert_eq!(component.phase(), Phase::Unbound);
        assert_eq!(factory.subscriber_count(), 0);
        assert_eq!(instance.subscriber_count(), 0);
    }

    #[test]
    fn missing_store_fails_the_mount() {
        let connector = connect(render_data, ConnectOptions::<Counter>::new());
        let mut component = connector.instance(Record::new());

        assert!(matches!(component.on_mount(), Err(Error::MissingStore)));
        assert!(!component.is_bound());
    }

    #[test]
    fn instance_store_is_used_when_factory_has_none() {
        let store = StateStore::new(Counter { count: 7, name: None });
        let connector = connect(
            render_data,
            ConnectOptions::new().map_state_to_props(count_projection()),
        );

        let mut component =
            connector.instance_with(Record::new(), ConnectOptions::new().store(store.clone()));
        component.on_mount().unwrap();
        assert_eq!(component.state().get("count"), Some(&json!(7)));
    }

    #[test]
    fn instance_overrides_win_over_factory_defaults() {
        let store = StateStore::new(Counter { count: 3, name: None });
        let factory_calls = Arc::new(AtomicI32::new(0));
        let factory_calls_clone = factory_calls.clone();
        let factory_projection = Projection::new(move |_: &Counter| {
            factory_calls_clone.fetch_add(1, Ordering::SeqCst);
            Patch::field("source", "factory")
        });

        let connector = connect(
            render_data,
            ConnectOptions::new()
                .store(store.clone())
                .map_state_to_props(factory_projection)
                .action_map(ActionMap::new().with("onFactory", Action::callback(|_| Ok(())))),
        );

        let overrides = ConnectOptions::new()
            .map_state_to_props(Projection::new(|_: &Counter| Patch::field("source", "instance")))
            .action_map(ActionMap::new().with("onInstance", Action::callback(|_| Ok(()))));
        let mut component = connector.instance_with(Record::new(), overrides);
        component.on_mount().unwrap();

        assert_eq!(component.state().get("source"), Some(&json!("instance")));
        assert_eq!(factory_calls.load(Ordering::SeqCst), 0);
        assert!(component.actions().contains("onInstance"));
        assert!(!component.actions().contains("onFactory"));
    }

    #[test]
    fn no_projection_means_empty_patches() {
        let store = StateStore::new(Counter { count: 1, name: None });
        let connector = connect(render_data, ConnectOptions::new().store(store.clone()));

        let mut component = connector.instance(Record::new().with("a", 1));
        component.on_mount().unwrap();
        store.set(Counter::default()).unwrap();

        assert!(component.state().is_empty());
        assert_eq!(component.host().update_count(), 2);
    }

    #[test]
    fn no_merges_after_unmount() {
        let store = StateStore::new(Counter::default());
        let connector = connect(
            render_data,
            ConnectOptions::new().store(store.clone()).map_state_to_props(count_projection()),
        );

        let mut component = connector.instance(Record::new());
        component.on_mount().unwrap();
        let updates = component.host().update_count();

        component.on_unmount();
        store.set(Counter { count: 9, name: None }).unwrap();

        assert_eq!(component.host().update_count(), updates);
        assert_eq!(component.state().get("count"), Some(&json!(0)));
        assert_eq!(store.subscriber_count(), 0);
    }

    /// A stream whose subscriptions never actually detach the observer, to
    /// exercise the binding gate on its own.
    #[derive(Clone, Default)]
    struct LeakyStream {
        observers: Arc<Mutex<Vec<Observer<Counter>>>>,
    }

    impl LeakyStream {
        fn emit(&self, value: Counter) -> Result<()> {
            let observers = self.observers.lock().clone();
            for observer in observers {
                observer(&value)?;
            }
            Ok(())
        }
    }

    impl Observable<Counter> for LeakyStream {
        fn subscribe(&self, observer: Observer<Counter>) -> Result<Subscription> {
            self.observers.lock().push(observer);
            Ok(Subscription::new(SubscriptionId::new(), || {}))
        }
    }

    impl Store<Counter> for LeakyStream {
        fn select(&self) -> Arc<dyn Observable<Counter>> {
            Arc::new(self.clone())
        }
    }

    #[test]
    fn late_emission_is_ignored_by_the_gate() {
        let stream = LeakyStream::default();
        let connector = connect(
            render_data,
            ConnectOptions::new().store(stream.clone()).map_state_to_props(count_projection()),
        );

        let mut component = connector.instance(Record::new());
        component.on_mount().unwrap();
        stream.emit(Counter { count: 1, name: None }).unwrap();
        assert_eq!(component.host().update_count(), 1);

        component.on_unmount();
        stream.emit(Counter { count: 2, name: None }).unwrap();
        assert_eq!(component.host().update_count(), 1);
        assert_eq!(component.state().get("count"), Some(&json!(1)));
    }

    #[test]
    fn unmount_waits_for_in_flight_merge() {
        let store = StateStore::new(Counter::default());
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let release_rx = Mutex::new(release_rx);

        // Parks the delivery of `count == 1` until released.
        let projection = Projection::new(move |s: &Counter| {
            if s.count == 1 {
                let _ = entered_tx.lock().send(());
                let _ = release_rx.lock().recv();
            }
            Patch::field("count", s.count)
        });
        let connector = connect(
            render_data,
            ConnectOptions::new().store(store.clone()).map_state_to_props(projection),
        );

        let mut component = connector.instance(Record::new());
        component.on_mount().unwrap();
        assert_eq!(component.host().update_count(), 1);

        let setter = {
            let store = store.clone();
            thread::spawn(move || store.set(Counter { count: 1, name: None }))
        };
        entered_rx.recv().unwrap();

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).unwrap();
        });

        component.on_unmount();
        let at_unmount = component.host().update_count();

        setter.join().unwrap().unwrap();
        releaser.join().unwrap();

        // The in-flight merge finished before unmount returned; nothing after.
        assert_eq!(at_unmount, 2);
        assert_eq!(component.host().update_count(), at_unmount);
        assert_eq!(component.state().get("count"), Some(&json!(1)));
    }

    #[test]
    fn emissions_racing_unmount_never_land_afterwards() {
        let store = StateStore::new(Counter::default());
        let connector = connect(
            render_data,
            ConnectOptions::new().store(store.clone()).map_state_to_props(count_projection()),
        );

        for _ in 0..50 {
            let mut component = connector.instance(Record::new());
            component.on_mount().unwrap();

            let setter = {
                let store = store.clone();
                thread::spawn(move || {
                    for count in 1..=200 {
                        store.set(Counter { count, name: None }).unwrap();
                    }
                })
            };

            component.on_unmount();
            let at_unmount = component.host().update_count();
            setter.join().unwrap();

            assert_eq!(component.host().update_count(), at_unmount);
        }
    }

    #[test]
    fn double_unmount_is_a_no_op() {
        let store = StateStore::new(Counter::default());
        let connector = connect(render_data, ConnectOptions::new().store(store.clone()));

        let mut component = connector.instance(Record::new());
        component.on_mount().unwrap();
        component.on_unmount();
        component.on_unmount();

        assert_eq!(component.phase(), Phase::Unmounted);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn discarding_before_mount_never_subscribes() {
        let store = StateStore::new(Counter { count: 4, name: None });
        let connector = connect(
            render_data,
            ConnectOptions::new().store(store.clone()).map_state_to_props(count_projection()),
        );

        let mut component = connector.instance(Record::new());
        component.on_unmount();
        assert_eq!(component.phase(), Phase::Unmounted);
        assert!(matches!(component.on_mount(), Err(Error::Remounted)));
        assert_eq!(component.host().update_count(), 0);

        drop(connector.instance(Record::new()));
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn mount_is_one_directional() {
        let store = StateStore::new(Counter::default());
        let connector = connect(render_data, ConnectOptions::new().store(store.clone()));

        let mut component = connector.instance(Record::new());
        component.on_mount().unwrap();
        assert!(matches!(component.on_mount(), Err(Error::AlreadyMounted)));
        assert_eq!(store.subscriber_count(), 1);

        component.on_unmount();
        assert!(matches!(component.on_mount(), Err(Error::Remounted)));
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn projection_error_propagates_and_binding_stays() {
        let store = StateStore::new(Counter::default());
        let projection = Projection::try_new(|s: &Counter| {
            if s.count < 0 {
                Err(Error::projection("negative count"))
            } else {
                Ok(Patch::field("count", s.count))
            }
        });
        let connector = connect(
            render_data,
            ConnectOptions::new().store(store.clone()).map_state_to_props(projection),
        );

        let mut component = connector.instance(Record::new());
        component.on_mount().unwrap();

        let err = store.set(Counter { count: -1, name: None }).unwrap_err();
        assert!(matches!(err, Error::Projection(_)));
        assert_eq!(component.state().get("count"), Some(&json!(0)));
        assert!(component.is_bound());

        store.set(Counter { count: 4, name: None }).unwrap();
        assert_eq!(component.state().get("count"), Some(&json!(4)));
    }

    #[test]
    fn failing_replay_fails_the_mount() {
        let store = StateStore::new(Counter { count: -1, name: None });
        let projection = Projection::try_new(|_: &Counter| Err(Error::projection("bad")));
        let connector = connect(
            render_data,
            ConnectOptions::new().store(store.clone()).map_state_to_props(projection),
        );

        let mut component = connector.instance(Record::new());
        assert!(component.on_mount().is_err());
        assert_eq!(component.phase(), Phase::Unbound);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn render_exposes_actions_and_shadows_data() {
        let store = StateStore::new(Counter::default());
        let clicks = Arc::new(AtomicI32::new(0));
        let clicks_clone = clicks.clone();
        let actions = ActionMap::new().with(
            "onClick",
            Action::callback(move |_| {
                clicks_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        let connector = connect(
            click_once,
            ConnectOptions::new().store(store.clone()).action_map(actions),
        );

        let mut component = connector.instance(Record::new().with("onClick", "stale"));
        component.on_mount().unwrap();

        assert!(component.render());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases_the_subscription() {
        let store = StateStore::new(Counter::default());
        let connector = connect(render_data, ConnectOptions::new().store(store.clone()));

        let mut component = connector.instance(Record::new());
        component.on_mount().unwrap();
        assert_eq!(store.subscriber_count(), 1);

        drop(component);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn instances_are_independent() {
        let store = StateStore::new(Counter::default());
        let connector = connect(
            render_data,
            ConnectOptions::new().store(store.clone()).map_state_to_props(count_projection()),
        );

        let mut first = connector.instance(Record::new());
        let mut second = connector.instance(Record::new());
        first.on_mount().unwrap();
        second.on_mount().unwrap();
        assert_eq!(store.subscriber_count(), 2);

        first.on_unmount();
        store.set(Counter { count: 5, name: None }).unwrap();

        assert_eq!(first.state().get("count"), Some(&json!(0)));
        assert_eq!(second.state().get("count"), Some(&json!(5)));
        assert_eq!(store.subscriber_count(), 1);
    }
}
