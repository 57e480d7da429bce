//! Binders
//!
//! This module connects streams to component state.
//!
//! # Connect
//!
//! [`connect`] wraps a presentational component. Each instance resolves a
//! store, a projection and an action map when it mounts, merges every
//! projected snapshot into its local state while bound, and releases its
//! subscription when it unmounts.
//!
//! # Actions
//!
//! An [`ActionMap`] names the action props a component receives. Each entry
//! is either a callback, passed through as is, or a sink, which receives the
//! first argument of every call. [`normalize_actions`] turns the map into
//! [`ActionProps`] the component can call uniformly.
//!
//! # Ad-hoc Binders
//!
//! [`bind_to_state`], [`map_to_state`] and [`observables_to_state`] feed
//! streams straight into a [`StateHost`](crate::state::StateHost) for
//! component-local state such as timers or sub-streams.

mod actions;
mod adhoc;
mod connect;

pub use actions::{callback, normalize_actions, Action, ActionMap, ActionProps, Callback};
pub use adhoc::{bind_to_state, map_to_state, observables_to_state, FieldStreams};
pub use connect::{
    connect, ConnectOptions, ConnectedComponent, Connector, Lifecycle, Phase, Presentational,
    Projection, RenderProps, ResolvedOptions,
};
