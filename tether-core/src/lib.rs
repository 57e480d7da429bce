//! Tether Core
//!
//! This crate binds observable state to component lifecycles. It
//! implements:
//!
//! - A lifecycle binder (`connect`) that subscribes a component to a store
//!   on mount and releases the subscription on unmount
//! - Patch merging of projected store snapshots into component state
//! - Normalization of action maps into callable props
//! - Ad-hoc binders that feed arbitrary streams into state fields
//!
//! The rendering framework, the store and the stream primitive are
//! consumed through traits. Minimal implementations of each are included so
//! the binders can be used and tested on their own.
//!
//! # Architecture
//!
//! - `stream`: the observable/subscription contract and a multicast `Subject`
//! - `store`: the `Store` trait and a replaying `StateStore`
//! - `state`: records, patches and the `StateHost` state slot
//! - `bind`: `connect`, action normalization and the ad-hoc binders
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::bind::{connect, ConnectOptions, Lifecycle, Projection, RenderProps};
//! use tether_core::state::{Patch, Record};
//! use tether_core::store::StateStore;
//!
//! let store = StateStore::new(0_i64);
//! let counter = connect(
//!     |props: &RenderProps<'_>| format!("{:?}", props.get("count")),
//!     ConnectOptions::new()
//!         .store(store.clone())
//!         .map_state_to_props(Projection::new(|n: &i64| Patch::field("count", *n))),
//! );
//!
//! let mut instance = counter.instance(Record::new());
//! instance.on_mount()?;
//! store.set(5)?;
//! assert_eq!(instance.render(), "Some(Number(5))");
//! instance.on_unmount();
//! ```

pub mod bind;
pub mod error;
pub mod state;
pub mod store;
pub mod stream;

pub use error::{Error, Result};
