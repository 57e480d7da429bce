//! Component State
//!
//! This module holds the data the binders write into: [`Record`]s of named
//! fields, [`Patch`]es that are merged into them, and the [`StateHost`]
//! trait through which a component's state slot is updated.
//!
//! # Merge Semantics
//!
//! Merging a patch is a shallow field overwrite. Fields present in the patch
//! replace the current value; fields absent from the patch keep it. A field
//! never reverts to absent through a merge, so applying patches `p1..pn` in
//! order gives the same record as folding them left to right.

mod host;
mod record;

pub use host::{ComponentState, StateHost, StateUpdate, Updater};
pub use record::{Patch, Record};
