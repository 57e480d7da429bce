//! Action normalization.
//!
//! Binding authors describe a component's action props either as plain
//! callbacks or as sinks that values are pushed into. Normalizing an
//! [`ActionMap`] turns every entry into a [`Callback`] so the component
//! always receives something it can call.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::stream::Sink;

/// A callable action prop. Receives every argument it is invoked with.
pub type Callback = Arc<dyn Fn(&[Value]) -> Result<()> + Send + Sync>;

/// Wrap a closure as a [`Callback`].
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&[Value]) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One entry of an [`ActionMap`].
#[derive(Clone)]
pub enum Action {
    /// Passed to the component unchanged.
    Callback(Callback),

    /// Receives the first argument of each invocation. Further arguments are
    /// dropped.
    Sink(Arc<dyn Sink<Value>>),
}

impl Action {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<()> + Send + Sync + 'static,
    {
        Self::Callback(callback(f))
    }

    pub fn sink<K>(sink: K) -> Self
    where
        K: Sink<Value> + 'static,
    {
        Self::Sink(Arc::new(sink))
    }

    fn into_callback(self) -> Callback {
        match self {
            Self::Callback(f) => f,
            Self::Sink(sink) => callback(move |args| {
                let first = args.first().cloned().unwrap_or(Value::Null);
                sink.next(first)
            }),
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Sink(_) => f.write_str("Sink(..)"),
        }
    }
}

/// Prop name to action. `None` entries are left out when normalizing.
#[derive(Debug, Clone, Default)]
pub struct ActionMap {
    entries: IndexMap<String, Option<Action>>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a defined entry.
    pub fn with(mut self, prop: impl Into<String>, action: Action) -> Self {
        self.entries.insert(prop.into(), Some(action));
        self
    }

    /// Builder-style insert of an entry that may be undefined.
    pub fn with_optional(mut self, prop: impl Into<String>, action: Option<Action>) -> Self {
        self.entries.insert(prop.into(), action);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Action>)> for ActionMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<Action>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Normalized action props, in the order they were declared.
#[derive(Clone, Default)]
pub struct ActionProps {
    callbacks: IndexMap<String, Callback>,
}

impl ActionProps {
    pub fn get(&self, prop: &str) -> Option<&Callback> {
        self.callbacks.get(prop)
    }

    pub fn contains(&self, prop: &str) -> bool {
        self.callbacks.contains_key(prop)
    }

    /// Call the action named `prop` with `args`.
    pub fn invoke(&self, prop: &str, args: &[Value]) -> Result<()> {
        let f = self
            .callbacks
            .get(prop)
            .ok_or_else(|| Error::UnknownAction(prop.to_owned()))?;
        f(args)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.callbacks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for ActionProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Turn every defined entry of `map` into a callback.
pub fn normalize_actions(map: &ActionMap) -> ActionProps {
    let callbacks = map
        .entries
        .iter()
        .filter_map(|(prop, action)| {
            action
                .clone()
                .map(|action| (prop.clone(), action.into_callback()))
        })
        .collect();
    ActionProps { callbacks }
}
