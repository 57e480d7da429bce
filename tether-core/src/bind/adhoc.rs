//! Ad-hoc stream-to-state binders.
//!
//! These attach streams straight to a component's state slot, without a
//! store or a lifecycle. They hold the host weakly: once the host is
//! dropped, later emissions are ignored.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::state::{Patch, Record, StateHost, StateUpdate};
use crate::stream::{observer, Observable, Observer, Subscription, SubscriptionGroup};

type Bind = Box<dyn FnOnce(Weak<dyn StateHost>) -> Result<Subscription> + Send>;

struct FieldEntry {
    field: String,
    bind: Bind,
}

/// State field name to the stream that feeds it.
///
/// # Example
///
/// ```rust,ignore
/// let streams = FieldStreams::new()
///     .bind("seconds", ticks.clone())
///     .bind("temperature", sensor.clone());
/// let subscriptions = observables_to_state(component.host(), streams)?;
/// ```
#[derive(Default)]
pub struct FieldStreams {
    entries: Vec<FieldEntry>,
}

impl FieldStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed `field` from `source`.
    pub fn bind<T, O>(mut self, field: impl Into<String>, source: O) -> Self
    where
        T: Serialize + Send + Sync + 'static,
        O: Observable<T> + 'static,
    {
        let field = field.into();
        let target = field.clone();
        self.entries.push(FieldEntry {
            field,
            bind: Box::new(move |host| source.subscribe(field_observer(host, target))),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            validate_field(&entry.field)?;
            if !seen.insert(entry.field.as_str()) {
                return Err(Error::InvalidField {
                    field: entry.field.clone(),
                    reason: "field is bound more than once",
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for FieldStreams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.field.as_str()))
            .finish()
    }
}

fn validate_field(field: &str) -> Result<()> {
    if field.is_empty() {
        return Err(Error::InvalidField {
            field: field.to_owned(),
            reason: "field name is empty",
        });
    }
    Ok(())
}

/// Observer merging every item into `field` as a one-field patch.
fn field_observer<T>(host: Weak<dyn StateHost>, field: String) -> Observer<T>
where
    T: Serialize + Send + Sync + 'static,
{
    observer(move |item: &T| {
        let Some(host) = host.upgrade() else {
            return Ok(());
        };
        let value = serde_json::to_value(item).map_err(|source| Error::Serialize {
            field: field.clone(),
            source,
        })?;
        trace!(field = %field, "merging stream item into state");
        host.set_state(StateUpdate::merge(Patch::field(field.clone(), value)))
    })
}

fn downgrade<H: StateHost>(host: &Arc<H>) -> Weak<dyn StateHost> {
    let host: Arc<dyn StateHost> = host.clone();
    Arc::downgrade(&host)
}

/// Bind every stream in `streams` to its state field.
///
/// All entries are validated before anything is subscribed. If a stream
/// fails to subscribe, the ones already subscribed are released and the
/// error is returned. The returned group disposes every binding at once.
pub fn observables_to_state<H>(host: &Arc<H>, streams: FieldStreams) -> Result<SubscriptionGroup>
where
    H: StateHost,
{
    streams.validate()?;

    let weak = downgrade(host);
    let mut group = SubscriptionGroup::new();
    for entry in streams.entries {
        group.push((entry.bind)(weak.clone())?);
    }
    debug!(fields = group.len(), "bound streams to state fields");
    Ok(group)
}

/// Replace the whole state with `f(item, prev_state, props)` on every item.
pub fn map_to_state<T, O, H, F>(source: &O, host: &Arc<H>, f: F) -> Result<Subscription>
where
    T: Clone + Send + Sync + 'static,
    O: Observable<T> + ?Sized,
    H: StateHost,
    F: Fn(&T, &Record, &Record) -> Result<Record> + Send + Sync + 'static,
{
    let weak = downgrade(host);
    let f = Arc::new(f);
    source.subscribe(observer(move |item: &T| {
        let Some(host) = weak.upgrade() else {
            return Ok(());
        };
        let f = Arc::clone(&f);
        let item = item.clone();
        trace!("replacing state from stream item");
        host.set_state(StateUpdate::with(move |prev, props| f(&item, prev, props)))
    }))
}

/// Merge every item of `source` into `field`.
pub fn bind_to_state<T, O, H>(source: &O, host: &Arc<H>, field: impl Into<String>) -> Result<Subscription>
where
    T: Serialize + Send + Sync + 'static,
    O: Observable<T> + ?Sized,
    H: StateHost,
{
    let field = field.into();
    validate_field(&field)?;
    debug!(field = %field, "binding stream to state field");
    source.subscribe(field_observer(downgrade(host), field))
}
