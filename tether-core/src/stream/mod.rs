//! Stream Primitives
//!
//! The binders in this crate consume streams through a small contract:
//!
//! - [`Observable::subscribe`] registers an observer and returns a
//!   [`Subscription`].
//! - [`Subscription::unsubscribe`] deregisters it. After it returns, the
//!   observer is never called again.
//! - [`Sink::next`] pushes one value into a stream.
//!
//! Observers return a `Result`. An error raised by an observer propagates
//! back to whoever pushed the value; the subscription stays active.
//!
//! [`Subject`] is a multicast implementation of both sides of the contract.
//! Any other reactive primitive can be used by implementing [`Observable`].

mod subject;
mod subscription;

use std::sync::Arc;

use crate::error::Result;

pub use subject::Subject;
pub use subscription::{Subscription, SubscriptionGroup, SubscriptionId};

/// Callback invoked with every value a stream emits.
pub type Observer<T> = Arc<dyn Fn(&T) -> Result<()> + Send + Sync>;

/// Wrap a closure as an [`Observer`].
pub fn observer<T, F>(f: F) -> Observer<T>
where
    F: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A stream that observers can subscribe to.
pub trait Observable<T>: Send + Sync {
    /// Register `observer` for every future emission.
    ///
    /// Streams that replay a current value may deliver it before this
    /// returns; an error from that delivery is returned here and the
    /// subscription is released.
    fn subscribe(&self, observer: Observer<T>) -> Result<Subscription>;
}

impl<T, O> Observable<T> for Arc<O>
where
    O: Observable<T> + ?Sized,
{
    fn subscribe(&self, observer: Observer<T>) -> Result<Subscription> {
        (**self).subscribe(observer)
    }
}

/// Something that accepts pushed values.
pub trait Sink<T>: Send + Sync {
    fn next(&self, value: T) -> Result<()>;
}
