//! Data sources consumed by a [`SubscriptionBinder`](super::SubscriptionBinder).
//!
//! A [`Source`] is either a stream of `Result<V, SourceError>` or a future that
//! resolves to another source. The binder subscribes by polling the source in
//! place and cancels by dropping it.

use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream};
use futures::{FutureExt, Stream, StreamExt};
use thiserror::Error;

/// Failure reported by a data source collaborator.
///
/// The binder never inspects it beyond its message; where it surfaced (factory
/// call, deferred step or stream) decides the [`BindError`](super::BindError)
/// variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for SourceError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for SourceError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

pub(crate) enum Inner<V> {
    Stream(BoxStream<'static, Result<V, SourceError>>),
    Deferred(BoxFuture<'static, Result<Source<V>, SourceError>>),
}

/// An asynchronous or streaming value source.
///
/// # Example
///
/// ```
/// use dao_header::subscription::source::{Source, SourceError};
///
/// let ready: Source<u32> = Source::once(42);
/// let later: Source<u32> = Source::deferred(async {
///     // e.g. warm a cache before handing out the real stream
///     Ok::<_, SourceError>(Source::once(7))
/// });
/// # drop((ready, later));
/// ```
pub struct Source<V> {
    pub(crate) inner: Inner<V>,
}

impl<V: Send + 'static> Source<V> {
    /// A source backed by a fallible stream. An `Err` item ends the subscription.
    pub fn stream(stream: impl Stream<Item = Result<V, SourceError>> + Send + 'static) -> Self {
        Self {
            inner: Inner::Stream(stream.boxed()),
        }
    }

    /// A source backed by an infallible stream.
    pub fn values(stream: impl Stream<Item = V> + Send + 'static) -> Self {
        Self::stream(stream.map(Ok))
    }

    /// A source that emits a single value and completes.
    pub fn once(value: V) -> Self {
        Self::stream(stream::once(future::ready(Ok(value))))
    }

    /// A source that fails as soon as it is subscribed.
    pub fn failed(error: impl Into<SourceError>) -> Self {
        Self::stream(stream::once(future::ready(Err(error.into()))))
    }

    /// A source that never emits.
    pub fn pending() -> Self {
        Self::stream(stream::pending())
    }

    /// A source produced by an asynchronous step, such as priming a cache
    /// before returning the real query.
    pub fn deferred(
        future: impl Future<Output = Result<Source<V>, SourceError>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Inner::Deferred(future.boxed()),
        }
    }

    /// Resolves every deferred step and returns the underlying stream.
    pub(crate) async fn open(self) -> Result<BoxStream<'static, Result<V, SourceError>>, SourceError> {
        let mut source = self;
        loop {
            match source.inner {
                Inner::Stream(stream) => return Ok(stream),
                Inner::Deferred(future) => source = future.await?,
            }
        }
    }

    /// Waits for the first value of this source.
    ///
    /// # Errors
    ///
    /// Returns the source's own error, or an error if it completes empty.
    pub async fn first(self) -> Result<V, SourceError> {
        let mut stream = self.open().await?;
        match stream.next().await {
            Some(item) => item,
            None => Err(SourceError::new("source completed without a value")),
        }
    }
}
