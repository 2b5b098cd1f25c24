//! Mock data source for testing.
//!
//! [`MockSource`] emits values and failures on demand, so binder behavior can
//! be tested deterministically without a ledger or timers.
//!
//! ```
//! use dao_header::subscription::mock::MockSource;
//!
//! let mock = MockSource::<u32>::new();
//! let source = mock.source(); // subscribes
//!
//! assert_eq!(mock.receiver_count(), 1);
//! mock.emit(42).expect("one subscriber");
//! # drop(source);
//! ```

use futures::{StreamExt, future};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use super::source::{Source, SourceError};

/// A source that emits on demand.
///
/// Backed by a broadcast channel, so clones share one channel and every
/// [`source`](Self::source) call is an independent subscriber.
#[derive(Debug, Clone)]
pub struct MockSource<T: Clone> {
    sender: broadcast::Sender<Result<T, SourceError>>,
}

impl<T: Clone + Send + 'static> MockSource<T> {
    /// Creates a mock that buffers up to `capacity` unread items per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _rx) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a mock with a capacity of 100.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Subscribes and returns the subscription as a [`Source`].
    ///
    /// Items that lag behind the channel capacity are skipped.
    #[must_use]
    pub fn source(&self) -> Source<T> {
        let rx = self.sender.subscribe();
        Source::stream(BroadcastStream::new(rx).filter_map(|item| future::ready(item.ok())))
    }

    /// Emits a value to every live subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is subscribed.
    pub fn emit(&self, value: T) -> Result<usize, broadcast::error::SendError<Result<T, SourceError>>> {
        self.sender.send(Ok(value))
    }

    /// Fails every live subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is subscribed.
    pub fn fail(
        &self,
        error: impl Into<SourceError>,
    ) -> Result<usize, broadcast::error::SendError<Result<T, SourceError>>> {
        self.sender.send(Err(error.into()))
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone + Send + 'static> Default for MockSource<T> {
    fn default() -> Self {
        Self::new()
    }
}
