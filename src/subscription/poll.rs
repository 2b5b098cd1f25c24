//! Polling sources.
//!
//! Turns a synchronous lookup into a [`Source`] by calling it on a fixed
//! interval and emitting only when the result changes.

use std::time::Duration;

use futures::{StreamExt, future};
use tokio::time::{MissedTickBehavior, interval};
use tokio_stream::wrappers::IntervalStream;

use super::source::{Source, SourceError};

const MIN_PERIOD: Duration = Duration::from_millis(1);

impl<V> Source<V>
where
    V: Clone + PartialEq + Send + 'static,
{
    /// Calls `fetch` immediately and then every `period`, emitting each result
    /// that differs from the previous one. A failed fetch ends the source.
    ///
    /// Missed ticks are skipped rather than replayed. A zero `period` is
    /// raised to one millisecond. Must be called from within a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use dao_header::subscription::source::{Source, SourceError};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let source = Source::poll(Duration::from_millis(250), || Ok::<_, SourceError>(7_u64));
    /// assert_eq!(source.first().await, Ok(7));
    /// # }
    /// ```
    pub fn poll<F>(period: Duration, fetch: F) -> Self
    where
        F: Fn() -> Result<V, SourceError> + Send + 'static,
    {
        let mut ticker = interval(period.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last: Option<V> = None;
        let stream = IntervalStream::new(ticker)
            .map(move |_| fetch())
            .filter_map(move |result| {
                let item = match result {
                    Ok(value) if last.as_ref() == Some(&value) => None,
                    Ok(value) => {
                        last = Some(value.clone());
                        Some(Ok(value))
                    }
                    Err(error) => Some(Err(error)),
                };
                future::ready(item)
            });

        Self::stream(stream)
    }
}
