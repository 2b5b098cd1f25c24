use futures::{FutureExt, StreamExt};

use super::BindError;
use super::source::{Inner, Source};

/// Identity of one subscription attempt of a binder.
///
/// Every resubscription allocates a new id; events carry the id of the handle
/// that produced them so a binder can drop anything that is not from its
/// current handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub(crate) const fn first() -> Self {
        Self(1)
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Something a live source reported.
#[derive(Debug)]
pub(crate) enum Event<V> {
    Next(V),
    Failed(BindError),
}

/// Ownership token for a live subscription.
///
/// The handle owns the source itself and polls it in place, so dropping (or
/// [`release`](Handle::release)-ing) the handle drops the upstream
/// subscription before the call returns.
pub(crate) struct Handle<V> {
    id: HandleId,
    source: Option<Source<V>>,
}

impl<V: Send + 'static> Handle<V> {
    pub(crate) const fn new(id: HandleId, source: Source<V>) -> Self {
        Self {
            id,
            source: Some(source),
        }
    }

    pub(crate) const fn id(&self) -> HandleId {
        self.id
    }

    /// `true` once the source can emit nothing more.
    pub(crate) const fn is_finished(&self) -> bool {
        self.source.is_none()
    }

    /// Next event if one is ready, without waiting.
    pub(crate) fn try_next(&mut self) -> Option<Event<V>> {
        self.next().now_or_never().flatten()
    }

    /// Waits for the next event. `None` once the source can emit nothing more.
    ///
    /// Cancel safe: a deferred step or stream that is still pending stays in
    /// place for the next call.
    pub(crate) async fn next(&mut self) -> Option<Event<V>> {
        loop {
            let source = self.source.as_mut()?;
            match &mut source.inner {
                Inner::Deferred(future) => {
                    let step = future.await;
                    match step {
                        Ok(next) => *source = next,
                        Err(error) => {
                            self.source = None;
                            return Some(Event::Failed(BindError::Deferred(error)));
                        }
                    }
                }
                Inner::Stream(stream) => {
                    let item = stream.next().await;
                    return match item {
                        Some(Ok(value)) => Some(Event::Next(value)),
                        Some(Err(error)) => {
                            self.source = None;
                            Some(Event::Failed(BindError::Source(error)))
                        }
                        None => {
                            tracing::trace!(handle = ?self.id, "source completed");
                            self.source = None;
                            None
                        }
                    };
                }
            }
        }
    }

    /// Cancels the subscription.
    pub(crate) fn release(self) {
        drop(self);
    }
}
