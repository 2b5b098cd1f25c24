//! Subscription binders: views kept in sync with asynchronous data sources.
//!
//! A [`SubscriptionBinder`] wraps a presentational function and owns the one
//! live subscription that feeds it. The host drives it through three lifecycle
//! hooks:
//!
//! 1. [`attach`](SubscriptionBinder::attach) when the view appears
//! 2. [`on_props_changed`](SubscriptionBinder::on_props_changed) on every update
//! 3. [`detach`](SubscriptionBinder::detach) when it goes away
//!
//! The binder owns its source and polls it when the host calls
//! [`sync`](SubscriptionBinder::sync) (once per frame) or awaits
//! [`wait_for_update`](SubscriptionBinder::wait_for_update). Releasing a
//! subscription drops the source on the spot.
//!
//! # Example
//!
//! ```
//! use dao_header::subscription::{Phase, SubscriptionBinder, SubscriptionSpec};
//! use dao_header::subscription::source::Source;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Props {
//!     id: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let spec = SubscriptionSpec::new(
//!     |_props: &Props| Ok(Source::once(42_u32)),
//!     |props: &Props, sub| format!("{} = {}", props.id, sub.data),
//! )
//! .on_loading(|_| "loading".to_string())
//! .resubscribe_when(|old: &Props, new: &Props| old.id != new.id);
//!
//! let mut binder = SubscriptionBinder::new(spec);
//! binder.attach(Props { id: "x".into() });
//!
//! assert_eq!(binder.phase(), Phase::Ready);
//! assert_eq!(binder.render(), "x = 42");
//! # }
//! ```

pub mod handle;
pub mod mock;
pub mod poll;
pub mod source;

use thiserror::Error;
use tracing::{debug, trace, warn};

use self::handle::{Event, Handle, HandleId};
use self::source::{Source, SourceError};

/// Why a binder ended up in [`Phase::Failed`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The source factory failed synchronously.
    #[error("source factory failed: {0}")]
    Factory(SourceError),

    /// An asynchronous step in front of the source failed.
    #[error("deferred source failed: {0}")]
    Deferred(SourceError),

    /// The source failed after it was subscribed.
    #[error("source failed: {0}")]
    Source(SourceError),
}

impl BindError {
    /// The collaborator error, regardless of where it surfaced.
    #[must_use]
    pub const fn source_error(&self) -> &SourceError {
        match self {
            Self::Factory(error) | Self::Deferred(error) | Self::Source(error) => error,
        }
    }
}

/// Coarse lifecycle phase of a binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not attached yet.
    Idle,
    /// Waiting for the first emission of the current source.
    Loading,
    /// The latest emission is available.
    Ready,
    /// The current source or its factory failed.
    Failed,
    /// Detached; nothing changes until the next attach.
    Detached,
}

/// Binding state; the variants carry exactly the data valid in each phase.
#[derive(Debug)]
enum BindingState<V> {
    Idle,
    Loading,
    Ready(V),
    Failed(BindError),
    Detached,
}

impl<V> BindingState<V> {
    const fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Loading => Phase::Loading,
            Self::Ready(_) => Phase::Ready,
            Self::Failed(_) => Phase::Failed,
            Self::Detached => Phase::Detached,
        }
    }
}

/// Subscription data handed to the wrapped presentational function.
///
/// The wrapped function only runs in [`Phase::Ready`]; loading and failure
/// go to the fallbacks. `is_loading` is therefore always `false` and `error`
/// always `None`.
#[derive(Debug)]
pub struct Subscribed<'a, V> {
    pub data: &'a V,
    pub is_loading: bool,
    pub error: Option<&'a BindError>,
}

type Factory<P, V> = Box<dyn Fn(&P) -> Result<Source<V>, SourceError> + Send>;
type Present<P, V, O> = Box<dyn for<'a> Fn(&P, Subscribed<'a, V>) -> O + Send>;
type Resubscribe<P> = Box<dyn Fn(&P, &P) -> bool + Send>;
type LoadingFallback<P, O> = Box<dyn Fn(&P) -> O + Send>;
type ErrorFallback<P, O> = Box<dyn Fn(&P, &BindError) -> O + Send>;

/// Immutable configuration of a [`SubscriptionBinder`].
///
/// `P` is the props type, `V` the value the source emits and `O` the rendered
/// output. Without a [`resubscribe_when`](Self::resubscribe_when) predicate the
/// binder resubscribes whenever new props differ from the previous ones.
pub struct SubscriptionSpec<P, V, O> {
    produce: Factory<P, V>,
    present: Present<P, V, O>,
    should_resubscribe: Option<Resubscribe<P>>,
    on_loading: Option<LoadingFallback<P, O>>,
    on_error: Option<ErrorFallback<P, O>>,
}

impl<P, V, O> SubscriptionSpec<P, V, O> {
    /// Creates a spec from a source factory and the wrapped presentational function.
    pub fn new<F, R>(produce: F, present: R) -> Self
    where
        F: Fn(&P) -> Result<Source<V>, SourceError> + Send + 'static,
        R: for<'a> Fn(&P, Subscribed<'a, V>) -> O + Send + 'static,
    {
        Self {
            produce: Box::new(produce),
            present: Box::new(present),
            should_resubscribe: None,
            on_loading: None,
            on_error: None,
        }
    }

    /// Resubscribe only when `predicate(old, new)` holds.
    #[must_use]
    pub fn resubscribe_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&P, &P) -> bool + Send + 'static,
    {
        self.should_resubscribe = Some(Box::new(predicate));
        self
    }

    /// Keep the first subscription for the whole attachment.
    #[must_use]
    pub fn never_resubscribe(self) -> Self {
        self.resubscribe_when(|_, _| false)
    }

    /// Rendered while loading.
    #[must_use]
    pub fn on_loading<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&P) -> O + Send + 'static,
    {
        self.on_loading = Some(Box::new(fallback));
        self
    }

    /// Rendered after a failure.
    #[must_use]
    pub fn on_error<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&P, &BindError) -> O + Send + 'static,
    {
        self.on_error = Some(Box::new(fallback));
        self
    }
}

/// Keeps a presentational function in sync with one asynchronous source.
///
/// At most one subscription is live at any time. Resubscribing drops the
/// current source before the factory runs again, and events are only applied
/// if they come from the subscription that is current when they are processed.
pub struct SubscriptionBinder<P, V, O> {
    spec: SubscriptionSpec<P, V, O>,
    state: BindingState<V>,
    props: Option<P>,
    /// Live source; `None` once it finished or failed.
    handle: Option<Handle<V>>,
    /// Subscription whose events may still be applied.
    current: Option<HandleId>,
    last_id: Option<HandleId>,
}

impl<P, V, O> SubscriptionBinder<P, V, O>
where
    P: PartialEq,
    V: Send + 'static,
    O: Default,
{
    #[must_use]
    pub const fn new(spec: SubscriptionSpec<P, V, O>) -> Self {
        Self {
            spec,
            state: BindingState::Idle,
            props: None,
            handle: None,
            current: None,
            last_id: None,
        }
    }

    /// Starts the binding with `props`. Must be called from within a Tokio runtime.
    pub fn attach(&mut self, props: P) {
        if self.is_attached() {
            warn!("attach on an attached binder, starting over");
        }
        self.release();
        self.state = BindingState::Idle;
        self.props = Some(props);
        debug!("binder attached");
        self.resolve();
    }

    /// Applies new props, resubscribing only if the predicate says so.
    pub fn on_props_changed(&mut self, props: P) {
        let Some(old) = self.props.as_ref() else {
            trace!("props changed while detached, ignoring");
            return;
        };

        let resubscribe = match &self.spec.should_resubscribe {
            Some(predicate) => predicate(old, &props),
            None => *old != props,
        };
        self.props = Some(props);

        if resubscribe {
            debug!("props changed, resubscribing");
            self.resolve();
        } else {
            trace!("props changed, keeping subscription");
        }
    }

    /// Releases the subscription. Calling it again is a no-op.
    pub fn detach(&mut self) {
        if matches!(self.state, BindingState::Detached) {
            return;
        }
        self.release();
        self.props = None;
        self.state = BindingState::Detached;
        debug!("binder detached");
    }

    /// Applies every event the live source has ready. Returns `true` if the
    /// state changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        while let Some((id, event)) = self.handle.as_mut().and_then(|handle| {
            let id = handle.id();
            handle.try_next().map(|event| (id, event))
        }) {
            changed |= self.apply(id, event);
        }
        self.drop_finished();
        changed
    }

    /// Waits for the next event of the live source and applies it.
    ///
    /// Returns `false` without waiting if there is no live source, or once the
    /// source has finished.
    pub async fn wait_for_update(&mut self) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        let id = handle.id();
        let event = handle.next().await;
        let changed = match event {
            Some(event) => self.apply(id, event),
            None => false,
        };
        self.drop_finished();
        changed
    }

    /// Renders the current phase.
    pub fn render(&self) -> O {
        let Some(props) = self.props.as_ref() else {
            return O::default();
        };

        match &self.state {
            BindingState::Ready(data) => (self.spec.present)(
                props,
                Subscribed {
                    data,
                    is_loading: false,
                    error: None,
                },
            ),
            BindingState::Idle | BindingState::Loading => self
                .spec
                .on_loading
                .as_ref()
                .map_or_else(O::default, |fallback| fallback(props)),
            BindingState::Failed(error) => self
                .spec
                .on_error
                .as_ref()
                .map_or_else(O::default, |fallback| fallback(props, error)),
            BindingState::Detached => O::default(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// The latest emission, if ready.
    #[must_use]
    pub const fn value(&self) -> Option<&V> {
        match &self.state {
            BindingState::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if failed.
    #[must_use]
    pub const fn error(&self) -> Option<&BindError> {
        match &self.state {
            BindingState::Failed(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn props(&self) -> Option<&P> {
        self.props.as_ref()
    }

    /// Identity of the live subscription, if any. A source that finished or
    /// failed no longer counts as live.
    #[must_use]
    pub fn handle_id(&self) -> Option<HandleId> {
        self.handle.as_ref().map(Handle::id)
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.props.is_some()
    }

    fn release(&mut self) {
        self.current = None;
        if let Some(handle) = self.handle.take() {
            trace!(handle = ?handle.id(), "releasing subscription");
            handle.release();
        }
    }

    fn drop_finished(&mut self) {
        if self.handle.as_ref().is_some_and(Handle::is_finished) {
            self.handle = None;
        }
    }

    fn resolve(&mut self) {
        // The old source is dropped before the factory runs, so two sources
        // never feed this binder.
        self.release();
        let Some(props) = self.props.as_ref() else {
            return;
        };
        self.state = BindingState::Loading;

        let source = match (self.spec.produce)(props) {
            Ok(source) => source,
            Err(error) => {
                debug!(%error, "source factory failed");
                self.state = BindingState::Failed(BindError::Factory(error));
                return;
            }
        };

        let id = self.last_id.map_or_else(HandleId::first, HandleId::next);
        self.last_id = Some(id);
        self.current = Some(id);

        // A first emission that is already available lands before attach or
        // on_props_changed returns.
        let mut handle = Handle::new(id, source);
        if let Some(event) = handle.try_next() {
            self.apply(id, event);
        }
        self.handle = Some(handle);
        self.drop_finished();
    }

    fn apply(&mut self, id: HandleId, event: Event<V>) -> bool {
        if self.current != Some(id) || matches!(self.state, BindingState::Detached) {
            trace!(handle = ?id, "discarding stale event");
            return false;
        }

        match event {
            Event::Next(value) => self.state = BindingState::Ready(value),
            Event::Failed(error) => {
                debug!(handle = ?id, %error, "subscription failed");
                self.state = BindingState::Failed(error);
            }
        }
        true
    }
}
