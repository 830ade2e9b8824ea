//! Action-like values and their normalization.
//!
//! Callers dispatch an [`ActionLike`], which may be a single action, an
//! ordered batch, or a source that produces more action-like values over
//! time. [`normalize`] flattens any of these into one ordered stream of
//! atomic actions.

use std::fmt;
use std::future::Future;

use futures::stream::{self, BoxStream, Stream, StreamExt};

/// Something that can be dispatched to a [`Store`](crate::Store).
pub enum ActionLike<A> {
    /// One concrete action.
    Atomic(A),
    /// Ordered batch; each element is drained before the next begins.
    Composite(Vec<ActionLike<A>>),
    /// Values produced over time, on whatever task the source chooses.
    Deferred(BoxStream<'static, ActionLike<A>>),
}

impl<A: Send + 'static> ActionLike<A> {
    pub fn atomic(action: A) -> Self {
        ActionLike::Atomic(action)
    }

    pub fn composite<I>(actions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ActionLike<A>>,
    {
        ActionLike::Composite(actions.into_iter().map(Into::into).collect())
    }

    /// Wrap a stream whose items are themselves action-like.
    pub fn deferred<S>(source: S) -> Self
    where
        S: Stream + Send + 'static,
        S::Item: Into<ActionLike<A>>,
    {
        ActionLike::Deferred(source.map(Into::<ActionLike<A>>::into).boxed())
    }

    /// A source that resolves once, e.g. the result of a network call.
    pub fn future<F>(future: F) -> Self
    where
        F: Future + Send + 'static,
        F::Output: Into<ActionLike<A>>,
    {
        Self::deferred(stream::once(future))
    }

    /// Produces no action at all.
    pub fn empty() -> Self {
        ActionLike::Composite(Vec::new())
    }
}

impl<A> From<A> for ActionLike<A> {
    fn from(action: A) -> Self {
        ActionLike::Atomic(action)
    }
}

impl<A> FromIterator<ActionLike<A>> for ActionLike<A> {
    fn from_iter<I: IntoIterator<Item = ActionLike<A>>>(iter: I) -> Self {
        ActionLike::Composite(iter.into_iter().collect())
    }
}

impl<A: fmt::Debug> fmt::Debug for ActionLike<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionLike::Atomic(action) => f.debug_tuple("Atomic").field(action).finish(),
            ActionLike::Composite(actions) => f.debug_tuple("Composite").field(actions).finish(),
            ActionLike::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Flatten an action-like value into an ordered stream of atomic actions.
///
/// The stream is lazy: nothing is pulled from a deferred source until the
/// result is polled, and composite elements are concatenated, never merged.
pub fn normalize<A: Send + 'static>(action: ActionLike<A>) -> BoxStream<'static, A> {
    match action {
        ActionLike::Atomic(action) => stream::once(async move { action }).boxed(),
        ActionLike::Composite(actions) => stream::iter(actions).flat_map(normalize).boxed(),
        ActionLike::Deferred(source) => source.flat_map(normalize).boxed(),
    }
}
