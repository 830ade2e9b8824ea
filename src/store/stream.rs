//! Streams handed out by a store.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::error::DispatchError;

/// Outcomes of one dispatch, in the order its atomic actions were processed.
///
/// Yields `Ok` for each committed action whose (projected) result differs
/// from the value before it, and `Err` for each action that failed. Dropping
/// the stream stops pulling further actions from the dispatched source.
pub struct DispatchStream<D> {
    inner: BoxStream<'static, Result<D, DispatchError>>,
}

impl<D> DispatchStream<D> {
    pub(crate) fn new(inner: BoxStream<'static, Result<D, DispatchError>>) -> Self {
        Self { inner }
    }
}

impl<D> Stream for DispatchStream<D> {
    type Item = Result<D, DispatchError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<D> fmt::Debug for DispatchStream<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchStream").finish_non_exhaustive()
    }
}

/// Every state committed by the store after the subscription was made.
///
/// A subscriber that falls too far behind skips the states it missed and
/// resumes with the oldest one still buffered.
pub struct StateStream<S> {
    inner: BoxStream<'static, S>,
}

impl<S: Clone + Send + 'static> StateStream<S> {
    pub(crate) fn new(store: String, receiver: broadcast::Receiver<S>) -> Self {
        let inner = stream::unfold((store, receiver), |(store, mut receiver)| async move {
            loop {
                match receiver.recv().await {
                    Ok(state) => return Some((state, (store, receiver))),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(store = %store, skipped, "State subscriber lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed();

        Self { inner }
    }

    /// Project every state and drop values equal to the previous projection.
    ///
    /// `seed` is the projection of the state at subscription time.
    pub(crate) fn distinct<D, F>(self, seed: D, projection: F) -> StateStream<D>
    where
        D: Clone + PartialEq + Send + 'static,
        F: Fn(&S) -> D + Send + 'static,
    {
        let mut last = seed;
        let inner = self
            .inner
            .filter_map(move |state| {
                let next = projection(&state);
                let changed = next != last;
                if changed {
                    last = next.clone();
                }
                future::ready(changed.then_some(next))
            })
            .boxed();

        StateStream { inner }
    }
}

impl<S> Stream for StateStream<S> {
    type Item = S;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<S> fmt::Debug for StateStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStream").finish_non_exhaustive()
    }
}
