//! The store: one state value, changed only by serialized dispatch.
//!
//! # Architecture
//!
//! ```text
//! dispatch(action-like) ──→ normalize ──→ atomic actions, one at a time
//!                                               │
//!                                               ▼
//!                              ┌──────────── store worker ────────────┐
//!                              │ middlewares observe (state, action)  │
//!                              │ mutators fold in registration order  │
//!                              │ commit, publish if state changed     │
//!                              └──────────────────────────────────────┘
//!                                               │
//!                         ┌─────────────────────┴───────────────┐
//!                         ▼                                     ▼
//!                  DispatchStream                          StateStream
//!              (this dispatch's results)           (every committed change)
//! ```
//!
//! Each store owns a dedicated worker thread; a slow reducer on one store
//! never delays another.

mod builder;
mod stream;
mod worker;

pub use builder::StoreBuilder;
pub use stream::{DispatchStream, StateStream};

use std::fmt;
use std::sync::Arc;

use futures::future;
use futures::stream::StreamExt;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::action::{normalize, ActionLike};
use crate::error::DispatchError;
use crate::state::StoreState;
use worker::{Job, Transition};

/// Handle to a running store.
///
/// Cloning is cheap; all clones talk to the same worker. The worker stops
/// once every handle and every in-flight dispatch stream is dropped.
pub struct Store<S: StoreState, A> {
    name: Arc<str>,
    jobs: mpsc::Sender<Job<S, A>>,
    snapshot: watch::Receiver<S>,
    changes: broadcast::Sender<S>,
}

impl<S: StoreState, A: Send + 'static> Store<S, A> {
    /// Begin registering mutators for a store starting at `initial`.
    pub fn builder(initial: S) -> StoreBuilder<S, A> {
        StoreBuilder::new(initial)
    }

    pub(crate) fn new(
        name: String,
        jobs: mpsc::Sender<Job<S, A>>,
        snapshot: watch::Receiver<S>,
        changes: broadcast::Sender<S>,
    ) -> Self {
        Self {
            name: name.into(),
            jobs,
            snapshot,
            changes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The most recently committed state.
    pub fn current(&self) -> S {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to every state committed from now on.
    pub fn subscribe(&self) -> StateStream<S> {
        StateStream::new(self.name.to_string(), self.changes.subscribe())
    }

    /// Subscribe to a projection of the state.
    ///
    /// Emits `projection(state)` for each commit whose projected value differs
    /// from the previous one, starting from the state at subscription time.
    pub fn subscribe_on<D, F>(&self, projection: F) -> StateStream<D>
    where
        D: Clone + PartialEq + Send + 'static,
        F: Fn(&S) -> D + Send + 'static,
    {
        let states = self.subscribe();
        let seed = projection(&self.current());
        states.distinct(seed, projection)
    }

    /// Dispatch an action-like value and observe the resulting states.
    ///
    /// Nothing happens until the returned stream is polled. Each atomic
    /// action is committed before the next one is pulled from the source.
    pub fn dispatch(&self, action: impl Into<ActionLike<A>>) -> DispatchStream<S> {
        self.dispatch_on(action, S::clone)
    }

    /// Like [`dispatch`](Self::dispatch), but emits `projection(state)` and
    /// suppresses actions that leave the projected value unchanged.
    ///
    /// Each action is compared with the state it was folded over, not with
    /// this stream's previous emission. A no-op action emits nothing even
    /// when other dispatches committed in between.
    pub fn dispatch_on<D, F>(
        &self,
        action: impl Into<ActionLike<A>>,
        projection: F,
    ) -> DispatchStream<D>
    where
        D: PartialEq + Send + 'static,
        F: Fn(&S) -> D + Send + 'static,
    {
        let jobs = self.jobs.clone();
        let dispatch_id = Uuid::new_v4();
        let span = tracing::debug_span!("dispatch", store = %self.name, %dispatch_id);
        tracing::debug!(parent: &span, "Dispatch created");

        let outcomes = normalize(action.into())
            .then(move |action| {
                submit(jobs.clone(), dispatch_id, action).instrument(span.clone())
            })
            .filter_map(move |outcome| {
                let emitted = match outcome {
                    Ok(Transition { before, after }) => {
                        let next = projection(&after);
                        (next != projection(&before)).then_some(Ok(next))
                    }
                    Err(err) => Some(Err(err)),
                };
                future::ready(emitted)
            });

        DispatchStream::new(outcomes.boxed())
    }

    /// Drive a dispatch to completion on the current tokio runtime.
    ///
    /// Failed actions are logged. Must be called from within a runtime.
    pub fn spawn_dispatch(&self, action: impl Into<ActionLike<A>>) -> JoinHandle<()> {
        let name = Arc::clone(&self.name);
        let mut outcomes = self.dispatch(action);

        tokio::spawn(async move {
            while let Some(outcome) = outcomes.next().await {
                if let Err(err) = outcome {
                    tracing::warn!(
                        store = %name,
                        error_type = err.error_type(),
                        error = %err,
                        "Spawned dispatch action failed"
                    );
                }
            }
        })
    }
}

/// Hand one atomic action to the worker and wait for its outcome.
async fn submit<S, A>(
    jobs: mpsc::Sender<Job<S, A>>,
    dispatch_id: Uuid,
    action: A,
) -> Result<Transition<S>, DispatchError> {
    let (reply, outcome) = oneshot::channel();
    jobs.send(Job {
        dispatch_id,
        action,
        reply,
    })
    .await
    .map_err(|_| DispatchError::Closed)?;

    outcome.await.map_err(|_| DispatchError::Closed)?
}

impl<S: StoreState, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            jobs: self.jobs.clone(),
            snapshot: self.snapshot.clone(),
            changes: self.changes.clone(),
        }
    }
}

impl<S: StoreState, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
