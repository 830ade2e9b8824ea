//! The single thread that owns a store's state.
//!
//! Every atomic action is observed, folded and committed here, one at a
//! time, in the order the jobs arrive on the channel.

use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use uuid::Uuid;

use crate::error::{panic_message, DispatchError};
use crate::middleware::Middleware;
use crate::mutator::ApplyMutator;
use crate::state::{Partition, StoreState};

/// One atomic action waiting to be processed.
pub(crate) struct Job<S, A> {
    pub dispatch_id: Uuid,
    pub action: A,
    pub reply: oneshot::Sender<Result<Transition<S>, DispatchError>>,
}

/// States on either side of a committed action.
pub(crate) struct Transition<S> {
    pub before: S,
    pub after: S,
}

pub(crate) struct Worker<S: StoreState, A> {
    pub name: String,
    pub state: S,
    pub mutators: Vec<Box<dyn ApplyMutator<S, A>>>,
    pub middlewares: Vec<Box<dyn Middleware<S, A>>>,
    pub snapshot: watch::Sender<S>,
    pub changes: broadcast::Sender<S>,
}

impl<S: StoreState, A: Send + 'static> Worker<S, A> {
    /// Start the worker on its own thread.
    ///
    /// The thread exits once every sender for `jobs` has been dropped.
    pub fn spawn(self, jobs: mpsc::Receiver<Job<S, A>>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("rxreduce-{}", self.name))
            .spawn(move || self.run(jobs))
    }

    fn run(mut self, mut jobs: mpsc::Receiver<Job<S, A>>) {
        tracing::debug!(store = %self.name, "Store worker started");

        while let Some(job) = jobs.blocking_recv() {
            let outcome = self.process(job.dispatch_id, &job.action);
            if job.reply.send(outcome).is_err() {
                tracing::trace!(
                    store = %self.name,
                    dispatch_id = %job.dispatch_id,
                    "Dispatch outcome dropped (receiver gone)"
                );
            }
        }

        tracing::debug!(store = %self.name, "Store worker stopped");
    }

    /// Observe, fold and commit one action.
    fn process(&mut self, dispatch_id: Uuid, action: &A) -> Result<Transition<S>, DispatchError> {
        self.observe(dispatch_id, action);

        let next = match self.fold(action) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(
                    store = %self.name,
                    %dispatch_id,
                    error_type = err.error_type(),
                    error = %err,
                    "Action aborted; state left unchanged"
                );
                return Err(err);
            }
        };

        let before = std::mem::replace(&mut self.state, next.clone());
        let changed = before != next;
        if changed {
            self.snapshot.send_replace(next.clone());
            // No receivers is fine; nobody is subscribed yet.
            let _ = self.changes.send(next.clone());
        }

        tracing::debug!(store = %self.name, %dispatch_id, changed, "Action committed");

        Ok(Transition {
            before,
            after: next,
        })
    }

    fn observe(&self, dispatch_id: Uuid, action: &A) {
        for (index, middleware) in self.middlewares.iter().enumerate() {
            let observed = catch_unwind(AssertUnwindSafe(|| middleware.observe(&self.state, action)));
            if let Err(payload) = observed {
                tracing::warn!(
                    store = %self.name,
                    %dispatch_id,
                    middleware = index,
                    panic = %panic_message(payload.as_ref()),
                    "Middleware panicked; continuing"
                );
            }
        }
    }

    /// Run every mutator in registration order over a copy of the state.
    fn fold(&self, action: &A) -> Result<S, DispatchError> {
        let mut state = self.state.clone();

        for mutator in &self.mutators {
            let partition = mutator.partition().name();
            state = match catch_unwind(AssertUnwindSafe(|| mutator.apply(state, action))) {
                Ok(Ok(next)) => next,
                Ok(Err(source)) => return Err(DispatchError::Reducer { partition, source }),
                Err(payload) => {
                    return Err(DispatchError::ReducerPanicked {
                        partition,
                        message: panic_message(payload.as_ref()),
                    })
                }
            };
        }

        Ok(state)
    }
}
