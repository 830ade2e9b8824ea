//! Mutators: a lens bound to a pure reduction of one partition.

use std::fmt;
use std::sync::Arc;

use crate::lens::Lens;
use crate::state::{Partition, StoreState};

type ReduceFn<S, P, A> = Arc<dyn Fn(&S, &A) -> anyhow::Result<P> + Send + Sync>;

/// Reduces one partition of `S` and writes it back through a [`Lens`].
///
/// The reducer sees the whole state so it can read sibling partitions, but
/// only ever produces its own part. It must be pure and must return the
/// current part unchanged for actions it does not handle.
pub struct Mutator<S: StoreState, P, A> {
    partition: S::Partition,
    lens: Lens<S, P>,
    reduce: ReduceFn<S, P, A>,
}

impl<S: StoreState, P: 'static, A: 'static> Mutator<S, P, A> {
    /// Bind `reduce` to `partition` through `lens`.
    ///
    /// The store trusts `lens` to write exactly the part named by
    /// `partition`; keeping the two consistent is up to the caller.
    pub fn new<F>(partition: S::Partition, lens: Lens<S, P>, reduce: F) -> Self
    where
        F: Fn(&S, &A) -> P + Send + Sync + 'static,
    {
        Self {
            partition,
            lens,
            reduce: Arc::new(move |state: &S, action: &A| {
                Ok::<P, anyhow::Error>(reduce(state, action))
            }),
        }
    }

    /// A mutator whose reducer can reject an action.
    ///
    /// An `Err` aborts the commit of that action only.
    pub fn fallible<F>(partition: S::Partition, lens: Lens<S, P>, reduce: F) -> Self
    where
        F: Fn(&S, &A) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        Self {
            partition,
            lens,
            reduce: Arc::new(reduce),
        }
    }

    pub fn partition(&self) -> S::Partition {
        self.partition
    }

    /// `lens.set(state, reduce(state, action))`
    pub fn apply(&self, state: S, action: &A) -> anyhow::Result<S> {
        let part = (self.reduce)(&state, action)?;
        Ok(self.lens.set(state, part))
    }
}

impl<S: StoreState, P, A> Clone for Mutator<S, P, A> {
    fn clone(&self) -> Self {
        Self {
            partition: self.partition,
            lens: self.lens.clone(),
            reduce: Arc::clone(&self.reduce),
        }
    }
}

impl<S: StoreState, P, A> fmt::Debug for Mutator<S, P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("partition", &self.partition.name())
            .finish_non_exhaustive()
    }
}

/// Type-erased mutator as held by the store, with the part type hidden.
pub(crate) trait ApplyMutator<S: StoreState, A>: Send + Sync {
    fn partition(&self) -> S::Partition;

    fn apply(&self, state: S, action: &A) -> anyhow::Result<S>;
}

impl<S, P, A> ApplyMutator<S, A> for Mutator<S, P, A>
where
    S: StoreState,
    P: 'static,
    A: 'static,
{
    fn partition(&self) -> S::Partition {
        Mutator::partition(self)
    }

    fn apply(&self, state: S, action: &A) -> anyhow::Result<S> {
        Mutator::apply(self, state, action)
    }
}
