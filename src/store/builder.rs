//! Registration phase of a store.

use std::collections::HashSet;

use tokio::sync::{broadcast, mpsc, watch};

use crate::config::{ConfigError, StoreConfig};
use crate::error::StoreError;
use crate::middleware::Middleware;
use crate::mutator::{ApplyMutator, Mutator};
use crate::state::{Partition, StoreState};
use crate::store::worker::Worker;
use crate::store::Store;

/// Collects mutators and middlewares, then starts a [`Store`].
///
/// The partition manifest is fixed when the builder is created. A store can
/// only be built once every partition in it has exactly one mutator, so a
/// built store never accepts a dispatch with uncovered partitions.
pub struct StoreBuilder<S: StoreState, A> {
    initial: S,
    partitions: Vec<S::Partition>,
    covered: HashSet<S::Partition>,
    mutators: Vec<Box<dyn ApplyMutator<S, A>>>,
    middlewares: Vec<Box<dyn Middleware<S, A>>>,
    config: StoreConfig,
}

impl<S: StoreState, A: Send + 'static> StoreBuilder<S, A> {
    /// Start from `initial`, expecting the partitions declared by `S`.
    pub fn new(initial: S) -> Self {
        Self::with_partitions(initial, S::partitions())
    }

    /// Start from `initial` with an explicit partition manifest.
    ///
    /// Repeated entries count once.
    pub fn with_partitions<I>(initial: S, partitions: I) -> Self
    where
        I: IntoIterator<Item = S::Partition>,
    {
        let mut seen = HashSet::new();
        let partitions = partitions
            .into_iter()
            .filter(|partition| seen.insert(*partition))
            .collect();

        Self {
            initial,
            partitions,
            covered: HashSet::new(),
            mutators: Vec::new(),
            middlewares: Vec::new(),
            config: StoreConfig::default(),
        }
    }

    /// Apply runtime settings after validating them.
    pub fn config(mut self, config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Bind `mutator` to its partition.
    ///
    /// # Errors
    /// - [`StoreError::UnknownPartition`] if the partition is not in the
    ///   manifest. This is a wiring bug and should abort setup.
    /// - [`StoreError::MutatorAlreadyExists`] if the partition is already
    ///   covered. The first mutator stays registered.
    pub fn register<P: 'static>(&mut self, mutator: Mutator<S, P, A>) -> Result<(), StoreError> {
        let partition = mutator.partition();

        if !self.partitions.contains(&partition) {
            tracing::error!(partition = partition.name(), "Mutator targets unknown partition");
            return Err(StoreError::UnknownPartition {
                partition: partition.name(),
            });
        }

        if !self.covered.insert(partition) {
            return Err(StoreError::MutatorAlreadyExists {
                partition: partition.name(),
            });
        }

        tracing::debug!(partition = partition.name(), "Mutator registered");
        self.mutators.push(Box::new(mutator));
        Ok(())
    }

    /// Chaining form of [`register`](Self::register).
    pub fn mutator<P: 'static>(mut self, mutator: Mutator<S, P, A>) -> Result<Self, StoreError> {
        self.register(mutator)?;
        Ok(self)
    }

    /// Add an observer; middlewares run in registration order.
    pub fn register_middleware<M>(&mut self, middleware: M)
    where
        M: Middleware<S, A> + 'static,
    {
        self.middlewares.push(Box::new(middleware));
    }

    /// Chaining form of [`register_middleware`](Self::register_middleware).
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<S, A> + 'static,
    {
        self.register_middleware(middleware);
        self
    }

    /// Partitions in the manifest that still have no mutator, in manifest order.
    pub fn missing_partitions(&self) -> Vec<S::Partition> {
        self.partitions
            .iter()
            .copied()
            .filter(|partition| !self.covered.contains(partition))
            .collect()
    }

    /// Start the store worker.
    ///
    /// # Errors
    /// [`StoreError::MissingMutators`] if any partition is uncovered, or
    /// [`StoreError::WorkerSpawn`] if the worker thread cannot start.
    pub fn build(self) -> Result<Store<S, A>, StoreError> {
        let missing = self.missing_partitions();
        if !missing.is_empty() {
            let missing: Vec<&'static str> = missing.iter().map(Partition::name).collect();
            tracing::error!(?missing, "Refusing to build store with uncovered partitions");
            return Err(StoreError::MissingMutators { missing });
        }

        let StoreBuilder {
            initial,
            mutators,
            middlewares,
            config,
            ..
        } = self;

        let (jobs_tx, jobs_rx) = mpsc::channel(config.queue_capacity);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());
        let (changes_tx, _) = broadcast::channel(config.stream_capacity);

        let worker = Worker {
            name: config.name.clone(),
            state: initial,
            mutators,
            middlewares,
            snapshot: snapshot_tx,
            changes: changes_tx.clone(),
        };
        worker
            .spawn(jobs_rx)
            .map_err(|err| StoreError::WorkerSpawn {
                message: err.to_string(),
            })?;

        tracing::info!(store = %config.name, "Store started");

        Ok(Store::new(config.name, jobs_tx, snapshot_rx, changes_tx))
    }
}
