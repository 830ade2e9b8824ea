//! Shared test fixtures: a counter/users state and its mutators.

#![allow(dead_code, unused_imports)]

use futures::StreamExt;
use parking_lot::Mutex;
use rxreduce::{
    field_lens, DispatchStream, Mutator, Partition, Store, StoreBuilder, StoreState,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub counter: i64,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppPartition {
    Counter,
    Users,
}

impl Partition for AppPartition {
    fn name(&self) -> &'static str {
        match self {
            AppPartition::Counter => "counter",
            AppPartition::Users => "users",
        }
    }
}

impl StoreState for AppState {
    type Partition = AppPartition;

    fn partitions() -> Vec<AppPartition> {
        vec![AppPartition::Counter, AppPartition::Users]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Increase(i64),
    AddUser(String),
    Clear,
    /// Makes the counter reducer panic.
    Explode,
    /// Makes the users reducer return an error.
    Reject,
}

pub type AppStore = Store<AppState, AppAction>;

fn counter_reduce(state: &AppState, action: &AppAction) -> i64 {
    match action {
        AppAction::Increase(delta) => state.counter + delta,
        AppAction::Clear => 0,
        AppAction::Explode => panic!("counter reducer exploded"),
        _ => state.counter,
    }
}

fn users_reduce(state: &AppState, action: &AppAction) -> anyhow::Result<Vec<String>> {
    match action {
        AppAction::AddUser(name) if name.is_empty() => anyhow::bail!("user name must not be empty"),
        AppAction::AddUser(name) => {
            let mut users = state.users.clone();
            users.push(name.clone());
            Ok(users)
        }
        AppAction::Clear => Ok(Vec::new()),
        AppAction::Reject => anyhow::bail!("users reducer rejected the action"),
        _ => Ok(state.users.clone()),
    }
}

pub fn counter_mutator() -> Mutator<AppState, i64, AppAction> {
    Mutator::new(
        AppPartition::Counter,
        field_lens!(AppState, counter),
        counter_reduce,
    )
}

pub fn users_mutator() -> Mutator<AppState, Vec<String>, AppAction> {
    Mutator::fallible(
        AppPartition::Users,
        field_lens!(AppState, users),
        users_reduce,
    )
}

/// Builder with both mutators registered.
pub fn app_builder() -> StoreBuilder<AppState, AppAction> {
    Store::builder(AppState::default())
        .mutator(counter_mutator())
        .and_then(|builder| builder.mutator(users_mutator()))
        .expect("Failed to register mutators")
}

/// A running store starting from the default state.
pub fn app_store() -> AppStore {
    app_builder().build().expect("Failed to build store")
}

pub fn state(counter: i64, users: &[&str]) -> AppState {
    AppState {
        counter,
        users: users.iter().map(|user| user.to_string()).collect(),
    }
}

/// Collect every emitted value, failing the test on the first error.
pub async fn emitted<D>(stream: DispatchStream<D>) -> Vec<D> {
    tokio::time::timeout(
        Duration::from_secs(5),
        stream
            .map(|outcome| outcome.expect("Dispatched action failed"))
            .collect::<Vec<_>>(),
    )
    .await
    .expect("Dispatch did not complete in time")
}

/// Records every (counter, action) pair a middleware observes.
pub type ObservedLog = Arc<Mutex<Vec<(i64, AppAction)>>>;

pub fn recording_middleware(
    log: &ObservedLog,
) -> impl Fn(&AppState, &AppAction) + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |state: &AppState, action: &AppAction| log.lock().push((state.counter, action.clone()))
}

/// Create a temporary store config file with the given TOML body.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("store.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
