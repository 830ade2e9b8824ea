//! Error types for store configuration and dispatch.
//!
//! Configuration errors signal a wiring bug and should abort startup.
//! Registration of a duplicate mutator is recoverable. Dispatch errors are
//! scoped to the single atomic action that failed.

use thiserror::Error;

/// Errors raised while registering mutators or building a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The mutator targets a partition missing from the state manifest
    #[error("Partition '{partition}' is not part of the state shape")]
    UnknownPartition { partition: &'static str },

    /// A mutator is already bound to this partition
    #[error("A mutator already exists for partition '{partition}'")]
    MutatorAlreadyExists { partition: &'static str },

    /// Some partitions have no mutator; dispatch cannot be accepted
    #[error("Partitions without a mutator: {}", .missing.join(", "))]
    MissingMutators { missing: Vec<&'static str> },

    /// The worker thread owning the state could not be started
    #[error("Failed to start store worker: {message}")]
    WorkerSpawn { message: String },
}

impl StoreError {
    /// Whether this error indicates a configuration bug rather than a
    /// condition the caller can react to.
    pub fn is_fatal(&self) -> bool {
        match self {
            StoreError::UnknownPartition { .. } => true,
            StoreError::MutatorAlreadyExists { .. } => false,
            StoreError::MissingMutators { .. } => true,
            StoreError::WorkerSpawn { .. } => true,
        }
    }

    /// Stable error tag for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            StoreError::UnknownPartition { .. } => "unknown_partition",
            StoreError::MutatorAlreadyExists { .. } => "mutator_already_exists",
            StoreError::MissingMutators { .. } => "missing_mutators",
            StoreError::WorkerSpawn { .. } => "worker_spawn",
        }
    }
}

/// Failure of one atomic action. The store state is left as it was before
/// the action.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A fallible reducer returned an error
    #[error("Reducer for partition '{partition}' failed: {source}")]
    Reducer {
        partition: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A reducer panicked
    #[error("Reducer for partition '{partition}' panicked: {message}")]
    ReducerPanicked {
        partition: &'static str,
        message: String,
    },

    /// The store worker is no longer running
    #[error("Store worker has shut down")]
    Closed,
}

impl DispatchError {
    /// Stable error tag for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            DispatchError::Reducer { .. } => "reducer_error",
            DispatchError::ReducerPanicked { .. } => "reducer_panicked",
            DispatchError::Closed => "store_closed",
        }
    }

    /// Partition whose reducer failed, if any.
    pub fn partition(&self) -> Option<&'static str> {
        match self {
            DispatchError::Reducer { partition, .. } => Some(*partition),
            DispatchError::ReducerPanicked { partition, .. } => Some(*partition),
            DispatchError::Closed => None,
        }
    }
}

/// Extract a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_mutator_is_recoverable() {
        let err = StoreError::MutatorAlreadyExists { partition: "counter" };
        assert!(!err.is_fatal());
        assert_eq!(err.error_type(), "mutator_already_exists");
        assert_eq!(
            err.to_string(),
            "A mutator already exists for partition 'counter'"
        );
    }

    #[test]
    fn test_configuration_errors_are_fatal() {
        assert!(StoreError::UnknownPartition { partition: "ghost" }.is_fatal());
        let missing = StoreError::MissingMutators {
            missing: vec!["counter", "users"],
        };
        assert!(missing.is_fatal());
        assert_eq!(missing.to_string(), "Partitions without a mutator: counter, users");
    }

    #[test]
    fn test_reducer_error_keeps_source() {
        let err = DispatchError::Reducer {
            partition: "users",
            source: anyhow::anyhow!("name must not be empty"),
        };
        assert_eq!(err.error_type(), "reducer_error");
        assert_eq!(err.partition(), Some("users"));
        assert!(err.to_string().contains("name must not be empty"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_panic_message_from_payloads() {
        let static_payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(static_payload.as_ref()), "boom");

        let owned_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(owned_payload.as_ref()), "kaboom");

        let other_payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other_payload.as_ref()), "non-string panic payload");
    }
}
