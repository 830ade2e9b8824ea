use serde::{Deserialize, Serialize};

/// Store runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Label for the worker thread and log records (default: "store").
    #[serde(default = "default_name")]
    pub name: String,
    /// Atomic actions that may wait for the worker before dispatch
    /// applies backpressure (default: 64).
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Committed states buffered per subscriber before a slow subscriber
    /// starts skipping values (default: 256).
    #[serde(default = "default_stream_capacity")]
    pub stream_capacity: usize,
}

fn default_name() -> String {
    "store".to_string()
}

fn default_queue_capacity() -> usize {
    64
}

fn default_stream_capacity() -> usize {
    256
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            queue_capacity: default_queue_capacity(),
            stream_capacity: default_stream_capacity(),
        }
    }
}
