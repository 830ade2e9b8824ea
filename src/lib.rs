//! Unidirectional state container.
//!
//! A [`Store`] holds one state value. It changes only when an action is
//! dispatched: middlewares observe the action, then every registered
//! [`Mutator`] folds its partition of the state through a [`Lens`], and the
//! result is committed and published if it differs from the previous state.
//!
//! ```text
//! Action ──→ Middlewares ──→ Mutators ──→ State ──→ Observers
//!    ↑                                                 │
//!    └─────────────────────────────────────────────────┘
//! ```
//!
//! - **State**: [`StoreState`], a value split into declared [`Partition`]s
//! - **Action**: [`ActionLike`], a single action, a batch or a deferred source
//! - **Mutator**: a lens plus a pure reducer for exactly one partition

pub mod action;
pub mod config;
pub mod error;
pub mod lens;
pub mod logging;
pub mod middleware;
pub mod mutator;
pub mod state;
pub mod store;

pub use action::{normalize, ActionLike};
pub use config::{ConfigError, StoreConfig};
pub use error::{DispatchError, StoreError};
pub use lens::Lens;
pub use middleware::{LoggingMiddleware, Middleware};
pub use mutator::Mutator;
pub use state::{Partition, StoreState};
pub use store::{DispatchStream, StateStream, Store, StoreBuilder};
