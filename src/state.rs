//! State shape traits.
//!
//! A store state is a single value made of named partitions. The set of
//! partitions is declared up front as a manifest of [`Partition`] keys
//! instead of being discovered at runtime.

use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of one top-level partition of a state shape.
///
/// Usually a fieldless enum with one variant per sub-state.
pub trait Partition: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Static label used in errors and logs.
    fn name(&self) -> &'static str;
}

/// Whole application state held by a [`Store`](crate::Store).
///
/// States should be:
/// - Immutable by convention (Clone to create new states)
/// - Comparable (PartialEq for distinct-until-changed emission)
/// - Shareable across the store worker and its observers
pub trait StoreState: Clone + PartialEq + Send + Sync + 'static {
    /// Partition keys of this shape.
    type Partition: Partition;

    /// Manifest of every partition that must have a mutator before dispatch.
    fn partitions() -> Vec<Self::Partition>;
}
