//! Logical-time utilities (Lamport clocks, vector clocks, vector timestamps).
//!
//! `logical` holds the expandable scalar clock, `vector` the partial order over
//! named clocks, `stamp` the per-process state used by the SES admission test
//! and `shared` the lockable wrapper that lets two clocks be compared while
//! other threads keep mutating them.

pub mod logical;
pub mod shared;
pub mod stamp;
pub mod vector;

// Re-export for convenience
pub use logical::LogicalClock;
pub use shared::{lock_both, SharedClock};
pub use stamp::VectorTimeStamp;
pub use vector::{PartialOrder, VectorClock};

/// Capability shared by the scalar and the vector clock.
///
/// `is_less_than` is strict: a value is never less than itself.
pub trait Clock: Clone + Send {
    fn is_less_than(&self, other: &Self) -> bool;
}
