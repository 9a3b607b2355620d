#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Causal ordering of point-to-point and multicast messages.
//!
//! The crate provides expandable Lamport clocks, vector clocks, the vector
//! timestamps of the Schiper-Eggli-Sandoz protocol and a per-process message
//! handler that stamps outgoing payloads, holds incoming ones that arrive
//! ahead of their causal predecessors, and releases them once those have been
//! delivered. Moving envelopes between processes is left to the caller.

// Crate error type.
pub mod error;

// Process ids, digit width, wire field names and output format.
pub mod types;

// Clocks and timestamps.
pub mod time;

// Strict JSON codec for clocks and timestamps.
pub mod wire;

// Envelope exchanged between handlers.
pub mod message;

// Per-process SES gateway.
pub mod handler;

#[cfg(feature = "test-utils")]
pub mod testing;

pub use error::ClockError;
pub use handler::{CausallyOrderedMsgHandler, HandlerConfig};
pub use message::CausallyOrderedMessage;
pub use time::{
    lock_both, Clock, LogicalClock, PartialOrder, SharedClock, VectorClock, VectorTimeStamp,
};
pub use types::{ProcessId, WireFormat};
