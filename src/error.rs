//!
//! Defines error types for clock decoding, encoding and handler configuration.

use serde_json::error::Category;

/// Errors surfaced by the strict wire decoders and by configuration checks.
///
/// Malformed wire data is never fatal inside the handler: the lossy decoders
/// map every variant below to an empty clock or timestamp. The strict
/// `from_wire` entry points return them so callers can tell what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The input is not well-formed JSON.
    #[error("Malformed clock text: {0}")]
    Syntax(String),
    /// Well-formed JSON that does not follow the wire layout (field names, order, types).
    #[error("Unexpected clock layout: {0}")]
    Schema(String),
    /// The input ended before the entity was complete.
    #[error("Truncated clock text: {0}")]
    Truncated(String),
    /// The serializer rejected a value.
    #[error("Failed to encode clock: {0}")]
    Encode(String),
    /// A handler configuration was rejected.
    #[error("Invalid handler configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for ClockError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Syntax => ClockError::Syntax(err.to_string()),
            Category::Data => ClockError::Schema(err.to_string()),
            Category::Eof => ClockError::Truncated(err.to_string()),
            Category::Io => ClockError::Encode(err.to_string()),
        }
    }
}
