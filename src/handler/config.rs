use serde::{Deserialize, Serialize};

use crate::error::ClockError;
use crate::types::{ProcessId, WireFormat};

/// Settings for one [`CausallyOrderedMsgHandler`](super::CausallyOrderedMsgHandler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    /// Name of the process the handler stamps messages for.
    pub process_id: ProcessId,
    /// Encoding used for outgoing timestamps. Incoming ones may use either.
    #[serde(default)]
    pub wire_format: WireFormat,
}

impl HandlerConfig {
    pub fn new(process_id: impl Into<ProcessId>) -> Self {
        Self {
            process_id: process_id.into(),
            wire_format: WireFormat::default(),
        }
    }

    pub fn with_wire_format(mut self, wire_format: WireFormat) -> Self {
        self.wire_format = wire_format;
        self
    }

    /// Parses and validates a JSON config document.
    pub fn from_json(text: &str) -> Result<Self, ClockError> {
        let config: HandlerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClockError> {
        if self.process_id.trim().is_empty() {
            return Err(ClockError::InvalidConfig("process_id must not be empty".into()));
        }
        Ok(())
    }
}
