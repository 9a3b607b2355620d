//! Envelope carried between processes: a payload plus the sender's serialized
//! vector timestamp as it stood just before the send.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::VectorTimeStamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausallyOrderedMessage<P> {
    /// Correlation id for logs. Plays no part in ordering.
    id: Uuid,
    payload: P,
    timestamp: String,
}

impl<P> CausallyOrderedMessage<P> {
    pub(crate) fn new(payload: P, timestamp: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            timestamp,
        }
    }

    /// Rebuilds an envelope a transport took apart.
    pub fn from_parts(id: Uuid, payload: P, timestamp: impl Into<String>) -> Self {
        Self {
            id,
            payload,
            timestamp: timestamp.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// The sender's timestamp in wire form.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The sender's timestamp, or an empty one if the wire form is malformed.
    pub fn decoded_timestamp(&self) -> VectorTimeStamp {
        VectorTimeStamp::restore(None, &self.timestamp)
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}
