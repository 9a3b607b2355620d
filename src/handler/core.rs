//!
//! Per-process gateway implementing the Schiper-Eggli-Sandoz protocol.
//!
//! Outgoing payloads are stamped with the process's vector timestamp. Incoming
//! envelopes are admitted when the SES test passes and held otherwise; every
//! admission re-sweeps the held set until a full sweep delivers nothing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ClockError;
use crate::handler::config::HandlerConfig;
use crate::message::CausallyOrderedMessage;
use crate::time::VectorTimeStamp;
use crate::types::{ProcessId, WireFormat};

/// A received envelope that is not yet in causal order, kept with its decoded stamp.
#[derive(Debug)]
struct HeldMessage<P> {
    message: CausallyOrderedMessage<P>,
    stamp: VectorTimeStamp,
}

#[derive(Debug)]
struct HandlerState<P> {
    clock: VectorTimeStamp,
    /// Insertion order. Delivery order is decided by admission, not position.
    held: Vec<HeldMessage<P>>,
}

/// Stamps, admits and buffers messages for one named process.
///
/// All operations take `&self`; the clock and the held set sit behind one
/// mutex, so "check admission, merge, advance" is atomic against concurrent
/// sends and receives on the same handler.
#[derive(Debug)]
pub struct CausallyOrderedMsgHandler<P> {
    name: ProcessId,
    wire_format: WireFormat,
    state: Mutex<HandlerState<P>>,
}

impl<P> CausallyOrderedMsgHandler<P> {
    /// Creates a handler for `name` with the default configuration.
    pub fn new(name: impl Into<ProcessId>) -> Self {
        Self::build(HandlerConfig::new(name))
    }

    /// Validates `config` and creates a handler from it.
    pub fn with_config(config: HandlerConfig) -> Result<Self, ClockError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: HandlerConfig) -> Self {
        let clock = VectorTimeStamp::new(config.process_id.clone());
        Self {
            name: config.process_id,
            wire_format: config.wire_format,
            state: Mutex::new(HandlerState { clock, held: Vec::new() }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_format(&self) -> WireFormat {
        self.wire_format
    }

    /// Snapshot of the live timestamp.
    pub fn clock(&self) -> VectorTimeStamp {
        self.lock().clock.clone()
    }

    pub fn held_count(&self) -> usize {
        self.lock().held.len()
    }

    /// Removes and returns every held envelope, oldest first.
    ///
    /// Held messages never expire by themselves; callers that need a bound
    /// apply their own policy with this.
    pub fn take_held(&self) -> Vec<CausallyOrderedMessage<P>> {
        let held = std::mem::take(&mut self.lock().held);
        held.into_iter().map(|h| h.message).collect()
    }

    /// Stamps `payload` for a single destination.
    ///
    /// The envelope carries the timestamp as it was before the send: the
    /// destination's foreign clock is recorded and the local event ticked
    /// only afterwards.
    pub fn send_message(
        &self,
        payload: P,
        destination: &str,
    ) -> Result<CausallyOrderedMessage<P>, ClockError> {
        let mut state = self.lock();
        let timestamp = state.clock.to_wire(self.wire_format)?;
        state.clock.insert_clock_for(destination);
        state.clock.tick();
        drop(state);

        let message = CausallyOrderedMessage::new(payload, timestamp);
        tracing::trace!(
            process = %self.name,
            destination,
            message_id = %message.id(),
            "stamped message"
        );
        Ok(message)
    }

    /// Stamps `payload` once per destination, returning envelopes in input order.
    ///
    /// Each copy also records the sender's clock for every sibling
    /// destination, so each recipient learns what the sender assumed the
    /// others knew.
    pub fn send_multicast<D>(
        &self,
        payload: P,
        destinations: &[D],
    ) -> Result<Vec<CausallyOrderedMessage<P>>, ClockError>
    where
        P: Clone,
        D: AsRef<str>,
    {
        let mut state = self.lock();

        let mut timestamps = Vec::with_capacity(destinations.len());
        for (i, _) in destinations.iter().enumerate() {
            let mut copy = state.clock.clone();
            for (j, sibling) in destinations.iter().enumerate() {
                if i != j {
                    copy.insert_clock_for(sibling.as_ref());
                }
            }
            timestamps.push(copy.to_wire(self.wire_format)?);
        }

        for destination in destinations {
            state.clock.insert_clock_for(destination.as_ref());
            state.clock.tick_for(destination.as_ref());
        }
        state.clock.tick();
        drop(state);

        let messages: Vec<_> = timestamps
            .into_iter()
            .map(|timestamp| CausallyOrderedMessage::new(payload.clone(), timestamp))
            .collect();
        tracing::trace!(process = %self.name, destinations = messages.len(), "stamped multicast");
        Ok(messages)
    }

    /// Accepts an envelope from the transport.
    ///
    /// Returns the payloads that became deliverable, in delivery order: the
    /// envelope's own payload first, then any held ones it released. Empty
    /// when the envelope is out of causal order and was held instead. A
    /// malformed timestamp carries no causal information and is admitted.
    pub fn recv_message(&self, message: CausallyOrderedMessage<P>) -> Vec<P> {
        let stamp = message.decoded_timestamp();
        let mut state = self.lock();

        if !state.clock.in_causal_order(&stamp) {
            tracing::debug!(
                process = %self.name,
                message_id = %message.id(),
                held = state.held.len() + 1,
                "holding out-of-order message"
            );
            state.held.push(HeldMessage { message, stamp });
            return Vec::new();
        }

        state.clock.receive(&stamp);
        tracing::debug!(process = %self.name, message_id = %message.id(), "delivered message");

        let mut delivered = vec![message.into_payload()];
        self.release_held(&mut state, &mut delivered);
        delivered
    }

    /// Sweeps the held set until a full sweep admits nothing.
    fn release_held(&self, state: &mut HandlerState<P>, delivered: &mut Vec<P>) {
        while !state.held.is_empty() {
            let mut progressed = false;
            for held in std::mem::take(&mut state.held) {
                if state.clock.in_causal_order(&held.stamp) {
                    state.clock.receive(&held.stamp);
                    tracing::debug!(
                        process = %self.name,
                        message_id = %held.message.id(),
                        "released held message"
                    );
                    delivered.push(held.message.into_payload());
                    progressed = true;
                } else {
                    state.held.push(held);
                }
            }
            if !progressed {
                break;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandlerState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
