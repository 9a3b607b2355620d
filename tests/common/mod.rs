//! Script replayer for handler scenarios.
//!
//! One command per line:
//!
//! ```text
//! // comment
//! send <from> <to[,to,...]> <name>
//! recv <at> <name>
//! ```
//!
//! Handlers are created on first mention. An envelope is addressed by
//! destination plus message name, so multicast copies stay distinct.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use causal_order::{CausallyOrderedMessage, CausallyOrderedMsgHandler};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    Syntax(String),
    DuplicateMessage(String),
    UnknownReceiver(String),
    UnknownMessage(String),
}

#[derive(Default)]
pub struct Scenario {
    processes: BTreeMap<String, CausallyOrderedMsgHandler<String>>,
    in_flight: HashMap<(String, String), CausallyOrderedMessage<String>>,
    /// Every payload each process has delivered, in delivery order.
    pub delivered: BTreeMap<String, Vec<String>>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(script: &str) -> Result<Self, ScriptError> {
        let mut scenario = Self::new();
        for line in script.lines() {
            scenario.step(line)?;
        }
        Ok(scenario)
    }

    pub fn handler(&self, name: &str) -> Option<&CausallyOrderedMsgHandler<String>> {
        self.processes.get(name)
    }

    pub fn delivered_at(&self, name: &str) -> &[String] {
        self.delivered.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn held_at(&self, name: &str) -> usize {
        self.handler(name).map_or(0, |h| h.held_count())
    }

    pub fn step(&mut self, line: &str) -> Result<(), ScriptError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => Ok(()),
            [first, ..] if first.starts_with("//") => Ok(()),
            ["send", from, to, name] => self.send(from, to, name),
            ["recv", at, name] => self.recv(at, name),
            _ => Err(ScriptError::Syntax(line.to_owned())),
        }
    }

    fn send(&mut self, from: &str, to: &str, name: &str) -> Result<(), ScriptError> {
        let destinations: Vec<&str> = to.split(',').filter(|d| !d.is_empty()).collect();
        for destination in &destinations {
            if self.in_flight.contains_key(&(destination.to_string(), name.to_owned())) {
                return Err(ScriptError::DuplicateMessage(format!("{destination}{name}")));
            }
        }
        for process in std::iter::once(from).chain(destinations.iter().copied()) {
            self.processes
                .entry(process.to_owned())
                .or_insert_with(|| CausallyOrderedMsgHandler::new(process));
        }

        let sender = &self.processes[from];
        let envelopes = if destinations.len() == 1 {
            vec![sender.send_message(name.to_owned(), destinations[0])]
        } else {
            sender
                .send_multicast(name.to_owned(), &destinations)
                .map(|all| all.into_iter().map(Ok).collect())
                .unwrap_or_else(|err| vec![Err(err)])
        };
        for (destination, envelope) in destinations.iter().zip(envelopes) {
            let envelope = envelope.map_err(|err| ScriptError::Syntax(err.to_string()))?;
            self.in_flight.insert((destination.to_string(), name.to_owned()), envelope);
        }
        Ok(())
    }

    fn recv(&mut self, at: &str, name: &str) -> Result<(), ScriptError> {
        let handler = self
            .processes
            .get(at)
            .ok_or_else(|| ScriptError::UnknownReceiver(at.to_owned()))?;
        let envelope = self
            .in_flight
            .remove(&(at.to_owned(), name.to_owned()))
            .ok_or_else(|| ScriptError::UnknownMessage(format!("{at}{name}")))?;
        let delivered = handler.recv_message(envelope);
        self.delivered.entry(at.to_owned()).or_default().extend(delivered);
        Ok(())
    }
}
