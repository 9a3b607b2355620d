//! Vector timestamp: the causal state one process keeps for the
//! Schiper-Eggli-Sandoz protocol.
//!
//! A timestamp holds the owner's own vector clock plus "foreign clocks": for
//! each correspondent, a copy of the owner's clock taken when the owner last
//! sent to it. A copy of the whole timestamp rides on every outgoing message,
//! so the receiver learns what the sender assumed it had already seen.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ClockError;
use crate::time::VectorClock;
use crate::types::{ProcessId, WireFormat};
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorTimeStamp {
    owner: ProcessId,
    clock: VectorClock,
    /// Never contains `owner`.
    foreign: BTreeMap<ProcessId, VectorClock>,
}

impl VectorTimeStamp {
    /// A fresh timestamp for `owner`: zero clock, no foreign clocks.
    pub fn new(owner: impl Into<ProcessId>) -> Self {
        Self {
            owner: owner.into(),
            clock: VectorClock::new(),
            foreign: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The owner's own vector clock.
    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    pub fn foreign_clock(&self, process: &str) -> Option<&VectorClock> {
        self.foreign.get(process)
    }

    pub fn foreign_clocks(&self) -> impl Iterator<Item = (&str, &VectorClock)> {
        self.foreign.iter().map(|(pid, clock)| (pid.as_str(), clock))
    }

    /// Records a local event.
    pub fn tick(&mut self) {
        self.clock.tick(&self.owner);
    }

    /// Advances the owner's record of `destination`. Used by multicast so
    /// co-recipients account for one another's copy of the message.
    pub fn tick_for(&mut self, destination: &str) {
        self.clock.tick(destination);
    }

    /// Stores a copy of the current clock as the foreign clock for `other`,
    /// replacing any earlier one. Ignored for the owner itself.
    pub fn insert_clock_for(&mut self, other: &str) {
        if other == self.owner {
            tracing::debug!(owner = %self.owner, "not recording a foreign clock for the owner");
            return;
        }
        self.foreign.insert(other.to_owned(), self.clock.clone());
    }

    /// Overwrites this clock's entry for the sender with the sender's own
    /// entry for itself, so multicast co-recipients agree on the sender's progress.
    pub fn set_for_sender(&mut self, sender: &VectorTimeStamp) {
        let sender_clock = sender.clock.value_of(&sender.owner);
        self.clock.set(&sender.owner, &sender_clock);
    }

    /// Merges the received timestamp's own clock into this one.
    pub fn merge_local(&mut self, other: &VectorTimeStamp) {
        self.clock.merge(&other.clock);
    }

    /// Merges the received foreign clocks into ours, adding the ones we lack.
    /// The received clock for our own owner is skipped.
    pub fn merge_other(&mut self, other: &VectorTimeStamp) {
        for (pid, theirs) in &other.foreign {
            if *pid == self.owner {
                continue;
            }
            match self.foreign.get_mut(pid) {
                Some(mine) => mine.merge(theirs),
                None => {
                    self.foreign.insert(pid.clone(), theirs.clone());
                }
            }
        }
    }

    /// Accepts a message stamped with `received`: merges both clocks and
    /// records the delivery as a local event.
    pub fn receive(&mut self, received: &VectorTimeStamp) {
        self.merge_local(received);
        self.merge_other(received);
        self.tick();
    }

    /// The SES admission test.
    ///
    /// In order when the sender recorded nothing about this process, or when
    /// what it recorded is strictly behind this process's own clock.
    pub fn in_causal_order(&self, received: &VectorTimeStamp) -> bool {
        match received.foreign.get(&self.owner) {
            Some(assumed) => assumed.is_less_than(&self.clock),
            None => true,
        }
    }

    pub fn from_wire(text: &str) -> Result<Self, ClockError> {
        wire::decode(text)
    }

    /// Rebuilds a timestamp from its wire form.
    ///
    /// Malformed text yields an empty timestamp. When `owner` is given it
    /// replaces the decoded owner and the clock is reset to zero: only the
    /// recorded foreign clocks carry over.
    pub fn restore(owner: Option<&str>, text: &str) -> Self {
        let mut stamp: VectorTimeStamp = wire::decode_or_default(text, "vector timestamp");
        if let Some(owner) = owner {
            stamp.owner = owner.to_owned();
            stamp.clock = VectorClock::new();
            stamp.foreign.remove(owner);
        }
        stamp
    }

    /// [`restore`](Self::restore) keeping the decoded owner.
    pub fn from_wire_lossy(text: &str) -> Self {
        Self::restore(None, text)
    }

    pub fn to_wire(&self, format: WireFormat) -> Result<String, ClockError> {
        wire::encode(self, format)
    }

    pub(crate) fn from_parts(
        owner: ProcessId,
        clock: VectorClock,
        mut foreign: BTreeMap<ProcessId, VectorClock>,
    ) -> Self {
        foreign.remove(&owner);
        Self { owner, clock, foreign }
    }

    pub(crate) fn foreign_map(&self) -> &BTreeMap<ProcessId, VectorClock> {
        &self.foreign
    }
}

impl fmt::Display for VectorTimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_wire(WireFormat::Compact).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for VectorTimeStamp {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        r#"{"O_PID" : "p2","VC" : [ {"PID" : "p1","LLC" : [ 1 ]}, {"PID" : "p2","LLC" : [ 2 ]} ],"#,
        r#""FC" : [ {"PID" : "p3","VC" : [ {"PID" : "p1","LLC" : [ 1 ]}, {"PID" : "p2","LLC" : [ 1 ]} ]} ]}"#
    );

    /// Sends from `from` to `to`: the snapshot rides on the message, then the
    /// sender records the destination and ticks.
    fn send(from: &mut VectorTimeStamp, to: &str) -> VectorTimeStamp {
        let outgoing = from.clone();
        from.insert_clock_for(to);
        from.tick();
        outgoing
    }

    #[test]
    fn test_new_is_empty() {
        let stamp = VectorTimeStamp::new("p1");
        assert_eq!(stamp.owner(), "p1");
        assert!(stamp.clock().is_empty());
        assert_eq!(stamp.foreign_clocks().count(), 0);
    }

    #[test]
    fn test_ses_protocol() {
        let mut p1 = VectorTimeStamp::new("p1");
        let mut p2 = VectorTimeStamp::new("p2");
        let mut p3 = VectorTimeStamp::new("p3");

        for _round in 0..3 {
            let p1p3 = send(&mut p1, "p3");
            let p1p2 = send(&mut p1, "p2");

            assert!(p2.in_causal_order(&p1p2));
            p2.receive(&p1p2);

            let p2p3 = send(&mut p2, "p3");

            // p2's message carries p1's assumption about p3, which p3 has not
            // yet caught up with.
            assert!(!p3.in_causal_order(&p2p3));

            assert!(p3.in_causal_order(&p1p3));
            p3.receive(&p1p3);

            assert!(p3.in_causal_order(&p2p3));
            p3.receive(&p2p3);
        }
    }

    #[test]
    fn test_round_trip_is_mutually_in_order() {
        let mut p1 = VectorTimeStamp::new("p1");
        let mut p2 = VectorTimeStamp::new("p2");
        let mut p3 = VectorTimeStamp::new("p3");

        let p1p3 = send(&mut p1, "p3");
        let p1p2 = send(&mut p1, "p2");
        p2.receive(&p1p2);
        let p2p3 = send(&mut p2, "p3");
        p3.receive(&p1p3);
        p3.receive(&p2p3);

        for stamp in [&p1, &p2, &p3] {
            let copy: VectorTimeStamp = stamp.to_string().parse().unwrap();
            assert_eq!(&copy, stamp);
            assert!(stamp.in_causal_order(&copy));
            assert!(copy.in_causal_order(stamp));
        }
    }

    #[test]
    fn test_identical_parsed_stamps_are_in_order() {
        let a = VectorTimeStamp::from_wire(SAMPLE).unwrap();
        let b = VectorTimeStamp::from_wire_lossy(SAMPLE);
        assert_eq!(a.owner(), "p2");
        assert_eq!(a.clock().value_of("p2").digits(), &[2]);
        assert!(a.in_causal_order(&b));
        assert!(b.in_causal_order(&a));
    }

    #[test]
    fn test_malformed_fields_degrade_to_empty() {
        let empty = VectorTimeStamp::new("empty");
        for bad in [
            SAMPLE.replacen("O_PID", "XXXX", 1),
            SAMPLE.replacen("\"FC\"", "\"XXXX\"", 1),
            SAMPLE.replacen(r#"{"PID" : "p3""#, r#"{"XXXX" : "p3""#, 1),
        ] {
            assert!(VectorTimeStamp::from_wire(&bad).is_err());
            let a = VectorTimeStamp::from_wire_lossy(&bad);
            assert_eq!(a, VectorTimeStamp::new(""));
            assert!(a.in_causal_order(&empty));
            assert!(empty.in_causal_order(&a));
        }
    }

    #[test]
    fn test_restore_with_owner_resets_clock() {
        let restored = VectorTimeStamp::restore(Some("p9"), SAMPLE);
        assert_eq!(restored.owner(), "p9");
        assert!(restored.clock().is_empty());
        assert!(restored.foreign_clock("p3").is_some());

        let dropped_own = VectorTimeStamp::restore(Some("p3"), SAMPLE);
        assert!(dropped_own.foreign_clock("p3").is_none());

        let from_garbage = VectorTimeStamp::restore(Some("p4"), "{");
        assert_eq!(from_garbage, VectorTimeStamp::new("p4"));
    }

    #[test]
    fn test_insert_clock_for_copies() {
        let mut p1 = VectorTimeStamp::new("p1");
        p1.tick();
        p1.insert_clock_for("p2");
        p1.tick();
        assert_eq!(p1.foreign_clock("p2").unwrap().value_of("p1").digits(), &[1]);
        assert_eq!(p1.clock().value_of("p1").digits(), &[2]);

        p1.insert_clock_for("p1");
        assert!(p1.foreign_clock("p1").is_none());
    }

    #[test]
    fn test_tick_for_destination() {
        let mut p1 = VectorTimeStamp::new("p1");
        p1.tick_for("p2");
        assert_eq!(p1.clock().value_of("p2").digits(), &[1]);
        assert!(p1.clock().get("p1").is_none());
    }

    #[test]
    fn test_set_for_sender_overwrites() {
        let mut sender = VectorTimeStamp::new("s");
        sender.tick();
        sender.tick();
        let mut recipient = VectorTimeStamp::new("r");
        recipient.tick_for("s");
        recipient.tick_for("s");
        recipient.tick_for("s");

        recipient.set_for_sender(&sender);
        assert_eq!(recipient.clock().value_of("s").digits(), &[2]);
    }

    #[test]
    fn test_merge_other_skips_owner_and_merges_existing() {
        let mut a = VectorTimeStamp::new("a");
        let mut other = VectorTimeStamp::new("b");
        other.tick();
        other.insert_clock_for("a");
        other.insert_clock_for("c");
        other.tick();
        other.insert_clock_for("d");

        a.tick();
        a.insert_clock_for("c");
        a.merge_other(&other);

        assert!(a.foreign_clock("a").is_none());
        let c = a.foreign_clock("c").unwrap();
        assert_eq!(c.value_of("a").digits(), &[1]);
        assert_eq!(c.value_of("b").digits(), &[1]);
        assert_eq!(a.foreign_clock("d").unwrap().value_of("b").digits(), &[2]);
    }

    #[test]
    fn test_receive_ticks_owner() {
        let mut sender = VectorTimeStamp::new("s");
        sender.tick();
        let mut receiver = VectorTimeStamp::new("r");
        receiver.receive(&sender);
        assert_eq!(receiver.clock().value_of("s").digits(), &[1]);
        assert_eq!(receiver.clock().value_of("r").digits(), &[1]);
    }
}
