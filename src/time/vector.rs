//! Vector clock: one [`LogicalClock`] per named process.
//!
//! A process missing from the map holds an implicit zero clock, so `{}` and
//! `{"p1":0}` describe the same point in causal time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ClockError;
use crate::time::{Clock, LogicalClock};
use crate::types::{ProcessId, WireFormat};
use crate::wire;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PartialOrder {
    LessThan,
    GreaterThan,
    Equal,
    Concurrent,
}

#[derive(Debug, Clone, Default)]
pub struct VectorClock {
    clocks: BTreeMap<ProcessId, LogicalClock>,
}

impl VectorClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks the clock for `name`, creating it at zero first if needed.
    pub fn tick(&mut self, name: &str) {
        match self.clocks.get_mut(name) {
            Some(clock) => clock.tick(),
            None => {
                let mut clock = LogicalClock::new();
                clock.tick();
                self.clocks.insert(name.to_owned(), clock);
            }
        }
    }

    /// Pointwise supremum: every entry of `other` that is missing here is
    /// copied in, every entry here that is behind `other` is replaced by a copy.
    pub fn merge(&mut self, other: &VectorClock) {
        for (name, theirs) in &other.clocks {
            match self.clocks.get_mut(name) {
                Some(mine) => {
                    if mine.is_less_than(theirs) {
                        mine.clone_from(theirs);
                    }
                }
                None => {
                    self.clocks.insert(name.clone(), theirs.clone());
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&LogicalClock> {
        self.clocks.get(name)
    }

    /// The clock for `name`, zero when absent.
    pub fn value_of(&self, name: &str) -> LogicalClock {
        self.clocks.get(name).cloned().unwrap_or_default()
    }

    /// Overwrites the entry for `name` with a copy of `clock`.
    pub fn set(&mut self, name: &str, clock: &LogicalClock) {
        self.clocks.insert(name.to_owned(), clock.clone());
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &LogicalClock)> {
        self.clocks.iter().map(|(name, clock)| (name.as_str(), clock))
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    /// Causal "happened before".
    ///
    /// `self` is less than `other` when no entry of `self` is ahead of its
    /// counterpart and at least one entry is behind. Absent entries count as
    /// zero on either side.
    pub fn is_less_than(&self, other: &VectorClock) -> bool {
        let zero = LogicalClock::new();
        let mut found_lesser = false;

        for (name, mine) in &self.clocks {
            let theirs = other.clocks.get(name).unwrap_or(&zero);
            if theirs.is_less_than(mine) {
                return false;
            }
            if !found_lesser {
                found_lesser = mine.is_less_than(theirs);
            }
        }

        // Nothing here is ahead of `other`. If no entry was behind either, look
        // for an entry only `other` has that is past zero.
        if !found_lesser {
            found_lesser = other
                .clocks
                .iter()
                .any(|(name, theirs)| !self.clocks.contains_key(name) && zero.is_less_than(theirs));
        }
        found_lesser
    }

    pub fn compare(&self, other: &VectorClock) -> PartialOrder {
        let zero = LogicalClock::new();
        let mut behind = false;
        let mut ahead = false;

        let only_theirs = other
            .clocks
            .keys()
            .filter(|name| !self.clocks.contains_key(*name));
        for name in self.clocks.keys().chain(only_theirs) {
            let mine = self.clocks.get(name).unwrap_or(&zero);
            let theirs = other.clocks.get(name).unwrap_or(&zero);
            if mine < theirs {
                behind = true;
            }
            if theirs < mine {
                ahead = true;
            }
        }

        match (behind, ahead) {
            (false, false) => PartialOrder::Equal,
            (true, false) => PartialOrder::LessThan,
            (false, true) => PartialOrder::GreaterThan,
            (true, true) => PartialOrder::Concurrent,
        }
    }

    pub fn from_wire(text: &str) -> Result<Self, ClockError> {
        wire::decode(text)
    }

    /// Decodes `text`, or returns an empty clock if it is not a valid vector clock.
    pub fn from_wire_lossy(text: &str) -> Self {
        wire::decode_or_default(text, "vector clock")
    }

    pub fn to_wire(&self, format: WireFormat) -> Result<String, ClockError> {
        wire::encode(self, format)
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<ProcessId, LogicalClock> {
        &self.clocks
    }

    pub(crate) fn from_map(clocks: BTreeMap<ProcessId, LogicalClock>) -> Self {
        Self { clocks }
    }
}

impl PartialEq for VectorClock {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == PartialOrder::Equal
    }
}

impl Eq for VectorClock {}

impl PartialOrd for VectorClock {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        match self.compare(other) {
            PartialOrder::LessThan => Some(Ordering::Less),
            PartialOrder::GreaterThan => Some(Ordering::Greater),
            PartialOrder::Equal => Some(Ordering::Equal),
            PartialOrder::Concurrent => None,
        }
    }
}

impl Clock for VectorClock {
    fn is_less_than(&self, other: &Self) -> bool {
        VectorClock::is_less_than(self, other)
    }
}

impl fmt::Display for VectorClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_wire(WireFormat::Compact).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for VectorClock {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s)
    }
}
