//! Expandable Lamport clock.
//!
//! The value is a sequence of `u32` digits, most significant first, i.e. a
//! base-2^32 number that only ever grows. Digits are kept normalized (no
//! leading zero digits, never empty), which makes "fewer digits" mean
//! "smaller value" for every clock, ticked or decoded.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ClockError;
use crate::time::Clock;
use crate::types::{Digit, WireFormat};
use crate::wire;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalClock {
    digits: Vec<Digit>,
}

impl LogicalClock {
    /// A clock that has never been ticked.
    pub fn new() -> Self {
        Self { digits: vec![0] }
    }

    /// Builds a clock from raw digits, most significant first.
    /// Leading zero digits are dropped; an empty list is zero.
    pub fn from_digits(digits: impl Into<Vec<Digit>>) -> Self {
        let mut digits = digits.into();
        let leading = digits.iter().take_while(|d| **d == 0).count();
        digits.drain(..leading.min(digits.len().saturating_sub(1)));
        if digits.is_empty() {
            digits.push(0);
        }
        Self { digits }
    }

    pub fn digits(&self) -> &[Digit] {
        &self.digits
    }

    pub fn is_zero(&self) -> bool {
        self.digits == [0]
    }

    /// Advances the clock by one, carrying into a new leading digit when every
    /// digit is saturated.
    pub fn tick(&mut self) {
        for digit in self.digits.iter_mut().rev() {
            if *digit < Digit::MAX {
                *digit += 1;
                return;
            }
            *digit = 0;
        }
        self.digits.insert(0, 1);
    }

    pub fn is_less_than(&self, other: &LogicalClock) -> bool {
        self.cmp(other) == Ordering::Less
    }

    pub fn from_wire(text: &str) -> Result<Self, ClockError> {
        wire::decode(text)
    }

    /// Decodes `text`, or returns zero if it is not a valid clock.
    pub fn from_wire_lossy(text: &str) -> Self {
        wire::decode_or_default(text, "logical clock")
    }

    pub fn to_wire(&self, format: WireFormat) -> Result<String, ClockError> {
        wire::encode(self, format)
    }
}

impl Default for LogicalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Ord for LogicalClock {
    fn cmp(&self, other: &Self) -> Ordering {
        // Vec ordering is lexicographic, i.e. most significant digit first.
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl PartialOrd for LogicalClock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Clock for LogicalClock {
    fn is_less_than(&self, other: &Self) -> bool {
        LogicalClock::is_less_than(self, other)
    }
}

impl fmt::Display for LogicalClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_wire(WireFormat::Compact).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for LogicalClock {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s)
    }
}
