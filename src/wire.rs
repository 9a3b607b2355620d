//! JSON wire codec for clocks and timestamps.
//!
//! The layouts are fixed and every object must present its fields in exactly
//! this order:
//!
//! ```text
//! LogicalClock     {"LLC":[d0,d1,...]}                       most significant digit first
//! VectorClock      {"VC":[{"PID":"<id>","LLC":[...]}, ...]}
//! VectorTimeStamp  {"O_PID":"<owner>","VC":[...],"FC":[{"PID":"<id>","VC":[...]}, ...]}
//! ```
//!
//! An unexpected, missing or trailing field name is a decode failure. Entries
//! are always written sorted by process id, so equal values encode to equal
//! bytes.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ClockError;
use crate::time::{LogicalClock, VectorClock, VectorTimeStamp};
use crate::types::fields::{
    FOREIGN_CLOCKS, LAMPORT_LOGICAL_CLOCK, OWNER_PROCESS_ID, PROCESS_ID, VECTOR_CLOCK,
};
use crate::types::{Digit, ProcessId, WireFormat};

/// Writes `value` in the requested layout.
pub fn encode<T: Serialize>(value: &T, format: WireFormat) -> Result<String, ClockError> {
    let text = match format {
        WireFormat::Compact => serde_json::to_string(value),
        WireFormat::Pretty => serde_json::to_string_pretty(value),
    };
    text.map_err(|err| ClockError::Encode(err.to_string()))
}

/// Strict decode: any deviation from the layout is returned as an error.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ClockError> {
    Ok(serde_json::from_str(text)?)
}

/// Lossy decode: malformed input becomes `T::default()`.
pub(crate) fn decode_or_default<T: DeserializeOwned + Default>(
    text: &str,
    entity: &'static str,
) -> T {
    match decode(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(entity, error = %err, "malformed wire data, using an empty value");
            T::default()
        }
    }
}

fn expect_field<'de, A: MapAccess<'de>>(
    map: &mut A,
    expected: &'static str,
) -> Result<(), A::Error> {
    match map.next_key::<String>()? {
        Some(found) if found == expected => Ok(()),
        Some(found) => Err(de::Error::custom(format_args!(
            "unexpected field name: {found} should be: {expected}"
        ))),
        None => Err(de::Error::missing_field(expected)),
    }
}

fn expect_end<'de, A: MapAccess<'de>>(map: &mut A) -> Result<(), A::Error> {
    match map.next_key::<String>()? {
        None => Ok(()),
        Some(found) => Err(de::Error::custom(format_args!("unexpected trailing field: {found}"))),
    }
}

// --- Borrowed views used while encoding --------------------------------------

struct EntriesRef<'a>(&'a BTreeMap<ProcessId, LogicalClock>);

impl Serialize for EntriesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (pid, clock) in self.0 {
            seq.serialize_element(&EntryRef { pid, clock })?;
        }
        seq.end()
    }
}

struct EntryRef<'a> {
    pid: &'a str,
    clock: &'a LogicalClock,
}

impl Serialize for EntryRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(PROCESS_ID, self.pid)?;
        map.serialize_entry(LAMPORT_LOGICAL_CLOCK, self.clock.digits())?;
        map.end()
    }
}

struct ForeignRef<'a>(&'a BTreeMap<ProcessId, VectorClock>);

impl Serialize for ForeignRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (pid, clock) in self.0 {
            seq.serialize_element(&ForeignEntryRef { pid, clock })?;
        }
        seq.end()
    }
}

struct ForeignEntryRef<'a> {
    pid: &'a str,
    clock: &'a VectorClock,
}

impl Serialize for ForeignEntryRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(PROCESS_ID, self.pid)?;
        map.serialize_entry(VECTOR_CLOCK, &EntriesRef(self.clock.as_map()))?;
        map.end()
    }
}

impl Serialize for LogicalClock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(LAMPORT_LOGICAL_CLOCK, self.digits())?;
        map.end()
    }
}

impl Serialize for VectorClock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(VECTOR_CLOCK, &EntriesRef(self.as_map()))?;
        map.end()
    }
}

impl Serialize for VectorTimeStamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(OWNER_PROCESS_ID, self.owner())?;
        map.serialize_entry(VECTOR_CLOCK, &EntriesRef(self.clock().as_map()))?;
        map.serialize_entry(FOREIGN_CLOCKS, &ForeignRef(self.foreign_map()))?;
        map.end()
    }
}

// --- Owned shapes produced while decoding ------------------------------------

/// `[{"PID":..,"LLC":[..]}, ...]`; a repeated process id keeps the last entry.
struct Entries(BTreeMap<ProcessId, LogicalClock>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of vector clock entries")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Entries, A::Error> {
                let mut clocks = BTreeMap::new();
                while let Some(Entry(pid, clock)) = seq.next_element()? {
                    clocks.insert(pid, clock);
                }
                Ok(Entries(clocks))
            }
        }

        deserializer.deserialize_seq(EntriesVisitor)
    }
}

struct Entry(ProcessId, LogicalClock);

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = Entry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a vector clock entry {\"PID\":..,\"LLC\":[..]}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Entry, A::Error> {
                expect_field(&mut map, PROCESS_ID)?;
                let pid: ProcessId = map.next_value()?;
                expect_field(&mut map, LAMPORT_LOGICAL_CLOCK)?;
                let digits: Vec<Digit> = map.next_value()?;
                expect_end(&mut map)?;
                Ok(Entry(pid, LogicalClock::from_digits(digits)))
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}

/// `[{"PID":..,"VC":[..]}, ...]`
struct Foreign(BTreeMap<ProcessId, VectorClock>);

impl<'de> Deserialize<'de> for Foreign {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ForeignVisitor;

        impl<'de> Visitor<'de> for ForeignVisitor {
            type Value = Foreign;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of foreign clocks")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Foreign, A::Error> {
                let mut clocks = BTreeMap::new();
                while let Some(ForeignEntry(pid, clock)) = seq.next_element()? {
                    clocks.insert(pid, clock);
                }
                Ok(Foreign(clocks))
            }
        }

        deserializer.deserialize_seq(ForeignVisitor)
    }
}

struct ForeignEntry(ProcessId, VectorClock);

impl<'de> Deserialize<'de> for ForeignEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ForeignEntryVisitor;

        impl<'de> Visitor<'de> for ForeignEntryVisitor {
            type Value = ForeignEntry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a foreign clock {\"PID\":..,\"VC\":[..]}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ForeignEntry, A::Error> {
                expect_field(&mut map, PROCESS_ID)?;
                let pid: ProcessId = map.next_value()?;
                expect_field(&mut map, VECTOR_CLOCK)?;
                let Entries(clocks) = map.next_value()?;
                expect_end(&mut map)?;
                Ok(ForeignEntry(pid, VectorClock::from_map(clocks)))
            }
        }

        deserializer.deserialize_map(ForeignEntryVisitor)
    }
}

impl<'de> Deserialize<'de> for LogicalClock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LogicalClockVisitor;

        impl<'de> Visitor<'de> for LogicalClockVisitor {
            type Value = LogicalClock;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a logical clock {\"LLC\":[..]}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LogicalClock, A::Error> {
                expect_field(&mut map, LAMPORT_LOGICAL_CLOCK)?;
                let digits: Vec<Digit> = map.next_value()?;
                expect_end(&mut map)?;
                Ok(LogicalClock::from_digits(digits))
            }
        }

        deserializer.deserialize_map(LogicalClockVisitor)
    }
}

impl<'de> Deserialize<'de> for VectorClock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VectorClockVisitor;

        impl<'de> Visitor<'de> for VectorClockVisitor {
            type Value = VectorClock;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a vector clock {\"VC\":[..]}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<VectorClock, A::Error> {
                expect_field(&mut map, VECTOR_CLOCK)?;
                let Entries(clocks) = map.next_value()?;
                expect_end(&mut map)?;
                Ok(VectorClock::from_map(clocks))
            }
        }

        deserializer.deserialize_map(VectorClockVisitor)
    }
}

impl<'de> Deserialize<'de> for VectorTimeStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VectorTimeStampVisitor;

        impl<'de> Visitor<'de> for VectorTimeStampVisitor {
            type Value = VectorTimeStamp;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a vector timestamp {\"O_PID\":..,\"VC\":[..],\"FC\":[..]}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<VectorTimeStamp, A::Error> {
                expect_field(&mut map, OWNER_PROCESS_ID)?;
                let owner: ProcessId = map.next_value()?;
                expect_field(&mut map, VECTOR_CLOCK)?;
                let Entries(clocks) = map.next_value()?;
                expect_field(&mut map, FOREIGN_CLOCKS)?;
                let Foreign(foreign) = map.next_value()?;
                expect_end(&mut map)?;
                Ok(VectorTimeStamp::from_parts(owner, VectorClock::from_map(clocks), foreign))
            }
        }

        deserializer.deserialize_map(VectorTimeStampVisitor)
    }
}
