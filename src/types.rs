// Shared types that are not clocks themselves: process identifiers, the digit
// width of a logical clock, the wire field names and the output format switch.

/// Identifies a communicating process. Compared and sorted as a plain string.
pub type ProcessId = String;

/// One fixed-width "digit" of a [`crate::LogicalClock`].
/// A digit saturates at `Digit::MAX` and then carries into the next one.
pub type Digit = u32;

/// Field names of the wire format. Every object presents its fields in the
/// order listed for it in [`crate::wire`].
pub mod fields {
    /// Digits of a logical clock, most significant first.
    pub const LAMPORT_LOGICAL_CLOCK: &str = "LLC";
    /// Entries of a vector clock.
    pub const VECTOR_CLOCK: &str = "VC";
    /// Owner of a vector timestamp.
    pub const OWNER_PROCESS_ID: &str = "O_PID";
    /// Process id of one vector clock entry or foreign clock.
    pub const PROCESS_ID: &str = "PID";
    /// Foreign clocks of a vector timestamp.
    pub const FOREIGN_CLOCKS: &str = "FC";
}

/// Text layout used when a clock is written out.
/// Decoding accepts either layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Single line, no insignificant whitespace.
    #[default]
    Compact,
    /// Indented, one field per line.
    Pretty,
}
