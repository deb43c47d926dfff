//! Error types for slot-date parsing and arithmetic

use thiserror::Error;

/// Which part of a `<EPOCH>.<SLOT>` text was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The text does not contain exactly one `.` separator
    MalformedFormat,
    /// The epoch part is not an unsigned decimal number
    InvalidEpoch,
    /// The slot part is not an unsigned decimal number
    InvalidSlot,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::MalformedFormat => {
                "the date must be of the format '<EPOCH>.<SLOT>' with unsigned numbers"
            }
            Self::InvalidEpoch => "epoch must be an unsigned number",
            Self::InvalidSlot => "slot must be an unsigned number",
        };
        f.write_str(reason)
    }
}

/// Failure to parse a plain slot date from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse '{text}': {kind}")]
pub struct ParseError {
    /// The text that was handed to the parser
    pub text: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(text: &str, kind: ParseErrorKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }
}

/// Failures when attaching time settings to a slot date or mapping it to wall-clock time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotDateError {
    #[error("slots per epoch must be greater than 0")]
    InvalidSlotsPerEpoch,

    #[error("slot duration must be greater than 0")]
    InvalidSlotDuration,

    #[error("slot {slot} is out of range for an epoch of {slots_per_epoch} slots")]
    SlotOutOfRange { slot: u64, slots_per_epoch: u64 },

    #[error("absolute slot index of {epoch}.{slot} does not fit in 64 bits")]
    SlotIndexOverflow { epoch: u64, slot: u64 },

    #[error("slot time is outside the representable date range")]
    TimeOutOfRange,

    #[error("slot dates were built from different time settings")]
    InconsistentSettings,

    #[error("instant lies before the genesis block")]
    BeforeGenesis,
}
