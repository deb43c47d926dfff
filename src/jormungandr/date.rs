//! Slot dates of the Jormungandr chain
//!
//! A [`PlainSlotDate`] is just the `(epoch, slot)` coordinate. It can be
//! parsed, printed and ordered, but it knows nothing about wall-clock time.
//! Attaching the chain's [`TimeSettings`] yields a [`FullSlotDate`], which
//! additionally knows its absolute slot index and the instants at which the
//! slot starts and ends.

use super::error::{ParseError, ParseErrorKind, SlotDateError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use std::time::Duration;

/// Epoch number, a fixed-length era of the chain
pub type Epoch = u64;

/// Slot number within an epoch
pub type Slot = u64;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Slot date without any knowledge of the chain's time settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlainSlotDate {
    // Field order gives the derived `Ord` its epoch-major, slot-minor order.
    epoch: Epoch,
    slot: Slot,
}

impl PlainSlotDate {
    pub const fn new(epoch: Epoch, slot: Slot) -> Self {
        Self { epoch, slot }
    }

    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub const fn slot(&self) -> Slot {
        self.slot
    }

    /// Returns true if both dates denote the same epoch and slot
    pub fn same_as(&self, other: &PlainSlotDate) -> bool {
        self == other
    }

    /// Returns true if this date lies strictly before `other`
    pub fn before(&self, other: &PlainSlotDate) -> bool {
        self < other
    }

    /// Returns true if this date lies strictly after `other`
    pub fn after(&self, other: &PlainSlotDate) -> bool {
        self > other
    }

    /// Attach time settings, turning this into a wall-clock aware date
    pub fn to_full(self, settings: &TimeSettings) -> Result<FullSlotDate<'_>, SlotDateError> {
        FullSlotDate::from_plain(self, settings)
    }
}

/// Parse a plain date of the format `<EPOCH>.<SLOT>`
///
/// Both parts must be non-empty runs of ASCII digits. Signs are rejected
/// rather than interpreted, leading zeros are accepted.
pub fn parse_plain_date(text: &str) -> Result<PlainSlotDate, ParseError> {
    let mut parts = text.split('.');
    let (epoch, slot) = match (parts.next(), parts.next(), parts.next()) {
        (Some(epoch), Some(slot), None) => (epoch, slot),
        _ => return Err(ParseError::new(text, ParseErrorKind::MalformedFormat)),
    };

    let epoch = parse_unsigned(epoch)
        .ok_or_else(|| ParseError::new(text, ParseErrorKind::InvalidEpoch))?;
    let slot =
        parse_unsigned(slot).ok_or_else(|| ParseError::new(text, ParseErrorKind::InvalidSlot))?;

    Ok(PlainSlotDate::new(epoch, slot))
}

fn parse_unsigned(part: &str) -> Option<u64> {
    // u64::from_str accepts a leading '+', so check the digits first
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for PlainSlotDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_plain_date(s)
    }
}

impl fmt::Display for PlainSlotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.epoch, self.slot)
    }
}

impl Serialize for PlainSlotDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlainSlotDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_plain_date(&text).map_err(de::Error::custom)
    }
}

/// Parameters mapping slot dates of one chain instance to wall-clock time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSettings {
    genesis_time: DateTime<Utc>,
    slots_per_epoch: NonZeroU64,
    slot_duration: Duration,
}

impl TimeSettings {
    /// Form time settings from the genesis block time, the number of slots
    /// in an epoch and the duration of a single slot
    pub fn new(
        genesis_time: DateTime<Utc>,
        slots_per_epoch: u64,
        slot_duration: Duration,
    ) -> Result<Self, SlotDateError> {
        let slots_per_epoch =
            NonZeroU64::new(slots_per_epoch).ok_or(SlotDateError::InvalidSlotsPerEpoch)?;
        if slot_duration.is_zero() {
            return Err(SlotDateError::InvalidSlotDuration);
        }

        Ok(Self {
            genesis_time,
            slots_per_epoch,
            slot_duration,
        })
    }

    pub fn genesis_time(&self) -> DateTime<Utc> {
        self.genesis_time
    }

    pub fn slots_per_epoch(&self) -> u64 {
        self.slots_per_epoch.get()
    }

    pub fn slot_duration(&self) -> Duration {
        self.slot_duration
    }

    /// Absolute slot index `epoch * slots_per_epoch + slot` of the given date
    ///
    /// The slot is not checked against the epoch length here.
    pub fn slot_index(&self, date: PlainSlotDate) -> Result<u64, SlotDateError> {
        date.epoch
            .checked_mul(self.slots_per_epoch.get())
            .and_then(|base| base.checked_add(date.slot))
            .ok_or(SlotDateError::SlotIndexOverflow {
                epoch: date.epoch,
                slot: date.slot,
            })
    }

    /// Exact time span covered by `slots` consecutive slots
    pub fn span(&self, slots: u64) -> Result<TimeDelta, SlotDateError> {
        let total_nanos = u128::from(slots)
            .checked_mul(self.slot_duration.as_nanos())
            .ok_or(SlotDateError::TimeOutOfRange)?;
        let secs = i64::try_from(total_nanos / NANOS_PER_SEC)
            .map_err(|_| SlotDateError::TimeOutOfRange)?;
        let nanos = (total_nanos % NANOS_PER_SEC) as u32;
        TimeDelta::new(secs, nanos).ok_or(SlotDateError::TimeOutOfRange)
    }

    /// Wall-clock length of one epoch
    pub fn epoch_duration(&self) -> Result<TimeDelta, SlotDateError> {
        self.span(self.slots_per_epoch.get())
    }

    /// Instant at which the given epoch begins
    pub fn epoch_start(&self, epoch: Epoch) -> Result<DateTime<Utc>, SlotDateError> {
        Ok(FullSlotDate::new(epoch, 0, self)?.start_time())
    }

    /// The slot containing `instant`; slot starts are inclusive, ends exclusive
    pub fn date_at(&self, instant: DateTime<Utc>) -> Result<FullSlotDate<'_>, SlotDateError> {
        let elapsed = (instant - self.genesis_time)
            .to_std()
            .map_err(|_| SlotDateError::BeforeGenesis)?;
        let index = u64::try_from(elapsed.as_nanos() / self.slot_duration.as_nanos())
            .map_err(|_| SlotDateError::TimeOutOfRange)?;
        FullSlotDate::from_index(index, self)
    }

    fn start_of(&self, index: u64) -> Result<DateTime<Utc>, SlotDateError> {
        self.genesis_time
            .checked_add_signed(self.span(index)?)
            .ok_or(SlotDateError::TimeOutOfRange)
    }
}

/// Slot date bound to the time settings of its chain
///
/// The absolute slot index and the slot boundaries are computed once at
/// construction, so every accessor is infallible afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullSlotDate<'s> {
    date: PlainSlotDate,
    settings: &'s TimeSettings,
    index: u64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl<'s> FullSlotDate<'s> {
    pub fn new(epoch: Epoch, slot: Slot, settings: &'s TimeSettings) -> Result<Self, SlotDateError> {
        Self::from_plain(PlainSlotDate::new(epoch, slot), settings)
    }

    pub fn from_plain(date: PlainSlotDate, settings: &'s TimeSettings) -> Result<Self, SlotDateError> {
        let slots_per_epoch = settings.slots_per_epoch();
        if date.slot >= slots_per_epoch {
            return Err(SlotDateError::SlotOutOfRange {
                slot: date.slot,
                slots_per_epoch,
            });
        }

        let index = settings.slot_index(date)?;
        let start = settings.start_of(index)?;
        let end = start
            .checked_add_signed(settings.span(1)?)
            .ok_or(SlotDateError::TimeOutOfRange)?;

        Ok(Self {
            date,
            settings,
            index,
            start,
            end,
        })
    }

    /// Build the date with the given absolute slot index
    pub fn from_index(index: u64, settings: &'s TimeSettings) -> Result<Self, SlotDateError> {
        let slots_per_epoch = settings.slots_per_epoch();
        let date = PlainSlotDate::new(index / slots_per_epoch, index % slots_per_epoch);
        Self::from_plain(date, settings)
    }

    pub fn plain(&self) -> PlainSlotDate {
        self.date
    }

    pub fn epoch(&self) -> Epoch {
        self.date.epoch
    }

    pub fn slot(&self) -> Slot {
        self.date.slot
    }

    pub fn settings(&self) -> &'s TimeSettings {
        self.settings
    }

    /// Number of slots since genesis
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end
    }

    /// Signed number of slots from `other` to this date, positive if this
    /// date is later
    ///
    /// Both dates must carry the same time settings; a mismatch is reported
    /// as [`SlotDateError::InconsistentSettings`].
    pub fn diff(&self, other: &FullSlotDate<'_>) -> Result<i128, SlotDateError> {
        if self.settings != other.settings {
            return Err(SlotDateError::InconsistentSettings);
        }
        Ok(i128::from(self.index) - i128::from(other.index))
    }

    /// Signed number of slots from a plain date to this one
    ///
    /// `other` is interpreted under this date's settings, which is only
    /// meaningful if it comes from the same chain.
    pub fn diff_plain(&self, other: PlainSlotDate) -> Result<i128, SlotDateError> {
        let other_index = self.settings.slot_index(other)?;
        Ok(i128::from(self.index) - i128::from(other_index))
    }
}

impl fmt::Display for FullSlotDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.date, f)
    }
}
