//! Jormungandr chain specific functionality
//!
//! This module contains the chain model the rest of the crate builds on:
//! - Slot dates, time settings and wall-clock mapping
//! - Leader schedule records and their sort/filter utilities
//! - Node statistics payload
//! - Time settings presets for known networks

pub mod date;
pub mod error;
pub mod node;
pub mod schedule;
pub mod timing;

pub use date::{parse_plain_date, Epoch, FullSlotDate, PlainSlotDate, Slot, TimeSettings};
pub use error::{ParseError, ParseErrorKind, SlotDateError};
pub use node::{NodeStats, NodeStatus};
pub use schedule::{
    decode_leader_logs, filter_after, filter_by_epoch, filter_by_leader, next_assignment,
    sort_by_schedule_time, LeaderAssignment, ScheduleQuery,
};
pub use timing::{ChainTiming, Network};
