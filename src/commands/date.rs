//! Date command - slot date conversions and arithmetic

use super::{format_span, parse_instant};
use crate::jormungandr::{parse_plain_date, FullSlotDate, TimeSettings};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use tracing::info;

/// Date command arguments
#[derive(Args, Debug)]
pub struct DateArgs {
    #[command(subcommand)]
    pub command: DateCommands,
}

#[derive(Subcommand, Debug)]
pub enum DateCommands {
    /// Show slot index and wall-clock bounds of a slot date
    Parse {
        /// Slot date as <EPOCH>.<SLOT>
        date: String,
    },

    /// Signed number of slots from B to A
    Diff {
        /// Slot date as <EPOCH>.<SLOT>
        a: String,
        /// Slot date as <EPOCH>.<SLOT>
        b: String,
    },

    /// Slot date containing the current time
    Now,

    /// Slot date containing the given instant
    At {
        /// RFC 3339 timestamp, e.g. 2019-12-31T02:08:43+01:00
        time: String,
    },
}

/// Run the date command
pub fn run(args: DateArgs, settings: &TimeSettings) -> Result<()> {
    match args.command {
        DateCommands::Parse { date } => {
            let date = full_date(&date, settings)?;
            show_date(&date);
        }
        DateCommands::Diff { a, b } => {
            let a = full_date(&a, settings)?;
            let b = full_date(&b, settings)?;
            let slots = a.diff(&b)?;
            let span = a.start_time() - b.start_time();

            info!("{} - {}", a, b);
            info!("  Slots:          {}", slots);
            info!("  Wall clock:     {}", format_span(span));
        }
        DateCommands::Now => {
            let date = date_at(Utc::now(), settings)?;
            show_date(&date);
        }
        DateCommands::At { time } => {
            let instant = parse_instant(&time, Utc::now())?;
            let date = date_at(instant, settings)?;
            show_date(&date);
        }
    }

    Ok(())
}

fn full_date<'s>(text: &str, settings: &'s TimeSettings) -> Result<FullSlotDate<'s>> {
    let plain = parse_plain_date(text)?;
    plain
        .to_full(settings)
        .with_context(|| format!("Slot date {} is not valid on this chain", plain))
}

fn date_at(instant: DateTime<Utc>, settings: &TimeSettings) -> Result<FullSlotDate<'_>> {
    settings
        .date_at(instant)
        .with_context(|| format!("No slot contains {}", instant.to_rfc3339()))
}

fn show_date(date: &FullSlotDate<'_>) {
    info!("Slot date {}", date);
    info!("─────────────────────────────────────────");
    info!("  Epoch:          {}", date.epoch());
    info!("  Slot:           {}", date.slot());
    info!("  Slot index:     {}", date.index());
    info!("  Start:          {}", date.start_time().to_rfc3339());
    info!("  End:            {}", date.end_time().to_rfc3339());
}
