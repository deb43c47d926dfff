//! Schedule command - inspect a leaders logs dump

use super::{format_span, parse_instant};
use crate::config::ScheduleConfig;
use crate::jormungandr::{
    decode_leader_logs, next_assignment, LeaderAssignment, ScheduleQuery, TimeSettings,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Schedule command arguments
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Leaders logs JSON file (defaults to schedule.leaders_log)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Only show assignments scheduled after this instant (RFC 3339 or "now")
    #[arg(short, long)]
    pub after: Option<String>,

    /// Only show assignments scheduled in this epoch
    #[arg(short, long)]
    pub epoch: Option<u64>,

    /// Only show assignments of this leader (defaults to schedule.leader_id)
    #[arg(short, long)]
    pub leader: Option<u64>,

    /// Only show the next upcoming assignment
    #[arg(long)]
    pub next: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ScheduleArgs {
    /// Build the filter pipeline, falling back to configured defaults
    pub fn query(&self, defaults: &ScheduleConfig, now: DateTime<Utc>) -> Result<ScheduleQuery> {
        let after = self
            .after
            .as_deref()
            .map(|text| parse_instant(text, now))
            .transpose()?;

        Ok(ScheduleQuery {
            after,
            epoch: self.epoch,
            leader: self.leader.or(defaults.leader_id),
        })
    }

    fn leaders_log(&self, defaults: &ScheduleConfig) -> Result<PathBuf> {
        self.file
            .clone()
            .or_else(|| defaults.leaders_log.as_ref().map(PathBuf::from))
            .context("No leaders log given; pass --file or set schedule.leaders_log")
    }
}

/// Run the schedule command
pub fn run(args: ScheduleArgs, defaults: &ScheduleConfig, settings: &TimeSettings) -> Result<()> {
    let path = args.leaders_log(defaults)?;
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read leaders log: {}", path.display()))?;
    let assignments = decode_leader_logs(&contents)
        .with_context(|| format!("Failed to parse leaders log: {}", path.display()))?;
    debug!("Loaded {} assignment(s) from {}", assignments.len(), path.display());

    let now = Utc::now();
    let query = args.query(defaults, now)?;
    let mut selected = query.run(&assignments);

    if args.next {
        selected = next_assignment(query.after.unwrap_or(now), &selected)
            .cloned()
            .into_iter()
            .collect();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    show_table(&selected, settings, now);
    Ok(())
}

fn show_table(assignments: &[LeaderAssignment], settings: &TimeSettings, now: DateTime<Utc>) {
    if assignments.is_empty() {
        info!("No matching leader assignments");
        return;
    }

    info!("{} leader assignment(s)", assignments.len());
    info!("─────────────────────────────────────────────────────────────────────────────");
    info!(
        "{:>8} {:>14} {:>27} {:>14} {:>9}",
        "Leader", "Date", "Scheduled (UTC)", "In", "Status"
    );
    info!("─────────────────────────────────────────────────────────────────────────────");

    for assignment in assignments {
        check_consistency(assignment, settings);

        let date = assignment
            .schedule_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = if assignment.is_finished() {
            "finished"
        } else {
            "pending"
        };
        info!(
            "{:>8} {:>14} {:>27} {:>14} {:>9}",
            assignment.leader_id,
            date,
            assignment.schedule_time.format("%Y-%m-%d %H:%M:%S"),
            format_span(assignment.schedule_time - now),
            status
        );
    }
}

/// Warn when the scheduled time disagrees with the start of the scheduled slot
fn check_consistency(assignment: &LeaderAssignment, settings: &TimeSettings) {
    match assignment.scheduled_slot(settings) {
        Ok(Some(slot)) if slot.start_time() != assignment.schedule_time => warn!(
            "Assignment at {} is scheduled for {}, but that slot starts at {}",
            slot,
            assignment.schedule_time.to_rfc3339(),
            slot.start_time().to_rfc3339()
        ),
        Ok(_) => {}
        Err(e) => warn!("Assignment of leader {}: {}", assignment.leader_id, e),
    }
}
