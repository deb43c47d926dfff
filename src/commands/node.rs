//! Node command - summarise a node statistics dump

use crate::config::NodeConfig;
use crate::jormungandr::{NodeStats, NodeStatus, TimeSettings};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Number of slots a node may lag before it is reported as behind
const BEHIND_THRESHOLD_SLOTS: i128 = 30;

/// Node command arguments
#[derive(Args, Debug)]
pub struct NodeArgs {
    /// Node statistics JSON file (defaults to node.stats_file)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Run the node command
pub fn run(args: NodeArgs, defaults: &NodeConfig, settings: &TimeSettings) -> Result<()> {
    let path = args
        .file
        .or_else(|| defaults.stats_file.as_ref().map(PathBuf::from))
        .context("No stats file given; pass --file or set node.stats_file")?;
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read stats file: {}", path.display()))?;

    match NodeStatus::from_json(&contents)
        .with_context(|| format!("Failed to parse stats file: {}", path.display()))?
    {
        NodeStatus::Bootstrapping => info!("Node is bootstrapping - no block statistics yet"),
        NodeStatus::Running(stats) => show_stats(&stats, settings, Utc::now())?,
    }

    Ok(())
}

fn show_stats(stats: &NodeStats, settings: &TimeSettings, now: DateTime<Utc>) -> Result<()> {
    info!("Node Statistics");
    info!("─────────────────────────────────────────");
    info!("Version:          {}", stats.version.as_deref().unwrap_or("unknown"));
    if let Some(uptime) = stats.uptime() {
        info!("Uptime:           {}s", uptime.as_secs());
    }
    if let Some(blocks) = stats.received_blocks {
        info!("Blocks received:  {}", blocks);
    }
    if let Some(txs) = stats.received_transactions {
        info!("Txs received:     {}", txs);
    }

    info!("─────────────────────────────────────────");
    if let Some(height) = stats.last_block_height {
        info!("Last block:       #{}", height);
    }
    if let Some(date) = stats.last_block_date {
        info!("  Date:           {}", date);
    }
    if let Some(hash) = &stats.last_block_hash {
        info!("  Hash:           {}", hash);
    }
    if let Some(time) = stats.last_block_time {
        info!("  Time:           {}", time.to_rfc3339());
    }

    match stats.slots_behind(now, settings)? {
        Some(behind) if behind > BEHIND_THRESHOLD_SLOTS => {
            warn!("Last block is {} slots behind the current slot", behind)
        }
        Some(behind) => info!("  Slots behind:   {}", behind),
        None => info!("  Slots behind:   unknown (no block date reported)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jormungandr::ChainTiming;

    #[test]
    fn test_run_requires_a_file() {
        let settings = ChainTiming::itn().time_settings().unwrap();
        let result = run(NodeArgs { file: None }, &NodeConfig::default(), &settings);
        assert!(result.is_err());
    }

    #[test]
    fn test_show_stats_before_genesis() {
        let settings = ChainTiming::itn().time_settings().unwrap();
        let status = NodeStatus::from_json(r#"{"state": "Running", "lastBlockDate": "1.5"}"#)
            .unwrap();
        let NodeStatus::Running(stats) = status else {
            panic!("node must be running");
        };

        let before_genesis = DateTime::from_timestamp(0, 0).unwrap();
        assert!(show_stats(&stats, &settings, before_genesis).is_err());
        assert!(show_stats(&stats, &settings, Utc::now()).is_ok());
    }

    #[test]
    fn test_run_bootstrapping_file() {
        let path = std::env::temp_dir().join(format!("jsm-stats-{}.json", std::process::id()));
        fs::write(&path, r#"{"state": "Bootstrapping"}"#).unwrap();

        let settings = ChainTiming::itn().time_settings().unwrap();
        let result = run(
            NodeArgs {
                file: Some(path.clone()),
            },
            &NodeConfig::default(),
            &settings,
        );
        fs::remove_file(&path).unwrap();

        assert!(result.is_ok());
    }
}
