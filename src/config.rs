//! Configuration management for JSM

use crate::jormungandr::{ChainTiming, Network, TimeSettings};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub node: NodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network preset: "itn" or "custom"
    #[serde(default = "default_network")]
    pub network: String,

    /// Override the genesis block time (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis_time: Option<DateTime<Utc>>,

    /// Override the number of slots per epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots_per_epoch: Option<u64>,

    /// Override the slot duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    /// JSON dump of the node's leaders logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaders_log: Option<String>,

    /// Only show assignments of this leader by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeConfig {
    /// JSON dump of the node's statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_file: Option<String>,
}

fn default_network() -> String {
    Network::default().name().to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            genesis_time: None,
            slots_per_epoch: None,
            slot_duration_ms: None,
        }
    }
}

impl ChainConfig {
    /// Resolve the network preset plus any overrides into raw timing parameters
    pub fn timing(&self) -> Result<ChainTiming> {
        let network = Network::from_str(&self.network)
            .with_context(|| format!("Unknown network: {}", self.network))?;

        let preset = network.preset();
        let missing = |name: &str| {
            anyhow::anyhow!("Network '{}' requires chain.{} to be set", network.name(), name)
        };

        Ok(ChainTiming {
            network,
            genesis_time: self
                .genesis_time
                .or(preset.as_ref().map(|p| p.genesis_time))
                .ok_or_else(|| missing("genesis_time"))?,
            slots_per_epoch: self
                .slots_per_epoch
                .or(preset.as_ref().map(|p| p.slots_per_epoch))
                .ok_or_else(|| missing("slots_per_epoch"))?,
            slot_duration_ms: self
                .slot_duration_ms
                .or(preset.as_ref().map(|p| p.slot_duration_ms))
                .ok_or_else(|| missing("slot_duration_ms"))?,
        })
    }

    /// Get validated time settings for this configuration
    pub fn time_settings(&self) -> Result<TimeSettings> {
        let timing = self.timing()?;
        timing
            .time_settings()
            .with_context(|| format!("Invalid timing for network '{}'", timing.network.name()))
    }
}

impl Config {
    /// Load configuration from file, environment, and defaults
    /// Priority: Environment variables > Config file > Defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some((file_config, config_path)) = Self::load_from_file()? {
            tracing::debug!("Loaded configuration from: {}", config_path.display());
            config = file_config;
        } else {
            tracing::debug!("Using default configuration (no config file found)");
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration and apply the command-line network override on top
    pub fn load_with_network(network: Option<&str>) -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_network_override(network);
        Ok(config)
    }

    /// Command-line `--network` takes priority over file and environment
    pub fn apply_network_override(&mut self, network: Option<&str>) {
        if let Some(network) = network {
            tracing::debug!("Network overridden on the command line: {}", network);
            self.chain.network = network.to_string();
        }
    }

    /// Load configuration from file (searches multiple locations)
    fn load_from_file() -> Result<Option<(Self, PathBuf)>> {
        for path in Self::config_file_paths() {
            if path.exists() {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

                let config = Self::from_toml(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

                return Ok(Some((config, path)));
            }
        }

        Ok(None)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Get list of config file paths to search (in order of priority)
    pub fn config_file_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Current directory
        paths.push(PathBuf::from("./jsm.toml"));

        // 2. User config directory (~/.config/jsm/config.toml)
        if let Some(proj_dirs) = ProjectDirs::from("org", "jormungandr", "jsm") {
            paths.push(proj_dirs.config_dir().join("config.toml"));
        }

        // 3. System-wide location
        paths.push(PathBuf::from("/etc/jsm/config.toml"));

        paths
    }

    /// Help text shown when no config file exists
    pub fn config_not_found_help() -> String {
        let mut help = String::from("No configuration file found. Searched:\n");
        for path in Self::config_file_paths() {
            help.push_str(&format!("  - {}\n", path.display()));
        }
        help.push_str("Create one with: jsm config example > jsm.toml");
        help
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup (`JSM_*` variable names)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Chain
        if let Some(network) = lookup("JSM_NETWORK") {
            self.chain.network = network;
        }
        if let Some(genesis) = lookup("JSM_GENESIS_TIME") {
            match DateTime::parse_from_rfc3339(&genesis) {
                Ok(time) => self.chain.genesis_time = Some(time.with_timezone(&Utc)),
                Err(e) => tracing::warn!("Ignoring JSM_GENESIS_TIME '{}': {}", genesis, e),
            }
        }
        if let Some(slots) = lookup("JSM_SLOTS_PER_EPOCH") {
            match slots.parse() {
                Ok(value) => self.chain.slots_per_epoch = Some(value),
                Err(e) => tracing::warn!("Ignoring JSM_SLOTS_PER_EPOCH '{}': {}", slots, e),
            }
        }
        if let Some(duration) = lookup("JSM_SLOT_DURATION_MS") {
            match duration.parse() {
                Ok(value) => self.chain.slot_duration_ms = Some(value),
                Err(e) => tracing::warn!("Ignoring JSM_SLOT_DURATION_MS '{}': {}", duration, e),
            }
        }

        // Schedule
        if let Some(leaders_log) = lookup("JSM_LEADERS_LOG") {
            self.schedule.leaders_log = Some(leaders_log);
        }
        if let Some(leader_id) = lookup("JSM_LEADER_ID") {
            match leader_id.parse() {
                Ok(id) => self.schedule.leader_id = Some(id),
                Err(e) => tracing::warn!("Ignoring JSM_LEADER_ID '{}': {}", leader_id, e),
            }
        }

        // Node
        if let Some(stats_file) = lookup("JSM_STATS_FILE") {
            self.node.stats_file = Some(stats_file);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.chain.time_settings()?;
        Ok(())
    }

    /// Get example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# Jormungandr Slot Monitor (JSM) Configuration File
#
# Location priority (first found is used):
#   1. ./jsm.toml (current directory)
#   2. ~/.config/jsm/config.toml (user config)
#   3. /etc/jsm/config.toml (system-wide)
#
# Override priority: CLI flags > Environment variables > Config file > Defaults
#
# Environment variables: JSM_NETWORK, JSM_GENESIS_TIME, JSM_SLOTS_PER_EPOCH,
#   JSM_SLOT_DURATION_MS, JSM_LEADERS_LOG, JSM_LEADER_ID, JSM_STATS_FILE

[chain]
# Network preset: "itn" or "custom"
#   itn:    genesis 2019-12-13T19:13:37Z, 43200 slots of 2s (24h epochs)
#   custom: all three values below must be set
network = "itn"
# genesis_time = "2019-12-13T19:13:37Z"
# slots_per_epoch = 43200
# slot_duration_ms = 2000

[schedule]
# Leaders logs dump, e.g. `curl localhost:3101/api/v0/leaders/logs > leaders.json`
# leaders_log = "./leaders.json"
# Only show assignments of this leader
# leader_id = 1

[node]
# Node statistics dump, e.g. `curl localhost:3101/api/v0/node/stats > stats.json`
# stats_file = "./stats.json"
"#
        .to_string()
    }
}
