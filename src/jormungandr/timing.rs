//! Time settings presets for known Jormungandr networks
//!
//! Only the incentivized testnet has a fixed preset. Any other chain
//! (a local cluster, a private testnet) is configured as `custom` with all
//! three time parameters supplied explicitly.

use super::date::TimeSettings;
use super::error::SlotDateError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Genesis block time of the incentivized testnet, seconds since Unix epoch
/// (2019-12-13T19:13:37Z)
const ITN_GENESIS_UNIX_SECS: i64 = 1_576_264_417;

/// Network identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Incentivized testnet - 43200 slots of 2 seconds (24h epochs)
    #[default]
    Itn,
    /// User supplied genesis, epoch length and slot duration
    Custom,
}

impl Network {
    /// Parse network from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "itn" | "incentivized" | "incentivized-testnet" => Some(Network::Itn),
            "custom" => Some(Network::Custom),
            _ => None,
        }
    }

    /// Get the display name for this network
    pub fn name(&self) -> &'static str {
        match self {
            Network::Itn => "itn",
            Network::Custom => "custom",
        }
    }

    /// Preset time parameters, if the network has any
    pub fn preset(&self) -> Option<ChainTiming> {
        match self {
            Network::Itn => Some(ChainTiming::itn()),
            Network::Custom => None,
        }
    }
}

/// Raw time parameters of a chain, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTiming {
    /// Network this timing is for
    pub network: Network,

    /// Creation time of the genesis block
    pub genesis_time: DateTime<Utc>,

    /// Number of slots in one epoch
    pub slots_per_epoch: u64,

    /// Slot duration in milliseconds
    pub slot_duration_ms: u64,
}

impl ChainTiming {
    /// Incentivized testnet timing
    /// - 2 second slots
    /// - 43200 slots per epoch (24 hours)
    pub fn itn() -> Self {
        Self {
            network: Network::Itn,
            // Constant is well inside chrono's range, so the addition cannot overflow
            genesis_time: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(ITN_GENESIS_UNIX_SECS),
            slots_per_epoch: 43_200,
            slot_duration_ms: 2_000,
        }
    }

    /// Validate the parameters and turn them into [`TimeSettings`]
    pub fn time_settings(&self) -> Result<TimeSettings, SlotDateError> {
        TimeSettings::new(
            self.genesis_time,
            self.slots_per_epoch,
            Duration::from_millis(self.slot_duration_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itn_timing() {
        let timing = ChainTiming::itn();
        assert_eq!(timing.genesis_time.to_rfc3339(), "2019-12-13T19:13:37+00:00");

        let settings = timing.time_settings().unwrap();
        assert_eq!(settings.slots_per_epoch(), 43_200);
        assert_eq!(settings.slot_duration(), Duration::from_secs(2));
        assert_eq!(settings.epoch_duration().unwrap(), TimeDelta::hours(24));
    }

    #[test]
    fn test_itn_genesis_constant() {
        let expected = DateTime::parse_from_rfc3339("2019-12-13T19:13:37Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(DateTime::from_timestamp(ITN_GENESIS_UNIX_SECS, 0), Some(expected));
        assert_eq!(ChainTiming::itn().genesis_time, expected);
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("itn"), Some(Network::Itn));
        assert_eq!(Network::from_str("ITN"), Some(Network::Itn));
        assert_eq!(Network::from_str("incentivized-testnet"), Some(Network::Itn));
        assert_eq!(Network::from_str("custom"), Some(Network::Custom));
        assert_eq!(Network::from_str("mainnet"), None);
    }

    #[test]
    fn test_presets() {
        assert!(Network::Itn.preset().is_some());
        assert!(Network::Custom.preset().is_none());
        assert_eq!(Network::Custom.name(), "custom");
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let timing = ChainTiming {
            slot_duration_ms: 0,
            ..ChainTiming::itn()
        };
        assert_eq!(timing.time_settings(), Err(SlotDateError::InvalidSlotDuration));
    }
}
