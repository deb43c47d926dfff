//! Node statistics payload (`/api/v0/node/stats`)

use super::date::{PlainSlotDate, TimeSettings};
use super::error::SlotDateError;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// State reported by a node that has finished bootstrapping
pub const RUNNING_STATE: &str = "Running";

/// Statistics of a running node
///
/// Bootstrapping nodes omit most of the block fields, so everything past
/// `state` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStats {
    pub state: String,

    #[serde(default)]
    pub version: Option<String>,

    /// Uptime in seconds
    #[serde(default)]
    pub uptime: Option<u64>,

    #[serde(rename = "blockRecvCnt", default)]
    pub received_blocks: Option<u128>,

    #[serde(rename = "txRecvCnt", default)]
    pub received_transactions: Option<u128>,

    #[serde(default)]
    pub last_block_content_size: Option<u128>,

    #[serde(default)]
    pub last_block_date: Option<PlainSlotDate>,

    #[serde(default)]
    pub last_block_fees: Option<u128>,

    #[serde(default)]
    pub last_block_hash: Option<String>,

    /// Reported as a decimal string by most node versions
    #[serde(default, deserialize_with = "string_or_number")]
    pub last_block_height: Option<u64>,

    #[serde(default)]
    pub last_block_sum: Option<u128>,

    #[serde(default)]
    pub last_block_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_block_tx: Option<u128>,
}

impl NodeStats {
    pub fn uptime(&self) -> Option<Duration> {
        self.uptime.map(Duration::from_secs)
    }

    /// Slots between the last received block and the slot containing `now`
    ///
    /// Negative if the last block lies in the future relative to `now`.
    /// `None` if the node has not reported a block date yet.
    pub fn slots_behind(
        &self,
        now: DateTime<Utc>,
        settings: &TimeSettings,
    ) -> Result<Option<i128>, SlotDateError> {
        let Some(last_block) = self.last_block_date else {
            return Ok(None);
        };
        let current = settings.date_at(now)?;
        current.diff_plain(last_block).map(Some)
    }
}

/// Whether a node is still bootstrapping or already serving statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    Bootstrapping,
    Running(NodeStats),
}

impl NodeStatus {
    /// Decode a stats payload; any state other than `Running` counts as bootstrapping
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let stats: NodeStats = serde_json::from_str(json)?;
        if stats.state == RUNNING_STATE {
            Ok(NodeStatus::Running(stats))
        } else {
            Ok(NodeStatus::Bootstrapping)
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Height {
        Text(String),
        Number(u64),
    }

    match Option::<Height>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Height::Number(n)) => Ok(Some(n)),
        Some(Height::Text(text)) => text.parse().map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING: &str = r#"{
        "blockRecvCnt": 1205,
        "lastBlockContentSize": 0,
        "lastBlockDate": "17.10653",
        "lastBlockFees": 0,
        "lastBlockHash": "b9597b45a402451540e6aabb58f2ee4d65c67953b338e04c52c00aa0886bd1f0",
        "lastBlockHeight": "36474",
        "lastBlockSum": 0,
        "lastBlockTime": "2019-12-31T01:08:43+00:00",
        "lastBlockTx": 0,
        "state": "Running",
        "txRecvCnt": 5,
        "uptime": 21600,
        "version": "jormungandr 0.8.5-30d20d2e"
    }"#;

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_running_node() {
        let NodeStatus::Running(stats) = NodeStatus::from_json(RUNNING).unwrap() else {
            panic!("node must be running");
        };

        assert_eq!(stats.last_block_date, Some(PlainSlotDate::new(17, 10653)));
        assert_eq!(stats.last_block_height, Some(36474));
        assert_eq!(stats.received_blocks, Some(1205));
        assert_eq!(stats.uptime(), Some(Duration::from_secs(21600)));
        assert_eq!(stats.last_block_time, Some(utc("2019-12-31T01:08:43Z")));
    }

    #[test]
    fn test_bootstrapping_node() {
        let json = r#"{"state": "Bootstrapping", "version": "jormungandr 0.8.5"}"#;
        assert_eq!(NodeStatus::from_json(json).unwrap(), NodeStatus::Bootstrapping);
    }

    #[test]
    fn test_numeric_block_height() {
        let json = r#"{"state": "Running", "lastBlockHeight": 42}"#;
        let NodeStatus::Running(stats) = NodeStatus::from_json(json).unwrap() else {
            panic!("node must be running");
        };
        assert_eq!(stats.last_block_height, Some(42));
        assert_eq!(stats.last_block_date, None);
    }

    #[test]
    fn test_slots_behind() {
        let settings =
            TimeSettings::new(utc("2019-12-13T19:13:37Z"), 43200, Duration::from_secs(2)).unwrap();
        let NodeStatus::Running(stats) = NodeStatus::from_json(RUNNING).unwrap() else {
            panic!("node must be running");
        };

        // Ten slots after 17.10653 started
        let now = utc("2019-12-31T01:09:03Z");
        assert_eq!(stats.slots_behind(now, &settings).unwrap(), Some(10));

        let no_date = NodeStats {
            last_block_date: None,
            ..stats
        };
        assert_eq!(no_date.slots_behind(now, &settings).unwrap(), None);
    }
}
