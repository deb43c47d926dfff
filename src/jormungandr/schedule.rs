//! Leader schedule records and the pure utilities that order and filter them
//!
//! None of the functions here mutate their input. Each one returns a fresh
//! `Vec`, so a caller can sort once and then narrow the result step by step
//! while the original snapshot stays untouched.

use super::date::{Epoch, FullSlotDate, PlainSlotDate, TimeSettings};
use super::error::SlotDateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One entry of a node's leader schedule (`/api/v0/leaders/logs`)
///
/// The field names follow the `v0` REST schema. `scheduled_at_date` is
/// absent in older node versions and `finished_at_time` stays `null` until
/// the leader event has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderAssignment {
    #[serde(rename = "created_at_time")]
    pub creation_time: DateTime<Utc>,

    #[serde(rename = "scheduled_at_time")]
    pub schedule_time: DateTime<Utc>,

    #[serde(
        rename = "scheduled_at_date",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule_date: Option<PlainSlotDate>,

    #[serde(rename = "finished_at_time", default)]
    pub finishing_time: Option<DateTime<Utc>>,

    #[serde(rename = "enclave_leader_id")]
    pub leader_id: u64,
}

impl LeaderAssignment {
    /// The scheduled slot with wall-clock capability, if the entry carries a date
    pub fn scheduled_slot<'s>(
        &self,
        settings: &'s TimeSettings,
    ) -> Result<Option<FullSlotDate<'s>>, SlotDateError> {
        self.schedule_date
            .map(|date| FullSlotDate::from_plain(date, settings))
            .transpose()
    }

    pub fn is_finished(&self) -> bool {
        self.finishing_time.is_some()
    }
}

/// Decode the JSON array returned by the leaders logs endpoint
pub fn decode_leader_logs(json: &str) -> serde_json::Result<Vec<LeaderAssignment>> {
    serde_json::from_str(json)
}

/// Ascending by scheduled time; assignments with equal times keep their input order
pub fn sort_by_schedule_time(assignments: &[LeaderAssignment]) -> Vec<LeaderAssignment> {
    let mut sorted = assignments.to_vec();
    sorted.sort_by_key(|assignment| assignment.schedule_time);
    sorted
}

/// Assignments scheduled strictly after `threshold`
pub fn filter_after(
    threshold: DateTime<Utc>,
    assignments: &[LeaderAssignment],
) -> Vec<LeaderAssignment> {
    assignments
        .iter()
        .filter(|assignment| assignment.schedule_time > threshold)
        .cloned()
        .collect()
}

/// Assignments whose scheduled date lies in `epoch`; entries without a date never match
pub fn filter_by_epoch(epoch: Epoch, assignments: &[LeaderAssignment]) -> Vec<LeaderAssignment> {
    assignments
        .iter()
        .filter(|assignment| {
            assignment
                .schedule_date
                .is_some_and(|date| date.epoch() == epoch)
        })
        .cloned()
        .collect()
}

/// Assignments of the given leader
pub fn filter_by_leader(leader_id: u64, assignments: &[LeaderAssignment]) -> Vec<LeaderAssignment> {
    assignments
        .iter()
        .filter(|assignment| assignment.leader_id == leader_id)
        .cloned()
        .collect()
}

/// Earliest assignment scheduled strictly after `now`
pub fn next_assignment(
    now: DateTime<Utc>,
    assignments: &[LeaderAssignment],
) -> Option<&LeaderAssignment> {
    assignments
        .iter()
        .filter(|assignment| assignment.schedule_time > now)
        .min_by_key(|assignment| assignment.schedule_time)
}

/// Sort-then-filter pipeline over a leader schedule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleQuery {
    /// Keep only assignments scheduled strictly after this instant
    pub after: Option<DateTime<Utc>>,
    /// Keep only assignments scheduled in this epoch
    pub epoch: Option<Epoch>,
    /// Keep only assignments of this leader
    pub leader: Option<u64>,
}

impl ScheduleQuery {
    pub fn run(&self, assignments: &[LeaderAssignment]) -> Vec<LeaderAssignment> {
        let mut selected = sort_by_schedule_time(assignments);

        if let Some(threshold) = self.after {
            selected = filter_after(threshold, &selected);
            debug!("{} assignment(s) after {}", selected.len(), threshold);
        }
        if let Some(epoch) = self.epoch {
            selected = filter_by_epoch(epoch, &selected);
            debug!("{} assignment(s) in epoch {}", selected.len(), epoch);
        }
        if let Some(leader) = self.leader {
            selected = filter_by_leader(leader, &selected);
            debug!("{} assignment(s) of leader {}", selected.len(), leader);
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    fn assignment(scheduled: &str, date: Option<(u64, u64)>, leader_id: u64) -> LeaderAssignment {
        LeaderAssignment {
            creation_time: utc("2019-12-31T00:00:00Z"),
            schedule_time: utc(scheduled),
            schedule_date: date.map(|(epoch, slot)| PlainSlotDate::new(epoch, slot)),
            finishing_time: None,
            leader_id,
        }
    }

    fn sample() -> Vec<LeaderAssignment> {
        vec![
            assignment("2019-12-31T03:00:00Z", Some((17, 16000)), 1),
            assignment("2019-12-31T01:08:43Z", Some((17, 10653)), 2),
            assignment("2020-01-01T00:00:00Z", Some((18, 2331)), 1),
            assignment("2019-12-31T02:00:00Z", None, 2),
        ]
    }

    #[test]
    fn test_sort_is_stable() {
        let mut first = assignment("2019-12-31T02:00:00Z", None, 1);
        first.creation_time = utc("2019-12-30T00:00:00Z");
        let earlier = assignment("2019-12-31T01:00:00Z", None, 2);
        let mut second = assignment("2019-12-31T02:00:00Z", None, 3);
        second.creation_time = utc("2019-12-30T12:00:00Z");

        let input = vec![first.clone(), earlier.clone(), second.clone()];
        let sorted = sort_by_schedule_time(&input);

        assert_eq!(sorted, vec![earlier, first, second]);
        // Input untouched
        assert_eq!(input[1].leader_id, 2);
    }

    #[test]
    fn test_filter_after_is_strict() {
        let assignments = sample();
        let threshold = utc("2019-12-31T02:00:00Z");

        let after = filter_after(threshold, &assignments);

        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|a| a.schedule_time > threshold));
        // Input order preserved
        assert_eq!(after[0].schedule_date, Some(PlainSlotDate::new(17, 16000)));
        assert_eq!(after[1].schedule_date, Some(PlainSlotDate::new(18, 2331)));
    }

    #[test]
    fn test_filter_by_epoch_skips_missing_dates() {
        let assignments = sample();

        let epoch_17 = filter_by_epoch(17, &assignments);
        assert_eq!(epoch_17.len(), 2);
        assert_eq!(epoch_17[0].leader_id, 1);
        assert_eq!(epoch_17[1].leader_id, 2);

        // Epoch 0 would match a defaulted date, but the undated entry must not
        assert!(filter_by_epoch(0, &assignments).is_empty());
        assert!(filter_by_epoch(99, &assignments).is_empty());
    }

    #[test]
    fn test_filter_by_leader() {
        let assignments = sample();
        let leader_2 = filter_by_leader(2, &assignments);

        assert_eq!(leader_2.len(), 2);
        assert!(leader_2.iter().all(|a| a.leader_id == 2));
        assert!(filter_by_leader(7, &assignments).is_empty());
    }

    #[test]
    fn test_next_assignment() {
        let assignments = sample();

        let next = next_assignment(utc("2019-12-31T01:08:43Z"), &assignments).unwrap();
        assert_eq!(next.schedule_time, utc("2019-12-31T02:00:00Z"));

        assert!(next_assignment(utc("2020-01-01T00:00:00Z"), &assignments).is_none());
    }

    #[test]
    fn test_query_pipeline() {
        let assignments = sample();
        let query = ScheduleQuery {
            after: Some(utc("2019-12-31T00:00:00Z")),
            epoch: Some(17),
            leader: None,
        };

        let result = query.run(&assignments);
        let dates: Vec<_> = result.iter().filter_map(|a| a.schedule_date).collect();
        assert_eq!(
            dates,
            vec![PlainSlotDate::new(17, 10653), PlainSlotDate::new(17, 16000)]
        );

        let query = ScheduleQuery {
            leader: Some(1),
            ..query
        };
        let result = query.run(&assignments);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].schedule_date, Some(PlainSlotDate::new(17, 16000)));
    }

    #[test]
    fn test_empty_query_only_sorts() {
        let assignments = sample();
        let result = ScheduleQuery::default().run(&assignments);

        assert_eq!(result.len(), assignments.len());
        assert!(result
            .windows(2)
            .all(|pair| pair[0].schedule_time <= pair[1].schedule_time));
    }

    #[test]
    fn test_decode_leader_logs() {
        let json = r#"[
            {
                "created_at_time": "2019-12-31T00:12:01.123+00:00",
                "scheduled_at_time": "2019-12-31T02:08:43+01:00",
                "scheduled_at_date": "17.10653",
                "wake_at_time": null,
                "finished_at_time": null,
                "status": "Pending",
                "enclave_leader_id": 1
            },
            {
                "created_at_time": "2019-12-30T00:12:01+00:00",
                "scheduled_at_time": "2019-12-30T10:00:01+00:00",
                "finished_at_time": "2019-12-30T10:00:02+00:00",
                "enclave_leader_id": 2
            }
        ]"#;

        let logs = decode_leader_logs(json).unwrap();
        assert_eq!(logs.len(), 2);

        assert_eq!(logs[0].schedule_time, utc("2019-12-31T01:08:43Z"));
        assert_eq!(logs[0].schedule_date, Some(PlainSlotDate::new(17, 10653)));
        assert!(!logs[0].is_finished());
        assert_eq!(logs[0].leader_id, 1);

        assert_eq!(logs[1].schedule_date, None);
        assert!(logs[1].is_finished());
    }

    #[test]
    fn test_decode_rejects_bad_date() {
        let json = r#"[{
            "created_at_time": "2019-12-31T00:12:01+00:00",
            "scheduled_at_time": "2019-12-31T02:08:43+00:00",
            "scheduled_at_date": "17-10653",
            "enclave_leader_id": 1
        }]"#;
        assert!(decode_leader_logs(json).is_err());
    }

    #[test]
    fn test_scheduled_slot() {
        let settings =
            TimeSettings::new(utc("2019-12-13T19:13:37Z"), 43200, Duration::from_secs(2)).unwrap();
        let dated = assignment("2019-12-31T01:08:43Z", Some((17, 10653)), 1);
        let undated = assignment("2019-12-31T01:08:43Z", None, 1);

        let slot = dated.scheduled_slot(&settings).unwrap().unwrap();
        assert_eq!(slot.start_time(), dated.schedule_time);
        assert_eq!(undated.scheduled_slot(&settings).unwrap(), None);
    }
}
