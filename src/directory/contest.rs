//! Contest records as served by the Codeforces API

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a contest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestPhase {
    /// Not started yet
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
    #[serde(other)]
    Unknown,
}

/// A single contest from `contest.list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub phase: ContestPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_seconds: Option<i64>,
}

impl Contest {
    pub fn is_upcoming(&self) -> bool {
        self.phase == ContestPhase::Before && self.start_time_seconds.is_some()
    }
}

/// Pick the earliest not-yet-started contest.
///
/// Contests without a start time are skipped. On a tie the contest listed
/// first wins.
pub fn select_next_upcoming(contests: &[Contest]) -> Option<Contest> {
    contests
        .iter()
        .filter(|c| c.is_upcoming())
        .min_by_key(|c| c.start_time_seconds)
        .cloned()
}

#[cfg(test)]
pub(crate) fn contest(id: u64, phase: ContestPhase, start_time_seconds: i64) -> Contest {
    Contest {
        id,
        name: format!("Codeforces Round #{id}"),
        kind: Some("CF".to_string()),
        phase,
        duration_seconds: Some(7200),
        start_time_seconds: Some(start_time_seconds),
    }
}
