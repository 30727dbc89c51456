//! Scheduler status snapshot published to the API

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{ReminderState, SchedulerPhase};

/// Point-in-time view of the reminder scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub phase: String,
    pub enabled: bool,
    pub armed_contest_id: Option<u64>,
    pub contest_start_time: Option<DateTime<Utc>>,
    pub fire_at: Option<DateTime<Utc>>,
    /// In-memory state has not reached disk yet.
    pub store_dirty: bool,
}

impl SchedulerStatus {
    pub fn from_state(state: &ReminderState, store_dirty: bool) -> Self {
        let phase = state.phase();
        let armed = match phase {
            SchedulerPhase::Armed(contest) => Some(contest),
            _ => None,
        };

        Self {
            phase: phase.name().to_string(),
            enabled: state.enabled,
            armed_contest_id: armed.map(|c| c.id),
            contest_start_time: armed.and_then(|c| utc_from_ms(c.start_ms())),
            fire_at: armed.and_then(|c| utc_from_ms(c.fire_at_ms())),
            store_dirty,
        }
    }
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        Self::from_state(&ReminderState::default(), false)
    }
}

pub fn utc_from_ms(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
