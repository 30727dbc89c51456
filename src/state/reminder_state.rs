//! Persisted reminder state and the scheduler phase derived from it

use serde::{Deserialize, Serialize};

/// Lead time between the reminder and the contest start
pub const REMINDER_LEAD_MS: i64 = 5 * 60 * 1000;

/// The contest the reminder alarm is currently armed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmedContest {
    pub id: u64,
    pub start_time_seconds: i64,
}

impl ArmedContest {
    pub fn new(id: u64, start_time_seconds: i64) -> Self {
        Self {
            id,
            start_time_seconds,
        }
    }

    /// Contest start as epoch milliseconds
    pub fn start_ms(&self) -> i64 {
        self.start_time_seconds * 1000
    }

    /// Instant the reminder should trigger, in epoch milliseconds
    pub fn fire_at_ms(&self) -> i64 {
        fire_time_ms(self.start_time_seconds)
    }
}

/// Fire time for a contest starting at `start_time_seconds`
pub fn fire_time_ms(start_time_seconds: i64) -> i64 {
    start_time_seconds * 1000 - REMINDER_LEAD_MS
}

/// Reminder record owned by the scheduler.
///
/// The armed contest id and start time travel together in `armed`, so one
/// can never be present without the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderState {
    pub enabled: bool,
    pub armed: Option<ArmedContest>,
}

impl ReminderState {
    pub fn phase(&self) -> SchedulerPhase {
        match (self.enabled, self.armed) {
            (false, _) => SchedulerPhase::Disabled,
            (true, None) => SchedulerPhase::Idle,
            (true, Some(contest)) => SchedulerPhase::Armed(contest),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

/// Scheduler phase as seen from the outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SchedulerPhase {
    Disabled,
    Idle,
    Armed(ArmedContest),
}

impl SchedulerPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SchedulerPhase::Disabled => "disabled",
            SchedulerPhase::Idle => "idle",
            SchedulerPhase::Armed(_) => "armed",
        }
    }
}
