//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    directory::Contest,
    state::{fire_time_ms, status::utc_from_ms, SchedulerStatus},
};

/// API response structure for reminder toggle endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub reminder: SchedulerStatus,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, reminder: SchedulerStatus) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            reminder,
        }
    }

    /// Response whose status mirrors the scheduler phase
    pub fn phase(message: String, reminder: SchedulerStatus) -> Self {
        Self::new(reminder.phase.clone(), message, reminder)
    }

    /// Transition applied in memory but not written to disk
    pub fn degraded(message: String, reminder: SchedulerStatus) -> Self {
        Self::new("degraded".to_string(), message, reminder)
    }
}

/// Status response with scheduler and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub reminder: SchedulerStatus,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// The next contest as shown in the reminders view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingContest {
    pub id: u64,
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub start_time_seconds: i64,
    pub reminder_at: Option<DateTime<Utc>>,
}

impl UpcomingContest {
    pub fn from_contest(contest: &Contest) -> Option<Self> {
        let start_time_seconds = contest.start_time_seconds?;
        Some(Self {
            id: contest.id,
            name: contest.name.clone(),
            start_time: utc_from_ms(start_time_seconds * 1000),
            start_time_seconds,
            reminder_at: utc_from_ms(fire_time_ms(start_time_seconds)),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextContestResponse {
    pub contest: Option<UpcomingContest>,
    pub timestamp: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
