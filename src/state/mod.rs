//! State management module
//!
//! This module contains the reminder record, the status snapshot and the
//! shared application state used by the HTTP API.

pub mod app_state;
pub mod reminder_state;
pub mod status;

// Re-export main types
pub use app_state::AppState;
pub use reminder_state::{fire_time_ms, ArmedContest, ReminderState, SchedulerPhase, REMINDER_LEAD_MS};
pub use status::SchedulerStatus;
