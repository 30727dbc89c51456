//! cf-reminder - Codeforces contest reminder daemon
//! 
//! Polls the Codeforces contest list, arms a single alarm five minutes
//! before the next contest, and notifies the user when it fires. The
//! reminder state survives restarts, and a reminder missed while the daemon
//! was down is reported at startup.

pub mod api;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use scheduler::ReminderScheduler;
pub use utils::signals::shutdown_signal;
