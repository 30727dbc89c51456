//! Contest reminder scheduler
//!
//! [`machine`] holds the pure transition logic; [`ReminderScheduler`] feeds it
//! events and carries out the effects against the directory, the store, the
//! alarm facility and the notifier.

pub mod machine;
pub mod reminder_scheduler;

use tokio::sync::oneshot;

use crate::{services::AlarmId, state::SchedulerStatus};

pub use machine::{transition, Effect, Event, Note, Transition, POLL_ALARM, REMINDER_ALARM};
pub use reminder_scheduler::ReminderScheduler;

/// User-requested transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    Enable,
    Disable,
}

impl SchedulerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SchedulerCommand::Enable => "enable",
            SchedulerCommand::Disable => "disable",
        }
    }
}

/// Result of a command once the scheduler has handled it
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub status: SchedulerStatus,
    /// Set when the transition happened but could not be persisted.
    pub persistence_error: Option<String>,
}

/// Everything the scheduler task reacts to
#[derive(Debug)]
pub enum SchedulerEvent {
    /// `generation` is the id `AlarmFacility::create` returned for this arming.
    AlarmFired { name: String, generation: AlarmId },
    Command {
        command: SchedulerCommand,
        reply: oneshot::Sender<CommandOutcome>,
    },
}
