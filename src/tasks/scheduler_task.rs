//! Reminder scheduler background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    scheduler::{CommandOutcome, ReminderScheduler, SchedulerCommand, SchedulerEvent},
    state::AppState,
};

/// Background task that owns the scheduler and handles one event at a time.
///
/// Runs the startup recovery first, then consumes alarm and command events
/// until every sender is dropped.
pub async fn reminder_scheduler_task(
    mut scheduler: ReminderScheduler,
    mut events: mpsc::Receiver<SchedulerEvent>,
    state: Arc<AppState>,
) {
    info!("Starting reminder scheduler task");

    if let Err(e) = scheduler.start().await {
        warn!("Scheduler started with errors: {}", e);
    }
    state.publish_status(scheduler.status());

    while let Some(event) = events.recv().await {
        match event {
            SchedulerEvent::AlarmFired { name, generation } => {
                debug!("Scheduler received alarm '{}' (generation {})", name, generation);
                if let Err(e) = scheduler.timer_fired(&name, generation).await {
                    error!("Failed to handle alarm '{}': {}", name, e);
                }
                state.publish_status(scheduler.status());
            }
            SchedulerEvent::Command { command, reply } => {
                let result = match command {
                    SchedulerCommand::Enable => scheduler.enable().await,
                    SchedulerCommand::Disable => scheduler.disable().await,
                };
                if let Err(e) = &result {
                    error!("Command '{}' completed with errors: {}", command.name(), e);
                }

                let outcome = CommandOutcome {
                    status: scheduler.status(),
                    persistence_error: result.err().map(|e| e.to_string()),
                };
                state.publish_status(outcome.status.clone());
                if reply.send(outcome).is_err() {
                    debug!("Command '{}' caller went away", command.name());
                }
            }
        }
    }

    info!("Reminder scheduler task stopped");
}
