//! Shared application state for the HTTP API

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

use super::SchedulerStatus;
use crate::{
    directory::ContestDirectory,
    error::SchedulerError,
    scheduler::{CommandOutcome, SchedulerCommand, SchedulerEvent},
};

/// State shared between the API handlers and the scheduler task
pub struct AppState {
    /// Channel into the scheduler task
    pub scheduler_tx: mpsc::Sender<SchedulerEvent>,
    /// Directory used for the upcoming-contest view
    pub directory: Arc<dyn ContestDirectory>,
    /// Latest scheduler status, published by the scheduler task
    pub status_tx: watch::Sender<SchedulerStatus>,
    /// Keep the receiver alive to prevent channel closure
    pub _status_rx: watch::Receiver<SchedulerStatus>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        scheduler_tx: mpsc::Sender<SchedulerEvent>,
        directory: Arc<dyn ContestDirectory>,
        port: u16,
        host: String,
    ) -> Self {
        let (status_tx, status_rx) = watch::channel(SchedulerStatus::default());

        Self {
            scheduler_tx,
            directory,
            status_tx,
            _status_rx: status_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Ask the scheduler task to run a transition and wait for the result
    pub async fn send_command(
        &self,
        command: SchedulerCommand,
    ) -> Result<CommandOutcome, SchedulerError> {
        info!("Requesting scheduler command: {}", command.name());

        let (reply, outcome) = oneshot::channel();
        self.scheduler_tx
            .send(SchedulerEvent::Command { command, reply })
            .await
            .map_err(|_| SchedulerError::ChannelClosed)?;
        let outcome = outcome.await.map_err(|_| SchedulerError::ChannelClosed)?;

        self.record_action(command.name());
        Ok(outcome)
    }

    /// Publish a fresh status snapshot
    pub fn publish_status(&self, status: SchedulerStatus) {
        if let Err(e) = self.status_tx.send(status) {
            warn!("Failed to publish scheduler status: {}", e);
        }
    }

    /// Get current scheduler status
    pub fn get_status(&self) -> SchedulerStatus {
        self.status_tx.borrow().clone()
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;
        
        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
