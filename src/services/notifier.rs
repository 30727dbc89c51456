//! User-facing notifications

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Shown when the reminder alarm fires
    pub fn contest_starting() -> Self {
        Self::new(
            "Codeforces Contest Reminder",
            "A Codeforces contest is starting in 5 minutes!",
        )
    }

    /// Shown at startup when the reminder window passed while we were down
    pub fn missed_reminder() -> Self {
        Self::new(
            "Missed Contest Reminder",
            "You may have missed the earlier Codeforces contest reminder!",
        )
    }
}

/// Fire-and-forget notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification);
}

/// Desktop notifications through `notify-send`
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn show(&self, notification: &Notification) {
        debug!("Sending desktop notification: {}", notification.title);

        let output = Command::new("notify-send")
            .args(["-u", "critical", "-a", &self.app_name])
            .arg(&notification.title)
            .arg(&notification.message)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                info!("Notification shown: {}", notification.title);
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(
                    "notify-send failed for '{}': {}",
                    notification.title,
                    stderr.trim()
                );
            }
            Err(e) => {
                warn!(
                    "Failed to execute notify-send for '{}': {}",
                    notification.title, e
                );
            }
        }
    }
}

/// Notifier that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &Notification) {
        info!("[notification] {}: {}", notification.title, notification.message);
    }
}

/// Check that `notify-send` can be executed
pub async fn check_notify_send_available() -> Result<(), String> {
    Command::new("notify-send")
        .arg("--version")
        .output()
        .await
        .map_err(|_| "notify-send is not available, desktop notifications disabled".to_string())?;

    info!("notify-send is available");
    Ok(())
}
