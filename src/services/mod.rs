//! Host facilities
//!
//! Timers and user notifications used by the reminder scheduler.

pub mod alarms;
pub mod notifier;

// Re-export main types
pub use alarms::{AlarmFacility, AlarmId, AlarmSchedule, TokioAlarms};
pub use notifier::{check_notify_send_available, DesktopNotifier, LogNotifier, Notification, Notifier};
