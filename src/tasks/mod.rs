//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod scheduler_task;

// Re-export main functions
pub use scheduler_task::reminder_scheduler_task;
