//! Error types for the reminder daemon

use reqwest::StatusCode;

/// Failures talking to the remote contest directory
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Request could not be sent or the body could not be read.
    #[error("contest directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote answered with a non-success HTTP status.
    #[error("contest directory returned HTTP {0}")]
    Status(StatusCode),

    /// Envelope status was not `OK`.
    #[error("contest directory rejected the request: {comment}")]
    Rejected { comment: String },

    /// Body was not the expected envelope.
    #[error("malformed contest directory payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures reading or writing the persistent key-value store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but is not a JSON object.
    #[error("state file is corrupt: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced to callers of the scheduler task
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler task is not running")]
    ChannelClosed,

    /// The transition happened in memory but could not be written to disk.
    #[error("reminder state was not persisted: {0}")]
    Persistence(#[from] StoreError),
}
