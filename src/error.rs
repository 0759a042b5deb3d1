//! Error types for chatqueue.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid queue state: {0}")]
    Snapshot(String),

    #[error("Queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("No active chats to end")]
    QueueEmpty,
}
