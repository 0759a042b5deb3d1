//! chatqueue library root.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use cli::Commands;
pub use config::{load_settings, QueueSettings, Settings};
pub use core::{ChatQueue, ChatRequest, PersistentQueue, QueueSnapshot, QueueStatus, StateStore};
pub use error::{Error, Result};
