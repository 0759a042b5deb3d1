//! Core module - the chat queue and its persistence.
//!
//! - Chat request records
//! - Circular queue with round-robin agent assignment
//! - JSON snapshot store

pub mod chat;
pub mod queue;
pub mod service;
pub mod store;

pub use chat::ChatRequest;
pub use queue::{ChatQueue, QueueStatus};
pub use service::PersistentQueue;
pub use store::{QueueSnapshot, StateStore};
