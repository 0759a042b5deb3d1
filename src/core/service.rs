//! Queue operations backed by the snapshot file.

use crate::config::QueueSettings;
use crate::core::chat::ChatRequest;
use crate::core::queue::{ChatQueue, QueueStatus};
use crate::core::store::StateStore;
use crate::error::Result;

/// A [`ChatQueue`] that writes its snapshot after every successful mutation.
pub struct PersistentQueue {
    queue: ChatQueue,
    store: StateStore,
}

impl PersistentQueue {
    /// Load the queue from `store`, seeding a fresh one from `defaults`.
    pub fn open(store: StateStore, defaults: &QueueSettings) -> Result<Self> {
        let queue = store.load(defaults)?;
        Ok(Self { queue, store })
    }

    pub fn queue(&self) -> &ChatQueue {
        &self.queue
    }

    /// Queue a chat and persist. Nothing is written when the queue is full.
    pub fn add_chat(&mut self, customer: &str) -> Result<ChatRequest> {
        let chat = self.queue.add_chat(customer)?;
        self.store.save(&self.queue)?;
        Ok(chat)
    }

    /// End the oldest chat and persist. Nothing is written when empty.
    pub fn end_chat(&mut self) -> Result<ChatRequest> {
        let chat = self.queue.end_chat()?;
        self.store.save(&self.queue)?;
        Ok(chat)
    }

    pub fn list_chats(&self) -> String {
        self.queue.list_chats()
    }

    pub fn status(&self) -> QueueStatus {
        self.queue.status()
    }
}
