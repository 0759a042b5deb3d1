//! Fixed-capacity circular chat queue with round-robin agent assignment.
//!
//! Slots are a `Vec` of exactly `capacity` records. `front` points at the
//! oldest active chat and `rear` at the newest; both wrap modulo capacity.
//! `rear` is `None` until the first chat is ever queued.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::config::QueueSettings;
use crate::core::chat::ChatRequest;
use crate::error::{Error, Result};

/// Chat queue state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatQueue {
    pub(super) slots: Vec<ChatRequest>,
    pub(super) front: usize,
    pub(super) rear: Option<usize>,
    pub(super) size: usize,
    pub(super) agents: Vec<String>,
    pub(super) current_agent_index: usize,
    pub(super) next_id: u64,
}

impl ChatQueue {
    /// Create an empty queue.
    pub fn new(capacity: usize, agents: Vec<String>) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Config("queue capacity must be at least 1".to_string()));
        }
        if agents.is_empty() {
            return Err(Error::Config("at least one agent is required".to_string()));
        }

        Ok(Self {
            slots: vec![ChatRequest::default(); capacity],
            front: 0,
            rear: None,
            size: 0,
            agents,
            current_agent_index: 0,
            next_id: 1,
        })
    }

    /// Create an empty queue from settings.
    pub fn from_settings(settings: &QueueSettings) -> Result<Self> {
        Self::new(settings.capacity, settings.agents.clone())
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    /// Agent the next chat will be assigned to.
    pub fn current_agent(&self) -> &str {
        &self.agents[self.current_agent_index]
    }

    pub fn current_agent_index(&self) -> usize {
        self.current_agent_index
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Queue a chat for `customer`, stamped with the current time.
    pub fn add_chat(&mut self, customer: &str) -> Result<ChatRequest> {
        self.add_chat_at(customer, Local::now())
    }

    /// Queue a chat for `customer`, stamped with `created`.
    ///
    /// Fails with [`Error::QueueFull`] and leaves the queue untouched when
    /// every slot is occupied.
    pub fn add_chat_at(&mut self, customer: &str, created: DateTime<Local>) -> Result<ChatRequest> {
        if self.is_full() {
            return Err(Error::QueueFull {
                capacity: self.capacity(),
            });
        }

        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| Error::Snapshot("chat id counter exhausted".to_string()))?;
        let slot = self.rear.map_or(0, |rear| (rear + 1) % self.capacity());
        let chat = ChatRequest::new(self.next_id, customer, self.current_agent(), created);
        self.slots[slot] = chat.clone();
        self.rear = Some(slot);
        self.size += 1;
        self.next_id = next_id;
        self.current_agent_index = (self.current_agent_index + 1) % self.agents.len();

        tracing::info!(
            "Queued chat {} for {} with {} (slot {})",
            chat.id,
            chat.customer_name,
            chat.agent_name,
            slot
        );
        Ok(chat)
    }

    /// Dequeue the oldest chat.
    ///
    /// The slot keeps its record until it is overwritten by a later add.
    pub fn end_chat(&mut self) -> Result<ChatRequest> {
        if self.is_empty() {
            return Err(Error::QueueEmpty);
        }

        let chat = self.slots[self.front].clone();
        self.front = (self.front + 1) % self.capacity();
        self.size -= 1;

        tracing::info!("Ended chat {} for {}", chat.id, chat.customer_name);
        Ok(chat)
    }

    /// Active chats, oldest first.
    pub fn active(&self) -> impl Iterator<Item = &ChatRequest> + '_ {
        (0..self.size).map(move |i| &self.slots[(self.front + i) % self.capacity()])
    }

    /// Human-readable table of active chats, oldest first.
    pub fn list_chats(&self) -> String {
        if self.is_empty() {
            return "No active chats.\n".to_string();
        }

        let mut out = String::new();
        out.push_str("Active Chats:\n");
        out.push_str("ID | Customer | Agent | Timestamp\n");
        out.push_str("---|----------|-------|----------\n");
        for chat in self.active() {
            let _ = writeln!(
                out,
                "{} | {} | {} | {}",
                chat.id, chat.customer_name, chat.agent_name, chat.timestamp
            );
        }
        out
    }

    /// Structured view of the queue.
    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            total_chats: self.size,
            capacity: self.capacity(),
            chats: self.active().cloned().collect(),
            agents: self.agents.clone(),
        }
    }
}

/// Queue status as printed by the `json` command.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub total_chats: usize,
    pub capacity: usize,
    pub chats: Vec<ChatRequest>,
    pub agents: Vec<String>,
}
