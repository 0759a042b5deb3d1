//! Chat request records.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp format written into every chat record.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A customer chat assigned to an agent.
///
/// Records are immutable once created. A slot that has never held a chat is
/// the default record, with id 0.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub id: u64,

    #[serde(default)]
    pub customer_name: String,

    #[serde(default)]
    pub agent_name: String,

    #[serde(default)]
    pub timestamp: String,
}

impl ChatRequest {
    /// Create a chat stamped with the given local time.
    pub fn new(id: u64, customer: &str, agent: &str, created: DateTime<Local>) -> Self {
        Self {
            id,
            customer_name: customer.to_string(),
            agent_name: agent.to_string(),
            timestamp: created.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Whether this slot has never held a chat.
    pub fn is_vacant(&self) -> bool {
        self.id == 0
    }
}
