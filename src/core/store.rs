//! JSON snapshot persistence for the chat queue.
//!
//! The snapshot is rewritten in full after every mutation. Writes are not
//! atomic and there is no locking: one writer at a time.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::QueueSettings;
use crate::core::chat::ChatRequest;
use crate::core::queue::ChatQueue;
use crate::error::{Error, Result};

/// On-disk representation of a [`ChatQueue`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    #[serde(default)]
    pub front: usize,

    #[serde(default = "default_rear")]
    pub rear: i64,

    #[serde(default)]
    pub size: usize,

    /// Falls back to the configured capacity when absent.
    #[serde(default)]
    pub capacity: Option<usize>,

    #[serde(default)]
    pub current_agent_index: usize,

    #[serde(default = "default_next_id")]
    pub next_id: u64,

    /// Falls back to the configured agents when absent.
    #[serde(default)]
    pub agents: Option<Vec<String>>,

    #[serde(default)]
    pub queue: Vec<ChatRequest>,
}

fn default_rear() -> i64 {
    -1
}

fn default_next_id() -> u64 {
    1
}

impl From<&ChatQueue> for QueueSnapshot {
    fn from(queue: &ChatQueue) -> Self {
        Self {
            front: queue.front,
            rear: queue.rear.map_or(-1, |rear| rear as i64),
            size: queue.size,
            capacity: Some(queue.capacity()),
            current_agent_index: queue.current_agent_index,
            next_id: queue.next_id,
            agents: Some(queue.agents.clone()),
            queue: queue.slots.clone(),
        }
    }
}

impl QueueSnapshot {
    /// Rebuild a queue, filling absent fields from `defaults`.
    ///
    /// A slot array shorter than capacity is padded with vacant slots, but
    /// only if no active chat would land in the padding. Any state that
    /// breaks the queue's cursor invariants is rejected.
    pub fn into_queue(self, defaults: &QueueSettings) -> Result<ChatQueue> {
        let capacity = self.capacity.unwrap_or(defaults.capacity);
        let agents = self.agents.unwrap_or_else(|| defaults.agents.clone());
        let stored = self.queue.len();

        if capacity == 0 {
            return Err(Error::Snapshot("capacity is 0".to_string()));
        }
        if agents.is_empty() {
            return Err(Error::Snapshot("agent list is empty".to_string()));
        }
        if stored > capacity {
            return Err(Error::Snapshot(format!(
                "{} slots stored for capacity {}",
                stored, capacity
            )));
        }
        if self.front >= capacity || self.size > capacity {
            return Err(Error::Snapshot(format!(
                "front {} / size {} out of range for capacity {}",
                self.front, self.size, capacity
            )));
        }
        if self.rear < -1 || self.rear >= capacity as i64 {
            return Err(Error::Snapshot(format!(
                "rear {} out of range for capacity {}",
                self.rear, capacity
            )));
        }

        // A rear of -1 on a non-empty queue is the slot before front.
        let rear = match usize::try_from(self.rear) {
            Ok(rear) => Some(rear),
            Err(_) if self.size > 0 => Some(capacity - 1),
            Err(_) => None,
        };
        let expected_rear = self
            .front
            .checked_add(self.size)
            .and_then(|end| end.checked_add(capacity - 1))
            .map(|end| end % capacity)
            .ok_or_else(|| Error::Snapshot(format!("capacity {} is too large", capacity)))?;
        if rear.unwrap_or(capacity - 1) != expected_rear {
            return Err(Error::Snapshot(format!(
                "rear {} does not match front {} and size {}",
                self.rear, self.front, self.size
            )));
        }
        if self.next_id == 0 {
            return Err(Error::Snapshot("nextId is 0".to_string()));
        }
        if self.current_agent_index >= agents.len() {
            return Err(Error::Snapshot(format!(
                "currentAgentIndex {} out of range for {} agents",
                self.current_agent_index,
                agents.len()
            )));
        }

        let mut slots = self.queue;
        if slots.len() < capacity {
            tracing::warn!(
                "Snapshot holds {} slots for capacity {}, padding",
                slots.len(),
                capacity
            );
            slots.resize(capacity, ChatRequest::default());
        }

        let mut max_id = 0;
        for i in 0..self.size {
            let chat = &slots[(self.front + i) % capacity];
            if chat.is_vacant() {
                return Err(Error::Snapshot(format!(
                    "active slot {} is empty",
                    (self.front + i) % capacity
                )));
            }
            max_id = max_id.max(chat.id);
        }
        if self.next_id <= max_id {
            return Err(Error::Snapshot(format!(
                "nextId {} is not above active id {}",
                self.next_id, max_id
            )));
        }

        Ok(ChatQueue {
            slots,
            front: self.front,
            rear,
            size: self.size,
            agents,
            current_agent_index: self.current_agent_index,
            next_id: self.next_id,
        })
    }
}

/// Snapshot file location.
#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the queue, or a fresh one when there is no readable snapshot.
    pub fn load(&self, defaults: &QueueSettings) -> Result<ChatQueue> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No snapshot at {}, starting empty", self.path.display());
                return ChatQueue::from_settings(defaults);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read snapshot {}: {}, starting empty",
                    self.path.display(),
                    e
                );
                return ChatQueue::from_settings(defaults);
            }
        };

        // Invalid UTF-8 is a malformed snapshot, not a missing one.
        let snapshot: QueueSnapshot = serde_json::from_slice(&content)?;
        let queue = snapshot.into_queue(defaults)?;

        tracing::debug!(
            "Loaded {} of {} chats from {}",
            queue.len(),
            queue.capacity(),
            self.path.display()
        );
        Ok(queue)
    }

    /// Overwrite the snapshot with the queue's current state.
    pub fn save(&self, queue: &ChatQueue) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string(&QueueSnapshot::from(queue))?;
        fs::write(&self.path, content)?;

        tracing::debug!("Saved queue state to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> StateStore {
        StateStore::new(temp_dir.path().join("queue_state.json"))
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let queue = store(&temp_dir).load(&QueueSettings::default()).unwrap();

        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), 10);
        assert_eq!(queue.next_id(), 1);
        assert_eq!(queue.current_agent(), "Agent Alice");
    }

    #[test]
    fn test_save_then_load_preserves_queue() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut queue = ChatQueue::from_settings(&QueueSettings::default()).unwrap();
        for name in ["A", "B", "C"] {
            queue.add_chat(name).unwrap();
        }
        queue.end_chat().unwrap();

        store.save(&queue).unwrap();
        let loaded = store.load(&QueueSettings::default()).unwrap();

        assert_eq!(loaded, queue);
        let ids: Vec<u64> = loaded.active().map(|c| c.id).collect();
        assert_eq!(ids, [2, 3]);
        assert_eq!(loaded.next_id(), 4);
        assert_eq!(loaded.current_agent_index(), 3);
    }

    #[test]
    fn test_saved_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut queue = ChatQueue::from_settings(&QueueSettings::default()).unwrap();
        queue.add_chat("A").unwrap();
        store.save(&queue).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(json["front"], 0);
        assert_eq!(json["rear"], 0);
        assert_eq!(json["size"], 1);
        assert_eq!(json["capacity"], 10);
        assert_eq!(json["currentAgentIndex"], 1);
        assert_eq!(json["nextId"], 2);
        assert_eq!(json["agents"].as_array().unwrap().len(), 5);
        assert_eq!(json["queue"].as_array().unwrap().len(), 10);
        assert_eq!(json["queue"][0]["customerName"], "A");
        assert_eq!(json["queue"][1]["id"], 0);
    }

    #[test]
    fn test_fresh_queue_round_trips_rear_as_minus_one() {
        let queue = ChatQueue::from_settings(&QueueSettings::default()).unwrap();
        let snapshot = QueueSnapshot::from(&queue);

        assert_eq!(snapshot.rear, -1);
        assert_eq!(snapshot.into_queue(&QueueSettings::default()).unwrap(), queue);
    }

    #[test]
    fn test_partial_snapshot_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        fs::write(store.path(), "{}").unwrap();

        let queue = store.load(&QueueSettings::default()).unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), 10);
        assert_eq!(queue.next_id(), 1);
        assert_eq!(queue.agents().len(), 5);
    }

    #[test]
    fn test_short_slot_array_is_padded() {
        let snapshot: QueueSnapshot = serde_json::from_str(
            r#"{"front":0,"rear":1,"size":2,"capacity":4,"nextId":3,
                "agents":["X","Y"],
                "queue":[{"id":1,"customerName":"a"},{"id":2,"customerName":"b"}]}"#,
        )
        .unwrap();

        let queue = snapshot.into_queue(&QueueSettings::default()).unwrap();
        assert_eq!(queue.capacity(), 4);
        assert_eq!(queue.len(), 2);
        assert!(queue.slots[3].is_vacant());
    }

    #[test]
    fn test_active_chat_in_padding_is_rejected() {
        let snapshot: QueueSnapshot = serde_json::from_str(
            r#"{"front":1,"rear":2,"size":2,"capacity":4,"nextId":3,
                "queue":[{"id":1},{"id":2}]}"#,
        )
        .unwrap();

        assert!(matches!(
            snapshot.into_queue(&QueueSettings::default()),
            Err(Error::Snapshot(_))
        ));
    }

    #[test]
    fn test_inconsistent_cursors_are_rejected() {
        let snapshot: QueueSnapshot =
            serde_json::from_str(r#"{"front":3,"rear":-1,"size":0,"capacity":4}"#).unwrap();
        assert!(matches!(
            snapshot.into_queue(&QueueSettings::default()),
            Err(Error::Snapshot(_))
        ));

        let snapshot: QueueSnapshot =
            serde_json::from_str(r#"{"front":0,"rear":5,"size":1,"capacity":4}"#).unwrap();
        assert!(matches!(
            snapshot.into_queue(&QueueSettings::default()),
            Err(Error::Snapshot(_))
        ));
    }

    #[test]
    fn test_stale_next_id_is_rejected() {
        let snapshot: QueueSnapshot = serde_json::from_str(
            r#"{"front":0,"rear":0,"size":1,"capacity":2,"nextId":1,"queue":[{"id":1}]}"#,
        )
        .unwrap();

        assert!(matches!(
            snapshot.into_queue(&QueueSettings::default()),
            Err(Error::Snapshot(_))
        ));
    }

    #[test]
    fn test_wrong_types_surface_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        fs::write(store.path(), r#"{"size":"many"}"#).unwrap();

        assert!(matches!(
            store.load(&QueueSettings::default()),
            Err(Error::Json(_))
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), r#"{"size":"many"}"#);
    }

    #[test]
    fn test_invalid_utf8_snapshot_is_fatal_and_kept() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut content = br#"{"front":0,"rear":0,"size":1,"capacity":10,"nextId":42,"queue":[{"id":41,"customerName":"Ren"#.to_vec();
        content.push(0xE9);
        content.extend_from_slice(br#""}]}"#);
        fs::write(store.path(), &content).unwrap();

        assert!(matches!(
            store.load(&QueueSettings::default()),
            Err(Error::Json(_))
        ));
        assert_eq!(fs::read(store.path()).unwrap(), content);
    }

    #[test]
    fn test_unreadable_snapshot_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        fs::create_dir(store.path()).unwrap();

        let queue = store.load(&QueueSettings::default()).unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.next_id(), 1);
    }

    #[test]
    fn test_wrapped_queue_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut queue = ChatQueue::new(5, vec!["X".to_string(), "Y".to_string()]).unwrap();
        for name in ["a", "b", "c", "d", "e"] {
            queue.add_chat(name).unwrap();
        }
        queue.end_chat().unwrap();
        queue.end_chat().unwrap();
        queue.add_chat("f").unwrap();
        queue.add_chat("g").unwrap();
        assert!(queue.rear.unwrap() < queue.front);

        store.save(&queue).unwrap();
        let loaded = store.load(&QueueSettings::default()).unwrap();

        assert_eq!(loaded, queue);
        let ids: Vec<u64> = loaded.active().map(|c| c.id).collect();
        assert_eq!(ids, [3, 4, 5, 6, 7]);
        assert_eq!(loaded.current_agent_index(), 1);
    }

    #[test]
    fn test_full_queue_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut queue = ChatQueue::from_settings(&QueueSettings::default()).unwrap();
        for n in 0..10 {
            queue.add_chat(&format!("c{}", n)).unwrap();
        }

        store.save(&queue).unwrap();
        let mut loaded = store.load(&QueueSettings::default()).unwrap();

        assert_eq!(loaded, queue);
        assert!(loaded.is_full());
        assert!(matches!(loaded.add_chat("late"), Err(Error::QueueFull { .. })));
        assert_eq!(loaded.end_chat().unwrap().id, 1);
    }

    #[test]
    fn test_unset_rear_on_full_queue_points_before_front() {
        let snapshot: QueueSnapshot = serde_json::from_str(
            r#"{"front":0,"rear":-1,"size":2,"capacity":2,"nextId":3,
                "queue":[{"id":1},{"id":2}]}"#,
        )
        .unwrap();

        let mut queue = snapshot.into_queue(&QueueSettings::default()).unwrap();
        assert_eq!(queue.rear, Some(1));
        assert_eq!(queue.end_chat().unwrap().id, 1);
        assert_eq!(queue.add_chat("c").unwrap().id, 3);
        assert_eq!(queue.rear, Some(0));
    }

    #[test]
    fn test_zero_next_id_is_rejected() {
        let snapshot: QueueSnapshot =
            serde_json::from_str(r#"{"capacity":2,"nextId":0}"#).unwrap();

        assert!(matches!(
            snapshot.into_queue(&QueueSettings::default()),
            Err(Error::Snapshot(_))
        ));
    }
}
