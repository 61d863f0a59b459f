use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::workflow::WorkflowEvent;

/// Saved state of one evaluation run.
///
/// The inputs are fixed before the completion call; `events` is filled
/// in once the run finishes. A checkpoint with events is complete and
/// can be replayed without touching the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub question: String,
    pub answer: String,
    pub context: String,
    pub events: Option<Vec<WorkflowEvent>>,
}

impl Checkpoint {
    pub fn is_complete(&self) -> bool {
        self.events.is_some()
    }
}

/// Key-value checkpoint storage, keyed by the caller-supplied
/// interaction id. One id covers one evaluation lineage; ids are never
/// reused across answers.
pub trait CheckpointStore {
    fn save(&self, id: Uuid, checkpoint: &Checkpoint);
    fn load(&self, id: Uuid) -> Option<Checkpoint>;
}

/// In-memory checkpoint store.
pub struct MemoryCheckpointStore {
    entries: Mutex<HashMap<Uuid, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, id: Uuid, checkpoint: &Checkpoint) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id, checkpoint.clone());
        }
    }

    fn load(&self, id: Uuid) -> Option<Checkpoint> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&id).cloned())
    }
}
