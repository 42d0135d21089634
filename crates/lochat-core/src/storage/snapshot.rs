//! Durable snapshot of the chat store
//!
//! The whole store is written as one JSON record after every change
//! (last writer wins). Backends only know how to load and replace it.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::database::Database;
use super::sessions::Session;
use crate::ai::prompts::PromptMode;
use crate::constants;
use crate::error::PersistenceError;

/// Serialized form of the chat store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Id of the active session
    #[serde(default)]
    pub current_session: Option<String>,
    #[serde(default)]
    pub current_model: String,
    #[serde(default, alias = "currentPromptType")]
    pub current_prompt_mode: PromptMode,
}

impl StoreSnapshot {
    /// Empty store using the given model
    pub fn empty(model: &str) -> Self {
        Self {
            current_model: model.to_string(),
            ..Default::default()
        }
    }
}

/// Pluggable persistence for [`StoreSnapshot`]
pub trait SnapshotBackend: Send {
    /// Read the snapshot; `Ok(None)` when nothing was saved yet
    fn load(&self) -> Result<Option<StoreSnapshot>, PersistenceError>;

    /// Replace the stored snapshot
    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<(), PersistenceError>;
}

impl SnapshotBackend for Database {
    fn load(&self) -> Result<Option<StoreSnapshot>, PersistenceError> {
        match self.get(constants::storage::SNAPSHOT_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(snapshot)?;
        debug!("Saving chat store snapshot: {} bytes", json.len());
        self.set(constants::storage::SNAPSHOT_KEY, &json)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    json: Option<String>,
    saves: usize,
    failing: bool,
}

/// In-memory backend; clones share the same record
///
/// Stores serialized JSON so it behaves like a real backend, including for
/// malformed data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with raw record contents
    pub fn with_raw(json: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.state.lock().json = Some(json.into());
        backend
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.state.lock().saves
    }

    /// Make every following save fail
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }
}

impl SnapshotBackend for MemoryBackend {
    fn load(&self) -> Result<Option<StoreSnapshot>, PersistenceError> {
        match self.state.lock().json.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<(), PersistenceError> {
        let mut state = self.state.lock();
        if state.failing {
            return Err(PersistenceError::Unavailable(
                "memory backend set to fail".to_string(),
            ));
        }
        state.json = Some(serde_json::to_string(snapshot)?);
        state.saves += 1;
        Ok(())
    }
}
