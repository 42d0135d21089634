//! Session store
//!
//! In-memory table of chat sessions plus the active-session pointer. Every
//! mutation keeps the table consistent and mirrors the full state to the
//! snapshot backend when something changed.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::messages::Message;
use super::snapshot::{SnapshotBackend, StoreSnapshot};
use crate::ai::prompts::PromptMode;
use crate::ai::types::WireMessage;
use crate::constants;

/// A named conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Model in effect for this session
    #[serde(default)]
    pub model: String,
}

impl Session {
    pub fn new(title: impl Into<String>, model: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            model: model.into(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Sessions, active pointer and current settings
///
/// Not internally synchronized. Operations on a missing active session are
/// no-ops; persistence failures are logged and never undo the in-memory change.
pub struct SessionStore {
    sessions: Vec<Session>,
    active: Option<String>,
    current_model: String,
    current_prompt_mode: PromptMode,
    backend: Box<dyn SnapshotBackend>,
    last_error: Option<String>,
}

impl SessionStore {
    /// Load the store from `backend`
    ///
    /// A missing or unreadable snapshot yields an empty store. A loaded
    /// snapshot is repaired: duplicate session ids are dropped (first wins)
    /// and an active pointer to a missing session is cleared.
    pub fn load<B: SnapshotBackend + 'static>(backend: B, default_model: &str) -> Self {
        let snapshot = match backend.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("No saved chat store, starting empty");
                StoreSnapshot::empty(default_model)
            }
            Err(e) => {
                warn!("Failed to load chat store, starting empty: {}", e);
                StoreSnapshot::empty(default_model)
            }
        };

        let StoreSnapshot {
            sessions,
            current_session,
            current_model,
            current_prompt_mode,
        } = snapshot;

        let mut seen = HashSet::new();
        let total = sessions.len();
        let sessions: Vec<Session> = sessions
            .into_iter()
            .filter(|s| seen.insert(s.id.clone()))
            .collect();
        if sessions.len() != total {
            warn!(
                "Dropped {} sessions with duplicate ids",
                total - sessions.len()
            );
        }

        let active = current_session.filter(|id| sessions.iter().any(|s| &s.id == id));
        let current_model = if current_model.is_empty() {
            default_model.to_string()
        } else {
            current_model
        };

        info!("Loaded chat store: {} sessions", sessions.len());

        Self {
            sessions,
            active,
            current_model,
            current_prompt_mode,
            backend: Box::new(backend),
            last_error: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Sessions, most recently created first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_session(&self) -> Option<&Session> {
        let id = self.active.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn current_model(&self) -> &str {
        &self.current_model
    }

    pub fn current_prompt_mode(&self) -> PromptMode {
        self.current_prompt_mode
    }

    /// Role/content pairs of the active session, oldest first
    pub fn history(&self) -> Vec<WireMessage> {
        self.active_session()
            .map(|s| s.messages.iter().map(Message::to_wire).collect())
            .unwrap_or_default()
    }

    /// Full state in its persisted form
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            sessions: self.sessions.clone(),
            current_session: self.active.clone(),
            current_model: self.current_model.clone(),
            current_prompt_mode: self.current_prompt_mode,
        }
    }

    /// Message of the most recent failed save, cleared by the next success
    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ========================================================================
    // Session management
    // ========================================================================

    /// Create a session at the front and make it active
    pub fn create_session(&mut self, title: Option<&str>) -> String {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(constants::storage::DEFAULT_SESSION_TITLE);
        let session = Session::new(title, self.current_model.clone());
        let id = session.id.clone();
        debug!("Created session {} ({})", id, title);

        self.sessions.insert(0, session);
        self.active = Some(id.clone());
        self.persist();
        id
    }

    /// Make sure there is an active session, creating one if needed
    pub fn ensure_session(&mut self) -> String {
        match self.active_session() {
            Some(session) => session.id.clone(),
            None => self.create_session(None),
        }
    }

    /// Delete a session; deleting the active one selects the new first
    pub fn delete_session(&mut self, id: &str) -> bool {
        let Some(pos) = self.sessions.iter().position(|s| s.id == id) else {
            return false;
        };
        self.sessions.remove(pos);
        if self.active.as_deref() == Some(id) {
            self.active = self.sessions.first().map(|s| s.id.clone());
        }
        debug!("Deleted session {}", id);
        self.persist();
        true
    }

    /// Make `id` active; unknown ids leave the pointer unchanged
    pub fn select_session(&mut self, id: &str) -> bool {
        if !self.sessions.iter().any(|s| s.id == id) {
            return false;
        }
        if self.active.as_deref() != Some(id) {
            self.active = Some(id.to_string());
            self.persist();
        }
        true
    }

    pub fn update_session_title(&mut self, id: &str, title: &str) -> bool {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if session.title != title {
            session.title = title.to_string();
            self.persist();
        }
        true
    }

    /// Remove every session and clear the pointer
    pub fn clear_all_sessions(&mut self) {
        if self.sessions.is_empty() && self.active.is_none() {
            return;
        }
        info!("Clearing {} sessions", self.sessions.len());
        self.sessions.clear();
        self.active = None;
        self.persist();
    }

    // ========================================================================
    // Messages of the active session
    // ========================================================================

    pub fn append_message(&mut self, message: Message) -> bool {
        let Some(session) = self.active_session_mut() else {
            return false;
        };
        session.messages.push(message);
        session.touch();
        self.persist();
        true
    }

    /// Replace the content of the last message of the active session
    ///
    /// Only the content changes; id, role and timestamp stay put.
    pub fn replace_last_message_content(&mut self, content: &str) -> bool {
        let Some(session) = self.active_session_mut() else {
            return false;
        };
        let Some(last) = session.messages.last_mut() else {
            return false;
        };
        if last.content == content {
            return true;
        }
        last.content = content.to_string();
        session.touch();
        self.persist();
        true
    }

    pub fn remove_message(&mut self, id: &str) -> bool {
        let Some(session) = self.active_session_mut() else {
            return false;
        };
        let Some(pos) = session.messages.iter().position(|m| m.id == id) else {
            return false;
        };
        session.messages.remove(pos);
        session.touch();
        self.persist();
        true
    }

    /// Empty the active session, keeping the session itself
    pub fn clear_messages(&mut self) {
        let Some(session) = self.active_session_mut() else {
            return;
        };
        if session.messages.is_empty() {
            return;
        }
        session.messages.clear();
        session.touch();
        self.persist();
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Set the current model and record it on the active session
    pub fn set_model(&mut self, model: &str) {
        let mut changed = self.current_model != model;
        self.current_model = model.to_string();
        if let Some(session) = self.active_session_mut() {
            if session.model != model {
                session.model = model.to_string();
                changed = true;
            }
        }
        if changed {
            self.persist();
        }
    }

    pub fn set_prompt_mode(&mut self, mode: PromptMode) {
        if self.current_prompt_mode != mode {
            self.current_prompt_mode = mode;
            self.persist();
        }
    }

    fn active_session_mut(&mut self) -> Option<&mut Session> {
        let id = self.active.as_deref()?;
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        match self.backend.save(&snapshot) {
            Ok(()) => self.last_error = None,
            Err(e) => {
                error!("Failed to persist chat store: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;
    use crate::storage::messages::MessageRole;
    use crate::storage::snapshot::MemoryBackend;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tempfile::TempDir;

    fn create_test_store() -> (SessionStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = SessionStore::load(backend.clone(), "llama3");
        (store, backend)
    }

    fn assert_consistent(store: &SessionStore) {
        let ids: HashSet<&str> = store.sessions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), store.sessions().len(), "session ids must be unique");
        if let Some(active) = store.active_session_id() {
            assert!(ids.contains(active), "active pointer must exist");
        }
        if store.sessions().is_empty() {
            assert!(store.active_session_id().is_none());
        }
    }

    #[test]
    fn test_load_empty_backend_defaults() {
        let (store, backend) = create_test_store();
        assert!(store.sessions().is_empty());
        assert!(store.active_session().is_none());
        assert_eq!(store.current_model(), "llama3");
        assert_eq!(store.current_prompt_mode(), PromptMode::Chat);
        assert_eq!(backend.save_count(), 0);
    }

    #[test]
    fn test_create_session_inserts_at_front() {
        let (mut store, backend) = create_test_store();
        let first = store.create_session(None);
        let second = store.create_session(Some("Recipes"));

        assert_eq!(store.sessions()[0].id, second);
        assert_eq!(store.sessions()[1].id, first);
        assert_eq!(store.active_session_id(), Some(second.as_str()));
        assert_eq!(store.sessions()[1].title, "New Chat");
        assert_eq!(store.sessions()[0].title, "Recipes");
        assert_eq!(store.sessions()[0].model, "llama3");
        assert_eq!(backend.save_count(), 2);
    }

    #[test]
    fn test_ensure_session() {
        let (mut store, _backend) = create_test_store();
        let id = store.ensure_session();
        assert_eq!(store.ensure_session(), id);
        assert_eq!(store.sessions().len(), 1);
    }

    #[test]
    fn test_delete_active_selects_new_first() {
        let (mut store, _backend) = create_test_store();
        let c = store.create_session(Some("c"));
        let b = store.create_session(Some("b"));
        let a = store.create_session(Some("a"));
        // order is [a, b, c], a active
        assert!(store.delete_session(&a));
        assert_eq!(store.active_session_id(), Some(b.as_str()));

        assert!(store.select_session(&c));
        assert!(store.delete_session(&b));
        assert_eq!(store.active_session_id(), Some(c.as_str()));

        assert!(store.delete_session(&c));
        assert!(store.active_session_id().is_none());
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_delete_inactive_keeps_pointer() {
        let (mut store, _backend) = create_test_store();
        let older = store.create_session(None);
        let newer = store.create_session(None);
        assert!(store.delete_session(&older));
        assert_eq!(store.active_session_id(), Some(newer.as_str()));
        assert!(!store.delete_session("missing"));
    }

    #[test]
    fn test_select_unknown_is_noop_without_write() {
        let (mut store, backend) = create_test_store();
        let id = store.create_session(None);
        let saves = backend.save_count();

        assert!(!store.select_session("nope"));
        assert!(store.select_session(&id));
        assert_eq!(store.active_session_id(), Some(id.as_str()));
        assert_eq!(backend.save_count(), saves);
    }

    #[test]
    fn test_select_is_persisted() {
        let (mut store, backend) = create_test_store();
        let older = store.create_session(None);
        store.create_session(None);
        store.select_session(&older);

        let reloaded = SessionStore::load(backend, "llama3");
        assert_eq!(reloaded.active_session_id(), Some(older.as_str()));
    }

    #[test]
    fn test_streaming_turn_scenario() {
        let (mut store, _backend) = create_test_store();
        store.ensure_session();
        store.append_message(Message::user("hi", PromptMode::Chat));
        store.append_message(Message::assistant_placeholder(PromptMode::Chat));
        store.replace_last_message_content("Hel");
        store.replace_last_message_content("Hello");

        let session = store.active_session().unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].content, "hi");
        assert_eq!(session.messages[1].role, MessageRole::Assistant);
        assert_eq!(session.messages[1].content, "Hello");
    }

    #[test]
    fn test_replace_on_empty_session_is_noop() {
        let (mut store, backend) = create_test_store();
        store.ensure_session();
        let before = store.snapshot();
        let saves = backend.save_count();

        assert!(!store.replace_last_message_content("x"));
        assert_eq!(store.snapshot(), before);
        assert_eq!(backend.save_count(), saves);
    }

    #[test]
    fn test_replace_keeps_identity() {
        let (mut store, _backend) = create_test_store();
        store.ensure_session();
        let placeholder = Message::assistant_placeholder(PromptMode::Code);
        let id = placeholder.id.clone();
        let timestamp = placeholder.timestamp;
        store.append_message(placeholder);
        store.replace_last_message_content("done");

        let last = store.active_session().unwrap().messages.last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.timestamp, timestamp);
        assert_eq!(last.prompt_mode, PromptMode::Code);
    }

    #[test]
    fn test_messages_without_active_session_are_noops() {
        let (mut store, backend) = create_test_store();
        assert!(!store.append_message(Message::user("lost", PromptMode::Chat)));
        assert!(!store.remove_message("x"));
        store.clear_messages();
        assert!(store.history().is_empty());
        assert_eq!(backend.save_count(), 0);
    }

    #[test]
    fn test_remove_and_clear_messages() {
        let (mut store, _backend) = create_test_store();
        let session_id = store.ensure_session();
        let first = Message::user("one", PromptMode::Chat);
        let first_id = first.id.clone();
        store.append_message(first);
        store.append_message(Message::user("two", PromptMode::Chat));

        assert!(store.remove_message(&first_id));
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].content, "two");

        store.clear_messages();
        assert!(store.history().is_empty());
        assert_eq!(store.active_session_id(), Some(session_id.as_str()));
    }

    #[test]
    fn test_append_bumps_updated_at() {
        let (mut store, _backend) = create_test_store();
        store.ensure_session();
        let before = store.active_session().unwrap().updated_at;
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.append_message(Message::user("hi", PromptMode::Chat));
        assert!(store.active_session().unwrap().updated_at > before);
    }

    #[test]
    fn test_update_title_and_clear_all() {
        let (mut store, _backend) = create_test_store();
        let id = store.create_session(None);
        assert!(store.update_session_title(&id, "Renamed"));
        assert_eq!(store.active_session().unwrap().title, "Renamed");
        assert!(!store.update_session_title("missing", "x"));

        store.create_session(None);
        store.clear_all_sessions();
        assert!(store.sessions().is_empty());
        assert!(store.active_session_id().is_none());
    }

    #[test]
    fn test_set_model_records_on_active_session() {
        let (mut store, backend) = create_test_store();
        store.ensure_session();
        store.set_model("mistral");
        assert_eq!(store.current_model(), "mistral");
        assert_eq!(store.active_session().unwrap().model, "mistral");

        let saves = backend.save_count();
        store.set_model("mistral");
        assert_eq!(backend.save_count(), saves);
    }

    #[test]
    fn test_set_prompt_mode_persisted() {
        let (mut store, backend) = create_test_store();
        store.set_prompt_mode(PromptMode::DeepResearch);
        store.set_prompt_mode(PromptMode::DeepResearch);
        assert_eq!(backend.save_count(), 1);

        let reloaded = SessionStore::load(backend, "llama3");
        assert_eq!(reloaded.current_prompt_mode(), PromptMode::DeepResearch);
    }

    #[test]
    fn test_malformed_snapshot_falls_back() {
        let backend = MemoryBackend::with_raw("{\"sessions\": [oops");
        let store = SessionStore::load(backend, "llama3");
        assert!(store.sessions().is_empty());
        assert!(store.active_session_id().is_none());
        assert_eq!(store.current_model(), "llama3");
    }

    #[test]
    fn test_load_repairs_snapshot() {
        let a = Session::new("a", "m");
        let mut dup = Session::new("dup", "m");
        dup.id = a.id.clone();
        let snapshot = StoreSnapshot {
            sessions: vec![a.clone(), dup],
            current_session: Some("gone".to_string()),
            current_model: String::new(),
            current_prompt_mode: PromptMode::Code,
        };
        let backend = MemoryBackend::with_raw(serde_json::to_string(&snapshot).unwrap());
        let store = SessionStore::load(backend, "llama3");

        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.sessions()[0].title, "a");
        assert!(store.active_session_id().is_none());
        assert_eq!(store.current_model(), "llama3");
        assert_eq!(store.current_prompt_mode(), PromptMode::Code);
    }

    #[test]
    fn test_failing_backend_keeps_memory_state() {
        let (mut store, backend) = create_test_store();
        backend.set_failing(true);

        let id = store.create_session(Some("kept"));
        assert_eq!(store.active_session_id(), Some(id.as_str()));
        assert!(store.last_persistence_error().is_some());

        backend.set_failing(false);
        store.append_message(Message::user("hi", PromptMode::Chat));
        assert!(store.last_persistence_error().is_none());
        assert_eq!(backend.save_count(), 1);
    }

    #[test]
    fn test_sqlite_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lochat.db");
        let (id, snapshot) = {
            let mut store = SessionStore::load(Database::new(&path).unwrap(), "llama3");
            let id = store.create_session(Some("persisted"));
            store.append_message(Message::user("hello", PromptMode::Creative));
            store.set_prompt_mode(PromptMode::Creative);
            (id, store.snapshot())
        };

        let store = SessionStore::load(Database::new(&path).unwrap(), "other");
        assert_eq!(store.active_session_id(), Some(id.as_str()));
        assert_eq!(store.snapshot(), snapshot);
    }

    #[test]
    fn test_random_mutations_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x10c4a7);
        let (mut store, backend) = create_test_store();

        for _ in 0..500 {
            let pick_id = |store: &SessionStore, rng: &mut StdRng| -> String {
                if store.sessions().is_empty() || rng.gen_bool(0.1) {
                    "unknown".to_string()
                } else {
                    let i = rng.gen_range(0..store.sessions().len());
                    store.sessions()[i].id.clone()
                }
            };

            match rng.gen_range(0..10) {
                0 => {
                    store.create_session(None);
                }
                1 => {
                    let id = pick_id(&store, &mut rng);
                    store.delete_session(&id);
                }
                2 => {
                    let id = pick_id(&store, &mut rng);
                    store.select_session(&id);
                }
                3 => store.clear_all_sessions(),
                4 => {
                    store.append_message(Message::user("u", PromptMode::Chat));
                }
                5 => {
                    let n: u8 = rng.gen();
                    store.replace_last_message_content(&n.to_string());
                }
                6 => {
                    let id = store
                        .active_session()
                        .and_then(|s| s.messages.first())
                        .map(|m| m.id.clone())
                        .unwrap_or_default();
                    store.remove_message(&id);
                }
                7 => store.clear_messages(),
                8 => {
                    let id = pick_id(&store, &mut rng);
                    store.update_session_title(&id, "t");
                }
                _ => {
                    let mode = PromptMode::ALL[rng.gen_range(0..PromptMode::ALL.len())];
                    store.set_prompt_mode(mode);
                }
            }
            assert_consistent(&store);
        }

        let reloaded = SessionStore::load(backend, "llama3");
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }
}
