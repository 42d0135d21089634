//! Persistence layer
//!
//! - Session store (in-memory state machine over chat sessions)
//! - Snapshot backends: SQLite key-value record and an in-memory one

mod database;
mod messages;
mod sessions;
mod snapshot;

pub use database::Database;
pub use messages::{Message, MessageRole};
pub use sessions::{Session, SessionStore};
pub use snapshot::{MemoryBackend, SnapshotBackend, StoreSnapshot};
