//! Session store: the in-memory session collection and its persistence.
//!
//! The store owns the mapping from session identity to ordered message
//! lists, the "current session" pointer, and every write to the persistent
//! storage collaborator. Mutations (create, append, delete, select) write
//! the full snapshot through immediately; the snapshot is read exactly once,
//! at construction.

use colored::Colorize;
use std::collections::HashMap;

use luatchat_types::{
    generate_session_id, ChatMessage, Role, SessionId, StoreError, CHAT_STORAGE_KEY,
};

mod history;
mod prefs;
mod snapshot;
mod storage;

pub use history::{project, HistoryEntry, UNTITLED_SESSION};
pub use prefs::DisplayPrefs;
pub use snapshot::{PersistedSession, Snapshot};
pub use storage::{FileStorage, KvStorage, MemoryStorage};

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatStats {
    pub total_sessions: usize,
    pub total_messages: usize,
    pub average_messages_per_session: usize,
}

/// The session collection plus its storage handle.
///
/// Invariant: exactly one session is current, and the current id always
/// references a key present in the collection.
pub struct SessionStore {
    sessions: HashMap<SessionId, Vec<ChatMessage>>,
    current_id: SessionId,
    storage: Box<dyn KvStorage>,
}

impl SessionStore {
    /// Rehydrate the collection from storage.
    ///
    /// An empty or unparsable snapshot falls back to a single fresh session;
    /// the condition is logged but startup never fails on it.
    pub fn restore(storage: Box<dyn KvStorage>) -> Self {
        let mut store = Self {
            sessions: HashMap::new(),
            current_id: SessionId::new(),
            storage,
        };

        match store.storage.get(CHAT_STORAGE_KEY) {
            Some(raw) => match serde_json::from_str::<Snapshot>(&raw) {
                Ok(snap) => {
                    let (sessions, persisted_current) = snap.into_sessions();
                    store.sessions = sessions;
                    if store.sessions.contains_key(&persisted_current) {
                        store.current_id = persisted_current;
                    } else {
                        store.start_fresh_session();
                        store.persist();
                    }
                }
                Err(err) => {
                    eprintln!(
                        "{} Stored chat history is unreadable, starting fresh: {}",
                        "⚠".yellow(),
                        err
                    );
                    store.start_fresh_session();
                    store.persist();
                }
            },
            None => {
                store.start_fresh_session();
                store.persist();
            }
        }

        store
    }

    /// Create a fresh empty session, mark it current, and persist.
    pub fn create_session(&mut self) -> SessionId {
        let id = self.start_fresh_session();
        self.persist();
        id
    }

    /// Append a message to the given session with a freshly captured
    /// timestamp.
    pub fn append_message(
        &mut self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<(), StoreError> {
        let messages = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::UnknownSession(session_id.to_string()))?;
        messages.push(ChatMessage::new(role, content));
        self.persist();
        Ok(())
    }

    /// Append to the current session. The current id always resolves, so
    /// this cannot miss.
    pub fn append_to_current(&mut self, role: Role, content: &str) {
        let current = self.current_id.clone();
        self.sessions
            .entry(current)
            .or_default()
            .push(ChatMessage::new(role, content));
        self.persist();
    }

    /// Remove a session. Deleting the current session atomically replaces it
    /// with a fresh empty one before returning.
    pub fn delete_session(&mut self, session_id: &str) -> Result<(), StoreError> {
        self.sessions
            .remove(session_id)
            .ok_or_else(|| StoreError::UnknownSession(session_id.to_string()))?;
        if self.current_id == session_id {
            self.start_fresh_session();
        }
        self.persist();
        Ok(())
    }

    /// Read-only view of one session's messages in insertion order.
    pub fn get_session(&self, session_id: &str) -> Result<&[ChatMessage], StoreError> {
        self.sessions
            .get(session_id)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::UnknownSession(session_id.to_string()))
    }

    /// Make an existing session current.
    pub fn select_session(&mut self, session_id: &str) -> Result<(), StoreError> {
        if !self.sessions.contains_key(session_id) {
            return Err(StoreError::UnknownSession(session_id.to_string()));
        }
        self.current_id = session_id.to_string();
        // The snapshot embeds the current id, so selection writes through too.
        self.persist();
        Ok(())
    }

    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    /// All sessions, unordered as stored; ordering is a presentation concern.
    pub fn list_sessions(&self) -> impl Iterator<Item = (&SessionId, &[ChatMessage])> {
        self.sessions.iter().map(|(id, m)| (id, m.as_slice()))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sorted, titled history rows for the panel.
    pub fn history(&self) -> Vec<HistoryEntry> {
        history::project(self.list_sessions(), &self.current_id)
    }

    pub fn stats(&self) -> ChatStats {
        let total_sessions = self.sessions.len();
        let total_messages = self.sessions.values().map(Vec::len).sum();
        let average_messages_per_session = if total_sessions > 0 {
            (total_messages as f64 / total_sessions as f64).round() as usize
        } else {
            0
        };
        ChatStats {
            total_sessions,
            total_messages,
            average_messages_per_session,
        }
    }

    fn start_fresh_session(&mut self) -> SessionId {
        let id = generate_session_id();
        self.sessions.insert(id.clone(), Vec::new());
        self.current_id = id.clone();
        id
    }

    /// Write the full snapshot through. A failed write is logged and the
    /// in-memory state stays authoritative.
    fn persist(&mut self) {
        let snapshot = Snapshot::capture(&self.sessions, &self.current_id);
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                if let Err(err) = self.storage.set(CHAT_STORAGE_KEY, &json) {
                    eprintln!("{} Could not save chat history: {}", "⚠".yellow(), err);
                }
            }
            Err(err) => {
                eprintln!("{} Could not serialize chat history: {}", "⚠".yellow(), err);
            }
        }
    }
}
