//! Serialized projection of the session collection.
//!
//! The wire shape is `{sessions: [{id, messages, timestamp}], currentChatId}`;
//! the per-session `timestamp` mirrors the first message and exists only for
//! the persisted form, it is re-derived from messages on restore.

use chrono::{DateTime, Utc};
use luatchat_types::{ChatMessage, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub sessions: Vec<PersistedSession>,
    #[serde(rename = "currentChatId")]
    pub current_chat_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedSession {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// Build the persisted projection of the full collection.
    pub fn capture(sessions: &HashMap<SessionId, Vec<ChatMessage>>, current_id: &str) -> Self {
        let sessions = sessions
            .iter()
            .map(|(id, messages)| PersistedSession {
                id: id.clone(),
                messages: messages.clone(),
                timestamp: messages
                    .first()
                    .map(|m| m.timestamp)
                    .unwrap_or_else(Utc::now),
            })
            .collect();
        Self {
            sessions,
            current_chat_id: current_id.to_string(),
        }
    }

    /// Rebuild the in-memory collection from the persisted form.
    pub fn into_sessions(self) -> (HashMap<SessionId, Vec<ChatMessage>>, String) {
        let map = self
            .sessions
            .into_iter()
            .map(|s| (s.id, s.messages))
            .collect();
        (map, self.current_chat_id)
    }
}
