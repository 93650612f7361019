//! Core types and structures for luatchat
//!
//! This crate provides the foundational types shared across all luatchat crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Storage key holding the serialized session snapshot
pub const CHAT_STORAGE_KEY: &str = "chat_history";

/// Storage key holding the dark-mode display preference (boolean-as-string)
pub const DARK_MODE_STORAGE_KEY: &str = "dark_mode_enabled";

/// Maximum number of characters in a projected history title before truncation
pub const TITLE_MAX_CHARS: usize = 50;

// ============================================================================
// Session Identity
// ============================================================================

/// Opaque unique token identifying one conversation thread
pub type SessionId = String;

/// Generate a fresh session identity.
///
/// The token combines the current unix-millisecond timestamp with a random
/// suffix, so identities stay unique even when sessions are created within
/// the same millisecond.
pub fn generate_session_id() -> SessionId {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("chat_{}_{}", millis, &suffix[..9])
}

// ============================================================================
// Message Types
// ============================================================================

/// Role of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Error,
    System,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Error => "error",
            Role::System => "system",
        }
    }
}

/// One turn in a conversation.
///
/// Content is stored raw; any formatting is derived at render time and never
/// written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a message with a freshly captured timestamp.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Errors surfaced by the session store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The given session id is not present in the collection. This indicates
    /// a stale id reaching the store, not a user-visible condition.
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
}
