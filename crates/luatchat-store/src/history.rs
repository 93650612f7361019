//! History panel projection: a sorted, titled list view of the sessions.

use luatchat_types::{ChatMessage, Role, SessionId, TITLE_MAX_CHARS};

/// Placeholder title for a session with no user message yet.
pub const UNTITLED_SESSION: &str = "Cuộc trò chuyện";

/// One row of the history panel.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: SessionId,
    pub title: String,
    pub is_active: bool,
}

/// Derive the history rows: most recent conversation first, titled by the
/// first user message. Sessions without messages are not listable yet.
pub fn project<'a>(
    sessions: impl Iterator<Item = (&'a SessionId, &'a [ChatMessage])>,
    current_id: &str,
) -> Vec<HistoryEntry> {
    let mut rows: Vec<(&SessionId, &[ChatMessage])> =
        sessions.filter(|(_, messages)| !messages.is_empty()).collect();

    rows.sort_by(|a, b| {
        let a_time = a.1.first().map(|m| m.timestamp);
        let b_time = b.1.first().map(|m| m.timestamp);
        b_time.cmp(&a_time).then_with(|| b.0.cmp(a.0))
    });

    rows.into_iter()
        .map(|(id, messages)| HistoryEntry {
            id: id.clone(),
            title: derive_title(messages),
            is_active: id == current_id,
        })
        .collect()
}

fn derive_title(messages: &[ChatMessage]) -> String {
    match messages.iter().find(|m| m.role == Role::User) {
        Some(first_user) => {
            // Char-based truncation; byte slicing could split multibyte
            // Vietnamese characters.
            let title: String = first_user.content.chars().take(TITLE_MAX_CHARS).collect();
            if first_user.content.chars().count() > TITLE_MAX_CHARS {
                format!("{}...", title)
            } else {
                title
            }
        }
        None => UNTITLED_SESSION.to_string(),
    }
}
