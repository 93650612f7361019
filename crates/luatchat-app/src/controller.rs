//! Conversation controller: orchestrates asking a question, store updates,
//! concurrent-request suppression, and error surfacing.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use luatchat_api::{AskOutcome, InitOutcome, QaEndpoint};
use luatchat_format::{escape_html, Formatter};
use luatchat_store::{ChatStats, HistoryEntry, SessionStore};
use luatchat_types::{ChatMessage, Role, SessionId, StoreError};

/// Rendering collaborator. The controller drives it; it never mutates state.
pub trait ChatView: Send + Sync {
    /// Current input buffer, if the surface keeps one. Surfaces that pass
    /// the question explicitly return an empty string.
    fn take_input(&self) -> String;
    fn clear_input(&self);
    /// Render one message. `markup` is already safe for the sink.
    fn render_message(&self, role: Role, markup: &str);
    fn show_pending(&self);
    fn hide_pending(&self);
    fn refresh_history(&self, entries: &[HistoryEntry]);
    fn focus_input(&self);
}

pub struct ChatController<E, V> {
    store: Mutex<SessionStore>,
    endpoint: E,
    view: V,
    formatter: Formatter,
    // One outstanding request across the whole surface, not per session.
    in_flight: AtomicBool,
}

impl<E: QaEndpoint, V: ChatView> ChatController<E, V> {
    pub fn new(store: SessionStore, endpoint: E, view: V) -> Self {
        Self {
            store: Mutex::new(store),
            endpoint,
            view,
            formatter: Formatter::new(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Run the backend handshake and report the outcome as a transient
    /// system notice. Never persisted, never fatal.
    pub async fn initialize(&self) {
        let notice = match self.endpoint.initialize().await {
            InitOutcome::Ready => "✓ Hệ thống đã sẵn sàng",
            InitOutcome::Failure(_) => "⚠ Khởi tạo hệ thống thất bại, vui lòng khởi động lại",
            InitOutcome::Transport(_) => {
                "⚠ Không thể kết nối đến máy chủ, hãy đảm bảo backend đang chạy"
            }
        };
        self.view.render_message(Role::System, notice);
    }

    /// Submit a question. With `None`, the view's input buffer is used.
    ///
    /// Silently returns when the trimmed question is empty or when a request
    /// is already in flight; completion is observed through view and store
    /// side effects.
    pub async fn ask(&self, question: Option<String>) {
        let question = question.unwrap_or_else(|| self.view.take_input());
        let question = question.trim().to_string();
        if question.is_empty() {
            return;
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return;
        }

        self.view.clear_input();
        {
            let mut store = self.store.lock().await;
            store.append_to_current(Role::User, &question);
            self.view.render_message(Role::User, &escape_html(&question));
            self.view.refresh_history(&store.history());
        }
        self.view.show_pending();

        let outcome = self.endpoint.ask(&question).await;

        self.view.hide_pending();
        {
            let mut store = self.store.lock().await;
            match outcome {
                AskOutcome::Answer(answer) => {
                    store.append_to_current(Role::Assistant, &answer);
                    self.view
                        .render_message(Role::Assistant, &self.formatter.format(&answer));
                }
                AskOutcome::Failure(message) => {
                    let markup = format!("❌ Lỗi: {}", escape_html(&message));
                    store.append_to_current(Role::Error, &markup);
                    self.view.render_message(Role::Error, &markup);
                }
                AskOutcome::Transport(detail) => {
                    let markup = format!("❌ Lỗi kết nối: {}", escape_html(&detail));
                    store.append_to_current(Role::Error, &markup);
                    self.view.render_message(Role::Error, &markup);
                }
            }
            self.view.refresh_history(&store.history());
        }

        // Terminal path for every branch above.
        self.in_flight.store(false, Ordering::SeqCst);
        self.view.focus_input();
    }

    /// Submit one of the suggested starter questions.
    pub async fn ask_suggested(&self, question: &str) {
        self.ask(Some(question.to_string())).await;
    }

    pub async fn new_session(&self) -> SessionId {
        let mut store = self.store.lock().await;
        let id = store.create_session();
        self.view.refresh_history(&store.history());
        id
    }

    /// Switch to an existing session and replay its conversation.
    pub async fn select_session(&self, session_id: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock().await;
        store.select_session(session_id)?;
        for message in store.get_session(session_id)? {
            self.render_stored(message);
        }
        self.view.refresh_history(&store.history());
        Ok(())
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock().await;
        store.delete_session(session_id)?;
        self.view.refresh_history(&store.history());
        Ok(())
    }

    /// Re-render the current session, e.g. after a restored startup.
    /// Returns the number of messages shown.
    pub async fn replay_current(&self) -> usize {
        let store = self.store.lock().await;
        let messages = store.get_session(store.current_id()).unwrap_or(&[]);
        for message in messages {
            self.render_stored(message);
        }
        messages.len()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.store.lock().await.history()
    }

    pub async fn current_messages(&self) -> Vec<ChatMessage> {
        let store = self.store.lock().await;
        store
            .get_session(store.current_id())
            .map(<[ChatMessage]>::to_vec)
            .unwrap_or_default()
    }

    pub async fn stats(&self) -> ChatStats {
        self.store.lock().await.stats()
    }

    /// Stored content is raw for user/assistant turns and pre-escaped markup
    /// for error turns; formatting is derived here, never written back.
    fn render_stored(&self, message: &ChatMessage) {
        let markup = match message.role {
            Role::User => escape_html(&message.content),
            Role::Assistant => self.formatter.format(&message.content),
            Role::Error | Role::System => message.content.clone(),
        };
        self.view.render_message(message.role, &markup);
    }
}
