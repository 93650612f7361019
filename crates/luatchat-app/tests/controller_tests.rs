use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use luatchat::controller::{ChatController, ChatView};
use luatchat_api::{AskOutcome, InitOutcome, QaEndpoint};
use luatchat_store::{HistoryEntry, MemoryStorage, SessionStore};
use luatchat_types::Role;

// Endpoint double: counts calls, optionally parks until released.
struct MockEndpoint {
    outcome: AskOutcome,
    init_outcome: InitOutcome,
    calls: Arc<AtomicUsize>,
    gate: Option<Arc<Notify>>,
}

impl MockEndpoint {
    fn answering(answer: &str) -> Self {
        Self::with_outcome(AskOutcome::Answer(answer.to_string()))
    }

    fn with_outcome(outcome: AskOutcome) -> Self {
        Self {
            outcome,
            init_outcome: InitOutcome::Ready,
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl QaEndpoint for MockEndpoint {
    async fn initialize(&self) -> InitOutcome {
        self.init_outcome.clone()
    }

    async fn ask(&self, _question: &str) -> AskOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone()
    }
}

// View double: records every call, carries an input buffer.
#[derive(Default)]
struct RecordingView {
    input: Mutex<String>,
    events: Mutex<Vec<String>>,
}

impl RecordingView {
    fn set_input(&self, text: &str) {
        *self.input.lock().unwrap() = text.to_string();
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ChatView for RecordingView {
    fn take_input(&self) -> String {
        self.input.lock().unwrap().clone()
    }

    fn clear_input(&self) {
        self.input.lock().unwrap().clear();
        self.record("clear-input".to_string());
    }

    fn render_message(&self, role: Role, markup: &str) {
        self.record(format!("render:{}:{}", role.as_str(), markup));
    }

    fn show_pending(&self) {
        self.record("pending:on".to_string());
    }

    fn hide_pending(&self) {
        self.record("pending:off".to_string());
    }

    fn refresh_history(&self, _entries: &[HistoryEntry]) {
        self.record("refresh-history".to_string());
    }

    fn focus_input(&self) {
        self.record("focus".to_string());
    }
}

fn controller_with(endpoint: MockEndpoint) -> ChatController<MockEndpoint, RecordingView> {
    let store = SessionStore::restore(Box::new(MemoryStorage::new()));
    ChatController::new(store, endpoint, RecordingView::default())
}

#[tokio::test]
async fn test_ask_stores_raw_content_and_renders_markup() {
    let controller = controller_with(MockEndpoint::answering("**Có**, theo Điều 12"));

    controller.ask(Some("BHYT là gì?".to_string())).await;

    let messages = controller.current_messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "BHYT là gì?");
    assert_eq!(messages[1].role, Role::Assistant);
    // Stored raw; formatting is derived at render time only.
    assert_eq!(messages[1].content, "**Có**, theo Điều 12");

    let events = controller.view().events();
    let rendered = events
        .iter()
        .find(|e| e.starts_with("render:assistant:"))
        .unwrap();
    assert!(rendered.contains("<strong>Có</strong>"));
    assert!(rendered.contains("var(--primary-color)"));
}

#[tokio::test]
async fn test_pending_indicator_wraps_request_and_focus_ends_turn() {
    let controller = controller_with(MockEndpoint::answering("xong"));

    controller.ask(Some("hỏi".to_string())).await;

    let events = controller.view().events();
    let on = events.iter().position(|e| e == "pending:on").unwrap();
    let off = events.iter().position(|e| e == "pending:off").unwrap();
    assert!(on < off);
    assert_eq!(events.last().unwrap(), "focus");
}

#[tokio::test]
async fn test_structured_failure_becomes_escaped_error_message() {
    let controller = controller_with(MockEndpoint::with_outcome(AskOutcome::Failure(
        "mô hình <hỏng>".to_string(),
    )));

    controller.ask(Some("hỏi".to_string())).await;

    let messages = controller.current_messages().await;
    assert_eq!(messages[1].role, Role::Error);
    assert_eq!(messages[1].content, "❌ Lỗi: mô hình &lt;hỏng&gt;");
}

#[tokio::test]
async fn test_transport_failure_reports_connectivity_and_clears_in_flight() {
    let endpoint = MockEndpoint::with_outcome(AskOutcome::Transport(
        "connection refused".to_string(),
    ));
    let calls = endpoint.call_counter();
    let controller = controller_with(endpoint);

    controller.ask(Some("một".to_string())).await;
    let messages = controller.current_messages().await;
    assert_eq!(messages[1].role, Role::Error);
    assert!(messages[1].content.starts_with("❌ Lỗi kết nối: "));

    // The terminal path ran even on failure, so a new request goes out.
    controller.ask(Some("hai".to_string())).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_double_ask_while_in_flight_sends_one_request() {
    let gate = Arc::new(Notify::new());
    let endpoint = MockEndpoint::answering("trả lời").gated(gate.clone());
    let calls = endpoint.call_counter();
    let controller = Arc::new(controller_with(endpoint));

    let background = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.ask(Some("một".to_string())).await })
    };
    // Let the first ask claim the in-flight flag and park at the endpoint.
    tokio::task::yield_now().await;

    controller.ask(Some("hai".to_string())).await;

    gate.notify_one();
    background.await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let messages = controller.current_messages().await;
    let user_turns = messages.iter().filter(|m| m.role == Role::User).count();
    assert_eq!(user_turns, 1);
}

#[tokio::test]
async fn test_blank_question_is_a_silent_no_op() {
    let endpoint = MockEndpoint::answering("x");
    let calls = endpoint.call_counter();
    let controller = controller_with(endpoint);

    controller.ask(Some("   ".to_string())).await;
    controller.ask(None).await; // empty input buffer

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(controller.current_messages().await.is_empty());
}

#[tokio::test]
async fn test_question_is_read_from_the_input_buffer() {
    let controller = controller_with(MockEndpoint::answering("trả lời"));
    controller.view().set_input("  Mức đóng BHYT?  ");

    controller.ask(None).await;

    let messages = controller.current_messages().await;
    assert_eq!(messages[0].content, "Mức đóng BHYT?");
    assert!(controller.view().events().contains(&"clear-input".to_string()));
}

#[tokio::test]
async fn test_initialize_shows_transient_system_notice() {
    let controller = controller_with(MockEndpoint::answering("x"));

    controller.initialize().await;

    let events = controller.view().events();
    assert!(events
        .iter()
        .any(|e| e.starts_with("render:system:") && e.contains("sẵn sàng")));
    // System notices are displayed, never persisted.
    assert!(controller.current_messages().await.is_empty());
}

#[tokio::test]
async fn test_deleting_current_session_keeps_a_current_one() {
    let controller = controller_with(MockEndpoint::answering("trả lời"));
    controller.ask(Some("sắp xóa".to_string())).await;

    let doomed = controller.history().await[0].id.clone();
    controller.delete_session(&doomed).await.unwrap();

    assert!(controller.history().await.is_empty());
    assert_eq!(controller.stats().await.total_sessions, 1);
    assert!(controller.current_messages().await.is_empty());
}

#[tokio::test]
async fn test_select_session_switches_and_replays() {
    let controller = controller_with(MockEndpoint::answering("trả lời"));
    controller.ask(Some("câu một".to_string())).await;
    let first = controller.history().await[0].id.clone();

    controller.new_session().await;
    controller.ask(Some("câu hai".to_string())).await;
    assert_eq!(controller.current_messages().await[0].content, "câu hai");

    controller.select_session(&first).await.unwrap();
    assert_eq!(controller.current_messages().await[0].content, "câu một");

    let events = controller.view().events();
    let replayed = events
        .iter()
        .filter(|e| e.starts_with("render:user:câu một"))
        .count();
    // Once when asked, once when replayed on selection.
    assert_eq!(replayed, 2);
}

#[tokio::test]
async fn test_selecting_unknown_session_fails_without_side_effects() {
    let controller = controller_with(MockEndpoint::answering("x"));
    controller.ask(Some("một".to_string())).await;
    let current = controller.history().await[0].id.clone();

    assert!(controller.select_session("chat_0_missing").await.is_err());
    assert_eq!(controller.history().await[0].id, current);
}
