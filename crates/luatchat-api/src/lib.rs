//! Client for the remote question-answering endpoint.
//!
//! The endpoint is an opaque collaborator: `POST /initialize` readies the
//! backend, `POST /chat` answers a question. Responses are decoded here at
//! the boundary into tagged outcomes so downstream code never inspects
//! untyped fields, and transport faults are absorbed into the outcome
//! rather than propagated.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

mod request_log;

/// Default backend address, matching the served frontend.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api";

/// Generic fallback when a structured failure carries no message.
pub const GENERIC_FAILURE: &str = "Đã xảy ra lỗi khi xử lý yêu cầu";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

/// Wire envelope shared by both endpoints. Every field is tolerant of
/// absence; shape-level failures fall through to the transport path.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Outcome of one `/chat` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The endpoint answered the question.
    Answer(String),
    /// The endpoint replied with a well-formed envelope reporting an
    /// application-level error.
    Failure(String),
    /// The request could not complete or the reply could not be decoded.
    Transport(String),
}

/// Outcome of the `/initialize` handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Ready,
    Failure(String),
    Transport(String),
}

/// The remote endpoint seam; the controller only ever talks through this.
#[async_trait]
pub trait QaEndpoint: Send + Sync {
    async fn initialize(&self) -> InitOutcome;
    async fn ask(&self, question: &str) -> AskOutcome;
}

/// reqwest-backed endpoint client.
pub struct HttpQaClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpQaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl QaEndpoint for HttpQaClient {
    async fn initialize(&self) -> InitOutcome {
        let url = format!("{}/initialize", self.base_url);
        request_log::log_request(&url, &serde_json::json!({}));

        match self.client.post(&url).send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(body) => interpret_init_body(status, &body),
                    Err(err) => InitOutcome::Transport(err.to_string()),
                }
            }
            Err(err) => InitOutcome::Transport(err.to_string()),
        }
    }

    async fn ask(&self, question: &str) -> AskOutcome {
        let url = format!("{}/chat", self.base_url);
        let request = ChatRequest { question };
        request_log::log_request(&url, &serde_json::json!({ "question": question }));

        match self.client.post(&url).json(&request).send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(body) => interpret_chat_body(status, &body),
                    Err(err) => AskOutcome::Transport(err.to_string()),
                }
            }
            Err(err) => AskOutcome::Transport(err.to_string()),
        }
    }
}

/// Decode one `/chat` reply body.
///
/// A body that parses as the envelope is interpreted on its embedded
/// `status` regardless of the HTTP code; anything undecodable is a
/// transport failure carrying the HTTP status as detail.
fn interpret_chat_body(status: StatusCode, body: &str) -> AskOutcome {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => {
            if envelope.status == "success" {
                match envelope.answer {
                    Some(answer) => AskOutcome::Answer(answer),
                    None => AskOutcome::Failure(GENERIC_FAILURE.to_string()),
                }
            } else {
                AskOutcome::Failure(structured_message(envelope))
            }
        }
        Err(_) => AskOutcome::Transport(transport_detail(status)),
    }
}

/// Decode one `/initialize` reply body.
fn interpret_init_body(status: StatusCode, body: &str) -> InitOutcome {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => {
            if envelope.status == "success" {
                InitOutcome::Ready
            } else {
                InitOutcome::Failure(structured_message(envelope))
            }
        }
        Err(_) => InitOutcome::Transport(transport_detail(status)),
    }
}

fn structured_message(envelope: Envelope) -> String {
    envelope
        .error
        .or(envelope.message)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

fn transport_detail(status: StatusCode) -> String {
    if status.is_success() {
        "undecodable response body".to_string()
    } else {
        format!("undecodable response body (HTTP {})", status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_answer() {
        let out = interpret_chat_body(
            StatusCode::OK,
            r#"{"status":"success","answer":"Điều 12 quy định..."}"#,
        );
        assert_eq!(out, AskOutcome::Answer("Điều 12 quy định...".to_string()));
    }

    #[test]
    fn test_success_without_answer_is_a_failure() {
        let out = interpret_chat_body(StatusCode::OK, r#"{"status":"success"}"#);
        assert_eq!(out, AskOutcome::Failure(GENERIC_FAILURE.to_string()));
    }

    #[test]
    fn test_structured_failure_prefers_error_over_message() {
        let out = interpret_chat_body(
            StatusCode::OK,
            r#"{"status":"error","error":"chưa khởi tạo","message":"khác"}"#,
        );
        assert_eq!(out, AskOutcome::Failure("chưa khởi tạo".to_string()));
    }

    #[test]
    fn test_structured_failure_falls_back_to_message_then_generic() {
        let out = interpret_chat_body(StatusCode::OK, r#"{"status":"error","message":"bận"}"#);
        assert_eq!(out, AskOutcome::Failure("bận".to_string()));

        let out = interpret_chat_body(StatusCode::OK, r#"{"status":"error"}"#);
        assert_eq!(out, AskOutcome::Failure(GENERIC_FAILURE.to_string()));
    }

    #[test]
    fn test_well_formed_failure_on_non_2xx_stays_structured() {
        let out = interpret_chat_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"status":"error","error":"hỏng"}"#,
        );
        assert_eq!(out, AskOutcome::Failure("hỏng".to_string()));
    }

    #[test]
    fn test_undecodable_body_is_transport_with_status_detail() {
        let out = interpret_chat_body(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>");
        assert_eq!(
            out,
            AskOutcome::Transport("undecodable response body (HTTP 502)".to_string())
        );
    }

    #[test]
    fn test_initialize_outcomes() {
        assert_eq!(
            interpret_init_body(StatusCode::OK, r#"{"status":"success"}"#),
            InitOutcome::Ready
        );
        assert_eq!(
            interpret_init_body(StatusCode::OK, r#"{"status":"error","error":"thiếu dữ liệu"}"#),
            InitOutcome::Failure("thiếu dữ liệu".to_string())
        );
        assert_eq!(
            interpret_init_body(StatusCode::OK, "not json"),
            InitOutcome::Transport("undecodable response body".to_string())
        );
    }
}
