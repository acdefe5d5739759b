//! HTTP client for the remote `/chat` endpoint.
//!
//! One call per send: `POST {base_url}/chat` with the session identifier in
//! the `X-Session-ID` header. The whole exchange runs under a deadline;
//! reaching it drops the in-flight request.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::WidgetConfig;
use crate::message::Step;

/// Header carrying the session identifier.
pub const SESSION_HEADER: &str = "X-Session-ID";

/// Request body sent to the backend.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// Text typed by the user.
    pub message: &'a str,
    /// Always `true`; the backend decides whether to search.
    pub search_enabled: bool,
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    /// Reply text (Markdown).
    pub response: String,
    /// Source URLs backing the reply.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
    /// Intermediate reasoning steps.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub thinking_log: Vec<Step>,
}

/// Error body sent with a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Why a send failed.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The deadline fired before a response was read.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connectivity failure before a response was obtained.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-success status with a structured error payload.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Non-success status without a parseable error payload.
    #[error("server error (HTTP {0})")]
    Status(u16),

    /// Success status but the body is not a chat response.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Message shown when the deadline fires.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Message shown on connectivity failures.
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Message shown when a success response cannot be read.
pub const MALFORMED_MESSAGE: &str = "Unexpected response from server.";

impl RequestError {
    /// Text displayed to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout(_) => TIMEOUT_MESSAGE.to_string(),
            Self::Network(_) | Self::Client(_) => NETWORK_MESSAGE.to_string(),
            Self::Server { message, .. } => message.clone(),
            Self::Status(status) => format!("Server error (HTTP {status})"),
            Self::Malformed(_) => MALFORMED_MESSAGE.to_string(),
        }
    }

    /// Whether the failure came from the deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Client for the chat backend.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    deadline: Duration,
}

impl ChatClient {
    /// Build a client from the widget configuration.
    pub fn new(config: &WidgetConfig) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(RequestError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            deadline: config.timeout(),
        })
    }

    /// Full URL of the chat endpoint.
    pub fn url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    /// Deadline applied to each send.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Send one message and wait for the reply.
    pub async fn send(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<ChatResponse, RequestError> {
        debug!(url = %self.url(), len = message.len(), "Dispatching chat request");

        match timeout(self.deadline, self.exchange(session_id, message)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    warn!(error = %e, "Chat request failed");
                }
                result
            }
            Err(_) => {
                warn!(deadline = ?self.deadline, "Chat request timed out");
                Err(RequestError::Timeout(self.deadline))
            }
        }
    }

    async fn exchange(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<ChatResponse, RequestError> {
        let body = ChatRequest {
            message,
            search_enabled: true,
        };

        let resp = self
            .client
            .post(self.url())
            .header(CONTENT_TYPE, "application/json")
            .header(SESSION_HEADER, session_id)
            .json(&body)
            .send()
            .await
            .map_err(RequestError::Network)?;

        let status = resp.status();
        let text = resp.text().await.map_err(RequestError::Network)?;

        if !status.is_success() {
            return Err(error_from_body(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| RequestError::Malformed(e.to_string()))
    }
}

/// Map a non-success response to the matching error.
fn error_from_body(status: StatusCode, body: &str) -> RequestError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.trim().is_empty() => RequestError::Server {
            status: status.as_u16(),
            message: parsed.error,
        },
        _ => RequestError::Status(status.as_u16()),
    }
}
