//! Outbound chat-completion transport.
//!
//! [`ChatTransport`] is the seam between the invocation loop and the network:
//! one call is one HTTP attempt. [`HttpTransport`] is the production
//! implementation; tests substitute scripted transports or point
//! [`HttpTransport`] at a mock server.

pub mod http;

pub use http::HttpTransport;

use crate::types::Message;
use async_trait::async_trait;
use serde::Serialize;

/// `response_format` value asking the provider for a single JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
}

impl ResponseFormat {
    pub const fn json_object() -> Self {
        Self {
            format_type: "json_object",
        }
    }
}

/// Request body for one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [Message], json_mode: bool) -> Self {
        Self {
            model,
            messages,
            response_format: json_mode.then(ResponseFormat::json_object),
        }
    }
}

/// Raw provider reply: status code plus the body as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// `choices[0].message.content`, or an empty string when a JSON body lacks
    /// it. A body that is not JSON at all is an error.
    pub fn completion_text(&self) -> std::result::Result<String, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(&self.body)?;
        Ok(value
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default())
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Perform exactly one HTTP attempt. Non-2xx statuses are returned as
    /// responses, not errors; only transport-level failures are `Err`.
    async fn send(
        &self,
        request: &CompletionRequest<'_>,
        request_id: &str,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
