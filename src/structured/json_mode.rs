//! JSON mode response handling.
//!
//! When a caller asks for JSON mode the provider is told to emit a JSON object
//! and the returned text is parsed here. A parse failure is not an error of the
//! call: the provider answered, so the caller gets an [`InvalidJsonResponse`]
//! marker carrying the raw text instead.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const INVALID_RESPONSE_TITLE: &str = "Invalid AI Response";
pub const INVALID_RESPONSE_MESSAGE: &str = "The AI returned a response that was not valid JSON.";

/// Lenient extraction patterns, most specific first.
static LENIENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"```json\s*([\s\S]*?)\s*```",
        r"```\s*([\s\S]*?)\s*```",
        r"\{[\s\S]*\}",
        r"\[[\s\S]*\]",
    ]
    .into_iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Marker returned in place of parsed JSON when the model ignored JSON mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidJsonResponse {
    pub status: String,
    pub title: String,
    pub message: String,
    pub raw: String,
}

impl InvalidJsonResponse {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            title: INVALID_RESPONSE_TITLE.to_string(),
            message: INVALID_RESPONSE_MESSAGE.to_string(),
            raw: raw.into(),
        }
    }
}

/// Content of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseContent {
    /// Plain completion text (JSON mode off).
    Text(String),
    /// Parsed completion (JSON mode on).
    Json(serde_json::Value),
    /// JSON mode on, but the completion did not parse.
    InvalidResponse(InvalidJsonResponse),
}

impl ResponseContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseContent::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseContent::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_invalid_response(&self) -> bool {
        matches!(self, ResponseContent::InvalidResponse(_))
    }

    /// Text form suitable for persisting or returning to an end user.
    pub fn to_display_string(&self) -> String {
        match self {
            ResponseContent::Text(s) => s.clone(),
            ResponseContent::Json(v) => v.to_string(),
            ResponseContent::InvalidResponse(inv) => inv.raw.clone(),
        }
    }

    pub fn into_value(self) -> serde_json::Value {
        match self {
            ResponseContent::Text(s) => serde_json::Value::String(s),
            ResponseContent::Json(v) => v,
            ResponseContent::InvalidResponse(inv) => serde_json::json!({
                "status": inv.status,
                "title": inv.title,
                "message": inv.message,
                "raw": inv.raw,
            }),
        }
    }
}

/// Build the content of a successful attempt.
pub fn interpret_completion(text: String, json_mode: bool, lenient: bool) -> ResponseContent {
    if !json_mode {
        return ResponseContent::Text(text);
    }
    match parse_json(&text, lenient) {
        Some(v) => ResponseContent::Json(v),
        None => ResponseContent::InvalidResponse(InvalidJsonResponse::new(text)),
    }
}

/// Strict parse of the whole text; with `lenient`, fall back to a fenced
/// ```json block or the outermost object/array span.
pub fn parse_json(text: &str, lenient: bool) -> Option<serde_json::Value> {
    let trimmed = text.trim();
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Some(parsed);
    }
    if !lenient {
        return None;
    }

    for re in LENIENT_PATTERNS.iter() {
        if let Some(captures) = re.captures(trimmed) {
            let candidate = match captures.get(1) {
                Some(inner) => inner.as_str(),
                None => captures.get(0).map(|c| c.as_str()).unwrap_or(trimmed),
            };
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(candidate.trim()) {
                return Some(parsed);
            }
        }
    }

    None
}
