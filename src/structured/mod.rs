//! Structured (JSON mode) output handling.
//!
//! ```
//! use aorium_gateway::structured::{interpret_completion, ResponseContent};
//! use serde_json::json;
//!
//! let parsed = interpret_completion(r#"{"x": 1}"#.to_string(), true, false);
//! assert_eq!(parsed.as_json(), Some(&json!({"x": 1})));
//!
//! let invalid = interpret_completion("not json".to_string(), true, false);
//! assert!(invalid.is_invalid_response());
//! ```

pub mod json_mode;

pub use json_mode::{
    interpret_completion, parse_json, InvalidJsonResponse, ResponseContent,
    INVALID_RESPONSE_MESSAGE, INVALID_RESPONSE_TITLE,
};
