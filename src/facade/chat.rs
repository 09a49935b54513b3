use crate::client::GatewayClient;
use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use serde::Serialize;
use std::borrow::Cow;

/// Generic end-user text for any gateway failure. Details belong in logs.
pub const CHAT_FAILURE_MESSAGE: &str = "Failed to get a response from the AI";

pub const CHAT_INPUT_REQUIRED: &str = "Message or file is required";

const CHAT_SOURCE: &str = "chat_reply";

/// Reply to a chat prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub model_used: String,
}

/// Build the single user message for a chat turn, appending the attached
/// file's text when there is any.
pub fn compose_chat_message(message: &str, file_content: Option<&str>) -> Result<Message> {
    let file_content = file_content.unwrap_or("");
    if message.is_empty() && file_content.is_empty() {
        return Err(Error::validation_with_context(
            CHAT_INPUT_REQUIRED,
            ErrorContext::new()
                .with_field_path("message")
                .with_source(CHAT_SOURCE),
        ));
    }

    let mut content = message.to_string();
    if !file_content.is_empty() {
        content.push_str("\n\nFile content:\n");
        content.push_str(file_content);
    }
    Ok(Message::user(content))
}

/// Map any error to what an end user should see. Input problems are shown
/// as-is; everything that happened past validation collapses to
/// [`CHAT_FAILURE_MESSAGE`].
pub fn user_facing_error(err: &Error) -> Cow<'static, str> {
    match err {
        Error::Validation { context, .. } if context.source.as_deref() == Some(CHAT_SOURCE) => {
            Cow::Borrowed(CHAT_INPUT_REQUIRED)
        }
        Error::Validation { message, .. } => Cow::Owned(message.clone()),
        _ => Cow::Borrowed(CHAT_FAILURE_MESSAGE),
    }
}

impl GatewayClient {
    /// Free-text chat reply. An empty completion counts as a failure.
    pub async fn chat_reply(&self, message: &str, file_content: Option<&str>) -> Result<ChatReply> {
        let msg = compose_chat_message(message, file_content)?;
        let result = self.invoke(std::slice::from_ref(&msg), false).await?;

        let reply = result.content.to_display_string();
        if reply.is_empty() {
            return Err(Error::EmptyCompletion {
                model: result.model_used,
            });
        }
        Ok(ChatReply {
            reply,
            model_used: result.model_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_with_file() {
        let m = compose_chat_message("Summarise", Some("a,b\n1,2")).unwrap();
        assert_eq!(m.content, "Summarise\n\nFile content:\na,b\n1,2");
    }

    #[test]
    fn test_compose_message_only() {
        let m = compose_chat_message("Hi", None).unwrap();
        assert_eq!(m.content, "Hi");
        let m = compose_chat_message("Hi", Some("")).unwrap();
        assert_eq!(m.content, "Hi");
    }

    #[test]
    fn test_compose_file_only() {
        let m = compose_chat_message("", Some("data")).unwrap();
        assert_eq!(m.content, "\n\nFile content:\ndata");
    }

    #[test]
    fn test_compose_requires_something() {
        let err = compose_chat_message("", None).unwrap_err();
        assert_eq!(user_facing_error(&err), "Message or file is required");
    }

    #[test]
    fn test_other_validation_errors_keep_their_message() {
        let err: Error = "forecasting"
            .parse::<crate::facade::analysis::AnalysisTask>()
            .unwrap_err();
        assert_eq!(user_facing_error(&err), "Unknown analysis task: forecasting");

        let err = Error::validation_with_context(
            "analysis needs a prompt or content",
            ErrorContext::new().with_source("analyze"),
        );
        assert_eq!(user_facing_error(&err), "analysis needs a prompt or content");
    }

    #[test]
    fn test_exhaustion_maps_to_generic_message() {
        let err = Error::AllProvidersExhausted {
            attempts: 9,
            last_error: "HTTP 500".into(),
        };
        assert_eq!(user_facing_error(&err), CHAT_FAILURE_MESSAGE);
    }
}
