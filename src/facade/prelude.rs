//! Minimal prelude for application code.
//!
//! Goal: reduce import noise without hiding important concepts.

pub use crate::client::{CallStats, GatewayClient, GatewayClientBuilder, InvocationResult};
pub use crate::config::GatewayConfig;
pub use crate::facade::analysis::{AnalysisContext, AnalysisTask, BusinessContext, FileInfo};
pub use crate::facade::chat::{user_facing_error, ChatReply};
pub use crate::policy::RetryPolicy;
pub use crate::structured::ResponseContent;
pub use crate::types::message::{Message, MessageRole};
pub use crate::{Error, Result};
