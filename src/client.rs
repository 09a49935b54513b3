//! Gateway client for chat-completion providers.
//!
//! Keep the public surface small: build a [`GatewayClient`], call
//! [`GatewayClient::invoke`]. Implementation details are split into
//! submodules under `src/client/`.

pub mod builder;
pub mod core;
mod error_classification;
mod execution;
pub mod types;

#[cfg(test)]
mod tests;

pub use self::builder::GatewayClientBuilder;
pub use self::core::GatewayClient;
pub use self::types::{AttemptRecord, CallStats, InvocationResult};
