//! # aorium-gateway
//!
//! Model invocation gateway for chat-completion providers.
//!
//! ## Overview
//!
//! Every AI-backed feature (chat, file analysis, benchmarking, market
//! potential) goes through one call: [`GatewayClient::invoke`]. It sends the
//! caller's messages to an ordered list of candidate models on a single
//! provider and returns the first successful completion.
//!
//! - **Retry**: HTTP 429 is retried on the same candidate with exponential
//!   backoff (`base * 2^(k-1)`), up to 3 attempts by default
//! - **Fallover**: any other failure moves to the next candidate immediately
//! - **JSON mode**: asks the provider for a JSON object and parses it locally;
//!   unparseable output comes back as an invalid-response marker instead of an
//!   error
//! - **Exhaustion**: the only error raised to callers once candidates run out
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aorium_gateway::{GatewayClient, GatewayConfig, Message};
//!
//! #[tokio::main]
//! async fn main() -> aorium_gateway::Result<()> {
//!     let config = GatewayConfig::load(None)?;
//!     let client = GatewayClient::new(config)?;
//!
//!     let result = client
//!         .invoke(&[Message::user("Summarise the GCC retail market")], false)
//!         .await?;
//!     println!("{} answered: {}", result.model_used, result.content.to_display_string());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Gateway client, builder and call statistics |
//! | [`config`] | Configuration loading and validation |
//! | [`policy`] | Retry and fallover decisions |
//! | [`transport`] | Outbound HTTP attempt |
//! | [`structured`] | JSON mode parsing |
//! | [`facade`] | Chat and analysis helpers |
//! | [`types`] | Message types |

pub mod client;
pub mod config;
pub mod facade;
pub mod policy;
pub mod structured;
pub mod transport;
pub mod types;

pub use client::{CallStats, GatewayClient, GatewayClientBuilder, InvocationResult};
pub use config::GatewayConfig;
pub use facade::prelude;
pub use structured::ResponseContent;
pub use types::message::{Message, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
