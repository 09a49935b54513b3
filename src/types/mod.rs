//! Core data types exchanged with callers and the completion provider.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and text content |
//! | [`MessageRole`] | Message role (system, user, assistant) |
//!
//! ```rust
//! use aorium_gateway::types::{Message, MessageRole};
//!
//! let system = Message::system("You are a market analyst for the GCC region");
//! let user = Message::user("Summarise Q3 sales");
//! assert_eq!(user.role, MessageRole::User);
//! # let _ = system;
//! ```

pub mod message;

pub use message::{Message, MessageRole};
