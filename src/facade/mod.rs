//! Caller-facing helpers layered on [`GatewayClient::invoke`](crate::GatewayClient::invoke).
//!
//! The gateway itself knows nothing about chat turns or analysis tasks; these
//! helpers build the message lists the application features send and
//! interpret the results.

pub mod analysis;
pub mod chat;
pub mod prelude;
