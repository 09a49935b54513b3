//! Retry and fallover decisions.
//!
//! Every HTTP attempt is reduced to an [`AttemptOutcome`]; [`decide`] turns
//! that outcome into the next step of the invocation loop. Keep this module
//! free of I/O so the control flow stays deterministic and testable.

pub mod fallback;
pub mod retry;

pub use fallback::FallbackChain;
pub use retry::RetryPolicy;

use std::time::Duration;

/// Result of a single HTTP attempt against one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 2xx; carries the extracted completion text (possibly empty).
    Success(String),
    /// HTTP 429; carries the response body.
    RateLimited(String),
    /// Any other non-2xx status or a transport failure.
    Failed(String),
}

impl AttemptOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::RateLimited(_) => "rate_limited",
            AttemptOutcome::Failed(_) => "failed",
        }
    }

    pub fn failure_detail(&self) -> Option<&str> {
        match self {
            AttemptOutcome::Success(_) => None,
            AttemptOutcome::RateLimited(d) | AttemptOutcome::Failed(d) => Some(d),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            AttemptOutcome::Success(text) => Some(text),
            _ => None,
        }
    }
}

/// What the invocation loop does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Retry { delay: Duration },
    Fallover,
    Exhausted,
}

/// `attempt` is 1-based within the current candidate; `has_next` says whether
/// another candidate remains after this one.
pub fn decide(
    policy: &RetryPolicy,
    outcome: &AttemptOutcome,
    attempt: u32,
    has_next: bool,
) -> Decision {
    match outcome {
        AttemptOutcome::Success(_) => Decision::Accept,
        AttemptOutcome::RateLimited(_) if policy.can_retry(attempt) => Decision::Retry {
            delay: policy.backoff(attempt),
        },
        AttemptOutcome::RateLimited(_) | AttemptOutcome::Failed(_) => {
            if has_next {
                Decision::Fallover
            } else {
                Decision::Exhausted
            }
        }
    }
}
