//! Error classification logic

use crate::policy::AttemptOutcome;
use crate::transport::{TransportError, TransportResponse};

/// Reduce one transport result to an [`AttemptOutcome`].
///
/// - 2xx: success, with `choices[0].message.content` (empty when absent);
///   a 2xx body that is not JSON fails the candidate
/// - 429: rate limited, retried on the same candidate
/// - any other status or a transport failure: candidate failure, no retry
pub(crate) fn classify(
    result: &std::result::Result<TransportResponse, TransportError>,
) -> AttemptOutcome {
    match result {
        Ok(resp) if resp.is_success() => match resp.completion_text() {
            Ok(text) => AttemptOutcome::Success(text),
            Err(e) => AttemptOutcome::Failed(format!(
                "HTTP {}: invalid JSON body ({}): {}",
                resp.status, e, resp.body
            )),
        },
        Ok(resp) if resp.is_rate_limited() => {
            AttemptOutcome::RateLimited(format!("HTTP 429: {}", resp.body))
        }
        Ok(resp) => AttemptOutcome::Failed(format!("HTTP {}: {}", resp.status, resp.body)),
        Err(e) => AttemptOutcome::Failed(e.to_string()),
    }
}
