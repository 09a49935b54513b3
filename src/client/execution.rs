//! Request execution logic (single attempt).

use crate::policy::AttemptOutcome;
use crate::transport::CompletionRequest;
use crate::types::Message;
use crate::{Error, Result};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::core::GatewayClient;
use super::error_classification::classify;

pub(crate) struct AttemptResult {
    pub outcome: AttemptOutcome,
    pub http_status: Option<u16>,
    pub duration_ms: u128,
}

impl GatewayClient {
    /// One HTTP attempt against `model`. No retry or fallover here; the
    /// policy loop lives in the caller. Only cancellation is an `Err`.
    pub(crate) async fn execute_once(
        &self,
        model: &str,
        messages: &[Message],
        json_mode: bool,
        client_request_id: &str,
        cancel: &CancellationToken,
    ) -> Result<AttemptResult> {
        let request = CompletionRequest::new(model, messages, json_mode);
        let start = Instant::now();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            r = self.transport.send(&request, client_request_id) => r,
        };

        let http_status = result.as_ref().ok().map(|r| r.status);
        let outcome = classify(&result);
        let duration_ms = start.elapsed().as_millis();

        match &outcome {
            AttemptOutcome::Success(text) => debug!(
                model,
                http_status,
                duration_ms,
                content_len = text.len(),
                client_request_id,
                "completion attempt succeeded"
            ),
            AttemptOutcome::RateLimited(_) | AttemptOutcome::Failed(_) => info!(
                model,
                http_status,
                duration_ms,
                outcome = outcome.label(),
                client_request_id,
                "completion attempt failed"
            ),
        }

        Ok(AttemptResult {
            outcome,
            http_status,
            duration_ms,
        })
    }

    /// Sleep for `delay` unless cancelled first.
    pub(crate) async fn backoff(&self, delay: Duration, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
