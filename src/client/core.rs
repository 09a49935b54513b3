use crate::client::types::{AttemptRecord, CallStats, InvocationResult};
use crate::config::GatewayConfig;
use crate::policy::{decide, Decision, FallbackChain};
use crate::structured::interpret_completion;
use crate::transport::ChatTransport;
use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Model invocation gateway.
///
/// Holds only immutable configuration and a shared transport, so clones are
/// cheap and concurrent invocations never interact.
#[derive(Clone)]
pub struct GatewayClient {
    pub(crate) config: Arc<GatewayConfig>,
    pub(crate) transport: Arc<dyn ChatTransport>,
}

impl GatewayClient {
    /// Build a client over HTTP from an already-loaded configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        crate::client::builder::GatewayClientBuilder::new()
            .config(config)
            .build()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Obtain a completion from the first viable candidate model.
    ///
    /// Candidates are tried in configured order. A 429 is retried on the same
    /// candidate with exponential backoff up to the retry ceiling; any other
    /// failure moves to the next candidate immediately. The first 2xx wins.
    ///
    /// With `json_mode`, the provider is asked for a JSON object and the text
    /// is parsed locally. If it does not parse, the result carries an
    /// invalid-response marker attributed to the answering model; no other
    /// candidate is tried.
    ///
    /// Fails with [`Error::AllProvidersExhausted`] when no candidate produced
    /// a 2xx response.
    pub async fn invoke(&self, messages: &[Message], json_mode: bool) -> Result<InvocationResult> {
        self.invoke_with_cancel(messages, json_mode, &CancellationToken::new())
            .await
    }

    /// [`invoke`](Self::invoke) with caller-driven cancellation. Cancelling
    /// aborts the in-flight attempt and skips any pending backoff.
    pub async fn invoke_with_cancel(
        &self,
        messages: &[Message],
        json_mode: bool,
        cancel: &CancellationToken,
    ) -> Result<InvocationResult> {
        if messages.is_empty() {
            return Err(Error::validation_with_context(
                "at least one message is required",
                ErrorContext::new()
                    .with_field_path("messages")
                    .with_source("invoke"),
            ));
        }

        let chain = FallbackChain::new(&self.config.candidates);
        let policy = self.config.retry;
        let client_request_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut last_error = String::from("no candidate models configured");

        'candidates: for (idx, model) in chain.iter().enumerate() {
            let has_next = idx + 1 < chain.len();
            let mut attempt: u32 = 1;
            let mut backoff_before_ms: Option<u64> = None;

            loop {
                let result = self
                    .execute_once(model, messages, json_mode, &client_request_id, cancel)
                    .await?;

                attempts.push(AttemptRecord {
                    model: model.to_string(),
                    attempt,
                    http_status: result.http_status,
                    outcome: result.outcome.label(),
                    backoff_before_ms,
                    duration_ms: result.duration_ms,
                });

                let decision = decide(&policy, &result.outcome, attempt, has_next);
                if let Some(detail) = result.outcome.failure_detail() {
                    last_error = detail.to_string();
                }

                match decision {
                    Decision::Accept => {
                        let text = result.outcome.into_text().unwrap_or_default();
                        let content =
                            interpret_completion(text, json_mode, self.config.lenient_json);
                        if content.is_invalid_response() {
                            warn!(
                                model,
                                client_request_id = client_request_id.as_str(),
                                "model ignored JSON mode; returning invalid-response marker"
                            );
                        }
                        let stats = CallStats {
                            client_request_id,
                            attempts,
                            duration_ms: start.elapsed().as_millis(),
                        };
                        info!(
                            model,
                            total_requests = stats.total_requests(),
                            duration_ms = stats.duration_ms,
                            "invocation succeeded"
                        );
                        return Ok(InvocationResult {
                            model_used: model.to_string(),
                            content,
                            stats,
                        });
                    }
                    Decision::Retry { delay } => {
                        warn!(
                            model,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            client_request_id = client_request_id.as_str(),
                            "rate limited; backing off"
                        );
                        self.backoff(delay, cancel).await?;
                        attempt += 1;
                        backoff_before_ms = Some(delay.as_millis() as u64);
                    }
                    Decision::Fallover => {
                        warn!(
                            model,
                            next = chain.next_after(model).unwrap_or(""),
                            last_error = last_error.as_str(),
                            client_request_id = client_request_id.as_str(),
                            "candidate failed; falling over"
                        );
                        continue 'candidates;
                    }
                    Decision::Exhausted => break 'candidates,
                }
            }
        }

        error!(
            attempts = attempts.len(),
            last_error = last_error.as_str(),
            client_request_id = client_request_id.as_str(),
            "all candidate models exhausted"
        );
        Err(Error::AllProvidersExhausted {
            attempts: attempts.len(),
            last_error,
        })
    }
}
