use crate::structured::ResponseContent;
use serde::Serialize;
use std::time::Duration;

/// Successful invocation: the model that answered and what it said.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationResult {
    pub model_used: String,
    pub content: ResponseContent,
    pub stats: CallStats,
}

impl InvocationResult {
    pub fn is_invalid_response(&self) -> bool {
        self.content.is_invalid_response()
    }
}

/// Per-invocation diagnostics: every HTTP attempt, in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallStats {
    pub client_request_id: String,
    pub attempts: Vec<AttemptRecord>,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub model: String,
    /// 1-based within the candidate.
    pub attempt: u32,
    /// `None` when the attempt failed below HTTP.
    pub http_status: Option<u16>,
    pub outcome: &'static str,
    /// Backoff slept before this attempt.
    pub backoff_before_ms: Option<u64>,
    pub duration_ms: u128,
}

impl CallStats {
    pub fn total_requests(&self) -> usize {
        self.attempts.len()
    }

    pub fn requests_to(&self, model: &str) -> usize {
        self.attempts.iter().filter(|a| a.model == model).count()
    }

    /// Models in the order they were contacted, consecutive duplicates collapsed.
    pub fn models_tried(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for a in &self.attempts {
            if out.last() != Some(&a.model.as_str()) {
                out.push(a.model.as_str());
            }
        }
        out
    }

    pub fn backoffs(&self) -> Vec<Duration> {
        self.attempts
            .iter()
            .filter_map(|a| a.backoff_before_ms.map(Duration::from_millis))
            .collect()
    }
}
