use crate::client::{GatewayClient, GatewayClientBuilder};
use crate::config::GatewayConfig;
use crate::policy::RetryPolicy;
use crate::structured::ResponseContent;
use crate::transport::{ChatTransport, CompletionRequest, TransportError, TransportResponse};
use crate::types::Message;
use crate::Error;
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

type Scripted = std::result::Result<TransportResponse, TransportError>;

/// Replays per-model scripted replies and records every call.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Instant, serde_json::Value)>>,
}

impl ScriptedTransport {
    fn reply(self, model: &str, status: u16, body: &str) -> Self {
        self.push(model, Ok(TransportResponse::new(status, body)))
    }

    fn fail(self, model: &str, msg: &str) -> Self {
        self.push(model, Err(TransportError::Other(msg.to_string())))
    }

    fn push(self, model: &str, r: Scripted) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(r);
        self
    }

    fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _, _)| m.clone())
            .collect()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t, _)| *t).collect()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(
        &self,
        request: &CompletionRequest<'_>,
        _request_id: &str,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push((
            request.model.to_string(),
            Instant::now(),
            serde_json::to_value(request).unwrap(),
        ));
        self.replies
            .lock()
            .unwrap()
            .get_mut(request.model)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Ok(TransportResponse::new(500, "unscripted")))
    }
}

fn completion(content: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
}

fn client(transport: Arc<ScriptedTransport>, base_delay_ms: u64) -> GatewayClient {
    GatewayClientBuilder::new()
        .config(
            GatewayConfig::default()
                .with_candidates(["A", "B", "C"])
                .with_retry(RetryPolicy::new(3, base_delay_ms)),
        )
        .transport(transport)
        .build()
        .unwrap()
}

fn hello() -> Vec<Message> {
    vec![Message::user("hello")]
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_twice_then_success() {
    let t = Arc::new(
        ScriptedTransport::default()
            .reply("A", 429, "slow down")
            .reply("A", 429, "slow down")
            .reply("A", 200, &completion("hello")),
    );
    let res = client(t.clone(), 1000).invoke(&hello(), false).await.unwrap();

    assert_eq!(res.model_used, "A");
    assert_eq!(res.content, ResponseContent::Text("hello".into()));
    assert_eq!(t.models_called(), vec!["A", "A", "A"]);
    assert_eq!(
        res.stats.backoffs(),
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );

    let times = t.call_times();
    let first_gap = times[1] - times[0];
    let second_gap = times[2] - times[1];
    assert!(first_gap >= Duration::from_millis(1000) && first_gap < Duration::from_millis(1010));
    assert!(second_gap >= Duration::from_millis(2000) && second_gap < Duration::from_millis(2010));
}

#[tokio::test(start_paused = true)]
async fn test_retry_ceiling_then_fallover() {
    let t = Arc::new(
        ScriptedTransport::default()
            .reply("A", 429, "")
            .reply("A", 429, "")
            .reply("A", 429, "")
            .reply("B", 200, &completion("from b")),
    );
    let res = client(t.clone(), 10).invoke(&hello(), false).await.unwrap();

    assert_eq!(res.model_used, "B");
    assert_eq!(t.models_called(), vec!["A", "A", "A", "B"]);
    assert_eq!(res.stats.requests_to("A"), 3);
    // Fallover itself does not wait.
    let times = t.call_times();
    assert_eq!(times[3], times[2]);
}

#[tokio::test]
async fn test_terminal_failure_falls_over_in_order() {
    let t = Arc::new(
        ScriptedTransport::default()
            .reply("A", 500, "boom")
            .reply("B", 200, &completion("ok")),
    );
    let res = client(t.clone(), 10).invoke(&hello(), false).await.unwrap();

    assert_eq!(res.model_used, "B");
    assert_eq!(t.models_called(), vec!["A", "B"]);
    assert_eq!(res.stats.models_tried(), vec!["A", "B"]);
    assert!(res.stats.backoffs().is_empty());
}

#[tokio::test]
async fn test_transport_error_falls_over_without_retry() {
    let t = Arc::new(
        ScriptedTransport::default()
            .fail("A", "connection refused")
            .reply("B", 200, &completion("ok")),
    );
    let res = client(t.clone(), 10).invoke(&hello(), false).await.unwrap();

    assert_eq!(res.model_used, "B");
    assert_eq!(res.stats.attempts[0].http_status, None);
    assert_eq!(res.stats.attempts[0].outcome, "failed");
}

#[tokio::test]
async fn test_first_success_wins() {
    let t = Arc::new(ScriptedTransport::default().reply("A", 200, &completion("first")));
    let res = client(t.clone(), 10).invoke(&hello(), false).await.unwrap();

    assert_eq!(res.model_used, "A");
    assert_eq!(t.models_called(), vec!["A"]);
}

#[tokio::test]
async fn test_json_mode_parse_failure_does_not_fall_over() {
    let t = Arc::new(ScriptedTransport::default().reply("A", 200, &completion("not json")));
    let res = client(t.clone(), 10).invoke(&hello(), true).await.unwrap();

    assert_eq!(res.model_used, "A");
    assert!(res.is_invalid_response());
    match &res.content {
        ResponseContent::InvalidResponse(inv) => {
            assert_eq!(inv.status, "error");
            assert_eq!(inv.raw, "not json");
        }
        other => panic!("unexpected content: {:?}", other),
    }
    assert_eq!(t.models_called(), vec!["A"]);
}

#[tokio::test]
async fn test_json_mode_parses_and_sets_response_format() {
    let t = Arc::new(
        ScriptedTransport::default()
            .reply("A", 503, "unavailable")
            .reply("B", 200, &completion(r#"{"x":1}"#)),
    );
    let res = client(t.clone(), 10).invoke(&hello(), true).await.unwrap();

    assert_eq!(res.model_used, "B");
    assert_eq!(res.content, ResponseContent::Json(json!({"x": 1})));

    let calls = t.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    for (_, _, body) in calls.iter() {
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
    }
}

#[tokio::test]
async fn test_missing_content_is_empty_text() {
    let t = Arc::new(ScriptedTransport::default().reply("A", 200, r#"{"choices":[]}"#));
    let res = client(t.clone(), 10).invoke(&hello(), false).await.unwrap();
    assert_eq!(res.content, ResponseContent::Text(String::new()));
}

#[tokio::test]
async fn test_non_json_success_body_falls_over() {
    let t = Arc::new(
        ScriptedTransport::default()
            .reply("A", 200, "<html>gateway page</html>")
            .reply("B", 200, &completion("from b")),
    );
    let res = client(t.clone(), 10).invoke(&hello(), false).await.unwrap();

    assert_eq!(res.model_used, "B");
    assert_eq!(res.content, ResponseContent::Text("from b".into()));
    assert_eq!(t.models_called(), vec!["A", "B"]);
    assert_eq!(res.stats.attempts[0].outcome, "failed");
}

#[tokio::test]
async fn test_all_candidates_exhausted() {
    let t = Arc::new(
        ScriptedTransport::default()
            .reply("A", 500, "a down")
            .reply("B", 502, "b down")
            .reply("C", 400, "c rejected"),
    );
    let err = client(t.clone(), 10).invoke(&hello(), false).await.unwrap_err();

    match err {
        Error::AllProvidersExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_error, "HTTP 400: c rejected");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(t.models_called(), vec!["A", "B", "C"]);
}

#[tokio::test(start_paused = true)]
async fn test_last_candidate_rate_limited_exhausts() {
    let t = Arc::new(
        ScriptedTransport::default()
            .reply("A", 500, "")
            .reply("B", 500, "")
            .reply("C", 429, "")
            .reply("C", 429, "")
            .reply("C", 429, "still limited"),
    );
    let err = client(t.clone(), 10).invoke(&hello(), false).await.unwrap_err();

    assert!(err.is_exhausted());
    assert!(err.to_string().contains("HTTP 429: still limited"));
    assert_eq!(t.models_called().len(), 5);
}

#[tokio::test]
async fn test_empty_messages_rejected_without_calls() {
    let t = Arc::new(ScriptedTransport::default());
    let err = client(t.clone(), 10).invoke(&[], false).await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(t.models_called().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let t = Arc::new(ScriptedTransport::default().reply("A", 429, ""));
    let gw = client(t.clone(), 60_000);
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            cancel.cancel();
        })
    };

    let err = gw
        .invoke_with_cancel(&hello(), false, &cancel)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(t.models_called(), vec!["A"]);
}

/// Never answers within the test; records how many sends started.
#[derive(Default)]
struct HangingTransport {
    sends: Mutex<usize>,
}

#[async_trait]
impl ChatTransport for HangingTransport {
    async fn send(
        &self,
        _request: &CompletionRequest<'_>,
        _request_id: &str,
    ) -> std::result::Result<TransportResponse, TransportError> {
        *self.sends.lock().unwrap() += 1;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(TransportResponse::new(200, completion("too late")))
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_in_flight_attempt() {
    let t = Arc::new(HangingTransport::default());
    let gw = GatewayClientBuilder::new()
        .config(GatewayConfig::default().with_candidates(["A", "B"]))
        .transport(t.clone())
        .build()
        .unwrap();
    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        })
    };

    let started = Instant::now();
    let err = gw
        .invoke_with_cancel(&hello(), false, &cancel)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(*t.sends.lock().unwrap(), 1);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_already_cancelled_sends_nothing() {
    let t = Arc::new(ScriptedTransport::default().reply("A", 200, &completion("x")));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client(t.clone(), 10)
        .invoke_with_cancel(&hello(), false, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(t.models_called().is_empty());
}

#[tokio::test]
async fn test_concurrent_invocations_are_independent() {
    let t = Arc::new(
        ScriptedTransport::default()
            .reply("A", 200, &completion("one"))
            .reply("A", 200, &completion("two")),
    );
    let gw = client(t.clone(), 10);
    let msgs = hello();
    let (r1, r2) = tokio::join!(gw.invoke(&msgs, false), gw.invoke(&msgs, false));
    let (r1, r2) = (r1.unwrap(), r2.unwrap());

    assert_ne!(r1.stats.client_request_id, r2.stats.client_request_id);
    let mut got = vec![
        r1.content.as_text().unwrap().to_string(),
        r2.content.as_text().unwrap().to_string(),
    ];
    got.sort();
    assert_eq!(got, vec!["one", "two"]);
}
