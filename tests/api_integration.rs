//! Integration tests for the drafting REST API.
//!
//! Each test spins up an Axum server on a random port backed by a stub
//! provider and exercises the real HTTP contract with reqwest.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use replywise::api::api_routes;
use replywise::error::LlmError;
use replywise::llm::{JsonAdapter, LlmProvider};
use replywise::pipeline::ReplyDrafter;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub LLM provider replaying scripted completions (no real API calls).
struct StubLlm {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
}

impl StubLlm {
    fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn provider_name(&self) -> &str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::RequestFailed {
                    provider: "stub".into(),
                    reason: "script exhausted".into(),
                })
            })
    }
}

/// Start an Axum server on a random port, return the base URL.
async fn start_server(primary: Arc<StubLlm>, fallback: Option<Arc<StubLlm>>) -> String {
    let mut adapter = JsonAdapter::new(primary);
    if let Some(fallback) = fallback {
        adapter = adapter.with_fallback(fallback);
    }
    let drafter = Arc::new(ReplyDrafter::new(Arc::new(adapter)));
    let app = api_routes(Some(drafter));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

async fn post_json(url: String, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("request failed");
    let status = resp.status().as_u16();
    let json = resp.json().await.unwrap_or(Value::Null);
    (status, json)
}

// ── Generate ─────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_returns_three_ordered_drafts() {
    timeout(TEST_TIMEOUT, async {
        let model = json!({
            "intent_summary": ["Asks for payment", "Sets a deadline"],
            "reply_drafts": {
                "friendly": {"subject": "Re: Invoice", "body": "Thanks for the reminder!"},
                "short": {"subject": "Re: Invoice", "body": "Will pay Friday."}
            },
            "questions_to_ask": ["Which account?", "Is a partial payment ok?"],
            "risk": {"flags": ["urgency"], "notes": ["Deadline pressure"], "confidence": 0.4}
        });
        let fenced = format!("```json\n{model}\n```");
        let base = start_server(StubLlm::new(vec![Ok(fenced)]), None).await;

        let (status, json) = post_json(
            format!("{base}/api/generate"),
            json!({"emailText": "Please wire the payment for the invoice in the attachment by Friday."}),
        )
        .await;

        assert_eq!(status, 200);
        let drafts = json["reply_drafts"].as_array().unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0]["style"], "short");
        assert_eq!(drafts[1]["style"], "friendly");
        assert_eq!(drafts[2]["style"], "formal");
        assert_eq!(drafts[2]["subject"], "Re: Email");
        assert_eq!(drafts[2]["body"], "");

        // Model said urgency, heuristic found financial (wire/payment/invoice).
        assert_eq!(json["risk"]["flags"]["urgency"], true);
        assert_eq!(json["risk"]["flags"]["financial"], true);
        assert_eq!(json["risk"]["flags"]["phishing"], false);

        let notes = json["risk"]["notes"].as_array().unwrap();
        assert_eq!(notes[0], "Deadline pressure");
        assert!(
            notes
                .iter()
                .any(|n| n == "Warning: Financial request with attachment - verify sender")
        );

        let confidence = json["risk"]["confidence"].as_f64().unwrap();
        assert!((confidence - 40.0).abs() < 1e-6);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn generate_repairs_broken_json() {
    timeout(TEST_TIMEOUT, async {
        let primary = StubLlm::new(vec![
            Ok(r#"{"intent_summary": ["a", "b"],}"#.to_string()),
            Ok(r#"{"intent_summary": ["a", "b"]}"#.to_string()),
        ]);
        let base = start_server(primary, None).await;

        let (status, json) =
            post_json(format!("{base}/api/generate"), json!({"emailText": "hello"})).await;

        assert_eq!(status, 200);
        assert_eq!(json["intent_summary"], json!(["a", "b"]));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn generate_reports_both_parse_failures() {
    timeout(TEST_TIMEOUT, async {
        let primary = StubLlm::new(vec![Ok("{broken".into()), Ok("{still broken".into())]);
        let base = start_server(primary, None).await;

        let (status, json) =
            post_json(format!("{base}/api/generate"), json!({"emailText": "hello"})).await;

        assert_eq!(status, 500);
        assert_eq!(json["error"], "Failed to generate response");
        let message = json["message"].as_str().unwrap();
        assert!(message.contains("after retry"));
        assert!(message.contains("repair attempt"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn generate_uses_alternate_path_on_transport_failure() {
    timeout(TEST_TIMEOUT, async {
        let primary = StubLlm::new(vec![Err(LlmError::Upstream {
            provider: "gemini".into(),
            status: 503,
            body: "overloaded".into(),
        })]);
        let fallback = StubLlm::new(vec![Ok(
            r#"{"reply_drafts": {"formal": {"subject": "Re: Hi", "body": "Dear Sir"}}}"#.into(),
        )]);
        let base = start_server(primary, Some(fallback)).await;

        let (status, json) =
            post_json(format!("{base}/api/generate"), json!({"emailText": "hi"})).await;

        assert_eq!(status, 200);
        assert_eq!(json["reply_drafts"][2]["body"], "Dear Sir");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn generate_rejects_empty_email() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(StubLlm::new(vec![]), None).await;

        let (status, json) =
            post_json(format!("{base}/api/generate"), json!({"emailText": ""})).await;

        assert_eq!(status, 400);
        assert_eq!(json["error"], "Invalid request");
    })
    .await
    .expect("test timed out");
}

// ── Rewrite ──────────────────────────────────────────────────────────

#[tokio::test]
async fn rewrite_more_formal_falls_back_to_selected_body() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(
            StubLlm::new(vec![Ok(r#"{"subject": "Re: Plans"}"#.into())]),
            None,
        )
        .await;

        let (status, json) = post_json(
            format!("{base}/api/rewrite"),
            json!({
                "action": "more_formal",
                "selectedDraftBody": "yep, see you then",
                "originalEmail": "Are we still on for Thursday?"
            }),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(json["subject"], "Re: Plans");
        assert_eq!(json["body"], "yep, see you then");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rewrite_omits_subject_when_model_does() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(
            StubLlm::new(vec![Ok(r#"{"body": "Short version."}"#.into())]),
            None,
        )
        .await;

        let (status, json) = post_json(
            format!("{base}/api/rewrite"),
            json!({
                "action": "shorter",
                "selectedDraftBody": "A very long draft that goes on and on.",
                "originalEmail": "Status?"
            }),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(json, json!({"body": "Short version."}));
    })
    .await
    .expect("test timed out");
}

// ── Health ───────────────────────────────────────────────────────────

#[tokio::test]
async fn health_endpoint_ok() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(StubLlm::new(vec![]), None).await;
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert!(resp.status().is_success());
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");
    })
    .await
    .expect("test timed out");
}
