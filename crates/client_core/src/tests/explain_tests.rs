use super::*;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tokio::{
    net::TcpListener,
    sync::Semaphore,
    time::{sleep, timeout, Duration},
};

#[derive(Clone)]
struct ExplainServerState {
    calls: Arc<Mutex<u32>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    reply: Arc<Mutex<Value>>,
    reply_raw_text: Arc<Mutex<bool>>,
    gate: Arc<Semaphore>,
}

async fn handle_explain(
    State(state): State<ExplainServerState>,
    Json(body): Json<Value>,
) -> Response {
    *state.calls.lock().await += 1;
    state.bodies.lock().await.push(body);
    let permit = state.gate.acquire().await.expect("gate closed");
    permit.forget();
    if *state.reply_raw_text.lock().await {
        return (StatusCode::OK, "not json").into_response();
    }
    Json(state.reply.lock().await.clone()).into_response()
}

/// Spawns the mock explanation service. With `gate_permits = 0` every request
/// blocks inside the handler until the test adds permits.
async fn spawn_explain_server(gate_permits: usize) -> (String, ExplainServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ExplainServerState {
        calls: Arc::new(Mutex::new(0)),
        bodies: Arc::new(Mutex::new(Vec::new())),
        reply: Arc::new(Mutex::new(json!({ "explanation": "explained" }))),
        reply_raw_text: Arc::new(Mutex::new(false)),
        gate: Arc::new(Semaphore::new(gate_permits)),
    };
    let app = Router::new()
        .route("/explain", post(handle_explain))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

async fn wait_for_calls(state: &ExplainServerState, minimum: u32) {
    timeout(Duration::from_secs(5), async {
        loop {
            if *state.calls.lock().await >= minimum {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("server never saw the request");
}

fn sample_card() -> IssueCard {
    IssueCard {
        issue: json!("Content-Security-Policy"),
        severity: json!("High"),
        reasons: json!(["header missing", "inline scripts allowed"]),
    }
}

#[tokio::test]
async fn renders_explanation_text_and_forwards_payload_verbatim() {
    let (server_url, state) = spawn_explain_server(usize::MAX >> 3).await;
    *state.reply.lock().await = json!({ "explanation": "CSP stops script injection." });

    let panels = ExplanationPanels::new(server_url);
    panels.request_explanation(0, &sample_card()).await;

    let panel = panels.panel(0).await;
    assert!(!panel.loading);
    assert_eq!(panel.text, "CSP stops script injection.");

    let bodies = state.bodies.lock().await;
    assert_eq!(
        bodies[0],
        json!({
            "issue": "Content-Security-Policy",
            "severity": "High",
            "reasons": ["header missing", "inline scripts allowed"],
        })
    );
}

#[tokio::test]
async fn missing_explanation_field_renders_fallback_text() {
    let (server_url, state) = spawn_explain_server(usize::MAX >> 3).await;
    *state.reply.lock().await = json!({});

    let panels = ExplanationPanels::new(server_url);
    panels.request_explanation(0, &sample_card()).await;

    let panel = panels.panel(0).await;
    assert!(!panel.loading);
    assert_eq!(panel.text, UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn empty_explanation_renders_fallback_text() {
    let (server_url, state) = spawn_explain_server(usize::MAX >> 3).await;
    *state.reply.lock().await = json!({ "explanation": "" });

    let panels = ExplanationPanels::new(server_url);
    panels.request_explanation(0, &sample_card()).await;

    assert_eq!(panels.panel(0).await.text, UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn unparseable_body_renders_failed_text() {
    let (server_url, state) = spawn_explain_server(usize::MAX >> 3).await;
    *state.reply_raw_text.lock().await = true;

    let panels = ExplanationPanels::new(server_url);
    panels.request_explanation(0, &sample_card()).await;

    let panel = panels.panel(0).await;
    assert!(!panel.loading);
    assert_eq!(panel.text, FAILED_MESSAGE);
}

#[tokio::test]
async fn transport_failure_renders_failed_text_and_clears_loading() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let panels = ExplanationPanels::new(format!("http://{addr}"));
    panels.request_explanation(4, &sample_card()).await;

    let panel = panels.panel(4).await;
    assert!(!panel.loading);
    assert_eq!(panel.text, FAILED_MESSAGE);
}

#[tokio::test]
async fn second_request_while_loading_is_a_no_op() {
    let (server_url, state) = spawn_explain_server(0).await;
    let panels = Arc::new(ExplanationPanels::new(server_url));

    let first = {
        let panels = Arc::clone(&panels);
        let card = sample_card();
        tokio::spawn(async move { panels.request_explanation(0, &card).await })
    };
    wait_for_calls(&state, 1).await;

    let in_flight = panels.panel(0).await;
    assert!(in_flight.loading);
    assert_eq!(in_flight.text, GENERATING_MESSAGE);

    // Re-triggering the same panel must not issue a second call or disturb
    // the interim message.
    panels.request_explanation(0, &sample_card()).await;
    assert_eq!(*state.calls.lock().await, 1);
    assert_eq!(panels.panel(0).await.text, GENERATING_MESSAGE);

    state.gate.add_permits(1);
    first.await.expect("first request");

    let settled = panels.panel(0).await;
    assert!(!settled.loading);
    assert_eq!(settled.text, "explained");

    // Once settled the guard reopens.
    state.gate.add_permits(1);
    panels.request_explanation(0, &sample_card()).await;
    assert_eq!(*state.calls.lock().await, 2);
}

#[tokio::test]
async fn panels_for_different_findings_are_independent() {
    let (server_url, state) = spawn_explain_server(0).await;
    let panels = Arc::new(ExplanationPanels::new(server_url));

    let workers: Vec<_> = (0..2)
        .map(|index| {
            let panels = Arc::clone(&panels);
            let card = sample_card();
            tokio::spawn(async move { panels.request_explanation(index, &card).await })
        })
        .collect();

    // Both requests reach the server while the other is still in flight: the
    // guard is per panel, not shared.
    wait_for_calls(&state, 2).await;

    state.gate.add_permits(2);
    for worker in workers {
        worker.await.expect("request");
    }

    for index in 0..2 {
        let panel = panels.panel(index).await;
        assert!(!panel.loading);
        assert_eq!(panel.text, "explained");
    }
}
