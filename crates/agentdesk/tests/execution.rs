use agentdesk::execution::{ExecutionUpdate, HttpStreamTransport};
use agentdesk::{ApiClient, ApiSettings, ExecutionController};
use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse(events: &[serde_json::Value]) -> String {
    events
        .iter()
        .map(|event| format!("data: {}\n\n", event))
        .collect()
}

fn controller_for(server: &MockServer) -> Result<ExecutionController<HttpStreamTransport>> {
    let api = ApiClient::new(&ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })?;
    Ok(ExecutionController::new(api.stream_transport()))
}

#[tokio::test]
async fn test_stream_runs_to_completion() -> Result<()> {
    let server = MockServer::start().await;
    let body = sse(&[
        json!({"type": "message", "content": "Thinking about the question", "timestamp": "2024-05-01T10:00:00Z"}),
        json!({"type": "message", "content": "Calling calculator"}),
        json!({"type": "message", "content": {"output": 42}}),
        json!({"type": "result", "content": "42"}),
        json!({"type": "complete", "execution_id": "e-1"}),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/agents/A/stream"))
        .and(query_param("query", "What is 6*7?"))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller_for(&server)?;
    controller.execute_agent("A", "What is 6*7?");
    assert!(controller.is_executing());
    controller.run().await;

    let snapshot = controller.snapshot();
    assert!(!snapshot.is_executing);
    assert_eq!(snapshot.execution_result.as_deref(), Some("42"));
    assert!(snapshot.error.is_none());

    let contents: Vec<&str> = snapshot
        .execution_steps
        .iter()
        .map(|s| s.content.as_str())
        .collect();
    assert_eq!(
        contents,
        vec![
            "Thinking about the question",
            "Calling calculator",
            r#"{"output":42}"#,
        ]
    );
    let ids: Vec<u64> = snapshot.execution_steps.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(
        snapshot.execution_steps[0].timestamp.to_rfc3339(),
        "2024-05-01T10:00:00+00:00"
    );
    Ok(())
}

#[tokio::test]
async fn test_error_status_fails_the_run() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/A/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Agent crashed"})))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server)?;
    controller.execute_agent("A", "hello");

    let update = controller.next_update().await;
    assert!(matches!(update, Some(ExecutionUpdate::Failed(ref m)) if m.contains("Agent crashed")));
    assert!(!controller.is_executing());
    assert!(controller.execution_steps().is_empty());
    assert!(controller.error().unwrap().contains("Agent crashed"));
    assert_eq!(controller.next_update().await, None);
    Ok(())
}

#[tokio::test]
async fn test_error_event_ends_the_run() -> Result<()> {
    let server = MockServer::start().await;
    let body = sse(&[
        json!({"type": "message", "content": "starting"}),
        json!({"type": "error", "message": "Tool timed out"}),
        json!({"type": "message", "content": "never applied"}),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/agents/A/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server)?;
    controller.execute_agent("A", "go");
    controller.run().await;

    assert_eq!(controller.execution_steps().len(), 1);
    assert_eq!(controller.error(), Some("Tool timed out"));
    assert!(controller.execution_result().is_none());
    Ok(())
}

#[tokio::test]
async fn test_stream_closed_without_complete() -> Result<()> {
    let server = MockServer::start().await;
    let body = format!(
        ": keep-alive\n\n{}",
        sse(&[json!({"type": "result", "content": "partial"})])
    );
    Mock::given(method("GET"))
        .and(path("/api/agents/A/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server)?;
    controller.execute_agent("A", "go");
    controller.run().await;

    assert!(!controller.is_executing());
    assert_eq!(controller.execution_result(), Some("partial"));
    assert!(controller.error().is_some());
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_fails_the_run() -> Result<()> {
    let api = ApiClient::new(&ApiSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        ..ApiSettings::default()
    })?;
    let mut controller = ExecutionController::new(api.stream_transport());
    controller.execute_agent("A", "go");
    controller.run().await;

    assert!(!controller.is_executing());
    assert!(controller
        .error()
        .unwrap()
        .starts_with("could not connect to execution stream"));
    Ok(())
}
