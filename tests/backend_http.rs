//! Integration tests for the backend HTTP client against a mock server.

use ragdesk::backend::{BackendClient, BackendError, QueryRequest};
use ragdesk::event::AppEvent;
use std::sync::mpsc;
use tokio::runtime::Handle;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> (BackendClient, mpsc::Receiver<AppEvent>) {
    let (tx, rx) = mpsc::channel();
    let client = BackendClient::new(
        server.uri(),
        tx,
        Handle::current(),
        egui::Context::default(),
    );
    (client, rx)
}

#[tokio::test]
async fn query_round_trip_returns_answer_sources_and_audit_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(serde_json::json!({
            "query": "What is the capital of France?",
            "model": "llama3.2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "Paris is the capital.",
            "context_sources": ["doc1.txt"],
            "audit_id": "abc123",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _rx) = client_for(&server);
    let response = client
        .query(&QueryRequest {
            query: "What is the capital of France?".to_string(),
            model: "llama3.2".to_string(),
        })
        .await
        .expect("query should succeed");

    assert_eq!(response.answer, "Paris is the capital.");
    assert_eq!(response.context_sources, vec!["doc1.txt".to_string()]);
    assert_eq!(response.audit_id, "abc123");
}

#[tokio::test]
async fn query_error_surfaces_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "detail": "model unavailable",
        })))
        .mount(&server)
        .await;

    let (client, _rx) = client_for(&server);
    let err = client
        .query(&QueryRequest {
            query: "anything".to_string(),
            model: "llama3.2".to_string(),
        })
        .await
        .expect_err("query should fail");

    assert_eq!(err.user_message(), "model unavailable");
    match err {
        BackendError::Backend { status, detail } => {
            assert_eq!(status, 503);
            assert_eq!(detail, "model unavailable");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn query_error_without_detail_body_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let (client, _rx) = client_for(&server);
    let err = client
        .query(&QueryRequest {
            query: "anything".to_string(),
            model: "llama3.2".to_string(),
        })
        .await
        .expect_err("query should fail");

    assert!(err.user_message().contains("500"));
}

#[tokio::test]
async fn upload_sends_multipart_and_returns_vector_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_exists("content-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vector_id": "v42",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _rx) = client_for(&server);
    let response = client
        .upload_bytes("notes.txt", b"hello knowledge base".to_vec())
        .await
        .expect("upload should succeed");

    assert_eq!(response.vector_id, "v42");
}

#[tokio::test]
async fn upload_error_surfaces_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(413).set_body_json(serde_json::json!({
            "detail": "file too large",
        })))
        .mount(&server)
        .await;

    let (client, _rx) = client_for(&server);
    let err = client
        .upload_bytes("big.txt", vec![0u8; 16])
        .await
        .expect_err("upload should fail");

    assert_eq!(err.user_message(), "file too large");
}

#[tokio::test]
async fn health_succeeds_on_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
        })))
        .mount(&server)
        .await;

    let (client, _rx) = client_for(&server);
    client.health().await.expect("health should succeed");
}

#[tokio::test]
async fn health_fails_when_backend_is_down() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let (tx, _rx) = mpsc::channel();
    let client = BackendClient::new(uri, tx, Handle::current(), egui::Context::default());
    let err = client.health().await.expect_err("health should fail");
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn dispatch_query_delivers_exactly_one_terminal_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "hi",
            "context_sources": [],
            "audit_id": "a1",
        })))
        .mount(&server)
        .await;

    let (client, rx) = client_for(&server);
    client.dispatch_query(QueryRequest {
        query: "q".to_string(),
        model: "llama3.2".to_string(),
    });

    let event = tokio::task::spawn_blocking(move || {
        let event = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("terminal event expected");
        assert!(rx.try_recv().is_err());
        event
    })
    .await
    .expect("receiver task should finish");

    match event {
        AppEvent::QueryCompleted {
            answer, audit_id, ..
        } => {
            assert_eq!(answer, "hi");
            assert_eq!(audit_id, "a1");
        }
        other => panic!("expected completion event, got {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_upload_reports_unreadable_file_without_hitting_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, rx) = client_for(&server);
    client.dispatch_upload(
        "missing.txt".to_string(),
        std::path::PathBuf::from("does/not/exist/missing.txt"),
    );

    let event = tokio::task::spawn_blocking(move || {
        rx.recv_timeout(std::time::Duration::from_secs(5))
            .expect("terminal event expected")
    })
    .await
    .expect("receiver task should finish");

    match event {
        AppEvent::UploadFailed(message) => {
            assert!(message.contains("missing.txt"));
        }
        other => panic!("expected failure event, got {other:?}"),
    }
}
