//! End-to-end tests for the hyper binding over a real TCP socket.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use taskgate_core::HandlerOptions;
use taskgate_core::mock::MockTrigger;
use taskgate_hyper::{HyperTrigger, LegacyResponse, TriggerServer};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

fn run_handle() -> Value {
    json!({
        "id": "run_abc123",
        "taskIdentifier": "test-task",
        "publicAccessToken": "test-token"
    })
}

async fn start(prefix: &str, handler: HyperTrigger) -> (SocketAddr, watch::Sender<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = TriggerServer::new(prefix, handler);
    tokio::spawn(server.serve_listener(listener, shutdown_rx));
    (addr, shutdown_tx)
}

async fn send(addr: SocketAddr, method: &str, path: &str, body: &str) -> (StatusCode, Value) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await.unwrap();
    tokio::spawn(async move {
        let _ = conn.await;
    });

    let req = Request::builder()
        .method(method)
        .uri(path)
        .header("host", addr.to_string())
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap();

    let resp = sender.send_request(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn request(path: &str, body: &'static str) -> Request<Full<Bytes>> {
    Request::builder()
        .method("POST")
        .uri(path)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

#[tokio::test]
async fn server_triggers_task() {
    let mock = Arc::new(MockTrigger::returning(run_handle()));
    let (addr, _shutdown) = start("/api/trigger", HyperTrigger::new(mock.clone())).await;

    let (status, body) = send(
        addr,
        "POST",
        "/api/trigger/test-task",
        r#"{"name":"Test User","email":"test@example.com"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "taskId": "test-task",
            "payload": {"name": "Test User", "email": "test@example.com"},
            "handle": run_handle()
        })
    );
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn server_without_task_id_is_400() {
    let mock = Arc::new(MockTrigger::returning(run_handle()));
    let (addr, _shutdown) = start("/api/trigger", HyperTrigger::new(mock.clone())).await;

    for path in ["/api/trigger", "/api/trigger/"] {
        let (status, body) = send(addr, "POST", path, "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(body, json!({"error": "Task ID is required"}));
    }
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn server_array_payload() {
    let mock = Arc::new(MockTrigger::returning(run_handle()));
    let (addr, _shutdown) = start("/api/trigger", HyperTrigger::new(mock)).await;

    let (status, body) = send(addr, "POST", "/api/trigger/test-task-123_ABC", "[1,2,3]").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["taskId"], "test-task-123_ABC");
    assert_eq!(body["payload"], json!([1, 2, 3]));
}

#[tokio::test]
async fn server_trigger_failure_is_500() {
    let mock = Arc::new(MockTrigger::failing("backend unavailable"));
    let (addr, _shutdown) = start("/api/trigger", HyperTrigger::new(mock.clone())).await;

    let (status, body) = send(addr, "POST", "/api/trigger/test-task", "{}").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to trigger task"}));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn server_routes_outside_prefix_are_404() {
    let mock = Arc::new(MockTrigger::returning(run_handle()));
    let (addr, _shutdown) = start("/api/trigger", HyperTrigger::new(mock.clone())).await;

    let (status, body) = send(addr, "POST", "/elsewhere/test-task", "{}").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not Found"}));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn server_non_post_is_405() {
    let mock = Arc::new(MockTrigger::returning(run_handle()));
    let (addr, _shutdown) = start("/api/trigger", HyperTrigger::new(mock.clone())).await;

    let (status, _) = send(addr, "GET", "/api/trigger/test-task", "").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn server_stops_on_shutdown() {
    let mock = Arc::new(MockTrigger::returning(run_handle()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = TriggerServer::new("/", HyperTrigger::new(mock));
    let task = tokio::spawn(server.serve_listener(listener, shutdown_rx));

    shutdown_tx.send(true).unwrap();

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), task)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn legacy_and_modern_entry_points_agree() {
    let cases: [(&str, &'static str); 4] = [
        ("/api/trigger/test-task", r#"{"name":"Test User"}"#),
        ("/api/trigger/", "{}"),
        ("/api/trigger/list", "[1,2,3]"),
        ("/api/trigger/bad", "{oops"),
    ];

    for (path, body) in cases {
        let mock = Arc::new(MockTrigger::returning(run_handle()));
        let handler = HyperTrigger::new(mock);

        let modern = handler.handle(request(path, body)).await;
        let mut legacy = LegacyResponse::new();
        handler.handle_legacy(request(path, body), &mut legacy).await;

        assert_eq!(modern.status(), legacy.status_code(), "{path}");
        let modern_body = modern.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&modern_body, legacy.body(), "{path}");
    }
}

#[tokio::test]
async fn legacy_failure_details_when_exposed() {
    let mock = Arc::new(MockTrigger::failing("quota exceeded"));
    let handler = HyperTrigger::new(mock).with_options(HandlerOptions {
        expose_error_details: true,
    });
    let mut res = LegacyResponse::new();

    handler
        .handle_legacy(request("/api/trigger/test-task", "{}"), &mut res)
        .await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(
        body,
        json!({"error": "Failed to trigger task", "details": "quota exceeded"})
    );
}
