//! ChatClient and ChatController against a local mock of the chat endpoint.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use soudan_core::{
    ChatClient, ChatController, ChatMessage, ChatTransport, ExchangeError, Session, FALLBACK_REPLY,
};

#[derive(Clone)]
struct Mock {
    status: StatusCode,
    reply: Value,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn chat(State(mock): State<Mock>, Json(body): Json<Value>) -> impl IntoResponse {
    mock.received.lock().unwrap().push(body);
    (mock.status, Json(mock.reply.clone()))
}

/// Serve `reply` with `status` on a random port; returns the endpoint URL and
/// the request bodies seen so far.
async fn spawn_endpoint(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let mock = Mock {
        status,
        reply,
        received: received.clone(),
    };
    let router = Router::new().route("/api/chat", post(chat)).with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    (format!("http://{}/api/chat", addr), received)
}

#[tokio::test]
async fn test_reply_text_is_returned() {
    let (url, received) = spawn_endpoint(
        StatusCode::OK,
        json!({ "content": [ { "type": "text", "text": "それはめでたい" } ] }),
    )
    .await;
    let client = ChatClient::new(&url);

    let reply = client
        .exchange(vec![ChatMessage::user("元気です")])
        .await
        .unwrap();

    assert_eq!(reply, "それはめでたい");
    let received = received.lock().unwrap();
    assert_eq!(
        received.as_slice(),
        &[json!({ "messages": [ { "role": "user", "content": "元気です" } ] })]
    );
}

#[tokio::test]
async fn test_error_status_is_rejected() {
    let (url, _) = spawn_endpoint(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Failed to get response" }),
    )
    .await;

    let result = ChatClient::new(&url)
        .exchange(vec![ChatMessage::user("hi")])
        .await;

    assert!(matches!(
        result,
        Err(ExchangeError::Status(status)) if status.as_u16() == 500
    ));
}

#[tokio::test]
async fn test_empty_object_is_malformed() {
    let (url, _) = spawn_endpoint(StatusCode::OK, json!({})).await;

    let result = ChatClient::new(&url)
        .exchange(vec![ChatMessage::user("hi")])
        .await;

    assert!(matches!(result, Err(ExchangeError::Malformed)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = ChatClient::new(&format!("http://{}/api/chat", addr))
        .exchange(vec![ChatMessage::user("hi")])
        .await;

    assert!(matches!(result, Err(ExchangeError::Transport(_))));
}

#[tokio::test]
async fn test_controller_round_trip_excludes_greeting() {
    let (url, received) = spawn_endpoint(
        StatusCode::OK,
        json!({ "content": [ { "text": "よかったです" } ] }),
    )
    .await;
    let mut controller = ChatController::new(Session::new(), Arc::new(ChatClient::new(&url)));

    assert!(controller.submit("元気です"));
    controller.settle().await;

    let history = controller.session().history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1], ChatMessage::user("元気です"));
    assert_eq!(history[2], ChatMessage::assistant("よかったです"));
    assert!(!controller.is_pending());

    let received = received.lock().unwrap();
    assert_eq!(received[0]["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_controller_falls_back_on_empty_reply() {
    let (url, _) = spawn_endpoint(StatusCode::OK, json!({})).await;
    let mut controller = ChatController::new(Session::new(), Arc::new(ChatClient::new(&url)));

    controller.submit("元気です");
    controller.settle().await;

    let history = controller.session().history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2], ChatMessage::assistant(FALLBACK_REPLY));
}
