//! End-to-end tests: the real router on an ephemeral port, driven over HTTP.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use board_gateway::api::build_app;
use board_gateway::app_state::AppState;
use board_gateway::auth::HeaderAuthenticator;
use board_gateway::auth::authenticator::{FIRST_NAME_HEADER, LAST_NAME_HEADER, USER_ID_HEADER};
use board_gateway::domain::{BroadcastHub, MessageStore};
use board_gateway::persistence::{ListBackend, MemoryListBackend};
use board_gateway::service::MessageService;

const WAIT: Duration = Duration::from_secs(2);

struct TestApp {
    base: String,
    hub: BroadcastHub,
    client: Client,
}

impl TestApp {
    async fn spawn() -> Self {
        let backend: Arc<dyn ListBackend> = Arc::new(MemoryListBackend::new());
        let store = Arc::new(MessageStore::new(backend));
        let hub = BroadcastHub::new(64);
        let service = Arc::new(MessageService::new(store, hub.clone()));
        let app = build_app(AppState::new(service, Arc::new(HeaderAuthenticator::new())));

        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base: format!("http://{addr}"),
            hub,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn as_user(&self, builder: RequestBuilder, user_id: &str) -> RequestBuilder {
        builder
            .header(USER_ID_HEADER, user_id)
            .header(FIRST_NAME_HEADER, "Test")
            .header(LAST_NAME_HEADER, user_id)
    }

    async fn send(&self, builder: RequestBuilder) -> Response {
        let Ok(response) = builder.send().await else {
            panic!("request failed");
        };
        response
    }

    async fn create(&self, user_id: &str, content: &str) -> Response {
        let req = self
            .client
            .post(self.url("/api/v1/messages"))
            .json(&json!({ "content": content }));
        self.send(self.as_user(req, user_id)).await
    }

    async fn edit(&self, user_id: &str, id: &str, content: &str) -> Response {
        let req = self
            .client
            .patch(self.url(&format!("/api/v1/messages/{id}")))
            .json(&json!({ "content": content }));
        self.send(self.as_user(req, user_id)).await
    }

    async fn delete(&self, user_id: &str, id: &str) -> Response {
        let req = self
            .client
            .delete(self.url(&format!("/api/v1/messages/{id}")));
        self.send(self.as_user(req, user_id)).await
    }

    async fn get(&self, user_id: &str, path: &str) -> Response {
        let req = self.client.get(self.url(path));
        self.send(self.as_user(req, user_id)).await
    }

    async fn open_stream(&self, user_id: &str) -> EventReader {
        let response = self.get(user_id, "/api/v1/messages/stream").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/event-stream"));
        EventReader {
            response,
            buffer: String::new(),
            keep_alives: 0,
        }
    }
}

async fn body_json(response: Response) -> Value {
    let Ok(value) = response.json::<Value>().await else {
        panic!("body is not json");
    };
    value
}

/// Incremental reader of a `text/event-stream` body.
struct EventReader {
    response: Response,
    buffer: String,
    keep_alives: usize,
}

impl EventReader {
    /// Returns the next data frame's JSON, counting keep-alives skipped.
    async fn next_envelope(&mut self) -> Value {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                let data: String = block
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(str::trim_start)
                    .collect();
                if data.is_empty() {
                    if block.starts_with(':') {
                        self.keep_alives += 1;
                    }
                    continue;
                }
                let Ok(value) = serde_json::from_str(&data) else {
                    panic!("data frame is not json: {data}");
                };
                return value;
            }

            let Ok(Ok(Some(chunk))) = tokio::time::timeout(WAIT, self.response.chunk()).await
            else {
                panic!("stream ended or stalled");
            };
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}

#[tokio::test]
async fn requests_without_identity_are_rejected() {
    let app = TestApp::spawn().await;

    for path in ["/api/v1/messages", "/api/v1/messages/stream"] {
        let response = app.send(app.client.get(app.url(path))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .send(
            app.client
                .post(app.url("/api/v1/messages"))
                .json(&json!({ "content": "hi" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 5001);
}

#[tokio::test]
async fn ownership_scenario_over_http() {
    let app = TestApp::spawn().await;

    let response = app.create("u1", "hi").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let Some(id) = created["id"].as_str().map(str::to_string) else {
        panic!("missing id");
    };
    assert_eq!(created["authorId"], "u1");
    assert_eq!(created["authorDisplayName"], "Test u1");
    assert!(created["updatedAt"].is_null());

    let response = app.edit("u2", &id, "stolen").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let current = body_json(app.get("u2", &format!("/api/v1/messages/{id}")).await).await;
    assert_eq!(current["content"], "hi");

    let response = app.edit("u1", &id, "hi there").await;
    assert_eq!(response.status(), StatusCode::OK);
    let edited = body_json(response).await;
    assert_eq!(edited["content"], "hi there");
    assert!(!edited["updatedAt"].is_null());
    assert_eq!(edited["createdAt"], created["createdAt"]);

    let response = app.delete("u2", &id).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.delete("u1", &id).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get("u1", &format!("/api/v1/messages/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let list = body_json(app.get("u1", "/api/v1/messages").await).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn invalid_input_and_unknown_ids() {
    let app = TestApp::spawn().await;

    let response = app.create("u1", "   ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.edit("u1", "not-a-real-id", "x").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .delete("u1", "00000000-0000-4000-8000-000000000000")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_edit_is_rejected_before_id_lookup() {
    let app = TestApp::spawn().await;

    for id in ["not-a-real-id", "00000000-0000-4000-8000-000000000000"] {
        let response = app.edit("u1", id, "  ").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 1001);
    }
}

#[tokio::test]
async fn malformed_body_uses_error_shape() {
    let app = TestApp::spawn().await;
    let created = body_json(app.create("u1", "original").await).await;
    let Some(id) = created["id"].as_str() else {
        panic!("created message has no id");
    };

    let req = app
        .client
        .post(app.url("/api/v1/messages"))
        .header("content-type", "application/json")
        .body("{\"content\": ");
    let response = app.send(app.as_user(req, "u1")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 1001);

    let req = app
        .client
        .patch(app.url(&format!("/api/v1/messages/{id}")))
        .header("content-type", "application/json")
        .body("not json");
    let response = app.send(app.as_user(req, "u1")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 1001);

    let list = body_json(app.get("u1", "/api/v1/messages").await).await;
    assert_eq!(list[0]["content"], "original");
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = TestApp::spawn().await;
    for content in ["A", "B", "C"] {
        assert_eq!(app.create("u1", content).await.status(), StatusCode::CREATED);
    }

    let list = body_json(app.get("u1", "/api/v1/messages").await).await;
    let contents: Vec<&str> = list
        .as_array()
        .map(|items| items.iter().filter_map(|m| m["content"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(contents, vec!["C", "B", "A"]);
}

#[tokio::test]
async fn stream_starts_with_initial_then_follows_mutations() {
    let app = TestApp::spawn().await;
    let existing = body_json(app.create("u1", "before").await).await;

    let mut stream = app.open_stream("u2").await;
    let initial = stream.next_envelope().await;
    assert_eq!(initial["type"], "initial");
    assert_eq!(initial["messages"], json!([existing]));

    let created = body_json(app.create("u1", "during").await).await;
    let Some(id) = created["id"].as_str().map(str::to_string) else {
        panic!("missing id");
    };
    let event = stream.next_envelope().await;
    assert_eq!(event["type"], "new-message");
    assert_eq!(event["message"], created);

    let edited = body_json(app.edit("u1", &id, "edited").await).await;
    let event = stream.next_envelope().await;
    assert_eq!(event["type"], "edit-message");
    assert_eq!(event["message"], edited);

    assert_eq!(app.delete("u1", &id).await.status(), StatusCode::NO_CONTENT);
    let event = stream.next_envelope().await;
    assert_eq!(event["type"], "delete-message");
    assert_eq!(event["id"], id.as_str());
}

#[tokio::test]
async fn keep_alives_are_comment_frames() {
    let app = TestApp::spawn().await;
    let mut stream = app.open_stream("u1").await;
    let _ = stream.next_envelope().await;

    assert_eq!(app.hub.heartbeat(), 1);
    let created = body_json(app.create("u1", "after ping").await).await;

    let event = stream.next_envelope().await;
    assert_eq!(event["message"], created);
    assert_eq!(stream.keep_alives, 1);
}

#[tokio::test]
async fn two_subscribers_receive_the_same_event() {
    let app = TestApp::spawn().await;
    let mut s1 = app.open_stream("u1").await;
    let mut s2 = app.open_stream("u2").await;
    let _ = s1.next_envelope().await;
    let _ = s2.next_envelope().await;

    let created = body_json(app.create("u3", "hello all").await).await;
    let e1 = s1.next_envelope().await;
    let e2 = s2.next_envelope().await;
    assert_eq!(e1, e2);
    assert_eq!(e1["message"], created);
}

#[tokio::test]
async fn disconnect_deregisters_subscriber() {
    let app = TestApp::spawn().await;
    let mut stream = app.open_stream("u1").await;
    let _ = stream.next_envelope().await;
    assert_eq!(app.hub.subscriber_count(), 1);

    drop(stream);

    // No frame is pushed: the closed socket alone must release the subscriber.
    let mut remaining = app.hub.subscriber_count();
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        remaining = app.hub.subscriber_count();
        if remaining == 0 {
            break;
        }
    }
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn reconnect_resyncs_from_snapshot() {
    let app = TestApp::spawn().await;
    let mut stream = app.open_stream("u1").await;
    let _ = stream.next_envelope().await;
    drop(stream);

    // Missed while disconnected.
    let missed = body_json(app.create("u2", "while away").await).await;

    let mut stream = app.open_stream("u1").await;
    let initial = stream.next_envelope().await;
    assert_eq!(initial["type"], "initial");
    assert_eq!(initial["messages"], json!([missed]));
}

#[tokio::test]
async fn health_reports_counts() {
    let app = TestApp::spawn().await;
    let _ = app.create("u1", "one").await;
    let mut stream = app.open_stream("u1").await;
    let _ = stream.next_envelope().await;

    let response = app.send(app.client.get(app.url("/health"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["messages"], 1);
    assert_eq!(health["subscribers"], 1);
}
