#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use clipme_sync::config::Config;
use clipme_sync::models::{ClipPayload, SendMessage};
use clipme_sync::routes::build_router;
use clipme_sync::ws::Link;
use clipme_sync::AppState;
use common::test_config;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};
use tower::ServiceExt;

const BOUNDARY: &str = "clipme-test-boundary";

struct Harness {
    state: AppState,
    app: Router,
}

impl Harness {
    fn new(config: Config) -> Self {
        let state = AppState::new(config);
        let app = build_router(state.clone());
        Self { state, app }
    }

    /// Joins `tag` directly through the gateway and returns the member's queue.
    fn member(&self, tag: &str) -> mpsc::Receiver<SendMessage> {
        let (tx, mut rx) = mpsc::channel(16);
        let link = Link::new(self.state.gateway.next_conn_id(), tx, Arc::new(Notify::new()));
        self.state.gateway.connect(tag, link).unwrap();
        // joined snapshot plus any presence notices
        while rx.try_recv().is_ok() {}
        rx
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self
            .call(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self
            .call(Request::delete(uri).body(Body::empty()).unwrap())
            .await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = self.call(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn upload(&self, tag: &str, name: &str, contents: &str) -> (StatusCode, Value) {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
             Content-Type: text/plain\r\n\r\n{contents}\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::post(format!("/api/v1/upload/{tag}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, body) = self.call(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

fn harness() -> Harness {
    Harness::new(test_config())
}

#[tokio::test]
async fn health_and_ready() {
    let h = harness();
    let (status, body) = h.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let _rx = h.member("ABCD");
    let (status, body) = h.get("/api/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"], 1);
    assert_eq!(body["sessions"], 1);
}

#[tokio::test]
async fn reading_unknown_room_does_not_create_it() {
    let h = harness();
    let (status, body) = h.get("/api/v1/clip/abcd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag"], "ABCD");
    assert_eq!(body["revision"], 0);
    assert_eq!(body["payload"], json!({"kind": "text", "text": ""}));
    assert!(h.state.gateway.registry().is_empty());

    let (status, body) = h.get("/api/v1/rooms/ABCD").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "RoomNotFound");
}

#[tokio::test]
async fn invalid_tag_is_bad_request() {
    let h = harness();
    let (status, body) = h.get("/api/v1/clip/toolong").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "InvalidRoomTag");
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn http_write_requires_live_room() {
    let h = harness();
    let (status, body) = h
        .post_json("/api/v1/clip/ABCD", json!({"payload": {"kind": "text", "text": "x"}}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "RoomNotFound");
    assert!(h.state.gateway.registry().is_empty());
}

#[tokio::test]
async fn http_write_syncs_members() {
    let h = harness();
    let mut rx = h.member("ABCD");

    let (status, body) = h
        .post_json(
            "/api/v1/clip/ABCD",
            json!({"payload": {"kind": "text", "text": "from http"}, "revision": 0}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revision"], 1);

    match rx.try_recv().unwrap() {
        SendMessage::Sync(sync) => {
            assert_eq!(sync.revision, 1);
            assert_eq!(sync.payload, ClipPayload::text("from http"));
        }
        other => panic!("unexpected {other:?}"),
    }

    let (status, body) = h.get("/api/v1/rooms/ABCD").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revision"], 1);
    assert_eq!(body["members"], 1);

    let (status, body) = h.delete("/api/v1/clip/ABCD").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revision"], 2);
    assert_eq!(body["payload"]["text"], "");
}

#[tokio::test]
async fn oversized_http_write_is_413() {
    let h = Harness::new(Config {
        max_clip_chars: 4,
        ..test_config()
    });
    let _rx = h.member("ABCD");
    let (status, body) = h
        .post_json("/api/v1/clip/ABCD", json!({"payload": {"kind": "text", "text": "12345"}}))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["kind"], "PayloadTooLarge");

    let (_, body) = h.get("/api/v1/clip/ABCD").await;
    assert_eq!(body["revision"], 0);
}

#[tokio::test]
async fn file_lifecycle() {
    let h = harness();
    let mut rx = h.member("FILE");

    let (status, uploaded) = h.upload("FILE", "hello.txt", "hello world").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploaded["name"], "hello.txt");
    assert_eq!(uploaded["size"], 11);
    assert_eq!(uploaded["mimeType"], "text/plain");
    assert!(uploaded["expiresAt"].is_string());
    let id = uploaded["id"].as_str().unwrap().to_string();
    assert!(matches!(rx.try_recv().unwrap(), SendMessage::FileUploaded(m) if m.file.id.to_string() == id));

    let (status, list) = h.get("/api/v1/files/FILE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["totalFiles"], 1);
    assert_eq!(list["totalSize"], 11);

    let (status, info) = h.get(&format!("/api/v1/file/FILE/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["id"], id.as_str());

    let response = h
        .app
        .clone()
        .oneshot(
            Request::get(format!("/api/v1/download/FILE/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"hello.txt\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"hello world");

    // other rooms cannot see it
    let (status, _) = h.get(&format!("/api/v1/file/WXYZ/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h.delete(&format!("/api/v1/file/FILE/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(matches!(rx.try_recv().unwrap(), SendMessage::FileDeleted(m) if m.file_id.to_string() == id));
    let (status, body) = h.get(&format!("/api/v1/file/FILE/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "FileNotFound");
}

#[tokio::test]
async fn upload_requires_live_room() {
    let h = harness();
    let (status, body) = h.upload("NONE", "a.txt", "x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "RoomNotFound");
    assert!(h.state.blobs.is_empty());
}

#[tokio::test]
async fn files_are_purged_with_their_room() {
    let h = harness();
    let (tx, _rx) = mpsc::channel(16);
    let link = Link::new(h.state.gateway.next_conn_id(), tx, Arc::new(Notify::new()));
    let session = h.state.gateway.connect("PURG", link).unwrap();

    let (status, _) = h.upload("PURG", "a.txt", "abc").await;
    assert_eq!(status, StatusCode::CREATED);
    h.state.gateway.leave(&session);

    let (_, list) = h.get("/api/v1/files/PURG").await;
    assert_eq!(list["totalFiles"], 0);
}

#[tokio::test]
async fn upload_outliving_its_room_is_not_shown_to_the_next_occupants() {
    let h = harness();
    let (tx, _old_rx) = mpsc::channel(16);
    let link = Link::new(h.state.gateway.next_conn_id(), tx, Arc::new(Notify::new()));
    let old = h.state.gateway.connect("REUS", link).unwrap();

    let (chunks, chunk_rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(4);
    let body = Body::from_stream(futures_util::stream::unfold(chunk_rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    }));
    let request = Request::post("/api/v1/upload/REUS")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap();
    let app = h.app.clone();
    let pending = tokio::spawn(async move { app.oneshot(request).await.unwrap() });

    let head = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"old.txt\"\r\n\
         Content-Type: text/plain\r\n\r\nfrom the old room, "
    );
    chunks.send(Ok(Bytes::from(head))).await.unwrap();
    // let the handler pick up the room and start reading the file
    tokio::time::sleep(Duration::from_millis(50)).await;

    h.state.gateway.leave(&old);
    let mut fresh_rx = h.member("REUS");

    let tail = format!("still streaming\r\n--{BOUNDARY}--\r\n");
    chunks.send(Ok(Bytes::from(tail))).await.unwrap();
    drop(chunks);

    let response = pending.await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(fresh_rx.try_recv().is_err());
    let (_, list) = h.get("/api/v1/files/REUS").await;
    assert_eq!(list["totalFiles"], 0);
    assert!(h.state.blobs.is_empty());
}

#[tokio::test]
async fn diagnostics_and_openapi() {
    let h = harness();
    let _rx = h.member("DIAG");
    let (status, body) = h.get("/api/v1/diagnostics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["n_rooms"], 1);
    assert_eq!(body["n_members"], 1);
    assert_eq!(body["n_active_sessions"], 1);

    let (status, doc) = h.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/clip/{tag}"].is_object());
}
