#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Shared helpers for the integration tests: a real server on an ephemeral
//! port and a small JSON-over-WebSocket client.

use std::net::SocketAddr;
use std::time::Duration;

use clipme_sync::config::Config;
use clipme_sync::routes::build_router;
use clipme_sync::ws::RoomTag;
use clipme_sync::AppState;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Small windows so grace expiry can be observed in real time.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        grace_window_ms: 300,
        heartbeat_interval_ms: 60_000,
        ..Config::default()
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(config: Config) -> Self {
        let state = AppState::new(config);
        let app = build_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state, handle }
    }

    pub async fn client(&self) -> WsClient {
        WsClient::connect(self.addr).await
    }

    pub fn room_exists(&self, tag: &str) -> bool {
        self.state
            .gateway
            .registry()
            .exists(&RoomTag::parse(tag).unwrap())
    }

    /// Polls `check` until it holds or `within` elapses.
    pub async fn wait_until(&self, within: Duration, check: impl Fn(&Self) -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if check(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        check(self)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let url = format!("ws://{}/ws", addr);
        let (stream, _response) = tokio_tungstenite::connect_async(url).await.unwrap();
        Self { stream }
    }

    pub async fn send(&mut self, value: Value) {
        self.stream
            .send(Message::Text(value.to_string().into()))
            .await
            .unwrap();
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream.send(Message::Text(text.into())).await.unwrap();
    }

    /// Next JSON frame from the server, skipping transport control frames.
    pub async fn recv(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for a server frame")
                .expect("connection closed")
                .expect("websocket error");
            match frame {
                Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame {other:?}"),
            }
        }
    }

    /// Next frame that is not a `members` presence notice.
    pub async fn recv_event(&mut self) -> Value {
        loop {
            let msg = self.recv().await;
            if msg["type"] != "members" {
                return msg;
            }
        }
    }

    pub async fn expect(&mut self, kind: &str) -> Value {
        let msg = self.recv_event().await;
        assert_eq!(msg["type"], kind, "unexpected message {msg}");
        msg
    }

    /// Asserts no non-presence frame arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return;
            }
            match tokio::time::timeout(remaining, self.stream.next()).await {
                Err(_) => return,
                Ok(Some(Ok(Message::Text(text)))) => {
                    let msg: Value = serde_json::from_str(text.as_str()).unwrap();
                    assert_eq!(msg["type"], "members", "expected silence, got {msg}");
                }
                Ok(Some(Ok(_))) => {}
                Ok(other) => panic!("connection ended: {other:?}"),
            }
        }
    }

    pub async fn join(&mut self, tag: &str) -> Value {
        self.send(serde_json::json!({"type": "join", "tag": tag})).await;
        self.expect("joined").await
    }

    pub async fn update_text(&mut self, text: &str, revision: Option<u64>) {
        self.send(serde_json::json!({
            "type": "update",
            "payload": {"kind": "text", "text": text},
            "revision": revision,
        }))
        .await;
    }

    pub async fn resume(&mut self, session_id: &str, last_seen_revision: u64) {
        self.send(serde_json::json!({
            "type": "resume",
            "sessionId": session_id,
            "lastSeenRevision": last_seen_revision,
        }))
        .await;
    }

    pub async fn leave(&mut self) {
        self.send(serde_json::json!({"type": "leave"})).await;
    }

    /// Drops the TCP connection without a close handshake, like a lost network.
    pub fn drop_connection(self) {
        drop(self.stream);
    }
}

pub fn text_of(msg: &Value) -> &str {
    msg["payload"]["text"].as_str().unwrap()
}
