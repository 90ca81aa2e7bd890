use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::ClipError;
use crate::models::{ReceivedMessage, SendMessage};
use crate::websocket::connctx::ConnCtx;
use crate::websocket::msg_join_handler::handle_join_message;
use crate::websocket::msg_leave_handler::handle_leave_message;
use crate::websocket::msg_ping_handler::handle_ping_message;
use crate::websocket::msg_resume_handler::handle_resume_message;
use crate::websocket::msg_update_handler::handle_update_message;
use crate::AppState;

/// WebSocket handler
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    debug!("New WebSocket connection attempt");
    let max_frame = state.config.max_frame_bytes;
    ws.max_message_size(max_frame)
        .max_frame_size(max_frame)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = state.gateway.next_conn_id();
    state.connections.fetch_add(1, Ordering::Relaxed);
    info!("WebSocket connection established with conn_id: {}", conn_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<SendMessage>(state.config.outbound_queue_size);
    let kick = Arc::new(Notify::new());
    let ctx = ConnCtx::new(conn_id, state.gateway.clone(), tx, Arc::clone(&kick));

    // Heartbeat intervals since the last inbound frame
    let missed = Arc::new(AtomicU32::new(0));
    let missed_writer = Arc::clone(&missed);
    let max_missed = state.config.max_missed_pongs;
    let heartbeat_every = state.config.heartbeat_interval();

    // Writer: drains the outbound queue, sends heartbeats, stops when kicked
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval_at(
            tokio::time::Instant::now() + heartbeat_every,
            heartbeat_every,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    let text = match serde_json::to_string(&msg) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Failed to serialize message for conn_id {}: {}", conn_id, e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    let silent = missed_writer.fetch_add(1, Ordering::Relaxed) + 1;
                    if silent > max_missed {
                        warn!("Heartbeat timeout on conn_id {} after {} intervals", conn_id, silent);
                        break;
                    }
                    if sender.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
                _ = kick.notified() => {
                    debug!("Transport kicked for conn_id {}", conn_id);
                    break;
                }
            }
        }
        let _ = sender.close().await;
    });

    // Reader: parses client frames and dispatches them
    let reader_ctx = ctx.clone();
    let mut recv_task = tokio::spawn(async move {
        let ctx = reader_ctx;
        while let Some(frame) = receiver.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    debug!("WebSocket read error on conn_id {}: {}", conn_id, e);
                    break;
                }
            };
            missed.store(0, Ordering::Relaxed);

            let text = match frame {
                Message::Text(text) => text,
                Message::Binary(_) => {
                    ctx.reply_error(&ClipError::Protocol("binary frames are not supported".to_string()));
                    continue;
                }
                Message::Close(_) => break,
                Message::Ping(_) | Message::Pong(_) => continue,
            };

            let received: ReceivedMessage = match serde_json::from_str(&text) {
                Ok(received) => received,
                Err(e) => {
                    error!("Failed to parse message on conn_id {}: {}", conn_id, e);
                    ctx.reply_error(&ClipError::Protocol(e.to_string()));
                    continue;
                }
            };

            match received {
                ReceivedMessage::Join(join_msg) => handle_join_message(&join_msg, &ctx),
                ReceivedMessage::Resume(resume_msg) => handle_resume_message(&resume_msg, &ctx),
                ReceivedMessage::Update(update_msg) => handle_update_message(update_msg, &ctx),
                ReceivedMessage::Leave => handle_leave_message(&ctx),
                ReceivedMessage::Ping => handle_ping_message(&ctx),
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // No LEAVE was seen: keep the membership for the grace window
    ctx.release();
    state.connections.fetch_sub(1, Ordering::Relaxed);
    info!("WebSocket connection terminated for conn_id: {}", conn_id);
}
