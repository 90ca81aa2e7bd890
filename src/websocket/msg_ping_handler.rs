use chrono::Utc;
use tracing::debug;

use crate::models::{PongMessage, SendMessage};
use crate::websocket::connctx::ConnCtx;

/// Handle a ping message - send a pong back.
pub fn handle_ping_message(ctx: &ConnCtx) {
    debug!("Ping message received on connection {}", ctx.conn_id);
    ctx.reply(SendMessage::Pong(PongMessage {
        date: Utc::now().to_rfc3339(),
    }));
}
