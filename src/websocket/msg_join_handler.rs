use tracing::info;

use crate::error::ClipError;
use crate::models::JoinMessage;
use crate::websocket::connctx::ConnCtx;

/// Handle JoinMessage
pub fn handle_join_message(join_msg: &JoinMessage, ctx: &ConnCtx) {
    info!("Join message received on connection {} for tag {}", ctx.conn_id, join_msg.tag);

    if ctx.session().is_some() {
        ctx.reply_error(&ClipError::AlreadyJoined);
        return;
    }

    // The joined snapshot is queued by the gateway itself
    match ctx.gateway.connect(&join_msg.tag, ctx.link()) {
        Ok(session) => ctx.attach(session),
        Err(e) => ctx.reply_error(&e),
    }
}
