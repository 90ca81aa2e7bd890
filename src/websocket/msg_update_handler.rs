use tracing::debug;

use crate::error::ClipError;
use crate::models::UpdateMessage;
use crate::websocket::connctx::ConnCtx;

/// Handle UpdateMessage
pub fn handle_update_message(update_msg: UpdateMessage, ctx: &ConnCtx) {
    let Some(session) = ctx.session() else {
        ctx.reply_error(&ClipError::NotJoined);
        return;
    };

    // Session was resumed on another connection
    if session.conn_id() != Some(ctx.conn_id) {
        ctx.take_session();
        ctx.reply_error(&ClipError::NotJoined);
        return;
    }

    debug!(
        "Update message received for {}: session={}, revision={:?}",
        session.tag(),
        session.id(),
        update_msg.revision
    );

    // Ack and sync are queued by the engine; only failures answer here
    if let Err(e) = ctx
        .gateway
        .update(&session, update_msg.payload, update_msg.revision)
    {
        ctx.reply_error(&e);
    }
}
