use tracing::info;

use crate::error::ClipError;
use crate::websocket::connctx::ConnCtx;

/// Handle a leave message. The connection stays open and may join again.
///
/// A session taken over by another connection is only detached from this
/// one; the resumed session keeps running.
pub fn handle_leave_message(ctx: &ConnCtx) {
    let Some(session) = ctx.take_session() else {
        ctx.reply_error(&ClipError::NotJoined);
        return;
    };
    info!("Leave message received for {}: session={}", session.tag(), session.id());
    if let Err(e) = ctx.gateway.leave_from(&session, ctx.conn_id) {
        ctx.reply_error(&e);
    }
}
