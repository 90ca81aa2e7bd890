use tracing::info;

use crate::error::ClipError;
use crate::models::ResumeMessage;
use crate::websocket::connctx::ConnCtx;

/// Handle ResumeMessage
pub fn handle_resume_message(resume_msg: &ResumeMessage, ctx: &ConnCtx) {
    info!(
        "Resume message received on connection {}: session={}, lastSeenRevision={}",
        ctx.conn_id, resume_msg.session_id, resume_msg.last_seen_revision
    );

    if ctx.session().is_some() {
        ctx.reply_error(&ClipError::AlreadyJoined);
        return;
    }

    match ctx
        .gateway
        .resume(resume_msg.session_id, resume_msg.last_seen_revision, ctx.link())
    {
        Ok(session) => ctx.attach(session),
        Err(e) => ctx.reply_error(&e),
    }
}
