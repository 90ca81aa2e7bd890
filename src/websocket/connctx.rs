use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, warn};

use crate::error::ClipError;
use crate::models::SendMessage;
use crate::ws::{Link, Session, SessionGateway};

/// Per-connection context shared by the message handlers.
///
/// `attached` is also held by the connection teardown so it can hand the
/// session to the grace path after either task has stopped.
#[derive(Clone)]
pub struct ConnCtx {
    pub conn_id: u64,
    pub gateway: SessionGateway,
    tx: mpsc::Sender<SendMessage>,
    kick: Arc<Notify>,
    attached: Arc<Mutex<Option<Arc<Session>>>>,
}

impl ConnCtx {
    pub fn new(
        conn_id: u64,
        gateway: SessionGateway,
        tx: mpsc::Sender<SendMessage>,
        kick: Arc<Notify>,
    ) -> Self {
        Self {
            conn_id,
            gateway,
            tx,
            kick,
            attached: Arc::new(Mutex::new(None)),
        }
    }

    /// Outbound handle for a session bound to this connection.
    pub fn link(&self) -> Link {
        Link::new(self.conn_id, self.tx.clone(), Arc::clone(&self.kick))
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.attached.lock().clone()
    }

    pub fn attach(&self, session: Arc<Session>) {
        *self.attached.lock() = Some(session);
    }

    pub fn take_session(&self) -> Option<Arc<Session>> {
        self.attached.lock().take()
    }

    /// Queues a frame for this connection only, outside any session.
    pub fn reply(&self, msg: SendMessage) {
        if let Err(e) = self.tx.try_send(msg) {
            warn!(conn_id = self.conn_id, "Reply not queued: {}", e);
            self.kick.notify_one();
        }
    }

    pub fn reply_error(&self, err: &ClipError) {
        debug!(conn_id = self.conn_id, code = err.code(), "Rejecting client message: {}", err);
        self.reply(SendMessage::error(err));
    }

    /// Releases the attached session to the grace path, if this connection
    /// still owns it.
    pub fn release(&self) {
        if let Some(session) = self.take_session() {
            self.gateway.on_transport_lost(&session, self.conn_id);
        }
    }
}
