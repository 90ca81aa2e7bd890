//! Connection sessions and their reconnect state machine.
//!
//! ```text
//! Connecting -> Active <-> Disconnected -> Closed
//!                  |                          ^
//!                  +------- explicit leave ---+
//! ```
//!
//! A session outlives its transport: when the socket drops the session goes
//! `Disconnected` and a grace timer is armed. A `RESUME` on a new socket
//! within the window reattaches it; otherwise the timer closes it and the
//! membership is released.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ClipError;
use crate::models::SendMessage;
use crate::ws::tag::RoomTag;

pub type SessionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Connecting,
    Active,
    Disconnected,
    Closed,
}

/// Outbound half of one transport connection.
#[derive(Clone, Debug)]
pub struct Link {
    conn_id: u64,
    tx: mpsc::Sender<SendMessage>,
    kick: Arc<Notify>,
}

impl Link {
    /// `kick` is notified when the session wants the transport torn down
    /// (queue overflow, takeover by a newer connection).
    pub fn new(conn_id: u64, tx: mpsc::Sender<SendMessage>, kick: Arc<Notify>) -> Self {
        Self { conn_id, tx, kick }
    }

    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    fn kick(&self) {
        self.kick.notify_one();
    }
}

struct GraceTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

struct SessionInner {
    state: SessionState,
    link: Option<Link>,
    last_seen_revision: u64,
    grace: Option<GraceTimer>,
    next_generation: u64,
}

impl SessionInner {
    fn cancel_grace(&mut self) {
        if let Some(timer) = self.grace.take() {
            timer.handle.abort();
        }
    }
}

pub struct Session {
    id: SessionId,
    tag: RoomTag,
    inner: Mutex<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(tag: RoomTag, link: Link) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            tag,
            inner: Mutex::new(SessionInner {
                state: SessionState::Connecting,
                link: Some(link),
                last_seen_revision: 0,
                grace: None,
                next_generation: 0,
            }),
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Room this session is attached to. Fixed for the session's lifetime.
    pub fn tag(&self) -> &RoomTag {
        &self.tag
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Last room revision handed to this session's transport.
    pub fn last_seen_revision(&self) -> u64 {
        self.inner.lock().last_seen_revision
    }

    pub fn conn_id(&self) -> Option<u64> {
        self.inner.lock().link.as_ref().map(Link::conn_id)
    }

    pub(crate) fn activate(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Connecting {
            return false;
        }
        inner.state = SessionState::Active;
        true
    }

    /// Queues `msg` without blocking.
    ///
    /// Returns `Ok(false)` when the session has no live transport (the
    /// message is dropped, the store stays authoritative). A full or closed
    /// queue kicks the transport and yields `TransportFailure`.
    pub fn deliver(&self, msg: SendMessage) -> Result<bool, ClipError> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Active {
            return Ok(false);
        }
        let revision = msg.revision();
        let sent = match &inner.link {
            Some(link) => match link.tx.try_send(msg) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(session_id = %self.id, conn_id = link.conn_id, "Outbound queue full, dropping transport");
                    link.kick();
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(session_id = %self.id, conn_id = link.conn_id, "Outbound queue closed");
                    link.kick();
                    false
                }
            },
            None => return Ok(false),
        };
        if !sent {
            return Err(ClipError::TransportFailure);
        }
        if let Some(revision) = revision {
            inner.last_seen_revision = revision;
        }
        Ok(true)
    }

    /// `Active -> Disconnected`. With `conn_id` set, only the transport that
    /// currently owns the session can detach it.
    pub(crate) fn detach(&self, conn_id: Option<u64>) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Active {
            return false;
        }
        if let Some(conn_id) = conn_id {
            if inner.link.as_ref().map(Link::conn_id) != Some(conn_id) {
                return false;
            }
        }
        inner.state = SessionState::Disconnected;
        if let Some(link) = inner.link.take() {
            link.kick();
        }
        true
    }

    /// Starts the grace timer of a `Disconnected` session. When it fires
    /// before a resume or close, the session is `Closed` and `on_expire` runs.
    pub(crate) fn arm_grace_timer<F>(self: &Arc<Self>, window: Duration, on_expire: F)
    where
        F: FnOnce(Arc<Session>) + Send + 'static,
    {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Disconnected {
            return;
        }
        inner.next_generation += 1;
        let generation = inner.next_generation;
        let session = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if session.expire(generation) {
                on_expire(session);
            }
        });
        inner.cancel_grace();
        inner.grace = Some(GraceTimer { generation, handle });
    }

    fn expire(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        let current = inner.grace.as_ref().map(|t| t.generation) == Some(generation);
        if !current || inner.state != SessionState::Disconnected {
            return false;
        }
        // dropping our own handle only detaches it
        inner.grace = None;
        inner.state = SessionState::Closed;
        true
    }

    /// Reattaches the session to a new transport.
    ///
    /// A still-`Active` session is taken over: the old transport is kicked.
    pub(crate) fn resume(&self, link: Link) -> Result<(), ClipError> {
        let mut inner = self.inner.lock();
        match inner.state {
            SessionState::Disconnected => inner.cancel_grace(),
            SessionState::Active => {
                if let Some(old) = inner.link.take() {
                    old.kick();
                }
            }
            SessionState::Connecting | SessionState::Closed => {
                return Err(ClipError::DuplicateSessionResume)
            }
        }
        inner.state = SessionState::Active;
        inner.link = Some(link);
        Ok(())
    }

    /// `Active | Disconnected -> Closed`, bypassing the grace window.
    ///
    /// With `Some(conn_id)` only that transport may close the session: it
    /// must be `Active` on that very link, so a connection that lost a
    /// takeover cannot close the resumed session.
    pub(crate) fn close(&self, conn_id: Option<u64>) -> bool {
        let mut inner = self.inner.lock();
        if let Some(conn_id) = conn_id {
            if inner.state != SessionState::Active
                || inner.link.as_ref().map(Link::conn_id) != Some(conn_id)
            {
                return false;
            }
        }
        match inner.state {
            SessionState::Active | SessionState::Disconnected => {
                inner.cancel_grace();
                inner.link = None;
                inner.state = SessionState::Closed;
                true
            }
            SessionState::Connecting | SessionState::Closed => false,
        }
    }
}

/// Process-wide lookup of resumable sessions.
#[derive(Clone, Default)]
pub struct SessionTable {
    sessions: Arc<DashMap<SessionId, Arc<Session>>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<Session>) {
        self.sessions.insert(session.id(), session);
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn count_in_state(&self, state: SessionState) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().state() == state)
            .count()
    }
}

#[cfg(test)]
pub(crate) fn test_link(
    conn_id: u64,
    capacity: usize,
) -> (Link, mpsc::Receiver<SendMessage>, Arc<Notify>) {
    let (tx, rx) = mpsc::channel(capacity);
    let kick = Arc::new(Notify::new());
    (Link::new(conn_id, tx, Arc::clone(&kick)), rx, kick)
}
