use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::ClipError;
use crate::models::{AckMessage, ClipPayload, SendMessage, SyncMessage};
use crate::ws::engine::{Applied, SyncEngine, UpdateEvent};
use crate::ws::membership::{Departure, MembershipTracker};
use crate::ws::registry::RoomRegistry;
use crate::ws::session::{Link, Session, SessionId, SessionTable};
use crate::ws::tag::RoomTag;

struct GatewayInner {
    membership: MembershipTracker,
    engine: SyncEngine,
    sessions: SessionTable,
    grace_window: Duration,
    next_conn_id: AtomicU64,
}

/// Entry point used by transports. Wires sessions to the membership tracker
/// and the sync engine, and owns the disconnect/grace lifecycle.
#[derive(Clone)]
pub struct SessionGateway {
    inner: Arc<GatewayInner>,
}

impl SessionGateway {
    pub fn new(registry: RoomRegistry, max_clip_chars: usize, grace_window: Duration) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                membership: MembershipTracker::new(registry.clone()),
                engine: SyncEngine::new(registry, max_clip_chars),
                sessions: SessionTable::new(),
                grace_window,
                next_conn_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        self.inner.membership.registry()
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.inner.engine
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.inner.sessions
    }

    /// Unique id for a new transport connection.
    pub fn next_conn_id(&self) -> u64 {
        self.inner.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    /// `JOIN(tag)`. A malformed tag fails before any state is touched.
    pub fn connect(&self, candidate: &str, link: Link) -> Result<Arc<Session>, ClipError> {
        let tag = RoomTag::parse(candidate)?;
        let session = Session::new(tag, link);
        self.inner.sessions.insert(Arc::clone(&session));
        self.inner.membership.join(&session);
        Ok(session)
    }

    /// `RESUME(sessionId, lastSeenRevision)` on a new transport.
    ///
    /// Answers `sync` when the client is behind (or ahead of a recreated
    /// room), `ack_current` otherwise. The reply is queued under the room
    /// lock so no concurrent `sync` can overtake it.
    pub fn resume(
        &self,
        session_id: SessionId,
        last_seen_revision: u64,
        link: Link,
    ) -> Result<Arc<Session>, ClipError> {
        let session = self
            .inner
            .sessions
            .get(&session_id)
            .ok_or(ClipError::DuplicateSessionResume)?;
        let tag = session.tag().clone();
        let conn_id = link.conn_id();

        let room = self
            .registry()
            .get(&tag)
            .ok_or_else(|| ClipError::RoomNotFound(tag.to_string()))?;
        let state = room.lock();
        if state.destroyed || !state.members.contains_key(&session_id) {
            return Err(ClipError::RoomNotFound(tag.to_string()));
        }
        session.resume(link)?;

        let snapshot = state.clipboard.snapshot();
        let reply = if last_seen_revision != snapshot.revision {
            SendMessage::Sync(SyncMessage {
                revision: snapshot.revision,
                payload: snapshot.payload,
                updated_at: snapshot.updated_at,
            })
        } else {
            SendMessage::AckCurrent(AckMessage { revision: snapshot.revision })
        };
        if let Err(e) = session.deliver(reply) {
            debug!(session_id = %session_id, "Resume reply not delivered: {}", e);
        }
        drop(state);

        info!(
            tag = %tag,
            session_id = %session_id,
            conn_id,
            last_seen_revision,
            revision = snapshot.revision,
            "Session resumed"
        );
        Ok(session)
    }

    pub fn update(
        &self,
        session: &Session,
        payload: ClipPayload,
        submitted_revision: Option<u64>,
    ) -> Result<Applied, ClipError> {
        self.inner.engine.apply(UpdateEvent {
            tag: session.tag().clone(),
            submitted_revision,
            payload,
            submitter: Some(session.id()),
        })
    }

    /// Closes the session immediately, no grace window.
    pub fn leave(&self, session: &Session) -> Departure {
        self.depart(session, None).unwrap_or(Departure::NotMember)
    }

    /// Explicit `LEAVE` from transport `conn_id`. Refused with `NotJoined`
    /// when the session is no longer attached to that transport.
    pub fn leave_from(&self, session: &Session, conn_id: u64) -> Result<Departure, ClipError> {
        self.depart(session, Some(conn_id)).ok_or(ClipError::NotJoined)
    }

    fn depart(&self, session: &Session, conn_id: Option<u64>) -> Option<Departure> {
        // an unowned close still clears a session the room may list
        if !session.close(conn_id) && conn_id.is_some() {
            debug!(session_id = %session.id(), ?conn_id, "Leave from a transport that no longer owns the session");
            return None;
        }
        self.inner.sessions.remove(&session.id());
        let departure = self.inner.membership.leave(session);
        debug!(session_id = %session.id(), ?departure, "Session left");
        Some(departure)
    }

    /// Called when transport `conn_id` is gone without a `LEAVE`. If it still
    /// owned the session, the session goes `Disconnected` and the grace timer
    /// starts.
    pub fn on_transport_lost(&self, session: &Arc<Session>, conn_id: u64) {
        if !session.detach(Some(conn_id)) {
            return;
        }
        info!(
            tag = %session.tag(),
            session_id = %session.id(),
            conn_id,
            grace_ms = self.inner.grace_window.as_millis() as u64,
            "Session disconnected"
        );
        let membership = self.inner.membership.clone();
        let sessions = self.inner.sessions.clone();
        session.arm_grace_timer(self.inner.grace_window, move |session| {
            sessions.remove(&session.id());
            let departure = membership.leave(&session);
            info!(tag = %session.tag(), session_id = %session.id(), ?departure, "Grace window expired");
        });
    }
}
