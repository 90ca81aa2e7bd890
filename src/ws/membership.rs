use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{JoinedMessage, MembersMessage, SendMessage};
use crate::ws::clipboard::Snapshot;
use crate::ws::registry::RoomRegistry;
use crate::ws::session::Session;

/// Outcome of [`MembershipTracker::leave`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    NotMember,
    Left { remaining: usize },
    RoomDestroyed,
}

/// Keeps each room's member set and ties room lifetime to it: the room is
/// created by the first join and destroyed by the last leave.
#[derive(Clone)]
pub struct MembershipTracker {
    registry: RoomRegistry,
}

impl MembershipTracker {
    pub fn new(registry: RoomRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Adds a `Connecting` session to the live room of its tag, activates it
    /// and pushes the current snapshot as `joined`. Other members get the
    /// new member count.
    pub fn join(&self, session: &Arc<Session>) -> Snapshot {
        loop {
            let room = self.registry.get_or_create(session.tag());
            let mut state = room.lock();
            if state.destroyed {
                // lost the race against the last leave, the tag is free again
                continue;
            }

            state.members.insert(session.id(), Arc::clone(session));
            session.activate();
            let snapshot = state.clipboard.snapshot();
            let members = state.members.len();

            let joined = SendMessage::Joined(JoinedMessage {
                session_id: session.id(),
                tag: session.tag().to_string(),
                revision: snapshot.revision,
                payload: snapshot.payload.clone(),
                members,
            });
            if let Err(e) = session.deliver(joined) {
                debug!(session_id = %session.id(), "Initial snapshot not delivered: {}", e);
            }
            state.fan_out(&SendMessage::Members(MembersMessage { count: members }), Some(session.id()));

            info!(
                tag = %session.tag(),
                session_id = %session.id(),
                revision = snapshot.revision,
                members,
                "Session joined room"
            );
            return snapshot;
        }
    }

    /// Removes the session from its room. Removing the last member destroys
    /// the room before the lock is released, so no later join can see it.
    pub fn leave(&self, session: &Session) -> Departure {
        let Some(room) = self.registry.get(session.tag()) else {
            return Departure::NotMember;
        };
        let mut state = room.lock();
        if state.destroyed || state.members.remove(&session.id()).is_none() {
            return Departure::NotMember;
        }

        if state.members.is_empty() {
            state.destroyed = true;
            self.registry.destroy(session.tag(), &room);
            info!(tag = %session.tag(), session_id = %session.id(), "Last member left");
            return Departure::RoomDestroyed;
        }

        let remaining = state.members.len();
        state.fan_out(&SendMessage::Members(MembersMessage { count: remaining }), None);
        info!(tag = %session.tag(), session_id = %session.id(), remaining, "Session left room");
        Departure::Left { remaining }
    }
}
