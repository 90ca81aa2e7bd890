use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::models::SendMessage;
use crate::ws::clipboard::ClipboardStore;
use crate::ws::session::{Session, SessionId};
use crate::ws::tag::RoomTag;

/// Ephemeral shared-state container for one ClipTag.
///
/// All mutations of a room (join, leave, apply) run under its single lock,
/// which gives every room a total order of events. Rooms never share locks.
pub struct Room {
    tag: RoomTag,
    created_at: DateTime<Utc>,
    state: Mutex<RoomState>,
}

pub struct RoomState {
    pub clipboard: ClipboardStore,
    pub members: HashMap<SessionId, Arc<Session>>,
    /// Set under the lock right before the registry drops this instance.
    /// A joiner that finds it set must look the tag up again.
    pub destroyed: bool,
}

impl Room {
    pub fn new(tag: RoomTag) -> Self {
        Self {
            tag,
            created_at: Utc::now(),
            state: Mutex::new(RoomState {
                clipboard: ClipboardStore::new(),
                members: HashMap::new(),
                destroyed: false,
            }),
        }
    }

    pub fn tag(&self) -> &RoomTag {
        &self.tag
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock()
    }
}

impl RoomState {
    /// Fire-and-forget delivery to every member except `except`.
    ///
    /// Never blocks: slow members are kicked by their session and pick the
    /// state up again on resume. Returns how many frames were queued.
    pub fn fan_out(&self, msg: &SendMessage, except: Option<SessionId>) -> usize {
        let mut delivered = 0;
        for (id, session) in &self.members {
            if Some(*id) == except {
                continue;
            }
            match session.deliver(msg.clone()) {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(e) => debug!(session_id = %id, "Broadcast not delivered: {}", e),
            }
        }
        delivered
    }
}
