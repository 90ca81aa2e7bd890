use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::ClipError;
use crate::models::{AckMessage, ClipPayload, FileRef, FileUploadedMessage, SendMessage, SyncMessage};
use crate::ws::registry::RoomRegistry;
use crate::ws::room::Room;
use crate::ws::session::SessionId;
use crate::ws::tag::RoomTag;

/// One clipboard write. Not stored beyond producing the next revision.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub tag: RoomTag,
    /// Revision the submitter believed was current. Never used to reject.
    pub submitted_revision: Option<u64>,
    pub payload: ClipPayload,
    /// `None` for writes that did not come from a room member (REST).
    pub submitter: Option<SessionId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub revision: u64,
    pub payload: ClipPayload,
    pub updated_at: DateTime<Utc>,
    /// Members that had the `sync` frame queued.
    pub delivered: usize,
}

/// Read-only view of a live room.
#[derive(Debug, Clone)]
pub struct RoomView {
    pub tag: RoomTag,
    pub revision: u64,
    pub payload: ClipPayload,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub members: usize,
}

/// Applies clipboard writes and fans the result out to the room.
///
/// Conflict policy is last-write-wins: every accepted write gets
/// `revision + 1` in the order the room lock is taken. The submitter gets
/// `ack`, every other member `sync`.
#[derive(Clone)]
pub struct SyncEngine {
    registry: RoomRegistry,
    max_clip_chars: usize,
}

impl SyncEngine {
    pub fn new(registry: RoomRegistry, max_clip_chars: usize) -> Self {
        Self { registry, max_clip_chars }
    }

    pub fn apply(&self, event: UpdateEvent) -> Result<Applied, ClipError> {
        let not_found = || ClipError::RoomNotFound(event.tag.to_string());
        let room = self.registry.get(&event.tag).ok_or_else(not_found)?;
        let mut state = room.lock();
        if state.destroyed {
            return Err(not_found());
        }
        if let Some(id) = event.submitter {
            if !state.members.contains_key(&id) {
                return Err(not_found());
            }
        }
        if let Some(base) = event.submitted_revision {
            if base < state.clipboard.revision() {
                debug!(tag = %event.tag, base, current = state.clipboard.revision(), "Write on stale base, last write wins");
            }
        }

        let snapshot = state.clipboard.replace(event.payload, self.max_clip_chars)?;

        if let Some(id) = event.submitter {
            if let Some(sender) = state.members.get(&id) {
                if let Err(e) = sender.deliver(SendMessage::Ack(AckMessage { revision: snapshot.revision })) {
                    debug!(session_id = %id, "Ack not delivered: {}", e);
                }
            }
        }
        let sync = SendMessage::Sync(SyncMessage {
            revision: snapshot.revision,
            payload: snapshot.payload.clone(),
            updated_at: snapshot.updated_at,
        });
        let delivered = state.fan_out(&sync, event.submitter);

        info!(tag = %event.tag, revision = snapshot.revision, delivered, "Clipboard updated");
        Ok(Applied {
            revision: snapshot.revision,
            payload: snapshot.payload,
            updated_at: snapshot.updated_at,
            delivered,
        })
    }

    /// Sends a revision-less notice (file events) to every member.
    pub fn notify(&self, tag: &RoomTag, msg: SendMessage) -> Result<usize, ClipError> {
        let room = self
            .registry
            .get(tag)
            .ok_or_else(|| ClipError::RoomNotFound(tag.to_string()))?;
        let state = room.lock();
        if state.destroyed {
            return Err(ClipError::RoomNotFound(tag.to_string()));
        }
        Ok(state.fan_out(&msg, None))
    }

    /// Stores an uploaded file into `room` and tells its members.
    ///
    /// `room` is the instance the upload started against. If it was destroyed
    /// meanwhile, even if a new room took the tag, the file is not stored.
    /// Storing under the room lock means a later destroy always purges it.
    pub fn publish_file(
        &self,
        room: &Arc<Room>,
        name: String,
        mime_type: String,
        bytes: Bytes,
    ) -> Result<FileRef, ClipError> {
        let state = room.lock();
        if state.destroyed || !self.registry.is_current(room) {
            return Err(ClipError::RoomNotFound(room.tag().to_string()));
        }
        let file = self.registry.blobs().store(room.tag(), name, mime_type, bytes);
        state.fan_out(&SendMessage::FileUploaded(FileUploadedMessage { file: file.clone() }), None);
        Ok(file)
    }

    pub fn view(&self, tag: &RoomTag) -> Option<RoomView> {
        let room = self.registry.get(tag)?;
        let state = room.lock();
        if state.destroyed {
            return None;
        }
        let snapshot = state.clipboard.snapshot();
        Some(RoomView {
            tag: tag.clone(),
            revision: snapshot.revision,
            payload: snapshot.payload,
            updated_at: snapshot.updated_at,
            created_at: room.created_at(),
            members: state.members.len(),
        })
    }
}
