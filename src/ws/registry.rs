use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::services::BlobStore;
use crate::ws::room::Room;
use crate::ws::tag::RoomTag;

/// Process-wide table of live rooms.
///
/// The raw map is never exposed: rooms are only created through
/// [`RoomRegistry::get_or_create`] and dropped through
/// [`RoomRegistry::destroy`]. Sharded locking keeps different tags
/// independent.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomTag, Arc<Room>>>,
    blobs: BlobStore,
}

impl RoomRegistry {
    pub fn new(blobs: BlobStore) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            blobs,
        }
    }

    /// Returns the room for `tag`, creating it when absent. Concurrent
    /// first-joins on one tag all receive the same instance.
    ///
    /// The caller must check `destroyed` after locking: a room can be torn
    /// down between this lookup and the lock.
    pub fn get_or_create(&self, tag: &RoomTag) -> Arc<Room> {
        let room = self
            .rooms
            .entry(tag.clone())
            .or_insert_with(|| {
                info!(tag = %tag, "Room created");
                Arc::new(Room::new(tag.clone()))
            })
            .value()
            .clone();
        room
    }

    pub fn get(&self, tag: &RoomTag) -> Option<Arc<Room>> {
        self.rooms.get(tag).map(|entry| Arc::clone(entry.value()))
    }

    pub fn exists(&self, tag: &RoomTag) -> bool {
        self.rooms.contains_key(tag)
    }

    /// Whether `room` is still the instance registered under its tag.
    pub fn is_current(&self, room: &Arc<Room>) -> bool {
        self.rooms
            .get(room.tag())
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), room))
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Removes `room` from the table and purges its files.
    ///
    /// Idempotent, and only removes that exact instance: if a newer room
    /// already took the tag it survives. Returns whether anything was removed.
    pub fn destroy(&self, tag: &RoomTag, room: &Arc<Room>) -> bool {
        let removed = self
            .rooms
            .remove_if(tag, |_, current| Arc::ptr_eq(current, room))
            .is_some();
        if removed {
            self.blobs.purge_room(tag);
            info!(tag = %tag, "Room destroyed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Total members over all live rooms.
    pub fn member_count(&self) -> usize {
        let rooms: Vec<Arc<Room>> = self.rooms.iter().map(|e| Arc::clone(e.value())).collect();
        rooms.iter().map(|room| room.lock().members.len()).sum()
    }
}
