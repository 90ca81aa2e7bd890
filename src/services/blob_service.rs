use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use moka::sync::Cache;
use tracing::info;
use uuid::Uuid;

use crate::error::ClipError;
use crate::models::FileRef;
use crate::ws::tag::RoomTag;

pub struct StoredBlob {
    pub tag: RoomTag,
    pub file: FileRef,
    pub bytes: Bytes,
}

/// In-memory store for uploaded files.
///
/// Entries live at most `ttl` after upload and are purged with their room.
/// Clipboard payloads only ever carry the [`FileRef`], never the bytes.
#[derive(Clone)]
pub struct BlobStore {
    cache: Cache<Uuid, Arc<StoredBlob>>,
    ttl: Duration,
}

impl BlobStore {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }

    pub fn store(&self, tag: &RoomTag, name: String, mime_type: String, bytes: Bytes) -> FileRef {
        let file = FileRef {
            id: Uuid::new_v4(),
            name,
            size: bytes.len() as u64,
            mime_type,
            uploaded_at: Utc::now(),
        };
        info!(tag = %tag, file_id = %file.id, size = file.size, "Stored file \"{}\"", file.name);
        self.cache.insert(
            file.id,
            Arc::new(StoredBlob {
                tag: tag.clone(),
                file: file.clone(),
                bytes,
            }),
        );
        file
    }

    /// Looks a file up within one room. Files of other rooms are invisible.
    pub fn get(&self, tag: &RoomTag, id: &Uuid) -> Result<Arc<StoredBlob>, ClipError> {
        self.cache
            .get(id)
            .filter(|blob| &blob.tag == tag)
            .ok_or(ClipError::FileNotFound)
    }

    /// Files of a room, oldest first.
    pub fn list(&self, tag: &RoomTag) -> Vec<FileRef> {
        let mut files: Vec<FileRef> = self
            .cache
            .iter()
            .filter(|(_, blob)| &blob.tag == tag)
            .map(|(_, blob)| blob.file.clone())
            .collect();
        files.sort_by_key(|f| f.uploaded_at);
        files
    }

    pub fn remove(&self, tag: &RoomTag, id: &Uuid) -> Result<FileRef, ClipError> {
        let blob = self.get(tag, id)?;
        self.cache.invalidate(id);
        info!(tag = %tag, file_id = %id, "Deleted file");
        Ok(blob.file.clone())
    }

    /// Drops every file of `tag`. Returns how many were removed.
    pub fn purge_room(&self, tag: &RoomTag) -> usize {
        let ids: Vec<Uuid> = self
            .cache
            .iter()
            .filter(|(_, blob)| &blob.tag == tag)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.cache.invalidate(id);
        }
        if !ids.is_empty() {
            info!(tag = %tag, count = ids.len(), "Purged room files");
        }
        ids.len()
    }

    pub fn expires_at(&self, file: &FileRef) -> DateTime<Utc> {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        file.uploaded_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
