use chrono::{DateTime, Utc};

use crate::error::ClipError;
use crate::models::ClipPayload;

/// Point-in-time copy of a room's clipboard.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub revision: u64,
    pub payload: ClipPayload,
    pub updated_at: DateTime<Utc>,
}

/// Authoritative clipboard value of one room.
///
/// Revisions start at 0 and grow by exactly one per accepted write. A
/// rejected write leaves both revision and payload untouched.
#[derive(Debug)]
pub struct ClipboardStore {
    revision: u64,
    payload: ClipPayload,
    updated_at: DateTime<Utc>,
}

impl ClipboardStore {
    pub fn new() -> Self {
        Self {
            revision: 0,
            payload: ClipPayload::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            payload: self.payload.clone(),
            updated_at: self.updated_at,
        }
    }

    /// Last-write-wins replace of the payload.
    pub fn replace(&mut self, payload: ClipPayload, max_chars: usize) -> Result<Snapshot, ClipError> {
        payload.check_size(max_chars)?;
        self.revision += 1;
        self.payload = payload;
        self.updated_at = Utc::now();
        Ok(self.snapshot())
    }
}

impl Default for ClipboardStore {
    fn default() -> Self {
        Self::new()
    }
}
