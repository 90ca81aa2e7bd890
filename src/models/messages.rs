use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClipError;
use crate::models::{ClipPayload, FileRef};

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JoinMessage {
    pub tag: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessage {
    pub payload: ClipPayload,
    /// Revision the sender believed was current. Informational only.
    #[serde(default)]
    pub revision: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMessage {
    pub session_id: Uuid,
    pub last_seen_revision: u64,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ReceivedMessage {
    #[serde(rename = "join")]
    Join(JoinMessage),
    #[serde(rename = "update")]
    Update(UpdateMessage),
    #[serde(rename = "resume")]
    Resume(ResumeMessage),
    #[serde(rename = "leave")]
    Leave,
    #[serde(rename = "ping")]
    Ping,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinedMessage {
    pub session_id: Uuid,
    pub tag: String,
    pub revision: u64,
    pub payload: ClipPayload,
    pub members: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AckMessage {
    pub revision: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    pub revision: u64,
    pub payload: ClipPayload,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MembersMessage {
    pub count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadedMessage {
    pub file: FileRef,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileDeletedMessage {
    pub file_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PongMessage {
    pub date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum SendMessage {
    #[serde(rename = "joined")]
    Joined(JoinedMessage),
    #[serde(rename = "ack")]
    Ack(AckMessage),
    #[serde(rename = "sync")]
    Sync(SyncMessage),
    #[serde(rename = "ack_current")]
    AckCurrent(AckMessage),
    #[serde(rename = "members")]
    Members(MembersMessage),
    #[serde(rename = "file_uploaded")]
    FileUploaded(FileUploadedMessage),
    #[serde(rename = "file_deleted")]
    FileDeleted(FileDeletedMessage),
    #[serde(rename = "error")]
    Error(ErrorMessage),
    #[serde(rename = "pong")]
    Pong(PongMessage),
}

impl SendMessage {
    /// Room revision carried by this frame, if any.
    pub fn revision(&self) -> Option<u64> {
        match self {
            SendMessage::Joined(m) => Some(m.revision),
            SendMessage::Ack(m) | SendMessage::AckCurrent(m) => Some(m.revision),
            SendMessage::Sync(m) => Some(m.revision),
            _ => None,
        }
    }

    pub fn error(err: &ClipError) -> Self {
        SendMessage::Error(ErrorMessage {
            code: err.code().to_string(),
            message: err.to_string(),
        })
    }
}
