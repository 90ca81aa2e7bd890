use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::FileRef;

/// File metadata with its remaining lifetime in the blob store
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoResponse {
    #[serde(flatten)]
    pub file: FileRef,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    pub files: Vec<FileInfoResponse>,
    pub total_files: usize,
    pub total_size: u64,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileDeleteResponse {
    pub message: String,
}
