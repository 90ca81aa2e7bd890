use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ClipPayload;

/// Current clipboard value of a room
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ClipResponse {
    pub tag: String,
    pub revision: u64,
    pub payload: ClipPayload,
    pub updated_at: DateTime<Utc>,
}

/// Request body for replacing the clipboard value over HTTP
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ClipUpdateRequest {
    pub payload: ClipPayload,
    #[serde(default)]
    pub revision: Option<u64>,
}
