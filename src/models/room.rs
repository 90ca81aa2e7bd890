use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public view of a live room
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub tag: String,
    pub revision: u64,
    pub members: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
