use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for an error
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub code: u16,
    pub status: String,
    /// Stable error kind, e.g. `RoomNotFound`
    pub kind: String,
    pub error: String,
}
