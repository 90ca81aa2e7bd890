use axum::{extract::{Path, State}, http::StatusCode, Json};

use crate::error::{ApiError, ClipError};
use crate::models::RoomResponse;
use crate::ws::RoomTag;
use crate::AppState;

/// Describe a live room
pub async fn get_room(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<(StatusCode, Json<RoomResponse>), ApiError> {
    let tag = RoomTag::parse(&tag)?;
    let view = state
        .gateway
        .engine()
        .view(&tag)
        .ok_or_else(|| ClipError::RoomNotFound(tag.to_string()))?;
    Ok((
        StatusCode::OK,
        Json(RoomResponse {
            tag: view.tag.to_string(),
            revision: view.revision,
            members: view.members,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }),
    ))
}
