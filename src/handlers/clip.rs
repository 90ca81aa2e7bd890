use axum::{extract::{Path, State}, http::StatusCode, Json};
use chrono::Utc;
use tracing::info;

use crate::error::ApiError;
use crate::models::{ClipPayload, ClipResponse, ClipUpdateRequest};
use crate::ws::engine::{Applied, UpdateEvent};
use crate::ws::RoomTag;
use crate::AppState;

fn applied_response(tag: &RoomTag, applied: Applied) -> ClipResponse {
    ClipResponse {
        tag: tag.to_string(),
        revision: applied.revision,
        payload: applied.payload,
        updated_at: applied.updated_at,
    }
}

/// Current clipboard of a room. Never creates one: an unknown tag reads as
/// an empty clipboard at revision 0.
pub async fn get_clip(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<(StatusCode, Json<ClipResponse>), ApiError> {
    let tag = RoomTag::parse(&tag)?;
    let response = match state.gateway.engine().view(&tag) {
        Some(view) => ClipResponse {
            tag: tag.to_string(),
            revision: view.revision,
            payload: view.payload,
            updated_at: view.updated_at,
        },
        None => ClipResponse {
            tag: tag.to_string(),
            revision: 0,
            payload: ClipPayload::default(),
            updated_at: Utc::now(),
        },
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Replace the clipboard of a live room. Every member receives `sync`.
pub async fn update_clip(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Json(body): Json<ClipUpdateRequest>,
) -> Result<(StatusCode, Json<ClipResponse>), ApiError> {
    let tag = RoomTag::parse(&tag)?;
    let applied = state.gateway.engine().apply(UpdateEvent {
        tag: tag.clone(),
        submitted_revision: body.revision,
        payload: body.payload,
        submitter: None,
    })?;
    info!("Clipboard of {} replaced over HTTP, revision {}", tag, applied.revision);
    Ok((StatusCode::OK, Json(applied_response(&tag, applied))))
}

/// Clear the clipboard of a live room. Clearing is a regular write.
pub async fn clear_clip(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<(StatusCode, Json<ClipResponse>), ApiError> {
    let tag = RoomTag::parse(&tag)?;
    let applied = state.gateway.engine().apply(UpdateEvent {
        tag: tag.clone(),
        submitted_revision: None,
        payload: ClipPayload::default(),
        submitter: None,
    })?;
    info!("Clipboard of {} cleared over HTTP, revision {}", tag, applied.revision);
    Ok((StatusCode::OK, Json(applied_response(&tag, applied))))
}
