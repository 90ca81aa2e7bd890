use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ClipError};
use crate::models::{
    FileDeleteResponse, FileDeletedMessage, FileInfoResponse, FileListResponse, FileRef,
    SendMessage,
};
use crate::ws::RoomTag;
use crate::AppState;

const FILE_FIELD: &str = "file";

fn parse_file_path(tag: &str, file_id: &str) -> Result<(RoomTag, Uuid), ClipError> {
    let tag = RoomTag::parse(tag)?;
    let id = Uuid::parse_str(file_id).map_err(|_| ClipError::FileNotFound)?;
    Ok((tag, id))
}

fn file_info(state: &AppState, file: FileRef) -> FileInfoResponse {
    let expires_at = state.blobs.expires_at(&file);
    FileInfoResponse { file, expires_at }
}

/// Upload a file into a live room. Members are notified with `file_uploaded`.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileInfoResponse>), ApiError> {
    let tag = RoomTag::parse(&tag)?;
    // Pin the instance before the body streams in, the tag may be reused by then
    let room = state
        .gateway
        .registry()
        .get(&tag)
        .ok_or_else(|| ClipError::RoomNotFound(tag.to_string()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ClipError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ClipError::InvalidUpload(e.body_text()))?;
        if bytes.is_empty() {
            return Err(ClipError::InvalidUpload("file is empty".to_string()).into());
        }
        upload = Some((name, mime_type, bytes));
        break;
    }
    let (name, mime_type, bytes) =
        upload.ok_or_else(|| ClipError::InvalidUpload("No file uploaded.".to_string()))?;

    let file = state
        .gateway
        .engine()
        .publish_file(&room, name, mime_type, bytes)
        .inspect_err(|_| warn!("Room {} gone before upload completed, file discarded", tag))?;

    info!("File {} uploaded to {} ({} bytes)", file.id, tag, file.size);
    Ok((StatusCode::CREATED, Json(file_info(&state, file))))
}

/// List the files of a room, oldest first
pub async fn list_files(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<(StatusCode, Json<FileListResponse>), ApiError> {
    let tag = RoomTag::parse(&tag)?;
    let files: Vec<FileInfoResponse> = state
        .blobs
        .list(&tag)
        .into_iter()
        .map(|file| file_info(&state, file))
        .collect();
    let total_size = files.iter().map(|f| f.file.size).sum();
    Ok((
        StatusCode::OK,
        Json(FileListResponse {
            total_files: files.len(),
            total_size,
            files,
        }),
    ))
}

/// Metadata of one file
pub async fn get_file(
    State(state): State<AppState>,
    Path((tag, file_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<FileInfoResponse>), ApiError> {
    let (tag, id) = parse_file_path(&tag, &file_id)?;
    let blob = state.blobs.get(&tag, &id)?;
    Ok((StatusCode::OK, Json(file_info(&state, blob.file.clone()))))
}

/// Download the bytes of one file as an attachment
pub async fn download_file(
    State(state): State<AppState>,
    Path((tag, file_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (tag, id) = parse_file_path(&tag, &file_id)?;
    let blob = state.blobs.get(&tag, &id)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        blob.file.name.replace(['"', '\\', '\r', '\n'], "_")
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, blob.file.mime_type.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        blob.bytes.clone(),
    )
        .into_response())
}

/// Delete one file. Members are notified with `file_deleted`.
pub async fn delete_file(
    State(state): State<AppState>,
    Path((tag, file_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<FileDeleteResponse>), ApiError> {
    let (tag, id) = parse_file_path(&tag, &file_id)?;
    let file = state.blobs.remove(&tag, &id)?;
    let notice = SendMessage::FileDeleted(FileDeletedMessage { file_id: file.id });
    // no members left to tell is fine
    let _ = state.gateway.engine().notify(&tag, notice);
    Ok((
        StatusCode::OK,
        Json(FileDeleteResponse {
            message: format!("File {} deleted", file.name),
        }),
    ))
}
