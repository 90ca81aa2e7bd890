use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Process and room statistics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Diagnostics snapshot", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

/// Describe a live room
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{tag}",
    params(("tag" = String, Path, description = "4 character ClipTag")),
    responses(
        (status = 200, description = "Room found", body = RoomResponse),
        (status = 400, description = "Invalid ClipTag", body = ErrorResponse),
        (status = 404, description = "No live room for the tag", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_room_doc() {}

/// Read the clipboard of a room
#[utoipa::path(
    get,
    path = "/api/v1/clip/{tag}",
    params(("tag" = String, Path, description = "4 character ClipTag")),
    responses(
        (status = 200, description = "Current clipboard, empty at revision 0 when no room exists", body = ClipResponse),
        (status = 400, description = "Invalid ClipTag", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_clip_doc() {}

/// Replace the clipboard of a live room
#[utoipa::path(
    post,
    path = "/api/v1/clip/{tag}",
    params(("tag" = String, Path, description = "4 character ClipTag")),
    request_body = ClipUpdateRequest,
    responses(
        (status = 200, description = "Clipboard replaced", body = ClipResponse),
        (status = 400, description = "Invalid ClipTag", body = ErrorResponse),
        (status = 404, description = "No live room for the tag", body = ErrorResponse),
        (status = 413, description = "Content too long", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_clip_doc() {}

/// Clear the clipboard of a live room
#[utoipa::path(
    delete,
    path = "/api/v1/clip/{tag}",
    params(("tag" = String, Path, description = "4 character ClipTag")),
    responses(
        (status = 200, description = "Clipboard cleared", body = ClipResponse),
        (status = 404, description = "No live room for the tag", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn clear_clip_doc() {}

/// Upload a file into a live room (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/v1/upload/{tag}",
    params(("tag" = String, Path, description = "4 character ClipTag")),
    responses(
        (status = 201, description = "File stored", body = FileInfoResponse),
        (status = 400, description = "Missing or empty file", body = ErrorResponse),
        (status = 404, description = "No live room for the tag", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn upload_file_doc() {}

/// List the files of a room
#[utoipa::path(
    get,
    path = "/api/v1/files/{tag}",
    params(("tag" = String, Path, description = "4 character ClipTag")),
    responses(
        (status = 200, description = "Files of the room", body = FileListResponse)
    )
)]
#[allow(dead_code)]
pub async fn list_files_doc() {}

/// Metadata of one file
#[utoipa::path(
    get,
    path = "/api/v1/file/{tag}/{file_id}",
    params(
        ("tag" = String, Path, description = "4 character ClipTag"),
        ("file_id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileInfoResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_file_doc() {}

/// Download one file
#[utoipa::path(
    get,
    path = "/api/v1/download/{tag}/{file_id}",
    params(
        ("tag" = String, Path, description = "4 character ClipTag"),
        ("file_id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File contents", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn download_file_doc() {}

/// Delete one file
#[utoipa::path(
    delete,
    path = "/api/v1/file/{tag}/{file_id}",
    params(
        ("tag" = String, Path, description = "4 character ClipTag"),
        ("file_id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File deleted", body = FileDeleteResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn delete_file_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        diagnostics_doc,
        get_room_doc,
        get_clip_doc,
        update_clip_doc,
        clear_clip_doc,
        upload_file_doc,
        list_files_doc,
        get_file_doc,
        download_file_doc,
        delete_file_doc,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            DiagnosticsResponse,
            ErrorResponse,
            RoomResponse,
            ClipResponse,
            ClipUpdateRequest,
            ClipPayload,
            FileRef,
            FileInfoResponse,
            FileListResponse,
            FileDeleteResponse,
        )
    ),
    tags(
        (name = "api", description = "ClipMe sync API endpoints")
    )
)]
pub struct ApiDoc;
