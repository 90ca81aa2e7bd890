use axum::{http::StatusCode, Json};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Errors raised by the room, session and blob layers.
///
/// Every error is local to the session or request that caused it; none of
/// them abort other members of a room.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipError {
    /// Tag is not exactly 4 ASCII alphanumeric characters.
    #[error("Invalid ClipTag '{0}'. Must be 4 alphanumeric characters.")]
    InvalidRoomTag(String),

    /// Inline text exceeds the configured bound. The revision is unchanged.
    #[error("Content too long: {size} characters (maximum {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    /// No live room for the tag. Clients restart with a fresh JOIN.
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    /// Transient transport loss, handled by the grace window.
    #[error("Transport failure")]
    TransportFailure,

    /// Resume with an unknown or already closed session id.
    #[error("Session cannot be resumed, join again")]
    DuplicateSessionResume,

    /// Message that requires a joined session arrived before JOIN/RESUME.
    #[error("Connection has not joined a room")]
    NotJoined,

    /// JOIN/RESUME on a connection that is already attached to a session.
    #[error("Connection is already attached to a session")]
    AlreadyJoined,

    /// Unparseable or unexpected client frame.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("File not found")]
    FileNotFound,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

impl ClipError {
    /// Stable code sent to clients in `error` frames.
    pub fn code(&self) -> &'static str {
        match self {
            ClipError::InvalidRoomTag(_) => "InvalidRoomTag",
            ClipError::PayloadTooLarge { .. } => "PayloadTooLarge",
            ClipError::RoomNotFound(_) => "RoomNotFound",
            ClipError::TransportFailure => "TransportFailure",
            ClipError::DuplicateSessionResume => "DuplicateSessionResume",
            ClipError::NotJoined => "NotJoined",
            ClipError::AlreadyJoined => "AlreadyJoined",
            ClipError::Protocol(_) => "ProtocolError",
            ClipError::FileNotFound => "FileNotFound",
            ClipError::InvalidUpload(_) => "InvalidUpload",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ClipError::InvalidRoomTag(_)
            | ClipError::NotJoined
            | ClipError::AlreadyJoined
            | ClipError::Protocol(_)
            | ClipError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ClipError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ClipError::RoomNotFound(_) | ClipError::FileNotFound => StatusCode::NOT_FOUND,
            ClipError::DuplicateSessionResume => StatusCode::CONFLICT,
            ClipError::TransportFailure => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Error shape returned by the REST handlers.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl From<ClipError> for ApiError {
    fn from(err: ClipError) -> Self {
        let status = err.status_code();
        (
            status,
            Json(ErrorResponse {
                code: status.as_u16(),
                status: status.to_string(),
                kind: err.code().to_string(),
                error: err.to_string(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_http_status() {
        let (status, Json(body)) = ApiError::from(ClipError::RoomNotFound("ABCD".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, 404);
        assert_eq!(body.kind, "RoomNotFound");
        assert!(body.error.contains("ABCD"));

        let (status, _) = ApiError::from(ClipError::PayloadTooLarge { size: 11, limit: 10 });
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let (status, _) = ApiError::from(ClipError::DuplicateSessionResume);
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ClipError::InvalidRoomTag("x".into()).code(), "InvalidRoomTag");
        assert_eq!(ClipError::TransportFailure.code(), "TransportFailure");
        assert_eq!(ClipError::Protocol("bad".into()).code(), "ProtocolError");
    }
}
