use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("activity index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("activity {0} not found")]
    NotFound(Uuid),
    #[error("invalid time {0:?}, expected HH:MM")]
    TimeParse(String),
    #[error("{0}")]
    InvalidInput(String),
}

impl TrackerError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

/// Failures of best-effort side effects. These are logged where they happen
/// and never bubble past the reminder tick.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("notification permission denied")]
    NotificationDenied,
    #[error("audio playback failed: {0}")]
    AudioPlaybackFailed(String),
    #[error("share failed: {0}")]
    ShareFailed(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        let status = match &err {
            TrackerError::NotFound(_) | TrackerError::IndexOutOfRange { .. } => {
                StatusCode::NOT_FOUND
            }
            TrackerError::TimeParse(_) | TrackerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TrackerError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
