use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use board_core::error::BoardError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BoardError::InvalidOwnerKind(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<BoardError>() {
            match e {
                BoardError::EmailExists(_) => StatusCode::CONFLICT,
                BoardError::NotInitialized
                | BoardError::InvalidCategory(_)
                | BoardError::InvalidPriority(_)
                | BoardError::InvalidRecurrence(_)
                | BoardError::InvalidOwnerKind(_)
                | BoardError::InvalidMetric(_) => StatusCode::BAD_REQUEST,
                BoardError::Remote { .. } | BoardError::Transport(_) => StatusCode::BAD_GATEWAY,
                BoardError::Io(_) | BoardError::Json(_) | BoardError::Yaml(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
