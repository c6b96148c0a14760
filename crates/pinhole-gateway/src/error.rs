use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pinhole_core::ShortenerError;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::model::{Envelope, FieldErrors};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("short code generation failed")]
    GenerationFailed,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A validation failure on a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_owned(), vec![message.into()]);
        AppError::Validation(fields)
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::InvalidUrl(message) => AppError::field("long_url", message),
            ShortenerError::GenerationFailed { .. } => AppError::GenerationFailed,
            ShortenerError::Storage(source) => AppError::Internal(source.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(fields) => {
                (StatusCode::BAD_REQUEST, Json(Envelope::message(fields))).into_response()
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(Envelope::message(message))).into_response()
            }
            AppError::Unauthorized(source) => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, "Bearer")],
                Json(Envelope::message(source.to_string())),
            )
                .into_response(),
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(Envelope::message(message))).into_response()
            }
            AppError::GenerationFailed => (
                StatusCode::BAD_REQUEST,
                Json(Envelope::message("Failed to create short url")),
            )
                .into_response(),
            AppError::Internal(message) => {
                error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Envelope::message("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}
