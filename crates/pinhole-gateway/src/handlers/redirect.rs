use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pinhole_core::ShortCode;
use tracing::trace;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Public resolution: redirects to the long URL behind `short_code`.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    // A malformed code can never have been issued.
    let Ok(code) = ShortCode::new(short_code) else {
        return Err(AppError::NotFound("Url not found"));
    };

    let long_url = state
        .shortener()
        .resolve(&code)
        .await?
        .ok_or(AppError::NotFound("Url not found"))?;

    trace!(code = %code, "redirecting");
    Ok((StatusCode::FOUND, [(LOCATION, long_url)]).into_response())
}
