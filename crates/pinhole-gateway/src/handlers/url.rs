use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pinhole_core::{ShortCode, Shortened};

use crate::auth::CurrentOwner;
use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, Envelope, UrlResponse};
use crate::state::AppState;

pub async fn create_url_handler(
    State(state): State<AppState>,
    CurrentOwner(owner): CurrentOwner,
    request: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = request.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let long_url = request
        .long_url
        .ok_or_else(|| AppError::field("long_url", "Missing data for required field."))?;

    let shortened = state.shortener().create(owner, &long_url).await?;

    let (status, message) = match &shortened {
        Shortened::Created(_) => (StatusCode::CREATED, "Short url created"),
        Shortened::AlreadyExists(_) => (StatusCode::OK, "Url already in database."),
    };
    let body = UrlResponse::new(shortened.into_record(), state.base_url());

    Ok((status, Json(Envelope::data_with_message(body, message))).into_response())
}

pub async fn list_urls_handler(
    State(state): State<AppState>,
    CurrentOwner(owner): CurrentOwner,
) -> Result<Response> {
    let rows = state.shortener().list(owner).await?;

    if rows.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(Envelope::message("No shortened urls")),
        )
            .into_response());
    }

    let body: Vec<UrlResponse> = rows
        .into_iter()
        .map(|row| UrlResponse::new(row, state.base_url()))
        .collect();

    Ok(Json(Envelope::data(body)).into_response())
}

pub async fn delete_url_handler(
    State(state): State<AppState>,
    CurrentOwner(owner): CurrentOwner,
    Path(short_code): Path<String>,
) -> Result<Json<Envelope<()>>> {
    let code =
        ShortCode::new(short_code).map_err(|err| AppError::field("short_code", err.to_string()))?;

    if !state.shortener().delete(owner, &code).await? {
        return Err(AppError::NotFound("Short url not found"));
    }

    Ok(Json(Envelope::message("Record deleted")))
}
