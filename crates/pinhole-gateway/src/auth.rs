use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use pinhole_core::OwnerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// JWT claims identifying the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The owner id of the authenticated user.
    pub sub: OwnerId,
    /// Expiry as unix seconds.
    pub exp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
}

/// Resolves the caller of a request to an owner id.
pub trait IdentityProvider: Send + Sync + 'static {
    fn identify(&self, headers: &HeaderMap) -> Result<OwnerId, AuthError>;
}

/// Verifies HS256-signed bearer tokens.
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn identify(&self, headers: &HeaderMap) -> Result<OwnerId, AuthError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                // auth scheme names are case-insensitive
                let (scheme, token) = value.split_once(' ')?;
                scheme.eq_ignore_ascii_case("bearer").then_some(token)
            })
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            debug!(error = %err, "rejecting bearer token");
            AuthError::InvalidToken
        })?;

        Ok(data.claims.sub)
    }
}

/// Extractor for the authenticated owner of a request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentOwner(pub OwnerId);

impl FromRequestParts<AppState> for CurrentOwner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let owner = state.identity().identify(&parts.headers)?;
        Ok(CurrentOwner(owner))
    }
}
