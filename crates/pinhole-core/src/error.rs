use crate::owner::OwnerId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors related to the core types of the URL shortener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors reported by a storage backend.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short code already exists: {0}")]
    CodeConflict(String),
    #[error("url already shortened by owner {owner}: {long_url}")]
    OwnerUrlConflict { owner: OwnerId, long_url: String },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

/// Errors returned by shortener operations.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("failed to generate a unique short code after {attempts} attempts")]
    GenerationFailed { attempts: usize },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
