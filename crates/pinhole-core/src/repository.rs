use crate::error::StorageError;
use crate::owner::OwnerId;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored short URL mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortUrl {
    /// Identifier assigned by the store on insertion.
    pub id: u64,
    /// The user who created the mapping.
    pub owner_id: OwnerId,
    /// The original URL that was shortened.
    pub long_url: String,
    /// The code resolving to `long_url`.
    pub short_code: ShortCode,
    /// When the mapping was stored.
    pub created_at: Timestamp,
}

/// A mapping about to be inserted; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortUrl {
    pub owner_id: OwnerId,
    pub long_url: String,
    pub short_code: ShortCode,
}

/// A read-only view of a repository.
///
/// Resolution only needs these operations, so it can run against a
/// read replica or any other read-only backend.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the mapping for a given short code.
    /// Returns `None` if the code does not exist.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>>;

    /// Retrieves the mapping an owner already created for `long_url`, if any.
    async fn find_by_owner_and_url(
        &self,
        owner: OwnerId,
        long_url: &str,
    ) -> Result<Option<ShortUrl>>;

    /// Lists every mapping created by `owner`, in store-defined order.
    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<ShortUrl>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new mapping atomically.
    ///
    /// Returns `Err(CodeConflict)` if the short code is taken and
    /// `Err(OwnerUrlConflict)` if the owner already shortened the URL.
    async fn insert(&self, new: NewShortUrl) -> Result<ShortUrl>;

    /// Deletes the mapping for a given short code.
    /// Returns `true` if the record existed and was removed.
    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool>;

    /// Deletes the mapping for `code` only if it belongs to `owner`, as a
    /// single atomic step.
    /// Returns `true` if a matching record existed and was removed.
    async fn delete_by_owner_and_code(&self, owner: OwnerId, code: &ShortCode) -> Result<bool>;
}
