use crate::owner::OwnerId;
use crate::repository::ShortUrl;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Successful outcome of [`Shortener::create`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shortened {
    /// A new mapping was stored.
    Created(ShortUrl),
    /// The owner had already shortened this URL; the existing mapping is returned.
    AlreadyExists(ShortUrl),
}

impl Shortened {
    pub fn record(&self) -> &ShortUrl {
        match self {
            Shortened::Created(record) | Shortened::AlreadyExists(record) => record,
        }
    }

    pub fn into_record(self) -> ShortUrl {
        match self {
            Shortened::Created(record) | Shortened::AlreadyExists(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Shortened::Created(_))
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens `long_url` on behalf of `owner`.
    ///
    /// Idempotent per `(owner, long_url)`: a repeated call returns the
    /// stored mapping as [`Shortened::AlreadyExists`].
    async fn create(&self, owner: OwnerId, long_url: &str) -> Result<Shortened>;

    /// Lists the mappings created by `owner`. An empty list means the
    /// owner has no records.
    async fn list(&self, owner: OwnerId) -> Result<Vec<ShortUrl>>;

    /// Deletes a mapping on behalf of `owner`.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, owner: OwnerId, code: &ShortCode) -> Result<bool>;

    /// Resolves a short code to its long URL. Public: no ownership check.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>>;
}
