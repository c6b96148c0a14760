use async_trait::async_trait;
use pinhole_core::{
    NewShortUrl, OwnerId, Repository, ShortCode, ShortUrl, Shortened, Shortener, ShortenerError,
    StorageError,
};
use pinhole_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use url::Url;

/// Number of candidates tried before giving up on a create.
pub const MAX_ATTEMPTS: usize = 6;

/// Longest long URL accepted, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - URL validation
/// - Idempotent creation per `(owner, long_url)`
/// - Short code generation with a bounded collision retry
///
/// The repository enforces uniqueness atomically on insert. A rejected
/// insert counts as a collision and consumes one of the [`MAX_ATTEMPTS`].
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService`.
    pub fn new(repository: R, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validates that the URL is well formed, with an http(s) scheme and a host.
    fn validate_url(raw: &str) -> Result<(), ShortenerError> {
        if raw.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        if raw.len() > MAX_URL_LENGTH {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must be at most {} bytes, got {}",
                MAX_URL_LENGTH,
                raw.len()
            )));
        }

        // The parser silently strips these, so the stored URL would differ
        // from the one that was validated.
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ShortenerError::InvalidUrl(
                "URL must not contain whitespace or control characters".to_string(),
            ));
        }

        let url = Url::parse(raw).map_err(|err| {
            ShortenerError::InvalidUrl(format!("URL must have a valid scheme and host: {err}"))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                url.scheme()
            )));
        }

        // `http:host` and `http:///host` parse, but carry no explicit authority.
        let has_authority = raw
            .get(url.scheme().len()..)
            .and_then(|rest| rest.strip_prefix("://"))
            .is_some_and(|authority| !authority.starts_with('/'));
        if !has_authority || url.host_str().map_or(true, str::is_empty) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {raw}"
            )));
        }

        Ok(())
    }

    /// Stores a fresh mapping, retrying with a new candidate on every collision.
    async fn generate_and_insert(
        &self,
        owner: OwnerId,
        long_url: &str,
    ) -> Result<Shortened, ShortenerError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let candidate: ShortCode = self.generator.generate(long_url).into();

            if self.repository.find_by_code(&candidate).await?.is_some() {
                warn!(attempt, code = %candidate, "short code collision");
                continue;
            }

            let new = NewShortUrl {
                owner_id: owner,
                long_url: long_url.to_owned(),
                short_code: candidate,
            };

            match self.repository.insert(new).await {
                Ok(record) => {
                    info!(owner = %owner, code = %record.short_code, attempt, "short url created");
                    return Ok(Shortened::Created(record));
                }
                Err(StorageError::CodeConflict(code)) => {
                    warn!(attempt, code = %code, "short code taken by a concurrent insert");
                }
                Err(StorageError::OwnerUrlConflict { .. }) => {
                    // A concurrent create for the same pair won the race.
                    if let Some(existing) = self
                        .repository
                        .find_by_owner_and_url(owner, long_url)
                        .await?
                    {
                        debug!(owner = %owner, code = %existing.short_code, "returning concurrently created short url");
                        return Ok(Shortened::AlreadyExists(existing));
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        warn!(owner = %owner, attempts = MAX_ATTEMPTS, "short code generation exhausted");
        Err(ShortenerError::GenerationFailed {
            attempts: MAX_ATTEMPTS,
        })
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn create(&self, owner: OwnerId, long_url: &str) -> Result<Shortened, ShortenerError> {
        Self::validate_url(long_url)?;

        if let Some(existing) = self
            .repository
            .find_by_owner_and_url(owner, long_url)
            .await?
        {
            debug!(owner = %owner, code = %existing.short_code, "url already shortened");
            return Ok(Shortened::AlreadyExists(existing));
        }

        self.generate_and_insert(owner, long_url).await
    }

    async fn list(&self, owner: OwnerId) -> Result<Vec<ShortUrl>, ShortenerError> {
        let rows = self.repository.list_by_owner(owner).await?;
        trace!(owner = %owner, count = rows.len(), "listed short urls");
        Ok(rows)
    }

    async fn delete(&self, owner: OwnerId, code: &ShortCode) -> Result<bool, ShortenerError> {
        // Codes owned by others are reported as not found, so they are not revealed.
        let deleted = self.repository.delete_by_owner_and_code(owner, code).await?;
        if deleted {
            info!(owner = %owner, code = %code, "short url deleted");
        } else {
            trace!(owner = %owner, code = %code, "no owned short url to delete");
        }
        Ok(deleted)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>, ShortenerError> {
        trace!(code = %code, "resolving short code");

        let long_url = self
            .repository
            .find_by_code(code)
            .await?
            .map(|record| record.long_url);

        match &long_url {
            Some(url) => debug!(code = %code, url = %url, "resolved short code"),
            None => trace!(code = %code, "short code not found"),
        }

        Ok(long_url)
    }
}
