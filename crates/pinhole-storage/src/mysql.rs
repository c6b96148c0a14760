use async_trait::async_trait;
use jiff::Timestamp;
use pinhole_core::repository::{ReadRepository, Repository, Result};
use pinhole_core::{NewShortUrl, OwnerId, ShortCode, ShortUrl, StorageError};
use sha2::{Digest, Sha256};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::trace;

/// Name of the unique index over `(owner_id, long_url_digest)`.
const OWNER_URL_INDEX: &str = "uk_owner_url";

/// MySQL implementation of the repository contract.
///
/// Uniqueness is enforced by the schema in `ddl/mysql/short_urls.sql`:
/// `uk_short_code` on the code and `uk_owner_url` on the owner together
/// with a SHA-256 digest of the long URL (TEXT columns cannot be indexed
/// whole). Deletes are hard deletes.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }
}

fn url_digest(long_url: &str) -> Vec<u8> {
    Sha256::digest(long_url.as_bytes()).to_vec()
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

fn row_to_short_url(row: &MySqlRow) -> Result<ShortUrl> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let owner_id: i64 = row.try_get("owner_id").map_err(map_sqlx_error)?;
    let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(ShortUrl {
        id,
        owner_id: OwnerId::new(owner_id),
        long_url,
        short_code: ShortCode::new_unchecked(short_code),
        created_at: parse_created_at(created_at)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn violates_owner_url_index(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.message().contains(OWNER_URL_INDEX))
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, long_url, short_code, created_at
            FROM short_urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_short_url).transpose()
    }

    async fn find_by_owner_and_url(
        &self,
        owner: OwnerId,
        long_url: &str,
    ) -> Result<Option<ShortUrl>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, long_url, short_code, created_at
            FROM short_urls
            WHERE owner_id = ?
              AND long_url_digest = ?
              AND long_url = ?
            LIMIT 1
            "#,
        )
        .bind(owner.get())
        .bind(url_digest(long_url))
        .bind(long_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_short_url).transpose()
    }

    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<ShortUrl>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, long_url, short_code, created_at
            FROM short_urls
            WHERE owner_id = ?
            ORDER BY id
            "#,
        )
        .bind(owner.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_short_url).collect()
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, new: NewShortUrl) -> Result<ShortUrl> {
        let created_at = Timestamp::now().as_second();

        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (owner_id, long_url, long_url_digest, short_code, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.owner_id.get())
        .bind(new.long_url.as_str())
        .bind(url_digest(&new.long_url))
        .bind(new.short_code.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                trace!(code = %new.short_code, owner = %new.owner_id, "inserted short url");
                Ok(ShortUrl {
                    id: done.last_insert_id(),
                    owner_id: new.owner_id,
                    long_url: new.long_url,
                    short_code: new.short_code,
                    created_at: parse_created_at(created_at)?,
                })
            }
            Err(err) if is_unique_violation(&err) && violates_owner_url_index(&err) => {
                Err(StorageError::OwnerUrlConflict {
                    owner: new.owner_id,
                    long_url: new.long_url,
                })
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::CodeConflict(new.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM short_urls
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_owner_and_code(&self, owner: OwnerId, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM short_urls
            WHERE short_code = ?
              AND owner_id = ?
            "#,
        )
        .bind(code.as_str())
        .bind(owner.get())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_digest_is_sha256_sized() {
        assert_eq!(url_digest("https://example.com").len(), 32);
        assert_ne!(
            url_digest("https://example.com/a"),
            url_digest("https://example.com/b")
        );
    }

    #[test]
    fn pool_errors_map_to_availability_errors() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StorageError::InvalidData(_)
        ));
    }

    #[test]
    fn created_at_out_of_range_is_invalid_data() {
        assert!(parse_created_at(0).is_ok());
        assert!(matches!(
            parse_created_at(i64::MAX),
            Err(StorageError::InvalidData(_))
        ));
    }
}
