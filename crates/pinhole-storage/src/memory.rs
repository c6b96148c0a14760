use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use pinhole_core::repository::{ReadRepository, Repository, Result};
use pinhole_core::{NewShortUrl, OwnerId, ShortCode, ShortUrl, StorageError};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// In-memory implementation of the repository contract using DashMap.
///
/// Rows are keyed by short code, with a secondary index on
/// `(owner, long_url)`. Inserts lock the owner index entry before the row
/// entry, which makes the uniqueness check and the insert a single atomic
/// step for both keys. Deletes never hold both locks at once.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    rows: DashMap<String, ShortUrl>,
    by_owner_url: DashMap<(OwnerId, String), String>,
    next_id: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the `(owner, url)` entry of a removed row, unless a later
    /// insert already reused the pair.
    fn unindex(&self, row: ShortUrl) {
        let code = row.short_code;
        self.by_owner_url
            .remove_if(&(row.owner_id, row.long_url), |_, indexed| {
                indexed == code.as_str()
            });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>> {
        Ok(self.rows.get(code.as_str()).map(|row| row.clone()))
    }

    async fn find_by_owner_and_url(
        &self,
        owner: OwnerId,
        long_url: &str,
    ) -> Result<Option<ShortUrl>> {
        let key = (owner, long_url.to_owned());
        let Some(code) = self.by_owner_url.get(&key).map(|code| code.clone()) else {
            return Ok(None);
        };

        // A concurrent delete may have removed the row already.
        Ok(self.rows.get(&code).map(|row| row.clone()))
    }

    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<ShortUrl>> {
        let mut rows: Vec<ShortUrl> = self
            .rows
            .iter()
            .filter(|row| row.owner_id == owner)
            .map(|row| row.clone())
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, new: NewShortUrl) -> Result<ShortUrl> {
        let NewShortUrl {
            owner_id,
            long_url,
            short_code,
        } = new;

        let owner_slot = match self.by_owner_url.entry((owner_id, long_url.clone())) {
            Entry::Occupied(_) => {
                return Err(StorageError::OwnerUrlConflict {
                    owner: owner_id,
                    long_url,
                })
            }
            Entry::Vacant(slot) => slot,
        };

        let row_slot = match self.rows.entry(short_code.as_str().to_owned()) {
            Entry::Occupied(_) => return Err(StorageError::CodeConflict(short_code.to_string())),
            Entry::Vacant(slot) => slot,
        };

        let record = ShortUrl {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            owner_id,
            long_url,
            short_code,
            created_at: Timestamp::now(),
        };

        row_slot.insert(record.clone());
        owner_slot.insert(record.short_code.as_str().to_owned());

        trace!(code = %record.short_code, owner = %owner_id, "inserted short url");
        Ok(record)
    }

    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool> {
        let Some((_, row)) = self.rows.remove(code.as_str()) else {
            return Ok(false);
        };

        self.unindex(row);
        Ok(true)
    }

    async fn delete_by_owner_and_code(&self, owner: OwnerId, code: &ShortCode) -> Result<bool> {
        let Some((_, row)) = self
            .rows
            .remove_if(code.as_str(), |_, row| row.owner_id == owner)
        else {
            return Ok(false);
        };

        self.unindex(row);
        Ok(true)
    }
}
