use jiff::Timestamp;
use pinhole_core::{OwnerId, ShortUrl};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    #[serde(default)]
    pub long_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlResponse {
    pub id: u64,
    pub owner_id: OwnerId,
    pub long_url: String,
    pub short_code: String,
    pub short_url: String,
    pub created_at: Timestamp,
}

impl UrlResponse {
    pub fn new(record: ShortUrl, base_url: &str) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            short_url: record.short_code.to_url(base_url),
            short_code: record.short_code.into(),
            long_url: record.long_url,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
