//! Repository interface for scraped media assets
//!
//! Storage engines implement this trait; the scrape pipeline and the query
//! service only ever see `Arc<dyn AssetRepository>`.

use async_trait::async_trait;

use super::asset::{AssetRecord, MediaKind};
use super::errors::PersistenceError;
use super::pagination::{Page, PageRequest};

#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Store one per-URL batch in a single round-trip and return the
    /// assigned ids in input order. Must be safe to call concurrently.
    async fn bulk_insert(&self, records: Vec<AssetRecord>) -> Result<Vec<i64>, PersistenceError>;

    async fn find_all(&self, page: &PageRequest) -> Result<Page<AssetRecord>, PersistenceError>;

    async fn find_by_kind(
        &self,
        kind: MediaKind,
        page: &PageRequest,
    ) -> Result<Page<AssetRecord>, PersistenceError>;

    /// Exact kind match AND case-sensitive substring match on `original_url`.
    async fn find_by_kind_and_original_url_containing(
        &self,
        kind: MediaKind,
        substring: &str,
        page: &PageRequest,
    ) -> Result<Page<AssetRecord>, PersistenceError>;

    async fn count(&self) -> Result<u64, PersistenceError>;
}
