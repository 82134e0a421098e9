//! In-process asset repository
//!
//! Behaves like the SQLite repository (monotonic ids, case-sensitive origin
//! search, deterministic sort with id tie-break) without any storage engine.
//! Used for tests and for the CLI's `--memory` mode.

use std::cmp::Ordering;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::asset::{AssetRecord, MediaKind};
use crate::domain::errors::PersistenceError;
use crate::domain::pagination::{Page, PageRequest, SortDirection, SortField};
use crate::domain::repositories::AssetRepository;

#[derive(Debug, Default)]
struct Store {
    records: Vec<AssetRecord>,
    last_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryAssetRepository {
    store: RwLock<Store>,
}

impl InMemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(
        &self,
        predicate: impl Fn(&AssetRecord) -> bool,
        request: &PageRequest,
    ) -> Page<AssetRecord> {
        let store = self.store.read().await;
        let mut matched: Vec<&AssetRecord> = store.records.iter().filter(|r| predicate(*r)).collect();
        let total = matched.len() as u64;

        matched.sort_by(|a, b| {
            let ordering = compare(a, b, request.sort.field).then_with(|| a.id().cmp(&b.id()));
            match request.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = matched
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .cloned()
            .collect();

        Page::new(content, total, request)
    }
}

fn compare(a: &AssetRecord, b: &AssetRecord, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id().cmp(&b.id()),
        SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortField::OriginalUrl => a.original_url().cmp(b.original_url()),
        SortField::MediaUrl => a.media_url().cmp(b.media_url()),
        SortField::Kind => a.kind().as_str().cmp(b.kind().as_str()),
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    async fn bulk_insert(&self, records: Vec<AssetRecord>) -> Result<Vec<i64>, PersistenceError> {
        let mut store = self.store.write().await;
        let mut ids = Vec::with_capacity(records.len());
        for mut record in records {
            store.last_id += 1;
            record.assign_id(store.last_id);
            ids.push(store.last_id);
            store.records.push(record);
        }
        Ok(ids)
    }

    async fn find_all(&self, page: &PageRequest) -> Result<Page<AssetRecord>, PersistenceError> {
        Ok(self.select(|_| true, page).await)
    }

    async fn find_by_kind(
        &self,
        kind: MediaKind,
        page: &PageRequest,
    ) -> Result<Page<AssetRecord>, PersistenceError> {
        Ok(self.select(|r| r.kind() == kind, page).await)
    }

    async fn find_by_kind_and_original_url_containing(
        &self,
        kind: MediaKind,
        substring: &str,
        page: &PageRequest,
    ) -> Result<Page<AssetRecord>, PersistenceError> {
        Ok(self
            .select(
                |r| r.kind() == kind && r.original_url().contains(substring),
                page,
            )
            .await)
    }

    async fn count(&self) -> Result<u64, PersistenceError> {
        Ok(self.store.read().await.records.len() as u64)
    }
}
