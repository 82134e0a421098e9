//! Paginated lookup of stored media assets
//!
//! Filter precedence: kind and search together narrow by both, kind alone
//! narrows by kind, anything else returns every record. A search term
//! without a kind is ignored.

use std::sync::Arc;

use tracing::debug;

use crate::domain::asset::{AssetRecord, MediaKind};
use crate::domain::errors::QueryError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::AssetRepository;
use crate::infrastructure::config::QueryConfig;

/// Normalized read filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaQuery {
    pub kind: Option<MediaKind>,
    pub search: Option<String>,
}

impl MediaQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_kind(kind: MediaKind) -> Self {
        Self {
            kind: Some(kind),
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then_some(search);
        self
    }

    /// Build from raw request parameters. Blank values count as absent;
    /// a non-blank search is kept verbatim since matching is exact.
    pub fn from_params(kind: Option<&str>, search: Option<&str>) -> Result<Self, QueryError> {
        let kind = kind
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::parse::<MediaKind>)
            .transpose()?;
        let search = search
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        Ok(Self { kind, search })
    }
}

pub struct QueryService {
    repository: Arc<dyn AssetRepository>,
    config: QueryConfig,
}

impl QueryService {
    pub fn new(repository: Arc<dyn AssetRepository>, config: QueryConfig) -> Self {
        Self { repository, config }
    }

    /// Page request from optional raw parameters using the configured
    /// default and maximum size.
    pub fn page_request(
        &self,
        page: Option<u32>,
        size: Option<u32>,
        sort: Option<&str>,
    ) -> PageRequest {
        PageRequest::from_params(
            page,
            size,
            sort,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    /// Run `query` for one page. Out-of-range sizes are normalized, never
    /// rejected.
    pub async fn query(
        &self,
        query: &MediaQuery,
        page: PageRequest,
    ) -> Result<Page<AssetRecord>, QueryError> {
        let page = page.clamped(self.config.default_page_size, self.config.max_page_size);

        debug!(kind = ?query.kind, search = ?query.search, page = page.page, size = page.size, "Querying media");

        let result = match (query.kind, query.search.as_deref()) {
            (Some(kind), Some(search)) => {
                self.repository
                    .find_by_kind_and_original_url_containing(kind, search, &page)
                    .await?
            }
            (Some(kind), None) => self.repository.find_by_kind(kind, &page).await?,
            (None, _) => self.repository.find_all(&page).await?,
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_repository::InMemoryAssetRepository;
    use rstest::rstest;

    async fn seeded() -> QueryService {
        let repo = Arc::new(InMemoryAssetRepository::new());
        let rows = [
            ("http://a.test/gallery", "http://a.test/1.png", MediaKind::Image),
            ("http://a.test/gallery", "http://a.test/clip.mp4", MediaKind::Video),
            ("http://b.test/home", "http://b.test/2.png", MediaKind::Image),
            ("http://B.test/home", "http://b.test/3.png", MediaKind::Image),
        ];
        repo.bulk_insert(
            rows.iter()
                .map(|(o, m, k)| AssetRecord::new(*o, *m, *k).unwrap())
                .collect(),
        )
        .await
        .unwrap();
        QueryService::new(repo, QueryConfig::default())
    }

    #[rstest]
    #[case(None, None, 4)]
    #[case(Some("IMAGE"), None, 3)]
    #[case(Some("video"), None, 1)]
    #[case(Some("IMAGE"), Some("b.test"), 1)]
    #[case(Some("IMAGE"), Some("B.test"), 1)]
    #[case(Some("IMAGE"), Some("nowhere"), 0)]
    #[case(None, Some("b.test"), 4)]
    #[case(Some(" "), Some(""), 4)]
    #[tokio::test]
    async fn filter_precedence(
        #[case] kind: Option<&str>,
        #[case] search: Option<&str>,
        #[case] expected: u64,
    ) {
        let service = seeded().await;
        let query = MediaQuery::from_params(kind, search).unwrap();
        let page = service.query(&query, PageRequest::default()).await.unwrap();
        assert_eq!(page.total_elements, expected);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = MediaQuery::from_params(Some("AUDIO"), None).unwrap_err();
        assert!(matches!(err, QueryError::InvalidKind(_)));
    }

    #[test]
    fn search_is_kept_verbatim() {
        let q = MediaQuery::from_params(Some("IMAGE"), Some(" a.test ")).unwrap();
        assert_eq!(q.search.as_deref(), Some(" a.test "));
        assert_eq!(MediaQuery::of_kind(MediaKind::Video).with_search("  ").search, None);
    }

    #[rstest]
    #[case(0, 20)]
    #[case(201, 200)]
    #[case(500, 200)]
    #[case(3, 3)]
    #[tokio::test]
    async fn out_of_range_sizes_are_normalized(#[case] requested: u32, #[case] served: u32) {
        let service = seeded().await;
        let page = service
            .query(&MediaQuery::all(), PageRequest::of_size(requested))
            .await
            .unwrap();
        assert_eq!(page.size, served);
        assert_eq!(page.total_elements, 4);
        assert_eq!(page.content.len(), served.min(4) as usize);
    }

    #[tokio::test]
    async fn raw_size_parameters_are_normalized() {
        let service = seeded().await;
        assert_eq!(service.page_request(None, Some(0), None).size, 20);
        assert_eq!(service.page_request(None, Some(10_000), None).size, 200);
    }

    #[tokio::test]
    async fn reads_are_idempotent() {
        let service = seeded().await;
        let req = service.page_request(Some(0), Some(2), Some("id,asc"));
        let first = service.query(&MediaQuery::all(), req).await.unwrap();
        let second = service.query(&MediaQuery::all(), req).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_pages, 2);
        let ids: Vec<_> = first.content.iter().filter_map(AssetRecord::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn default_request_uses_configured_size() {
        let service = seeded().await;
        let req = service.page_request(None, None, None);
        assert_eq!(req.size, 20);
        assert_eq!(req, PageRequest::default());
    }
}
