//! Single-URL scrape worker
//!
//! Fetch, extract, persist for one URL. Every failure is logged and turned
//! into a `WorkerOutcome`; nothing propagates to the submitter.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::domain::repositories::AssetRepository;
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::parsing::MediaExtractor;

/// What happened to one URL of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Assets were written in one bulk insert
    Persisted { count: usize },
    /// Page fetched but carried no valid assets
    NoAssets,
    /// Blank URL, never fetched
    Skipped,
    FetchFailed,
    PersistFailed,
}

impl WorkerOutcome {
    pub fn persisted_count(&self) -> usize {
        match self {
            Self::Persisted { count } => *count,
            _ => 0,
        }
    }
}

pub struct ScrapeWorker {
    fetcher: Arc<dyn PageFetcher>,
    extractor: MediaExtractor,
    repository: Arc<dyn AssetRepository>,
    timeout: Duration,
}

impl ScrapeWorker {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: MediaExtractor,
        repository: Arc<dyn AssetRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            repository,
            timeout,
        }
    }

    pub async fn run(&self, url: &str) -> WorkerOutcome {
        if url.trim().is_empty() {
            debug!("Skipping blank url");
            return WorkerOutcome::Skipped;
        }

        let page = match self.fetcher.fetch(url, self.timeout).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, timeout = e.is_timeout(), "Failed to fetch page: {}", e);
                return WorkerOutcome::FetchFailed;
            }
        };

        let records = self.extractor.extract(url, &page);
        if records.is_empty() {
            debug!(url = %url, "No media assets found");
            return WorkerOutcome::NoAssets;
        }

        let count = records.len();
        match self.repository.bulk_insert(records).await {
            Ok(ids) => {
                info!(url = %url, "💾 Saved {} media items", ids.len());
                WorkerOutcome::Persisted { count }
            }
            Err(e) => {
                error!(url = %url, "Failed to persist {} media items: {}", count, e);
                WorkerOutcome::PersistFailed
            }
        }
    }
}
