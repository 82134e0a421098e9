//! Application state
//!
//! Owns the wired-up services for one process: the scrape coordinator with
//! its executor, the query service, and the storage they share.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::query_service::QueryService;
use crate::crawling::{ScrapeCoordinator, ScrapeWorker, TaskExecutor};
use crate::domain::repositories::AssetRepository;
use crate::infrastructure::asset_repository::SqliteAssetRepository;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database_connection::DatabaseConnection;
use crate::infrastructure::http_client::{HttpClient, PageFetcher};
use crate::infrastructure::memory_repository::InMemoryAssetRepository;
use crate::infrastructure::parsing::MediaExtractor;

/// Where assets are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Sqlite,
    Memory,
}

pub struct AppState {
    pub coordinator: ScrapeCoordinator,
    pub queries: QueryService,
    pub config: AppConfig,
    database: Option<DatabaseConnection>,
}

impl AppState {
    /// Build every service from configuration. Must run inside a tokio
    /// runtime; the executor attaches to the current one.
    pub async fn initialize(config: AppConfig, storage: StorageMode) -> Result<Self> {
        let fetcher = HttpClient::from_scraper_config(&config.scraper)
            .context("Failed to build HTTP client")?;

        let mut database = None;
        let repository: Arc<dyn AssetRepository> = match storage {
            StorageMode::Memory => Arc::new(InMemoryAssetRepository::new()),
            StorageMode::Sqlite => {
                let db = DatabaseConnection::new(&config.database).await?;
                db.migrate().await?;
                let repo = SqliteAssetRepository::new(db.pool().clone());
                database = Some(db);
                Arc::new(repo)
            }
        };

        let mut state = Self::with_components(Arc::new(fetcher), repository, config)?;
        state.database = database;
        info!(?storage, "✅ Application state initialized");
        Ok(state)
    }

    /// Wire services around caller-provided fetcher and repository.
    pub fn with_components(
        fetcher: Arc<dyn PageFetcher>,
        repository: Arc<dyn AssetRepository>,
        config: AppConfig,
    ) -> Result<Self> {
        let extractor = MediaExtractor::new()?;
        let worker = ScrapeWorker::new(
            fetcher,
            extractor,
            Arc::clone(&repository),
            config.scraper.request_timeout(),
        );
        let executor = TaskExecutor::current(config.scraper.max_in_flight);

        Ok(Self {
            coordinator: ScrapeCoordinator::new(executor, worker),
            queries: QueryService::new(repository, config.query.clone()),
            config,
            database: None,
        })
    }

    /// Stop accepting batches and wait for all in-flight scrape work.
    /// Queries keep working afterwards.
    pub async fn shutdown_executor(&self) {
        self.coordinator.executor().shutdown().await;
    }

    /// Release storage.
    pub async fn close(&self) {
        if let Some(db) = &self.database {
            db.close().await;
        }
    }

    pub async fn shutdown(&self) {
        self.shutdown_executor().await;
        self.close().await;
    }
}
