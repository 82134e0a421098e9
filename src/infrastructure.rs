//! Infrastructure layer: configuration, logging, HTTP retrieval, HTML
//! parsing and storage engines.

pub mod asset_repository;
pub mod config;
pub mod database_connection;
pub mod http_client;
pub mod logging;
pub mod memory_repository;
pub mod parsing;

pub use asset_repository::SqliteAssetRepository;
pub use config::{AppConfig, ConfigManager};
pub use database_connection::DatabaseConnection;
pub use http_client::{HttpClient, HttpClientConfig, PageContent, PageFetcher};
pub use logging::{get_log_directory, init_logging_with_config};
pub use memory_repository::InMemoryAssetRepository;
pub use parsing::MediaExtractor;
