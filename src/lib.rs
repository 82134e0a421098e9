//! Media Scraper - concurrent harvesting of image and video asset URLs
//!
//! A batch of page URLs is fanned out to one lightweight task per URL. Each
//! task fetches its page, extracts `<img>` and `<video><source>` references,
//! and bulk-inserts them. Stored assets are read back through paginated,
//! filterable queries.

// Module declarations
pub mod application;
pub mod crawling;
pub mod domain;
pub mod infrastructure;

pub use application::{AppState, MediaQuery, QueryService, StorageMode};
pub use crawling::{ScrapeCoordinator, ScrapeWorker, SubmissionReceipt, TaskExecutor, WorkerOutcome};
pub use domain::{AssetRecord, MediaKind, Page, PageRequest};
pub use infrastructure::{AppConfig, ConfigManager};
