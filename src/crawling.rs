//! Concurrent scrape pipeline: execution substrate, per-URL worker, and
//! batch coordinator.

pub mod coordinator;
pub mod executor;
pub mod worker;

pub use coordinator::{BatchSummary, ScrapeCoordinator, SubmissionReceipt};
pub use executor::TaskExecutor;
pub use worker::{ScrapeWorker, WorkerOutcome};
