//! Batch submission and fan-out
//!
//! `submit` validates the batch, spawns one tracked task per URL and returns
//! a receipt without awaiting any of them. A supervisor task joins the batch
//! and logs the summary once every worker has finished.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

use super::executor::TaskExecutor;
use super::worker::{ScrapeWorker, WorkerOutcome};
use crate::domain::errors::SubmitError;

/// Acknowledgement of an accepted batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub batch_id: Uuid,
    pub accepted: usize,
}

/// Per-batch tally, logged by the supervisor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub persisted_pages: usize,
    pub persisted_assets: usize,
    pub empty_pages: usize,
    pub skipped: usize,
    pub fetch_failures: usize,
    pub persist_failures: usize,
    pub panicked: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: WorkerOutcome) {
        match outcome {
            WorkerOutcome::Persisted { count } => {
                self.persisted_pages += 1;
                self.persisted_assets += count;
            }
            WorkerOutcome::NoAssets => self.empty_pages += 1,
            WorkerOutcome::Skipped => self.skipped += 1,
            WorkerOutcome::FetchFailed => self.fetch_failures += 1,
            WorkerOutcome::PersistFailed => self.persist_failures += 1,
        }
    }

    pub fn completed(&self) -> usize {
        self.persisted_pages
            + self.empty_pages
            + self.skipped
            + self.fetch_failures
            + self.persist_failures
            + self.panicked
    }
}

pub struct ScrapeCoordinator {
    executor: TaskExecutor,
    worker: Arc<ScrapeWorker>,
}

impl ScrapeCoordinator {
    pub fn new(executor: TaskExecutor, worker: ScrapeWorker) -> Self {
        Self {
            executor,
            worker: Arc::new(worker),
        }
    }

    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    /// Schedule one worker per URL, duplicates included, and return at once.
    pub fn submit(&self, urls: Vec<String>) -> Result<SubmissionReceipt, SubmitError> {
        if urls.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }
        if self.executor.is_closed() {
            return Err(SubmitError::ExecutorClosed);
        }

        let batch_id = Uuid::new_v4();
        let accepted = urls.len();
        let started = Instant::now();

        let mut workers = JoinSet::new();
        for url in urls {
            let worker = Arc::clone(&self.worker);
            let executor = self.executor.clone();
            let task = self.executor.track(async move {
                let _slot = executor.acquire_slot().await;
                worker.run(&url).await
            });
            workers.spawn_on(task, self.executor.handle());
        }

        self.executor
            .spawn(supervise(batch_id, accepted, started, workers));

        info!(%batch_id, "🚀 Accepted {} pages for background processing", accepted);
        Ok(SubmissionReceipt { batch_id, accepted })
    }
}

async fn supervise(
    batch_id: Uuid,
    accepted: usize,
    started: Instant,
    mut workers: JoinSet<WorkerOutcome>,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                error!(%batch_id, "Worker task ended abnormally: {}", e);
                summary.panicked += 1;
            }
        }
    }

    info!(
        %batch_id,
        accepted,
        persisted_pages = summary.persisted_pages,
        persisted_assets = summary.persisted_assets,
        empty_pages = summary.empty_pages,
        skipped = summary.skipped,
        fetch_failures = summary.fetch_failures,
        persist_failures = summary.persist_failures,
        panicked = summary.panicked,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "🏁 Batch finished"
    );
    summary
}
