//! Lightweight-task execution substrate for scrape workers
//!
//! Wraps a tokio runtime handle and a `TaskTracker`. It is created once at
//! process start, handed to the coordinator, and shut down at process stop;
//! shutdown waits for every tracked task and cancels nothing.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TrackedFuture;
use tracing::info;

#[derive(Debug, Clone)]
pub struct TaskExecutor {
    handle: Handle,
    tracker: TaskTracker,
    /// Present only when fan-out is capped
    slots: Option<Arc<Semaphore>>,
}

impl TaskExecutor {
    /// `max_in_flight = None` means unbounded fan-out.
    pub fn new(handle: Handle, max_in_flight: Option<usize>) -> Self {
        Self {
            handle,
            tracker: TaskTracker::new(),
            slots: max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Executor on the runtime the caller is currently running in.
    pub fn current(max_in_flight: Option<usize>) -> Self {
        Self::new(Handle::current(), max_in_flight)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn_on(future, &self.handle)
    }

    /// Wrap a future so that `shutdown` waits for it.
    pub fn track<F: Future>(&self, future: F) -> TrackedFuture<F> {
        self.tracker.track_future(future)
    }

    /// Wait for a fan-out slot when capped; `None` when unbounded.
    pub async fn acquire_slot(&self) -> Option<OwnedSemaphorePermit> {
        match &self.slots {
            Some(slots) => Arc::clone(slots).acquire_owned().await.ok(),
            None => None,
        }
    }

    /// Number of tracked tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_closed(&self) -> bool {
        self.tracker.is_closed()
    }

    /// Stop accepting work and wait for everything already spawned.
    pub async fn shutdown(&self) {
        self.tracker.close();
        info!("⏳ Waiting for {} in-flight tasks to finish", self.tracker.len());
        self.tracker.wait().await;
        info!("✅ Executor drained");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_waits_for_spawned_tasks() {
        let executor = TaskExecutor::current(None);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let done = Arc::clone(&done);
            executor.spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }

        executor.shutdown().await;
        assert_eq!(done.load(Ordering::SeqCst), 100);
        assert_eq!(executor.in_flight(), 0);
        assert!(executor.is_closed());
    }

    #[tokio::test]
    async fn unbounded_executor_hands_out_no_permits() {
        let executor = TaskExecutor::current(None);
        assert!(executor.acquire_slot().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn capped_executor_limits_concurrency() {
        let executor = TaskExecutor::current(Some(3));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..30 {
            let (exec, running, peak) = (executor.clone(), Arc::clone(&running), Arc::clone(&peak));
            executor.spawn(async move {
                let _slot = exec.acquire_slot().await;
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }

        executor.shutdown().await;
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }
}
