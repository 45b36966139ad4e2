// Worker Pool - fixed set of worker threads draining the input queue

pub mod constants;
mod panic_guard;

pub use panic_guard::{execute_guarded, PanicGuardResult};

use crate::application::dedicated::DedicatedThread;
use crate::domain::{ClosableQueue, Item, ItemFailure};
use crate::error::{AppError, Result};
use crate::port::{ErrorReporter, ProcessError, Processor};
use constants::MIN_WORKERS;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Per-worker counters, handed back when the worker thread finishes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl WorkerStats {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Aggregated counters for the whole pool
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl PoolStats {
    fn absorb(&mut self, stats: WorkerStats) {
        self.workers += 1;
        self.succeeded += stats.succeeded;
        self.failed += stats.failed;
    }
}

/// Worker pops items, processes them and forwards results
///
/// Holds only the two queue handles and the read-only collaborators.
pub struct Worker {
    id: usize,
    input: Arc<ClosableQueue<Item>>,
    output: Arc<ClosableQueue<String>>,
    processor: Arc<dyn Processor>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Worker {
    pub fn new(
        id: usize,
        input: Arc<ClosableQueue<Item>>,
        output: Arc<ClosableQueue<String>>,
        processor: Arc<dyn Processor>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            id,
            input,
            output,
            processor,
            reporter,
        }
    }

    /// Run the worker loop until the input queue is closed and drained
    ///
    /// Blocks the calling thread.
    pub fn run(self) -> WorkerStats {
        debug!(worker_id = self.id, "Worker started");
        let mut stats = WorkerStats::default();

        while let Some(item) = self.input.pop() {
            match self.process_item(&item) {
                Ok(result) => {
                    self.output.push(result);
                    stats.succeeded += 1;
                }
                Err(e) => {
                    self.reporter.report(&ItemFailure::new(item, e.to_string()));
                    stats.failed += 1;
                }
            }
        }

        debug!(
            worker_id = self.id,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "Worker stopped: input closed and drained"
        );
        stats
    }

    /// Process one item; a panic becomes an ordinary item failure
    fn process_item(&self, item: &str) -> std::result::Result<String, ProcessError> {
        let processor = &self.processor;
        match execute_guarded(AssertUnwindSafe(|| processor.process(item))) {
            PanicGuardResult::Success(result) => result,
            PanicGuardResult::Panicked(msg) => Err(ProcessError::Panicked(msg)),
        }
    }
}

/// Fixed-size pool, one dedicated OS thread per worker
pub struct WorkerPool {
    workers: Vec<DedicatedThread<WorkerStats>>,
}

impl WorkerPool {
    /// Spawn `size` workers (at least one)
    ///
    /// If a thread cannot be created, the input queue is closed so the
    /// workers already running drain and exit, and the error is returned.
    pub fn spawn(
        size: usize,
        input: Arc<ClosableQueue<Item>>,
        output: Arc<ClosableQueue<String>>,
        processor: Arc<dyn Processor>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self> {
        let size = size.max(MIN_WORKERS);
        info!(workers = size, "Starting worker pool");

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let worker = Worker::new(
                id,
                Arc::clone(&input),
                Arc::clone(&output),
                Arc::clone(&processor),
                Arc::clone(&reporter),
            );
            match DedicatedThread::spawn(format!("worker-{}", id), move || worker.run()) {
                Ok(thread) => workers.push(thread),
                Err(e) => {
                    error!(worker_id = id, error = %e, "Failed to start worker thread");
                    input.close();
                    return Err(e);
                }
            }
        }

        Ok(Self { workers })
    }

    /// Number of workers in the pool
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Wait until every worker observed closed-and-empty and exited
    ///
    /// All workers are joined even if one of them failed, so nothing is
    /// still pushing to the output queue when this returns.
    pub async fn join(self) -> Result<PoolStats> {
        let mut stats = PoolStats::default();
        let mut first_error: Option<AppError> = None;

        for worker in self.workers {
            let name = worker.name().to_string();
            match worker.join().await {
                Ok(worker_stats) => stats.absorb(worker_stats),
                Err(e) => {
                    error!(worker = %name, error = %e, "Worker thread failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(
                    workers = stats.workers,
                    succeeded = stats.succeeded,
                    failed = stats.failed,
                    "Worker pool drained"
                );
                Ok(stats)
            }
        }
    }
}
