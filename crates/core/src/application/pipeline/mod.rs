// Pipeline Orchestrator - wires producer, worker pool and sink, sequences shutdown

mod state;

pub use state::PipelineState;

use crate::application::producer::{ItemSource, Producer};
use crate::application::sink::spawn_sink;
use crate::application::worker::constants::{DEFAULT_REPORT_PREFIX, MIN_WORKERS};
use crate::application::worker::WorkerPool;
use crate::domain::{ClosableQueue, Item};
use crate::error::{AppError, Result};
use crate::port::{AcceptAll, ErrorReporter, ItemFilter, Processor, ResultSink, StderrReporter};
use state::StateTracker;
use std::sync::Arc;
use tracing::{info, warn};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of workers (never below 1)
    pub workers: usize,
}

impl PipelineConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(MIN_WORKERS),
        }
    }
}

impl Default for PipelineConfig {
    /// One worker per available hardware thread
    fn default() -> Self {
        Self::with_workers(num_cpus::get())
    }
}

/// Summary of a completed run
#[derive(Debug)]
pub struct PipelineReport<S> {
    /// The sink, handed back after the last result was emitted
    pub sink: S,
    pub workers: usize,
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub emitted: usize,
    pub final_state: PipelineState,
    pub history: Vec<PipelineState>,
}

/// Three-stage pipeline: producer -> N workers -> sink
///
/// # Example
/// ```text
/// let pipeline = Pipeline::new(PipelineConfig::with_workers(2), processor, CollectingSink::new());
/// let report = pipeline.run(ItemSource::items(["a.txt", "b.txt"])).await?;
/// assert_eq!(report.final_state, PipelineState::Done);
/// ```
pub struct Pipeline<S> {
    config: PipelineConfig,
    processor: Arc<dyn Processor>,
    reporter: Arc<dyn ErrorReporter>,
    filter: Arc<dyn ItemFilter>,
    sink: S,
}

impl<S: ResultSink> Pipeline<S> {
    /// Create a pipeline with a stderr error channel and no line filter
    pub fn new(config: PipelineConfig, processor: Arc<dyn Processor>, sink: S) -> Self {
        Self {
            config,
            processor,
            reporter: Arc::new(StderrReporter::new(DEFAULT_REPORT_PREFIX)),
            filter: Arc::new(AcceptAll),
            sink,
        }
    }

    /// Replace the error channel
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Filter applied to streamed lines
    pub fn with_filter(mut self, filter: Arc<dyn ItemFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Run to completion
    ///
    /// Shutdown order: the producer closes the input queue, all workers are
    /// joined, and only then is the output queue closed and the sink joined.
    /// Item failures do not make this return an error; a failed task or a
    /// failed result write does, after the pipeline has still reached DONE.
    pub async fn run(self, source: ItemSource) -> Result<PipelineReport<S>> {
        let mut tracker = StateTracker::new();
        info!(workers = self.config.workers, mode = %source.mode(), "Pipeline starting");

        let input: Arc<ClosableQueue<Item>> = Arc::new(ClosableQueue::new());
        let output: Arc<ClosableQueue<String>> = Arc::new(ClosableQueue::new());

        // Sink first, so nothing is ever pushed without a consumer
        let sink_handle = spawn_sink(Arc::clone(&output), self.sink)?;

        let pool = match WorkerPool::spawn(
            self.config.workers,
            Arc::clone(&input),
            Arc::clone(&output),
            self.processor,
            self.reporter,
        ) {
            Ok(pool) => pool,
            Err(e) => {
                // Partially started workers exit on the closed input; the sink follows
                output.close();
                let _ = sink_handle.join().await;
                return Err(e);
            }
        };
        let workers = pool.size();

        tracker.advance(); // PRODUCING
        let produced = Producer::new(Arc::clone(&input), self.filter)
            .run(source)
            .await;
        if let Err(e) = &produced {
            warn!(error = %e, "Producer failed; input queue was closed on exit");
        }

        tracker.advance(); // DRAINING_WORKERS
        let pool_stats = pool.join().await;

        tracker.advance(); // CLOSING_OUTPUT
        // Safe only now: every worker has exited, nobody pushes anymore
        output.close();

        tracker.advance(); // DRAINING_SINK
        let sink_outcome = sink_handle.join().await;

        tracker.advance(); // DONE

        let submitted = produced?;
        let pool_stats = pool_stats?;
        let sink_outcome = sink_outcome?;
        if let Some(e) = sink_outcome.error {
            return Err(AppError::Output(e));
        }

        let report = PipelineReport {
            sink: sink_outcome.sink,
            workers,
            submitted,
            succeeded: pool_stats.succeeded,
            failed: pool_stats.failed,
            emitted: sink_outcome.emitted,
            final_state: tracker.current(),
            history: tracker.into_history(),
        };

        info!(
            submitted = report.submitted,
            succeeded = report.succeeded,
            failed = report.failed,
            emitted = report.emitted,
            "Pipeline done"
        );
        Ok(report)
    }
}
