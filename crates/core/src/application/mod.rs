// Application Layer - Pipeline stages and orchestration

pub mod dedicated;
pub mod pipeline;
pub mod producer;
pub mod sink;
pub mod worker;

// Re-exports
pub use dedicated::DedicatedThread;
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport, PipelineState};
pub use producer::{ItemSource, Producer, ProducerMode};
pub use sink::{spawn_sink, SinkOutcome};
pub use worker::{PoolStats, Worker, WorkerPool, WorkerStats};
