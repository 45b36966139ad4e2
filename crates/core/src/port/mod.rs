// Port Layer - Interfaces for external collaborators

pub mod error_reporter;
pub mod item_filter;
pub mod processor;
pub mod result_sink;

// Re-exports
pub use error_reporter::{ErrorReporter, StderrReporter};
pub use item_filter::{AcceptAll, ItemFilter};
pub use processor::{ProcessError, Processor};
pub use result_sink::{CollectingSink, LineWriterSink, ResultSink};
