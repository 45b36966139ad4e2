// Pipeline constants (no magic values)

/// Lower bound for the worker pool size; a request for 0 workers becomes 1
pub const MIN_WORKERS: usize = 1;

/// Prefix for diagnostics written to the error channel
pub const DEFAULT_REPORT_PREFIX: &str = "batchcls";
