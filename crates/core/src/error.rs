// Central Error Type for the Pipeline

use thiserror::Error;

/// Run-level error type
///
/// Item failures never show up here; they go to the error reporter.
#[derive(Error, Debug)]
pub enum AppError {
    /// Failed to start a pipeline thread
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(std::io::Error),

    #[error("Task failed: {0}")]
    Task(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            AppError::Task(format!("task panicked: {}", err))
        } else {
            AppError::Task(format!("task cancelled: {}", err))
        }
    }
}
