// Vision adapter errors

use batchcls_core::port::ProcessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("path is not a regular file or does not exist")]
    NotRegularFile,

    #[error("file is empty")]
    EmptyFile,

    #[error("file is too large ({size} bytes, limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read or decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid model input size {width}x{height}")]
    InvalidInputSize { width: i64, height: i64 },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("class names file '{path}': {reason}")]
    ClassNames { path: String, reason: String },

    #[error("classification backend unavailable: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, VisionError>;

impl From<VisionError> for ProcessError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Io(e) => ProcessError::Io(e),
            e @ (VisionError::NotRegularFile
            | VisionError::EmptyFile
            | VisionError::FileTooLarge { .. }) => ProcessError::Rejected(e.to_string()),
            e => ProcessError::Failed(e.to_string()),
        }
    }
}
