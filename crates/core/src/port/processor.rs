// Processor Port
// Abstraction for the expensive per-item transformation (classification)

use thiserror::Error;

/// Item-level failures
///
/// Always recoverable from the pipeline's point of view: the worker reports
/// the failure and moves on to the next item.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),

    #[error("processor panicked: {0}")]
    Panicked(String),
}

/// Processor trait
///
/// Built fully before the pool starts and shared read-only by every worker,
/// so implementations must tolerate concurrent calls. Any internal
/// serialization (e.g. an inference session lock) is the implementation's
/// business.
///
/// Implementations:
/// - ClassifyProcessor (infra-vision): decode, infer, format
/// - any `Fn(&str) -> Result<String, ProcessError>` closure
pub trait Processor: Send + Sync {
    /// Transform one item into its formatted result
    fn process(&self, item: &str) -> Result<String, ProcessError>;
}

impl<F> Processor for F
where
    F: Fn(&str) -> Result<String, ProcessError> + Send + Sync,
{
    fn process(&self, item: &str) -> Result<String, ProcessError> {
        self(item)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock processor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Upper-case the item
        Upper,
        /// Fail for these items, upper-case the rest
        FailOn(HashSet<String>),
        /// Panic for these items, upper-case the rest
        PanicOn(HashSet<String>),
        /// Sleep, then upper-case
        Slow(Duration),
    }

    /// Mock Processor for testing
    pub struct MockProcessor {
        behavior: MockBehavior,
        call_count: AtomicUsize,
    }

    impl MockProcessor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn upper() -> Self {
            Self::new(MockBehavior::Upper)
        }

        pub fn failing_on<I, S>(items: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(MockBehavior::FailOn(items.into_iter().map(Into::into).collect()))
        }

        pub fn panicking_on<I, S>(items: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(MockBehavior::PanicOn(items.into_iter().map(Into::into).collect()))
        }

        pub fn slow(delay: Duration) -> Self {
            Self::new(MockBehavior::Slow(delay))
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    impl Processor for MockProcessor {
        fn process(&self, item: &str) -> Result<String, ProcessError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            match &self.behavior {
                MockBehavior::Upper => Ok(item.to_uppercase()),
                MockBehavior::FailOn(bad) if bad.contains(item) => {
                    Err(ProcessError::Failed("mock failure".to_string()))
                }
                MockBehavior::PanicOn(bad) if bad.contains(item) => {
                    panic!("mock panic on {}", item); // Actually panic for isolation testing
                }
                MockBehavior::Slow(delay) => {
                    std::thread::sleep(*delay);
                    Ok(item.to_uppercase())
                }
                MockBehavior::FailOn(_) | MockBehavior::PanicOn(_) => Ok(item.to_uppercase()),
            }
        }
    }
}
