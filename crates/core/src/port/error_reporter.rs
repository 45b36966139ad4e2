// Error Reporter Port
// Side channel for item-level failures, distinct from the result stream

use crate::domain::ItemFailure;
use std::io::Write;
use tracing::{debug, warn};

/// Receives one message per failed item
///
/// Called concurrently from every worker; a report never stops the pipeline.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, failure: &ItemFailure);
}

/// Writes `<prefix>: could not process <item>: <reason>` lines to stderr
#[derive(Debug, Clone)]
pub struct StderrReporter {
    prefix: String,
}

impl StderrReporter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl StderrReporter {
    /// Write one diagnostic line; a failed write is logged and dropped
    fn write_to<W: Write>(&self, out: &mut W, failure: &ItemFailure) {
        if let Err(e) = writeln!(out, "{}: {}", self.prefix, failure) {
            debug!(error = %e, item = %failure.item, "Could not write to error channel");
        }
    }
}

impl ErrorReporter for StderrReporter {
    fn report(&self, failure: &ItemFailure) {
        warn!(item = %failure.item, reason = %failure.reason, "Item failed");

        // One locked write per message keeps lines from interleaving
        let stderr = std::io::stderr();
        self.write_to(&mut stderr.lock(), failure);
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Collects every report for later assertions
    #[derive(Default)]
    pub struct CollectingReporter {
        failures: Mutex<Vec<ItemFailure>>,
    }

    impl CollectingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failures(&self) -> Vec<ItemFailure> {
            self.failures.lock().unwrap().clone()
        }

        pub fn messages(&self) -> Vec<String> {
            self.failures().iter().map(ToString::to_string).collect()
        }
    }

    impl ErrorReporter for CollectingReporter {
        fn report(&self, failure: &ItemFailure) {
            self.failures.lock().unwrap().push(failure.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct ClosedStderr;

    impl Write for ClosedStderr {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stderr closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_line_format() {
        let reporter = StderrReporter::new("batchcls");
        let mut out = Vec::new();
        reporter.write_to(&mut out, &ItemFailure::new("cat.png", "file is empty"));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "batchcls: could not process cat.png: file is empty\n"
        );
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        let reporter = StderrReporter::new("batchcls");
        reporter.write_to(&mut ClosedStderr, &ItemFailure::new("cat.png", "file is empty"));
        // Reporting continues after a failed write
        reporter.write_to(&mut ClosedStderr, &ItemFailure::new("dog.png", "file is empty"));
    }
}
