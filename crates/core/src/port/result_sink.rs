// Result Sink Port
// Append-only destination, written by the single sink task

use std::io::{self, Write};

/// Ordered destination for formatted results
///
/// Moved into the sink task for the lifetime of the run and handed back in
/// the run report, so it never has concurrent writers.
pub trait ResultSink: Send + 'static {
    /// Emit one formatted result
    fn emit(&mut self, result: &str) -> io::Result<()>;

    /// Flush buffered output (called once the queue is drained)
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Line-oriented sink over any writer (stdout in the binary)
///
/// Flushes after each line so results show up as soon as a worker finishes.
#[derive(Debug)]
pub struct LineWriterSink<W> {
    writer: W,
}

impl<W: Write> LineWriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + 'static> ResultSink for LineWriterSink<W> {
    fn emit(&mut self, result: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", result)?;
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// In-memory sink that keeps every result
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    results: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn into_results(self) -> Vec<String> {
        self.results
    }
}

impl ResultSink for CollectingSink {
    fn emit(&mut self, result: &str) -> io::Result<()> {
        self.results.push(result.to_string());
        Ok(())
    }
}
