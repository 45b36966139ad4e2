// Producer - originates items and owns closing the input queue

use crate::domain::{ClosableQueue, Item};
use crate::error::Result;
use crate::port::ItemFilter;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

/// Where items come from
pub enum ItemSource {
    /// Already materialized list (command-line arguments)
    Items(Vec<Item>),
    /// Newline-delimited stream (piped stdin)
    Lines(Box<dyn AsyncBufRead + Send + Unpin>),
}

impl ItemSource {
    pub fn items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Item>,
    {
        ItemSource::Items(items.into_iter().map(Into::into).collect())
    }

    pub fn lines<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        ItemSource::Lines(Box::new(reader))
    }

    pub fn mode(&self) -> ProducerMode {
        match self {
            ItemSource::Items(_) => ProducerMode::Enumeration,
            ItemSource::Lines(_) => ProducerMode::Streaming,
        }
    }
}

impl fmt::Debug for ItemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSource::Items(items) => f.debug_tuple("Items").field(&items.len()).finish(),
            ItemSource::Lines(_) => f.write_str("Lines(..)"),
        }
    }
}

/// Producer mode, fixed once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerMode {
    Enumeration,
    Streaming,
}

impl fmt::Display for ProducerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducerMode::Enumeration => write!(f, "ENUMERATION"),
            ProducerMode::Streaming => write!(f, "STREAMING"),
        }
    }
}

/// Closes the queue when dropped, so every exit path (including a panic in
/// the streaming task) releases the workers.
struct CloseOnDrop(Arc<ClosableQueue<Item>>);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Producer feeding the input queue
///
/// The filter only applies in streaming mode; enumerated items are queued
/// as given.
pub struct Producer {
    queue: Arc<ClosableQueue<Item>>,
    filter: Arc<dyn ItemFilter>,
}

impl Producer {
    pub fn new(queue: Arc<ClosableQueue<Item>>, filter: Arc<dyn ItemFilter>) -> Self {
        Self { queue, filter }
    }

    /// Feed the queue from `source` and close it; returns the number of items queued
    ///
    /// Enumeration runs inline. Streaming runs as its own task, which this
    /// call joins.
    pub async fn run(self, source: ItemSource) -> Result<usize> {
        info!(mode = %source.mode(), "Producer started");
        let queued = match source {
            ItemSource::Items(items) => self.enumerate(items),
            ItemSource::Lines(reader) => tokio::spawn(self.stream(reader)).await?,
        };
        info!(queued, "Producer finished, input queue closed");
        Ok(queued)
    }

    /// Push every item in order, then close the queue
    pub fn enumerate(self, items: Vec<Item>) -> usize {
        let guard = CloseOnDrop(Arc::clone(&self.queue));
        let count = items.len();
        for item in items {
            self.queue.push(item);
        }
        drop(guard);
        count
    }

    /// Read lines until end-of-stream, then close the queue
    ///
    /// Lines are split on `\n` with a trailing `\r` removed; invalid UTF-8
    /// is replaced rather than rejected. A read error ends the stream.
    pub async fn stream<R>(self, mut reader: R) -> usize
    where
        R: AsyncBufRead + Send + Unpin,
    {
        let _guard = CloseOnDrop(Arc::clone(&self.queue));
        let mut queued = 0;
        let mut skipped = 0;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = decode_line(&buf);
                    if self.filter.accepts(&line) {
                        self.queue.push(line);
                        queued += 1;
                    } else {
                        debug!(line = %line, "Line rejected by filter");
                        skipped += 1;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to read input stream, treating as end of input");
                    break;
                }
            }
        }

        debug!(queued, skipped, "Input stream exhausted");
        queued
    }
}

fn decode_line(raw: &[u8]) -> String {
    let mut line = raw;
    if let Some(stripped) = line.strip_suffix(b"\n") {
        line = stripped;
    }
    if let Some(stripped) = line.strip_suffix(b"\r") {
        line = stripped;
    }
    String::from_utf8_lossy(line).into_owned()
}
