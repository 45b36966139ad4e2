// Dedicated OS threads for long-lived pipeline stages
//
// Workers and the sink block on queue pops for the whole run. They get their
// own threads so they never occupy tokio's blocking pool, which async stdin
// and file reads on the producer side depend on.

use crate::error::{AppError, Result};
use std::thread;
use tokio::sync::oneshot;

/// A named thread whose return value is awaited from async code
#[derive(Debug)]
pub struct DedicatedThread<T> {
    name: String,
    thread: thread::JoinHandle<()>,
    done: oneshot::Receiver<T>,
}

impl<T: Send + 'static> DedicatedThread<T> {
    /// Spawn `f` on a new OS thread called `name`
    pub fn spawn<F>(name: impl Into<String>, f: F) -> Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let name = name.into();
        let (tx, done) = oneshot::channel();
        let thread = thread::Builder::new().name(name.clone()).spawn(move || {
            // Receiver gone means nobody waits for the value anymore
            let _ = tx.send(f());
        })?;

        Ok(Self { name, thread, done })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the thread's value without holding a runtime thread
    ///
    /// A thread that unwound drops its sender, which surfaces as
    /// `AppError::Task`.
    pub async fn join(self) -> Result<T> {
        self.done
            .await
            .map_err(|_| AppError::Task(format!("thread '{}' exited without a result", self.name)))
    }
}
