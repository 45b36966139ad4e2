// Closable Queue Domain Model

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Guarded queue contents
#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Unbounded FIFO queue with a one-way close transition
///
/// Shared between threads behind an `Arc`. `pop` blocks while the queue is
/// empty and open; once closed and drained it returns `None` to every caller.
/// Exactly one owner closes each queue: the producer closes the input queue,
/// the orchestrator closes the output queue after all workers joined.
///
/// # Example
/// ```text
/// let queue = Arc::new(ClosableQueue::new());
/// queue.push("a.jpg".to_string());
/// queue.close();
/// assert_eq!(queue.pop(), Some("a.jpg".to_string()));
/// assert_eq!(queue.pop(), None);
/// ```
#[derive(Debug)]
pub struct ClosableQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> ClosableQueue<T> {
    /// Create an empty, open queue
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    // Nothing inside the critical sections can panic halfway through a
    // mutation, so a poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an item to the tail and wake one blocked popper
    ///
    /// Never blocks beyond the lock. Pushing after `close` is a caller bug;
    /// it is not detected here.
    pub fn push(&self, item: T) {
        {
            let mut state = self.lock();
            state.items.push_back(item);
        }
        self.available.notify_one();
    }

    /// Remove the head item, blocking while the queue is empty and open
    ///
    /// Returns `None` only when the queue is both empty and closed.
    pub fn pop(&self) -> Option<T> {
        let state = self.lock();
        let mut state = self
            .available
            .wait_while(state, |s| s.items.is_empty() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);

        // Either an item is available or the queue is closed and drained
        state.items.pop_front()
    }

    /// Close the queue and wake every blocked popper
    ///
    /// Idempotent. Items pushed before close are still delivered.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
        }
        self.available.notify_all();
    }

    /// Snapshot of the number of queued items
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Snapshot of emptiness
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl<T> Default for ClosableQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
