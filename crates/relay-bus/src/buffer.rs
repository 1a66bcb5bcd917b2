//! # Subscription Buffer
//!
//! Bounded FIFO between the dispatcher (single writer path) and one
//! scheduler (single reader path).
//!
//! When full, new records are refused and existing ones are kept
//! (drop-newest). Every operation holds the one mutex only for the duration
//! of the queue mutation.

use crate::error::BufferError;
use parking_lot::Mutex;
use relay_types::EventRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Result of [`SubscriptionBuffer::drain_up_to`].
#[derive(Debug, Default)]
pub struct Drained {
    /// Oldest entries, in insertion order.
    pub entries: Vec<Arc<EventRecord>>,
    /// Entries left in the buffer, captured with the drain.
    pub remaining: usize,
}

struct Inner {
    queue: VecDeque<Arc<EventRecord>>,
    closed: bool,
}

/// Bounded per-subscription queue.
pub struct SubscriptionBuffer {
    inner: Mutex<Inner>,
    capacity: usize,
    /// Records refused because the buffer was full or closed.
    dropped: AtomicU64,
}

impl SubscriptionBuffer {
    /// Create a buffer holding at most `capacity` records.
    ///
    /// Capacity is validated by the subscription builder; a zero capacity
    /// refuses every record.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Append a record unless the buffer is full or closed.
    pub fn try_enqueue(&self, record: Arc<EventRecord>) -> Result<(), BufferError> {
        let mut inner = self.inner.lock();

        if inner.closed {
            drop(inner);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(BufferError::Closed);
        }

        if inner.queue.len() >= self.capacity {
            drop(inner);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(BufferError::Full {
                capacity: self.capacity,
            });
        }

        inner.queue.push_back(record);
        Ok(())
    }

    /// Remove and return the oldest `min(max, len)` records.
    pub fn drain_up_to(&self, max: usize) -> Drained {
        let mut inner = self.inner.lock();
        let take = max.min(inner.queue.len());
        let entries: Vec<_> = inner.queue.drain(..take).collect();
        let remaining = inner.queue.len();

        Drained { entries, remaining }
    }

    /// Current number of buffered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Whether the buffer holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records refused so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Release buffered records and refuse all further insertions.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.queue = VecDeque::new();
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl std::fmt::Debug for SubscriptionBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SubscriptionBuffer")
            .field("len", &inner.queue.len())
            .field("capacity", &self.capacity)
            .field("closed", &inner.closed)
            .field("dropped", &self.dropped())
            .finish()
    }
}
