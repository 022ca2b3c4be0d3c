//! Bounded multi-producer queue between interception and processing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_queue::ArrayQueue;
use crossbeam_utils::CachePadded;
use futures::Stream;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::{entry::LogEntry, error::QueueError};

/// Bounded queue of [`LogEntry`] values.
///
/// Producers never block: when the queue is full the oldest buffered entry
/// is dropped to make room. A single consumer reads through
/// [`BackgroundLog::read_all`]; synchronous drains use
/// [`BackgroundLog::try_dequeue`].
pub struct BackgroundLog {
    queue: ArrayQueue<LogEntry>,
    notify: Notify,
    disposed: AtomicBool,
    reader_claimed: AtomicBool,
    dropped: CachePadded<AtomicU64>,
}

impl BackgroundLog {
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        Ok(Self {
            queue: ArrayQueue::new(capacity),
            notify: Notify::new(),
            disposed: AtomicBool::new(false),
            reader_claimed: AtomicBool::new(false),
            dropped: CachePadded::new(AtomicU64::new(0)),
        })
    }

    /// Adds an entry without blocking. Returns `false` only once the queue is
    /// disposed; a full queue sheds its oldest entry instead.
    pub fn try_enqueue(&self, entry: LogEntry) -> bool {
        if self.is_disposed() {
            return false;
        }

        if self.queue.force_push(entry).is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.notify.notify_one();

        true
    }

    pub fn try_dequeue(&self) -> Option<LogEntry> {
        self.queue.pop()
    }

    /// Stream of entries for the single consumer.
    ///
    /// The stream waits for new entries and ends when `cancel` fires, or
    /// when the queue is disposed and everything buffered has been read. It
    /// can only be obtained once.
    pub fn read_all(
        &self,
        cancel: CancellationToken,
    ) -> Result<impl Stream<Item = LogEntry> + '_, QueueError> {
        if self.reader_claimed.swap(true, Ordering::AcqRel) {
            return Err(QueueError::ReaderClaimed);
        }

        Ok(futures::stream::unfold(
            (self, cancel),
            |(log, cancel)| async move {
                let entry = log.next_entry(&cancel).await?;
                Some((entry, (log, cancel)))
            },
        ))
    }

    async fn next_entry(&self, cancel: &CancellationToken) -> Option<LogEntry> {
        loop {
            // Register for wakeups before checking, so an enqueue or dispose
            // between the checks and the await is not missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if cancel.is_cancelled() {
                return None;
            }
            if let Some(entry) = self.queue.pop() {
                return Some(entry);
            }
            if self.is_disposed() {
                return None;
            }

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = &mut notified => {}
            }
        }
    }

    /// Stops accepting entries and wakes the reader. Idempotent.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            tracing::debug!(buffered = self.len(), "background log disposed");
        }
        self.notify.notify_waiters();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Entries shed because the queue was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
