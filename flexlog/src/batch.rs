use std::time::Duration;

use tokio::time::Instant;

/// Groups items into batches bounded by size and age.
///
/// A batch is ready when it holds `max_batch_size` items, or when
/// `batch_timeout` has passed since its first item arrived.
pub struct BatchCollector<T> {
    items: Vec<T>,
    max_batch_size: usize,
    batch_timeout: Duration,
    started: Option<Instant>,
}

impl<T> BatchCollector<T> {
    pub fn new(max_batch_size: usize, batch_timeout: Duration) -> Self {
        let max_batch_size = max_batch_size.max(1);

        Self {
            items: Vec::with_capacity(max_batch_size),
            max_batch_size,
            batch_timeout,
            started: None,
        }
    }

    /// Adds an item, returning the batch if it became ready.
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        let now = Instant::now();
        let started = *self.started.get_or_insert(now);
        self.items.push(item);

        if self.items.len() >= self.max_batch_size || now.duration_since(started) >= self.batch_timeout
        {
            return Some(self.take());
        }

        None
    }

    /// When the current batch times out, if it has started.
    pub fn deadline(&self) -> Option<Instant> {
        self.started.map(|started| started + self.batch_timeout)
    }

    /// The current batch if its timeout has passed.
    pub fn take_expired(&mut self) -> Option<Vec<T>> {
        match self.deadline() {
            Some(deadline) if Instant::now() >= deadline => Some(self.take()),
            _ => None,
        }
    }

    /// The current batch regardless of thresholds.
    pub fn take(&mut self) -> Vec<T> {
        self.started = None;
        std::mem::replace(&mut self.items, Vec::with_capacity(self.max_batch_size))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
