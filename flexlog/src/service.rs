//! Background consumer of the [`BackgroundLog`].
//!
//! The service owns one dedicated thread, `flexlog-background`, which drives
//! a current-thread tokio runtime. The runtime reads entries from the queue,
//! groups them with a [`BatchCollector`] and hands every entry of a ready
//! batch to the [`LogEntryProcessor`]. Failures are isolated per entry: an
//! error or panic while processing one entry is logged and counted, and the
//! rest of the batch carries on.
//!
//! Shutdown cancels the loop, processes the partial batch, then drains
//! whatever is still queued through [`BackgroundLoggingService::flush_remaining_entries`].
//!
//! ```text
//! Created -> Running -> Cancelling -> Flushing -> Stopped
//!    \________________________________/
//!         (stop before start flushes directly)
//! ```

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, AtomicU8, Ordering},
        mpsc, Arc, Mutex, MutexGuard, TryLockError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_utils::{Backoff, CachePadded};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::{
    batch::BatchCollector,
    config::LoggingConfig,
    entry::{ExceptionInfo, LogEntry},
    error::{ProcessError, ServiceError},
    processor::LogEntryProcessor,
    queue::BackgroundLog,
};

pub(crate) const WORKER_THREAD_NAME: &str = "flexlog-background";

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    Created = 0,
    Running = 1,
    Cancelling = 2,
    Flushing = 3,
    Stopped = 4,
}

impl ServiceState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ServiceState::Created,
            1 => ServiceState::Running,
            2 => ServiceState::Cancelling,
            3 => ServiceState::Flushing,
            _ => ServiceState::Stopped,
        }
    }
}

struct Worker {
    done: mpsc::Receiver<Result<(), ServiceError>>,
    handle: JoinHandle<()>,
}

struct Inner {
    log: Arc<BackgroundLog>,
    processor: Arc<dyn LogEntryProcessor>,
    state: AtomicU8,
    cancel: CancellationToken,
    batch_lock: Mutex<()>,
    max_batch_size: usize,
    batch_timeout: Duration,
    batch_lock_timeout: Duration,
    processed: CachePadded<AtomicU64>,
    failed: CachePadded<AtomicU64>,
}

/// Single consumer of a [`BackgroundLog`].
pub struct BackgroundLoggingService {
    inner: Arc<Inner>,
    worker: Mutex<Option<Worker>>,
    shutdown_timeout: Duration,
}

impl BackgroundLoggingService {
    pub fn new(
        log: Arc<BackgroundLog>,
        processor: Arc<dyn LogEntryProcessor>,
        config: &LoggingConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                log,
                processor,
                state: AtomicU8::new(ServiceState::Created as u8),
                cancel: CancellationToken::new(),
                batch_lock: Mutex::new(()),
                max_batch_size: config.max_batch_size,
                batch_timeout: config.batch_timeout,
                batch_lock_timeout: config.batch_lock_timeout,
                processed: CachePadded::new(AtomicU64::new(0)),
                failed: CachePadded::new(AtomicU64::new(0)),
            }),
            worker: Mutex::new(None),
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// Spawns the worker thread. Can only be called once.
    pub fn start(&self) -> Result<(), ServiceError> {
        if !self.inner.transition(ServiceState::Created, ServiceState::Running) {
            return Err(ServiceError::AlreadyStarted);
        }

        let spawned = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .and_then(|runtime| {
                let inner = self.inner.clone();
                let (tx, rx) = mpsc::channel();
                let handle = thread::Builder::new()
                    .name(WORKER_THREAD_NAME.to_string())
                    .spawn(move || {
                        let result = runtime.block_on(inner.run());
                        inner.set_state(ServiceState::Flushing);
                        inner.flush_remaining_entries();
                        inner.set_state(ServiceState::Stopped);
                        let _ = tx.send(result);
                    })?;

                Ok(Worker { done: rx, handle })
            });

        match spawned {
            Ok(worker) => {
                *self.lock_worker() = Some(worker);
                tracing::debug!("background logging service started");
                Ok(())
            }
            Err(e) => {
                self.inner.set_state(ServiceState::Stopped);
                tracing::error!(error = %e, "failed to start background logging service");
                Err(ServiceError::Spawn(e))
            }
        }
    }

    /// Cancels the worker and waits up to `ShutdownTimeout` for it to flush
    /// and finish. A service that was never started flushes the queue on the
    /// calling thread.
    pub fn stop(&self) -> Result<(), ServiceError> {
        if self.inner.transition(ServiceState::Created, ServiceState::Flushing) {
            self.inner.flush_remaining_entries();
            self.inner.set_state(ServiceState::Stopped);
            return Ok(());
        }

        self.inner.transition(ServiceState::Running, ServiceState::Cancelling);
        self.inner.cancel.cancel();

        let Some(worker) = self.lock_worker().take() else {
            return Ok(());
        };

        match worker.done.recv_timeout(self.shutdown_timeout) {
            Ok(result) => {
                let _ = worker.handle.join();
                if let Err(e) = &result {
                    tracing::error!(error = %e, "background logging service failed");
                }
                result
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout = ?self.shutdown_timeout,
                    "background logging service did not stop in time, abandoning wait"
                );
                Err(ServiceError::ShutdownTimeout(self.shutdown_timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = worker.handle.join();
                self.inner.set_state(ServiceState::Stopped);
                tracing::error!("background logging worker panicked");
                Err(ServiceError::WorkerPanicked)
            }
        }
    }

    /// [`stop`](Self::stop), logging instead of returning the outcome.
    /// Idempotent and valid in any state.
    pub fn dispose(&self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "background logging service did not stop cleanly");
        }
    }

    /// Processes everything still queued on the calling thread. Returns the
    /// number of entries taken from the queue.
    pub fn flush_remaining_entries(&self) -> usize {
        self.inner.flush_remaining_entries()
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// Entries processed successfully.
    pub fn processed_count(&self) -> u64 {
        self.inner.processed.load(Ordering::Relaxed)
    }

    /// Entries whose processing returned an error or panicked.
    pub fn failed_count(&self) -> u64 {
        self.inner.failed.load(Ordering::Relaxed)
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for BackgroundLoggingService {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Inner {
    fn transition(&self, from: ServiceState, to: ServiceState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn set_state(&self, state: ServiceState) {
        self.state.store(state as u8, Ordering::Release);
    }

    async fn run(&self) -> Result<(), ServiceError> {
        let stream = match self.log.read_all(self.cancel.clone()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "background logging consume loop failed");
                return Err(e.into());
            }
        };
        tokio::pin!(stream);

        let mut batch = BatchCollector::new(self.max_batch_size, self.batch_timeout);
        loop {
            let deadline = batch.deadline();
            tokio::select! {
                biased;

                next = stream.next() => match next {
                    Some(entry) => {
                        if let Some(ready) = batch.push(entry) {
                            self.process_batch(ready);
                        }
                    }
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(tokio::time::Instant::now)),
                    if deadline.is_some() =>
                {
                    if let Some(ready) = batch.take_expired() {
                        self.process_batch(ready);
                    }
                }
            }
        }

        if self.cancel.is_cancelled() {
            tracing::debug!(pending = batch.len(), "background logging cancelled");
        }
        if !batch.is_empty() {
            self.process_batch(batch.take());
        }

        Ok(())
    }

    fn process_batch(&self, batch: Vec<LogEntry>) {
        let _guard = self.acquire_batch_lock();
        for entry in &batch {
            self.process_one(entry);
        }
    }

    fn flush_remaining_entries(&self) -> usize {
        let _guard = self.acquire_batch_lock();
        let mut flushed = 0;
        while let Some(entry) = self.log.try_dequeue() {
            self.process_one(&entry);
            flushed += 1;
        }

        if flushed > 0 {
            tracing::debug!(flushed, "flushed remaining log entries");
        }
        flushed
    }

    fn process_one(&self, entry: &LogEntry) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.processor.process_entry(entry)))
            .unwrap_or_else(|payload| {
                Err(ProcessError::Panicked(
                    ExceptionInfo::from_panic(payload.as_ref()).message,
                ))
            });

        match result {
            Ok(()) => {
                self.processed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    entry_id = entry.id(),
                    type_name = entry.type_name(),
                    method = entry.method_name(),
                    error = %e,
                    "failed to process log entry"
                );
            }
        }
    }

    /// Waits up to `batch_lock_timeout` for the batch lock. On timeout the
    /// caller proceeds without it.
    fn acquire_batch_lock(&self) -> Option<MutexGuard<'_, ()>> {
        let started = Instant::now();
        let backoff = Backoff::new();
        loop {
            match self.batch_lock.try_lock() {
                Ok(guard) => return Some(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Some(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {}
            }

            if started.elapsed() >= self.batch_lock_timeout {
                tracing::debug!(
                    timeout = ?self.batch_lock_timeout,
                    "batch lock busy, processing unsynchronized"
                );
                return None;
            }

            if backoff.is_completed() {
                thread::sleep(Duration::from_millis(1));
            } else {
                backoff.snooze();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tracing_test::traced_test;

    use super::*;
    use crate::level::Level;

    #[derive(Default)]
    struct Recording {
        methods: Mutex<Vec<String>>,
        delay: Duration,
    }

    impl Recording {
        fn methods(&self) -> Vec<String> {
            self.methods.lock().unwrap().clone()
        }
    }

    impl LogEntryProcessor for Recording {
        fn process_entry(&self, entry: &LogEntry) -> Result<(), ProcessError> {
            thread::sleep(self.delay);
            match entry.method_name() {
                "fails" => Err(ProcessError::UnknownTarget("Nowhere".to_string())),
                "panics" => panic!("processor blew up"),
                method => {
                    self.methods.lock().unwrap().push(method.to_string());
                    Ok(())
                }
            }
        }
    }

    fn entry(method: &str) -> LogEntry {
        LogEntry::create_start("T", method, Level::Information)
    }

    fn service(
        config: &LoggingConfig,
        processor: Arc<Recording>,
    ) -> (Arc<BackgroundLog>, BackgroundLoggingService) {
        let log = Arc::new(BackgroundLog::new(config.queue_capacity).unwrap());
        let service = BackgroundLoggingService::new(log.clone(), processor, config);
        (log, service)
    }

    #[test]
    fn processes_everything_before_stop_in_order() {
        let processor = Arc::new(Recording::default());
        let (log, service) = service(&LoggingConfig::default().with_max_batch_size(3), processor.clone());
        service.start().unwrap();
        assert_eq!(service.state(), ServiceState::Running);

        let methods: Vec<String> = (0..10).map(|i| format!("m{}", i)).collect();
        for method in &methods {
            assert!(log.try_enqueue(entry(method)));
        }
        log.dispose();
        service.stop().unwrap();

        assert_eq!(service.state(), ServiceState::Stopped);
        assert_eq!(processor.methods(), methods);
        assert_eq!(service.processed_count(), 10);
    }

    #[test]
    fn batch_timeout_flushes_partial_batch() {
        let processor = Arc::new(Recording::default());
        let config = LoggingConfig::default().with_batch_timeout(Duration::from_millis(30));
        let (log, service) = service(&config, processor.clone());
        service.start().unwrap();

        log.try_enqueue(entry("lonely"));
        let deadline = Instant::now() + Duration::from_secs(5);
        while processor.methods().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(processor.methods(), ["lonely"]);
        assert_eq!(service.state(), ServiceState::Running);
        service.stop().unwrap();
    }

    #[traced_test]
    #[test]
    fn failures_are_isolated_per_entry() {
        let processor = Arc::new(Recording::default());
        let (log, service) = service(&LoggingConfig::default(), processor.clone());

        for method in ["a", "fails", "b", "panics", "c"] {
            log.try_enqueue(entry(method));
        }
        assert_eq!(service.flush_remaining_entries(), 5);

        assert_eq!(processor.methods(), ["a", "b", "c"]);
        assert_eq!(service.processed_count(), 3);
        assert_eq!(service.failed_count(), 2);
        assert!(logs_contain("failed to process log entry"));
        assert!(logs_contain("processor blew up"));
    }

    #[traced_test]
    #[test]
    fn busy_batch_lock_does_not_stall_flush() {
        let processor = Arc::new(Recording::default());
        let config = LoggingConfig::default().with_batch_lock_timeout(Duration::from_millis(10));
        let (log, service) = service(&config, processor.clone());
        for method in ["a", "b"] {
            log.try_enqueue(entry(method));
        }

        let held = service.inner.batch_lock.lock().unwrap();
        let started = Instant::now();
        assert_eq!(service.flush_remaining_entries(), 2);
        drop(held);

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(processor.methods(), ["a", "b"]);
        assert!(logs_contain("processing unsynchronized"));
    }

    #[test]
    fn never_started_service_flushes_on_dispose() {
        let processor = Arc::new(Recording::default());
        let (log, service) = service(&LoggingConfig::default(), processor.clone());
        log.try_enqueue(entry("queued"));

        service.dispose();
        service.dispose();
        assert_eq!(service.state(), ServiceState::Stopped);
        assert_eq!(processor.methods(), ["queued"]);
        assert!(matches!(service.start(), Err(ServiceError::AlreadyStarted)));
    }

    #[test]
    fn start_twice_rejected() {
        let (_log, service) = service(&LoggingConfig::default(), Arc::new(Recording::default()));
        service.start().unwrap();
        assert!(matches!(service.start(), Err(ServiceError::AlreadyStarted)));
        service.stop().unwrap();
        service.stop().unwrap();
    }

    #[traced_test]
    #[test]
    fn claimed_reader_surfaces_from_stop() {
        let processor = Arc::new(Recording::default());
        let (log, service) = service(&LoggingConfig::default(), processor.clone());
        drop(log.read_all(CancellationToken::new()).unwrap());

        log.try_enqueue(entry("still flushed"));
        service.start().unwrap();
        let err = service.stop().unwrap_err();

        assert!(matches!(err, ServiceError::Queue(crate::error::QueueError::ReaderClaimed)));
        assert_eq!(processor.methods(), ["still flushed"]);
        assert!(logs_contain("background logging service failed"));
    }

    #[test]
    fn stop_wait_is_bounded() {
        let processor = Arc::new(Recording {
            delay: Duration::from_millis(300),
            ..Recording::default()
        });
        let config = LoggingConfig::default()
            .with_max_batch_size(1)
            .with_shutdown_timeout(Duration::from_millis(20));
        let (log, service) = service(&config, processor);
        service.start().unwrap();

        for i in 0..5 {
            log.try_enqueue(entry(&format!("slow{}", i)));
        }
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        assert!(matches!(service.stop(), Err(ServiceError::ShutdownTimeout(_))));
        assert!(started.elapsed() < Duration::from_millis(250));
    }
}
