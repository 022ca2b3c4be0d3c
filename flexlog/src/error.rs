//! Error types for the logging pipeline.
//!
//! None of these ever reach the caller of an intercepted method. They surface
//! from construction (`ConfigError`, `QueueError`), from the host's lifecycle
//! calls (`ServiceError`) and from entry processing (`ProcessError`), which
//! the background service logs and counts.

use std::time::Duration;

use thiserror::Error;

use crate::format::FormatterType;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Queue must hold at least one entry
    #[error("QueueCapacity must be greater than zero")]
    ZeroQueueCapacity,

    /// Batches must hold at least one entry
    #[error("MaxBatchSize must be greater than zero")]
    ZeroBatchSize,

    /// Failed to deserialize a configuration document
    #[error("failed to parse logging configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the background queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Capacity of zero requested
    #[error("queue capacity must be greater than zero")]
    ZeroCapacity,

    /// The consumption stream was already handed out
    #[error("queue already has a reader")]
    ReaderClaimed,
}

/// Errors from the background logging service lifecycle.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// `start` called more than once, or after dispose
    #[error("background logging service already started or stopped")]
    AlreadyStarted,

    /// The dedicated worker thread or its runtime could not be created
    #[error("failed to spawn background logging worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The consume loop could not obtain the queue reader
    #[error("background consume loop failed: {0}")]
    Queue(#[from] QueueError),

    /// The worker did not finish within the shutdown timeout
    #[error("background logging worker did not stop within {0:?}")]
    ShutdownTimeout(Duration),

    /// The worker thread panicked outside per-entry processing
    #[error("background logging worker panicked")]
    WorkerPanicked,
}

/// Errors from turning a single entry into output.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Formatter failed and fallback formatting is disabled
    #[error("formatter {formatter} failed: {reason}")]
    Formatting {
        formatter: FormatterType,
        reason: String,
    },

    /// No sink registered under the target name
    #[error("unknown logging target: {0}")]
    UnknownTarget(String),

    /// The sink failed to write
    #[error("failed to write to target {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Processing panicked
    #[error("entry processing panicked: {0}")]
    Panicked(String),
}

/// Any error produced by flexlog.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
