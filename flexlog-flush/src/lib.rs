//! ## `Flush` trait
//!
//! A `Flush` implementor is the final destination of a formatted log line:
//! stdout, stderr, a file, or anything else a target can be bound to. The
//! flexlog processor renders one line per log entry and hands it to the
//! flusher registered for the entry's target.
//!
//! ## Example usage of `Flush`
//!
//! ```rust
//! use flexlog_flush::Flush;
//! # use flexlog_flush::stdout_flusher::StdoutFlusher;
//! # use std::collections::VecDeque;
//! # fn render(item: String) -> String { item }
//! # struct Processor;
//! impl Processor {
//!     fn write_pending(&mut self) -> std::io::Result<()> {
//!         # let mut flusher = StdoutFlusher::new();
//!         # let mut pending = VecDeque::new();
//!         # pending.push_back(String::from("Hello, world!\n"));
//!         while let Some(item) = pending.pop_front() {
//!             // flusher implements `Flush` trait
//!             flusher.flush_one(render(item))?;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

/// Flushes to a file
pub mod file_flusher;
/// No-op Flush, does nothing
pub mod noop_flusher;
/// Flushes to stderr
pub mod stderr_flusher;
/// Flushes to stdout
pub mod stdout_flusher;

/// Destination of rendered log lines.
///
/// Implementors perform the actual I/O, i.e. writing to a file or to stdout.
/// Errors are reported back to the caller, which decides whether a failed
/// write is worth more than a diagnostic.
pub trait Flush: Send {
    /// Writes a single rendered line (including its trailing newline).
    fn flush_one(&mut self, display: String) -> std::io::Result<()>;

    /// Pushes out anything buffered by the implementor.
    fn flush_all(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<F: Flush + ?Sized> Flush for Box<F> {
    fn flush_one(&mut self, display: String) -> std::io::Result<()> {
        (**self).flush_one(display)
    }

    fn flush_all(&mut self) -> std::io::Result<()> {
        (**self).flush_all()
    }
}
