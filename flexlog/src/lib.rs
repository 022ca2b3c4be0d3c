//! Configuration-driven method-interception logging.
//!
//! # Usage
//!
//! `flexlog` logs invocations of methods: their inputs, output, duration and
//! failure, without changing what the method returns. Which methods are
//! logged, and how, is decided per method from attributes on the type and a
//! [`LoggingConfig`]. Entries go through a bounded background queue to a
//! dedicated thread, which formats them and writes them to named targets.
//!
//! Types opt in with the [`loggable`] attribute, method bodies are wrapped
//! with a [`MethodLoggingInterceptor`] obtained from the [`FlexLog`] host.
//!
//! ## Example
//!
//! ```rust no_run
//! use flexlog::{config, loggable, method, params, FlexLog, MethodLoggingInterceptor};
//!
//! struct Orders {
//!     log: MethodLoggingInterceptor,
//! }
//!
//! #[loggable(log_input, level = "Debug")]
//! impl Orders {
//!     #[log(log_both, target = "Audit")]
//!     fn place(&self, item: &str, qty: u32) -> Result<u64, std::io::Error> {
//!         self.log
//!             .try_invoke(method!(Orders, place), params!(item, qty), || Ok(42))
//!     }
//!
//!     fn lookup(&self, id: u64) -> Option<String> {
//!         self.log.invoke(method!(Orders, lookup), params!(id), || None)
//!     }
//!
//!     #[log(no_log)]
//!     fn health(&self) -> bool {
//!         true
//!     }
//! }
//!
//! # fn main() -> flexlog::Result<()> {
//! let host = FlexLog::builder(config()).build()?;
//! host.start()?;
//!
//! let orders = Orders { log: host.interceptor() };
//! // [2024-05-01T10:00:00.123Z][DBG]Method my_app::Orders.lookup called with {"id":7} completed in 0.01ms
//! orders.lookup(7);
//!
//! // processes everything logged so far
//! host.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Decisions
//!
//! The [`InterceptionDecisionCache`] computes the decisions of all methods of
//! a type the first time one of them is called. From highest to lowest
//! precedence:
//!
//! 1. `no_log`/`no_auto_log` on the method or the type
//! 2. `log_input`/`log_output`/`log_both` on the method
//! 3. the same on the type
//! 4. a matching pattern in `Services`, e.g. `"my_app::orders::*"`
//! 5. `AutoIntercept`: input at `Information`
//!
//! # Formatting
//!
//! Each entry is rendered by a [`MessageFormatter`](format::MessageFormatter)
//! picked from the entry, its target and the configured default. Built-in
//! formatters cover plain templates, JSON and a mix of both; see
//! [`format`] for the template placeholders. When a formatter fails the
//! fallback template is rendered instead, so an entry is never lost to a
//! formatting bug.
//!
//! # Shutdown
//!
//! Every entry enqueued before [`FlexLog::shutdown`] is processed before it
//! returns, within `ShutdownTimeout`. When the queue overflows in the
//! meantime, the oldest entries are dropped; producers never block.

// Allows the attribute macro's `::flexlog::` paths inside this crate.
extern crate self as flexlog;

pub mod batch;
pub mod cache;
pub mod config;
pub mod decision;
pub mod entry;
pub mod error;
pub mod format;
mod host;
pub mod intercept;
pub mod level;
mod macros;
pub mod processor;
pub mod queue;
pub mod registry;
pub mod service;

pub use flexlog_clock as clock;
pub use flexlog_flush as flush;
pub use flexlog_macros::loggable;

pub use cache::InterceptionDecisionCache;
pub use config::{config, LoggingConfig};
pub use decision::{Decision, LogBehavior};
pub use entry::LogEntry;
pub use error::{Error, Result};
pub use host::{FlexLog, FlexLogBuilder};
pub use intercept::{Invocation, MethodLoggingInterceptor};
pub use level::Level;
pub use processor::{LogEntryProcessor, TargetProcessor};
pub use queue::BackgroundLog;
pub use registry::{Loggable, MethodRef};
pub use service::{BackgroundLoggingService, ServiceState};
