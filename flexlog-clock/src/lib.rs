//! `Clock` dictates how invocations are timed by flexlog.
//!
//! An intercepted call records a monotonic [`Instant`] when it starts and
//! another when it completes; the difference is the invocation duration. The
//! wall-clock timestamp of the log entry is derived from the start instant, so
//! only one clock read is needed on the hot path.
//!
//! ```rust no_run
//! use flexlog_clock::{Clock, quanta::QuantaClock};
//!
//! let clock = QuantaClock::new();
//!
//! let started = clock.get_instant();
//! // run the intercepted method
//! let elapsed = clock.elapsed_since(started);
//! let timestamp = clock.compute_system_time_from_instant(started);
//! # let _ = (elapsed, timestamp);
//! ```

use std::time::Duration;

use chrono::{DateTime, OutOfRangeError, Utc};

pub mod quanta;

pub use ::quanta::{Instant, Mock};

pub trait Clock: Send + Sync {
    /// Returns current monotonic instant
    fn get_instant(&self) -> Instant;

    /// Returns system time corresponding to a monotonic instant
    fn compute_system_time_from_instant(
        &self,
        instant: Instant,
    ) -> Result<DateTime<Utc>, OutOfRangeError>;

    /// Time passed since `start`, saturating at zero.
    fn elapsed_since(&self, start: Instant) -> Duration {
        self.get_instant().saturating_duration_since(start)
    }
}
