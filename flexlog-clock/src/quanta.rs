use std::sync::Arc;

use chrono::{DateTime, Duration, OutOfRangeError, Utc};
use quanta::{Instant, Mock};

use crate::Clock;

pub struct QuantaClock {
    clock: quanta::Clock,
    start_time: DateTime<Utc>,
    start_instant: quanta::Instant,
}

impl QuantaClock {
    pub fn new() -> QuantaClock {
        let clock = quanta::Clock::new();
        // this also lazily initializes a global clock which
        // can take up to 200ms if it is not initialized
        let start_instant = clock.now();
        QuantaClock {
            clock,
            start_time: Utc::now(),
            start_instant,
        }
    }

    /// Clock driven by hand through the returned [`Mock`].
    ///
    /// Time only moves when `Mock::increment` is called, which makes
    /// invocation durations deterministic in tests.
    pub fn mock() -> (QuantaClock, Arc<Mock>) {
        let (clock, mock) = quanta::Clock::mock();
        let start_instant = clock.now();
        let clock = QuantaClock {
            clock,
            start_time: Utc::now(),
            start_instant,
        };

        (clock, mock)
    }
}

impl Default for QuantaClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for QuantaClock {
    fn get_instant(&self) -> Instant {
        self.clock.now()
    }

    fn compute_system_time_from_instant(
        &self,
        instant: Instant,
    ) -> Result<DateTime<Utc>, OutOfRangeError> {
        let elapsed_time = instant.saturating_duration_since(self.start_instant);
        let chrono_duration = Duration::from_std(elapsed_time);
        chrono_duration.map(|duration| self.start_time + duration)
    }
}
