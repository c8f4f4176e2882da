//! Time mocking utilities
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use ksef_common::testing::{MockClock, RecordingSleeper};
//! use ksef_common::time::{Clock, Sleeper};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now().duration_since(start), Duration::from_secs(5));
//!
//! let sleeper = RecordingSleeper::new();
//! sleeper.sleep(Duration::from_millis(200));
//! assert_eq!(sleeper.recorded(), vec![Duration::from_millis(200)]);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::time::{Clock, Sleeper};

/// Mock clock for deterministic testing
///
/// Cloned handles share the same elapsed time.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
    base_system_time: SystemTime,
}

impl MockClock {
    /// Clock starting at the current real time.
    pub fn new() -> Self {
        Self::at_system_time(SystemTime::now())
    }

    /// Clock whose wall time starts at `base`.
    pub fn at_system_time(base: SystemTime) -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            base_system_time: base,
        }
    }

    /// Clock whose wall time starts at the given UTC timestamp.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self::at_system_time(SystemTime::from(timestamp))
    }

    /// Simulate time passing without waiting.
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        self.base_system_time + self.elapsed()
    }
}

/// Sleeper that records requested durations instead of blocking
///
/// Pair with a [`MockClock`] via [`RecordingSleeper::with_clock`] to have
/// each recorded sleep advance the clock.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
    clock: Option<MockClock>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: MockClock) -> Self {
        Self { sleeps: Arc::default(), clock: Some(clock) }
    }

    /// Durations requested so far, in call order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps.lock().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
    }
}
