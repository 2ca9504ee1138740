//! Clock abstraction — deterministic time for the engine.

use std::cell::Cell;
use vaultstake_types::Timestamp;

/// Supplies the current time. Injected so engine behavior is testable without
/// wall-clock dependence; the engine never calls `Timestamp::now()` itself.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct ManualClock {
    current: Cell<u64>,
}

impl ManualClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get() + secs);
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }
}
