//! Time sources for cache expiry and default post dates

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// A source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic time, used for cache ages.
    fn now(&self) -> Instant;

    /// Wall-clock time, used for defaulted post dates.
    fn utc(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<(Instant, DateTime<Utc>)>,
}

impl ManualClock {
    pub fn new(utc: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new((Instant::now(), utc)),
        }
    }

    /// Move both time sources forward
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock();
        state.0 += by;
        state.1 += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.state.lock().0
    }

    fn utc(&self) -> DateTime<Utc> {
        self.state.lock().1
    }
}
