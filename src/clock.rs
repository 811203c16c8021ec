use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// A source for the current time.
pub trait Clock: Send + Sync + 'static {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// A clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Timestamps are kept at second granularity, the same granularity tokens use.
#[derive(Debug)]
pub struct FixedClock {
    timestamp: AtomicI64,
}

impl FixedClock {
    /// Construct a clock frozen at the given Unix timestamp.
    pub fn at(timestamp: i64) -> Self {
        Self { timestamp: AtomicI64::new(timestamp) }
    }

    /// Move the clock to the given Unix timestamp.
    pub fn set(&self, timestamp: i64) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }

    /// Move the clock forward by the given number of seconds.
    pub fn advance(&self, seconds: i64) {
        self.timestamp.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        // Timestamps out of chrono's range saturate to its bounds.
        let timestamp = self.timestamp.load(Ordering::SeqCst);
        match DateTime::from_timestamp(timestamp, 0) {
            Some(now) => now,
            None if timestamp < 0 => DateTime::<Utc>::MIN_UTC,
            None => DateTime::<Utc>::MAX_UTC,
        }
    }
}
