//! Second-resolution time source (spec §5).
//!
//! The datapath reads time at exactly three points: dispatch entry (ARP
//! staleness sweep), ARP-reply ingestion (`cached_at`), and park
//! (`enqueued_at`). A `Clock` is injected into `Router::new` rather than
//! read from a process-wide singleton, so tests can drive it deterministically
//! without sleeping and without the synchronization a global would need under
//! the concurrent-dispatch extension in spec §5.
//!
//! `ManualClock` plays the same role the teacher crate's `TimeProvider`
//! freeze/advance API played (see the teacher's `tick.rs`), but as a value
//! owned by one router instead of a `static OnceLock`.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, at the granularity spec §5 requires.
pub type Timestamp = u64;

/// A source of second-granularity time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wraps `SystemTime::now()`. The default clock for a production router.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_secs()
    }
}

/// A clock whose value is set explicitly. Used in tests to exercise ARP
/// staleness (`STALE_TIME`) and pending-cache retry cadence without waiting
/// on real time.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    now: Timestamp,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now: start }
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    /// Sets the clock to an absolute value.
    pub fn set(&mut self, now: Timestamp) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let mut clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        clock.advance(15);
        assert_eq!(clock.now(), 115);
    }

    #[test]
    fn system_clock_is_plausible() {
        let now = SystemClock.now();
        assert!(now > 1_700_000_000);
    }
}
