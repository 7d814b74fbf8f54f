//! Wall clock and monotonic stamping.
//!
//! Every mutation is stamped with a millisecond timestamp. The [`Stamper`]
//! combines a wall clock with the last issued stamp so stamps strictly
//! increase even when several mutations land in the same millisecond or the
//! wall clock steps backward.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Largest stamp accepted from outside: 9999-12-31T23:59:59.999Z.
pub const MAX_STAMP: i64 = 253_402_300_799_999;

/// Source of wall-clock time in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Issues strictly increasing stamps.
pub struct Stamper {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl Stamper {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(i64::MIN),
        }
    }

    /// Current wall time, not advanced past previous stamps.
    ///
    /// Used for retention cutoffs and sync bookkeeping.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Issue the next stamp: `max(wall_now, last + 1)`.
    pub fn stamp(&self) -> i64 {
        let now = self.clock.now_ms();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = if prev == i64::MIN { now } else { now.max(prev.saturating_add(1)) };
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    /// Make sure later stamps out-rank `stamp` (e.g. one received from a merge).
    pub fn observe(&self, stamp: i64) {
        self.last.fetch_max(stamp, Ordering::AcqRel);
    }
}

impl Default for Stamper {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for Stamper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stamper")
            .field("last", &self.last.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// A clock tests can move by hand.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ManualClock(AtomicI64);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn at(ms: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(ms)))
    }

    pub(crate) fn set(&self, ms: i64) {
        self.0.store(ms, Ordering::SeqCst);
    }

    pub(crate) fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamps_follow_wall_clock() {
        let clock = ManualClock::at(1_000);
        let stamper = Stamper::new(clock.clone());

        assert_eq!(stamper.stamp(), 1_000);
        clock.advance(50);
        assert_eq!(stamper.stamp(), 1_050);
    }

    #[test]
    fn test_stamps_strictly_increase_within_a_millisecond() {
        let clock = ManualClock::at(1_000);
        let stamper = Stamper::new(clock.clone());

        let a = stamper.stamp();
        let b = stamper.stamp();
        clock.set(900); // wall clock stepped backward
        let c = stamper.stamp();

        assert!(a < b && b < c);
        assert_eq!(stamper.now(), 900);
    }

    #[test]
    fn test_observe_moves_past_remote_stamps() {
        let clock = ManualClock::at(1_000);
        let stamper = Stamper::new(clock);

        stamper.observe(5_000);
        assert_eq!(stamper.stamp(), 5_001);

        stamper.observe(10); // older stamps are ignored
        assert_eq!(stamper.stamp(), 5_002);
    }

    #[test]
    fn test_stamp_saturates_at_max() {
        let stamper = Stamper::new(ManualClock::at(1_000));
        stamper.observe(i64::MAX);

        assert_eq!(stamper.stamp(), i64::MAX);
        assert_eq!(stamper.stamp(), i64::MAX);
    }
}
