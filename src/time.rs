//! Write-time sources
//!
//! Every write asks an injected [`TimeSource`] for its logical timestamp.
//! Deletes of the same write are issued one microsecond earlier, so the
//! source must never hand out the same value twice for successive writes.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Supplies logical write timestamps in microseconds
pub trait TimeSource: Send + Sync {
    fn current_time_micros(&self) -> i64;
}

/// Wall-clock source that never goes backwards
#[derive(Debug, Default)]
pub struct SystemTimeSource {
    last: AtomicI64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for SystemTimeSource {
    fn current_time_micros(&self) -> i64 {
        let now = Utc::now().timestamp_micros();
        // Bump past the previous value when the clock stalls or steps back.
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = if now > prev { now } else { prev + 1 };
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Caller-controlled source for deterministic tests and tooling
///
/// Returns the same value until `set` or `advance` moves it; callers issuing
/// successive writes must advance it between them.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: AtomicI64,
}

impl ManualTimeSource {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, micros: i64) {
        self.now.store(micros, Ordering::SeqCst);
    }

    pub fn advance(&self, micros: i64) -> i64 {
        self.now.fetch_add(micros, Ordering::SeqCst) + micros
    }
}

impl TimeSource for ManualTimeSource {
    fn current_time_micros(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_source_strictly_increasing() {
        let source = SystemTimeSource::new();
        let mut prev = source.current_time_micros();
        for _ in 0..1000 {
            let next = source.current_time_micros();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn test_manual_source() {
        let source = ManualTimeSource::new(100);
        assert_eq!(source.current_time_micros(), 100);
        source.set(200);
        assert_eq!(source.current_time_micros(), 200);
        assert_eq!(source.advance(5), 205);
    }
}
