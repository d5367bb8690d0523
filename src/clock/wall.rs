// Wall clock - Time source for wall-clock-measured intervals
//
// The interval timer measures bursts in wall-clock seconds, not audio time.
// Time is injected through a trait so timer tests never have to sleep.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A monotonic wall-clock time source
pub trait TimeSource {
    /// Elapsed time since this source's origin
    fn now(&self) -> Duration;
}

// Shared handles read time like the source itself, so a timer and the
// code advancing a ManualTime can hold the same source.
impl<T: TimeSource + ?Sized> TimeSource for std::rc::Rc<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Real time source anchored at its creation instant
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually controlled time source for deterministic timer tests
#[derive(Debug, Default)]
pub struct ManualTime {
    now: Cell<Duration>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_time_moves_forward() {
        let time = MonotonicTime::new();
        let first = time.now();
        let second = time.now();
        assert!(second >= first);
    }

    #[test]
    fn test_manual_time_control() {
        let time = ManualTime::new();
        assert_eq!(time.now(), Duration::ZERO);

        time.set(Duration::from_secs(5));
        assert_eq!(time.now(), Duration::from_secs(5));

        time.advance(Duration::from_millis(500));
        assert_eq!(time.now(), Duration::from_millis(5500));
    }
}
