// Interval timer - Burst/rest duty cycle
//
// Interval-training protocol: a short high-intensity burst followed by a
// longer rest, measured in wall-clock seconds, independent of the
// scheduler's beat clock. Phase deadlines are polled via `tick()` — the
// single-shot timer of the duty cycle, re-armed per phase.
//
// Listener registration here is deliberately single-slot (last
// registration wins), unlike the metronome's multi-subscriber model. The
// two contracts differ on purpose; session orchestration depends on the
// replace-on-register behavior.

use std::time::Duration;

use crate::clock::TimeSource;

type PhaseCallback = Box<dyn FnMut()>;

/// Duty-cycle phase. Only `Idle` carries no pending deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Burst { started: Duration, ends: Duration },
    Rest { ends: Duration },
}

/// Two-phase burst/rest timer.
///
/// `Idle → Burst → Rest → Idle`; the rest-end listener is the hook for the
/// orchestrator to arm the next burst. Durations are fixed per instance.
pub struct IntervalTimer<T: TimeSource> {
    time: T,
    burst_duration: Duration,
    rest_duration: Duration,
    phase: Phase,
    on_burst_end: Option<PhaseCallback>,
    on_rest_end: Option<PhaseCallback>,
}

impl<T: TimeSource> IntervalTimer<T> {
    pub fn new(time: T, burst_duration: Duration, rest_duration: Duration) -> Self {
        Self {
            time,
            burst_duration,
            rest_duration,
            phase: Phase::Idle,
            on_burst_end: None,
            on_rest_end: None,
        }
    }

    /// Enter the burst phase and arm its auto-end deadline
    pub fn start_burst(&mut self) {
        let now = self.time.now();
        self.phase = Phase::Burst {
            started: now,
            ends: now + self.burst_duration,
        };
    }

    /// End the burst (manual override or automatic via `tick`), fire the
    /// burst-end listener, and arm the rest deadline. The pending burst
    /// deadline is cancelled, so an early manual end never double-fires.
    pub fn end_burst(&mut self) {
        if !matches!(self.phase, Phase::Burst { .. }) {
            return;
        }
        let now = self.time.now();
        self.phase = Phase::Rest {
            ends: now + self.rest_duration,
        };
        if let Some(callback) = self.on_burst_end.as_mut() {
            callback();
        }
    }

    /// Poll phase deadlines; fires at most one transition per call
    pub fn tick(&mut self) {
        let now = self.time.now();
        match self.phase {
            Phase::Burst { ends, .. } if now >= ends => self.end_burst(),
            Phase::Rest { ends } if now >= ends => {
                self.phase = Phase::Idle;
                if let Some(callback) = self.on_rest_end.as_mut() {
                    callback();
                }
            }
            _ => {}
        }
    }

    /// Remaining burst time: `burst_duration - elapsed` while in burst,
    /// saturating at zero; zero during rest and idle
    pub fn remaining_time(&self) -> Duration {
        match self.phase {
            Phase::Burst { started, .. } => {
                let elapsed = self.time.now().saturating_sub(started);
                self.burst_duration.saturating_sub(elapsed)
            }
            _ => Duration::ZERO,
        }
    }

    pub fn in_burst(&self) -> bool {
        matches!(self.phase, Phase::Burst { .. })
    }

    /// Register the burst-end listener. Single-slot: replaces any previous
    /// registration.
    pub fn on_burst_end(&mut self, callback: impl FnMut() + 'static) {
        self.on_burst_end = Some(Box::new(callback));
    }

    /// Register the rest-end listener. Single-slot: replaces any previous
    /// registration.
    pub fn on_rest_end(&mut self, callback: impl FnMut() + 'static) {
        self.on_rest_end = Some(Box::new(callback));
    }

    /// Cancel any pending phase deadline
    pub fn dispose(&mut self) {
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTime;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn timer(burst_secs: u64, rest_secs: u64) -> (IntervalTimer<Rc<ManualTime>>, Rc<ManualTime>) {
        let time = Rc::new(ManualTime::new());
        let timer = IntervalTimer::new(
            Rc::clone(&time),
            Duration::from_secs(burst_secs),
            Duration::from_secs(rest_secs),
        );
        (timer, time)
    }

    #[test]
    fn test_automatic_burst_and_rest_cycle() {
        let (mut timer, time) = timer(10, 20);
        let burst_ends = Rc::new(RefCell::new(0usize));
        let rest_ends = Rc::new(RefCell::new(0usize));
        let burst_sink = Rc::clone(&burst_ends);
        let rest_sink = Rc::clone(&rest_ends);
        timer.on_burst_end(move || *burst_sink.borrow_mut() += 1);
        timer.on_rest_end(move || *rest_sink.borrow_mut() += 1);

        timer.start_burst();
        assert!(timer.in_burst());

        // Remaining time is monotonically non-increasing during burst
        let mut previous = timer.remaining_time();
        for _ in 0..9 {
            time.advance(Duration::from_secs(1));
            timer.tick();
            let remaining = timer.remaining_time();
            assert!(remaining <= previous);
            previous = remaining;
        }
        assert!(timer.in_burst());
        assert_eq!(*burst_ends.borrow(), 0);

        // Crossing 10s ends the burst exactly once
        time.advance(Duration::from_secs(1));
        timer.tick();
        assert!(!timer.in_burst());
        assert_eq!(*burst_ends.borrow(), 1);
        assert_eq!(timer.remaining_time(), Duration::ZERO);

        // Rest runs for 20s from the burst end (30s from the start)
        time.advance(Duration::from_secs(19));
        timer.tick();
        assert_eq!(*rest_ends.borrow(), 0);

        time.advance(Duration::from_secs(1));
        timer.tick();
        assert_eq!(*rest_ends.borrow(), 1);
        assert_eq!(*burst_ends.borrow(), 1);

        // Back to idle: further ticks fire nothing
        timer.tick();
        timer.tick();
        assert_eq!(*rest_ends.borrow(), 1);
    }

    #[test]
    fn test_manual_end_burst_cancels_pending_deadline() {
        let (mut timer, time) = timer(10, 20);
        let burst_ends = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&burst_ends);
        timer.on_burst_end(move || *sink.borrow_mut() += 1);

        timer.start_burst();
        time.advance(Duration::from_secs(3));
        timer.end_burst();
        assert_eq!(*burst_ends.borrow(), 1);
        assert!(!timer.in_burst());

        // The original 10s deadline must not fire a second end
        time.advance(Duration::from_secs(7));
        timer.tick();
        assert_eq!(*burst_ends.borrow(), 1);
    }

    #[test]
    fn test_end_burst_outside_burst_is_noop() {
        let (mut timer, _time) = timer(10, 20);
        let burst_ends = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&burst_ends);
        timer.on_burst_end(move || *sink.borrow_mut() += 1);

        timer.end_burst(); // idle
        assert_eq!(*burst_ends.borrow(), 0);

        timer.start_burst();
        timer.end_burst();
        timer.end_burst(); // already in rest
        assert_eq!(*burst_ends.borrow(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let (mut timer, time) = timer(5, 5);
        let first = Rc::new(RefCell::new(0usize));
        let second = Rc::new(RefCell::new(0usize));
        let first_sink = Rc::clone(&first);
        let second_sink = Rc::clone(&second);

        timer.on_burst_end(move || *first_sink.borrow_mut() += 1);
        timer.on_burst_end(move || *second_sink.borrow_mut() += 1);

        timer.start_burst();
        time.advance(Duration::from_secs(5));
        timer.tick();

        // single-slot contract: only the latest listener fires
        assert_eq!(*first.borrow(), 0);
        assert_eq!(*second.borrow(), 1);
    }

    #[test]
    fn test_remaining_time_zero_during_rest() {
        let (mut timer, time) = timer(10, 20);
        timer.start_burst();
        time.advance(Duration::from_secs(10));
        timer.tick();
        assert!(!timer.in_burst());
        assert_eq!(timer.remaining_time(), Duration::ZERO);
    }

    #[test]
    fn test_dispose_cancels_pending_phase() {
        let (mut timer, time) = timer(10, 20);
        let fired = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&fired);
        timer.on_burst_end(move || *sink.borrow_mut() += 1);

        timer.start_burst();
        timer.dispose();

        time.advance(Duration::from_secs(60));
        timer.tick();
        assert_eq!(*fired.borrow(), 0);
        assert!(!timer.in_burst());
    }
}
