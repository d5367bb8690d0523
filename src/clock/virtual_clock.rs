// VirtualClock - Deterministic clock for headless hosts and tests
//
// Time only moves when the caller advances it, and every committed tone is
// recorded instead of synthesized. This is the substitute clock for
// environments without an audio device.

use super::audio_clock::{AudioClock, ClockError};

/// A tone as recorded by the virtual clock (seconds / Hz / linear gain)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneRecord {
    pub start: f64,
    pub stop: f64,
    pub frequency: f32,
    pub gain: f32,
}

/// Manually advanced audio clock that records scheduled tones
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: f64,
    running: bool,
    scheduled: Vec<ToneRecord>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `seconds`
    pub fn advance(&mut self, seconds: f64) {
        debug_assert!(seconds >= 0.0, "virtual time only moves forward");
        self.now += seconds;
    }

    /// All tones committed so far, in commit order
    pub fn scheduled(&self) -> &[ToneRecord] {
        &self.scheduled
    }

    /// Drop recorded tones (keeps the current time)
    pub fn clear_scheduled(&mut self) {
        self.scheduled.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl AudioClock for VirtualClock {
    fn ensure_running(&mut self) -> Result<(), ClockError> {
        self.running = true;
        Ok(())
    }

    fn now(&self) -> f64 {
        self.now
    }

    fn schedule_tone(&mut self, start: f64, stop: f64, frequency: f32, gain: f32) {
        self.scheduled.push(ToneRecord {
            start,
            stop,
            frequency,
            gain,
        });
    }

    fn release(&mut self) {
        self.running = false;
    }
}
