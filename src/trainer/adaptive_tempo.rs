// Adaptive tempo - Accuracy-driven tempo ramping
//
// Keeps the player in the optimal challenge band (success rate 0.6-0.8,
// optimum 0.7). A rolling window damps noise from a handful of attempts;
// the decrease factor is slightly larger than the increase factor because
// overshooting into frustration costs more than overshooting into ease.

use std::collections::VecDeque;

use crate::clock::AudioClock;
use crate::metronome::{MAX_TEMPO_BPM, MIN_TEMPO_BPM, Metronome, MetronomeError};

/// Number of recent attempts the controller evaluates over
pub const WINDOW_SIZE: usize = 20;

/// Upper edge of the acceptable band (inclusive)
const RATE_TOO_EASY: f64 = 0.8;

/// Lower edge of the acceptable band (inclusive)
const RATE_TOO_HARD: f64 = 0.6;

/// Tempo multiplier when the window reads too easy
const RAISE_FACTOR: f64 = 1.008;

/// Tempo multiplier when the window reads too hard
const LOWER_FACTOR: f64 = 0.988;

/// The narrow contract the controller holds on the tempo owner.
/// It never touches scheduler internals; all mutation goes through the
/// owner's validated setter.
pub trait TempoHost {
    fn tempo(&self) -> u32;
    fn set_tempo(&mut self, tempo_bpm: u32) -> Result<(), MetronomeError>;
}

impl<C: AudioClock> TempoHost for Metronome<C> {
    fn tempo(&self) -> u32 {
        Metronome::tempo(self)
    }

    fn set_tempo(&mut self, tempo_bpm: u32) -> Result<(), MetronomeError> {
        Metronome::set_tempo(self, tempo_bpm)
    }
}

/// Rolling-window tempo controller
#[derive(Debug, Default)]
pub struct AdaptiveTempo {
    window: VecDeque<bool>,
}

impl AdaptiveTempo {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_SIZE),
        }
    }

    /// Record one attempt outcome. Evicts the oldest entry once the window
    /// is full, then — only at a full window — evaluates the success rate
    /// and nudges the host's tempo:
    /// rate > 0.8 → ×1.008, rate < 0.6 → ×0.988, otherwise unchanged.
    /// The proposed tempo is clamped into the supported range, so ramping
    /// at the edge saturates instead of erroring.
    pub fn record_attempt(
        &mut self,
        correct: bool,
        host: &mut dyn TempoHost,
    ) -> Result<(), MetronomeError> {
        self.window.push_back(correct);
        if self.window.len() > WINDOW_SIZE {
            self.window.pop_front();
        }
        if self.window.len() < WINDOW_SIZE {
            return Ok(());
        }

        let rate = self.success_rate();
        let factor = if rate > RATE_TOO_EASY {
            RAISE_FACTOR
        } else if rate < RATE_TOO_HARD {
            LOWER_FACTOR
        } else {
            return Ok(());
        };

        let current = host.tempo();
        let proposed = (current as f64 * factor).round() as u32;
        let next = proposed.clamp(MIN_TEMPO_BPM, MAX_TEMPO_BPM);
        if next != current {
            host.set_tempo(next)?;
        }
        Ok(())
    }

    /// Successes divided by window length; 0 for an empty window
    pub fn success_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let successes = self.window.iter().filter(|&&ok| ok).count();
        successes as f64 / self.window.len() as f64
    }

    /// Number of attempts currently in the window
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Clear the window
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Host stub tracking how often the tempo was set
    struct StubHost {
        tempo: u32,
        set_count: usize,
    }

    impl StubHost {
        fn new(tempo: u32) -> Self {
            Self {
                tempo,
                set_count: 0,
            }
        }
    }

    impl TempoHost for StubHost {
        fn tempo(&self) -> u32 {
            self.tempo
        }

        fn set_tempo(&mut self, tempo_bpm: u32) -> Result<(), MetronomeError> {
            self.tempo = tempo_bpm;
            self.set_count += 1;
            Ok(())
        }
    }

    #[test]
    fn test_all_successes_raise_once() {
        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(120);

        for _ in 0..WINDOW_SIZE {
            controller.record_attempt(true, &mut host).unwrap();
        }

        assert_eq!(controller.success_rate(), 1.0);
        // 120 * 1.008 = 120.96 → 121
        assert_eq!(host.tempo, 121);
        assert_eq!(host.set_count, 1);
    }

    #[test]
    fn test_all_failures_lower_once() {
        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(120);

        for _ in 0..WINDOW_SIZE {
            controller.record_attempt(false, &mut host).unwrap();
        }

        assert_eq!(controller.success_rate(), 0.0);
        // 120 * 0.988 = 118.56 → 119
        assert_eq!(host.tempo, 119);
        assert_eq!(host.set_count, 1);
    }

    #[test]
    fn test_band_boundaries_are_inclusive() {
        // 12 true / 8 false = exactly 0.6: acceptable, no change
        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(120);
        for i in 0..WINDOW_SIZE {
            controller.record_attempt(i < 12, &mut host).unwrap();
        }
        assert!((controller.success_rate() - 0.6).abs() < 1e-12);
        assert_eq!(host.tempo, 120);
        assert_eq!(host.set_count, 0);

        // 16 true / 4 false = exactly 0.8: still acceptable
        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(120);
        for i in 0..WINDOW_SIZE {
            controller.record_attempt(i < 16, &mut host).unwrap();
        }
        assert!((controller.success_rate() - 0.8).abs() < 1e-12);
        assert_eq!(host.set_count, 0);
    }

    #[test]
    fn test_partial_window_never_adjusts() {
        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(120);

        for _ in 0..WINDOW_SIZE - 1 {
            controller.record_attempt(true, &mut host).unwrap();
        }
        assert_eq!(host.set_count, 0);
        assert_eq!(host.tempo, 120);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(120);

        // Fill with failures, then push successes through: the window
        // stays at capacity and the rate reflects only the newest 20
        for _ in 0..WINDOW_SIZE {
            controller.record_attempt(false, &mut host).unwrap();
        }
        for _ in 0..WINDOW_SIZE {
            controller.record_attempt(true, &mut host).unwrap();
        }
        assert_eq!(controller.window_len(), WINDOW_SIZE);
        assert_eq!(controller.success_rate(), 1.0);
    }

    #[test]
    fn test_ramp_saturates_at_range_edges() {
        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(300);
        for _ in 0..WINDOW_SIZE {
            controller.record_attempt(true, &mut host).unwrap();
        }
        // 300 * 1.008 = 302.4 → clamp keeps 300, no setter call
        assert_eq!(host.tempo, 300);
        assert_eq!(host.set_count, 0);

        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(20);
        for _ in 0..WINDOW_SIZE {
            controller.record_attempt(false, &mut host).unwrap();
        }
        assert_eq!(host.tempo, 20);
        assert_eq!(host.set_count, 0);
    }

    #[test]
    fn test_reset_clears_window() {
        let mut controller = AdaptiveTempo::new();
        let mut host = StubHost::new(120);

        for _ in 0..5 {
            controller.record_attempt(true, &mut host).unwrap();
        }
        assert_eq!(controller.window_len(), 5);

        controller.reset();
        assert_eq!(controller.window_len(), 0);
        assert_eq!(controller.success_rate(), 0.0);
    }
}
