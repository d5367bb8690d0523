// Metronome - Look-ahead click scheduling core
//
// Commits clicks to the audio clock a short window ahead of playback and
// notifies listeners when each click becomes audible. The scheduling loop
// is driven by a ~25ms tick; already-committed clicks stay sample-accurate
// even when the host wakes the loop late.

pub mod config;
pub mod scheduler;

pub use config::{BeatDynamics, DynamicLevel, Pattern, Subdivision};
pub use scheduler::{LOOKAHEAD_WINDOW_SECS, Metronome, SCHEDULER_TICK};

use crate::clock::ClockError;

/// Lowest supported tempo, inclusive
pub const MIN_TEMPO_BPM: u32 = 20;

/// Highest supported tempo, inclusive
pub const MAX_TEMPO_BPM: u32 = 300;

/// Beats per pattern cycle (fixed 4-beat patterns)
pub const PATTERN_BEATS: usize = 4;

/// Errors raised by the metronome: invalid configuration is rejected
/// synchronously with prior state untouched; clock failures surface the
/// underlying resource error. Nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum MetronomeError {
    #[error("tempo {0} BPM is outside the supported range {MIN_TEMPO_BPM}-{MAX_TEMPO_BPM}")]
    TempoOutOfRange(u32),

    #[error("pattern must contain exactly {PATTERN_BEATS} symbols, got {0}")]
    PatternLength(usize),

    #[error("pattern symbol {0} is outside the supported range 1-3")]
    PatternSymbol(u8),

    #[error("beat dynamics must contain exactly {PATTERN_BEATS} levels, got {0}")]
    DynamicsLength(usize),

    #[error("audio clock unavailable: {0}")]
    Clock(#[from] ClockError),
}
