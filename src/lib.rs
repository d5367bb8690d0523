// fretpulse - Rhythmic timing engine for guitar practice
//
// The core is a look-ahead click scheduler riding on a hardware audio
// clock, plus three session-level controllers: adaptive tempo ramping,
// burst/rest interval cycling, and rhythmic-variation multipliers. UI,
// persistence and analytics live outside this crate and talk to it
// through the types re-exported here.

pub mod clock;
pub mod metronome;
pub mod trainer;

// Re-export commonly used types for convenience
pub use clock::{AudioClock, ClockError, CpalClock, MonotonicTime, TimeSource, VirtualClock};
pub use metronome::{
    BeatDynamics, DynamicLevel, MAX_TEMPO_BPM, MIN_TEMPO_BPM, Metronome, MetronomeError,
    PATTERN_BEATS, Pattern, SCHEDULER_TICK, Subdivision,
};
pub use trainer::{AdaptiveTempo, IntervalTimer, RhythmVariation, TempoHost, VariationGenerator};
