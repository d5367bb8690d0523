// Trainer - Session-level timing controllers
// Independent utilities driven by session orchestration, not by the
// scheduler: adaptive tempo ramping, burst/rest interval cycling, and
// rhythmic-variation multipliers.

pub mod adaptive_tempo;
pub mod interval_timer;
pub mod variation;

pub use adaptive_tempo::{AdaptiveTempo, TempoHost};
pub use interval_timer::IntervalTimer;
pub use variation::{RhythmVariation, VariationGenerator};
