// Clock - Time sources for the timing engine
// The scheduler only ever talks to the AudioClock trait; binding to real
// hardware (cpal) or to a deterministic virtual clock is decided by the caller.

pub mod audio_clock;
pub mod cpal_clock;
pub mod virtual_clock;
pub mod wall;

pub use audio_clock::{AudioClock, ClockError};
pub use cpal_clock::CpalClock;
pub use virtual_clock::{ToneRecord, VirtualClock};
pub use wall::{ManualTime, MonotonicTime, TimeSource};
