// AudioClock - Minimal contract between the scheduler and real time
//
// The scheduler needs exactly two things from the outside world: the current
// time in a stable, sample-accurate time domain, and the ability to commit a
// synthesized tone to start/stop at an exact future instant in that domain.
// Everything else (device handling, sample formats, synthesis) stays behind
// this trait so the scheduling core runs identically against hardware and
// against a virtual clock.

/// Errors raised while acquiring or starting the hardware clock
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("audio device configuration failed: {0}")]
    Config(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio stream could not be built or started: {0}")]
    Stream(String),
}

/// A monotonic audio-rate clock that can play tones at exact times.
///
/// Time values are in seconds within the clock's own time domain (for the
/// hardware clock, samples elapsed divided by the sample rate). `now()` is
/// monotonically non-decreasing. Tones committed via `schedule_tone` are
/// owned by the clock: they play to completion even if the caller stops
/// scheduling afterwards, which avoids audible cutoff artifacts.
pub trait AudioClock {
    /// Acquire or resume the underlying time source. Idempotent.
    ///
    /// On hardware this builds and starts the output stream on first call
    /// and resumes it on subsequent calls. Fails if the host has no usable
    /// audio device; the caller stays in a non-playing state.
    fn ensure_running(&mut self) -> Result<(), ClockError>;

    /// Current time in seconds in this clock's time domain.
    fn now(&self) -> f64;

    /// Commit a tone to start at `start` and decay until `stop` (both in
    /// this clock's time domain), at the given frequency (Hz) and linear
    /// gain. A gain of zero is a valid, silent tone.
    fn schedule_tone(&mut self, start: f64, stop: f64, frequency: f32, gain: f32);

    /// Release the underlying resource. Terminal: the clock must not be
    /// used afterwards.
    fn release(&mut self);
}
