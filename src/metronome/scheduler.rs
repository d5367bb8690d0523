// Look-ahead scheduler - The timing core
//
// Clicks are committed to the audio clock a short window (~100ms) ahead of
// playback, while the loop itself re-arms on a much shorter tick (~25ms).
// Committed clicks live on the hardware clock and stay sample-accurate even
// if the host wakes the loop late; the short tick only has to keep the
// window topped up. Listener notification is decoupled from scheduling:
// each committed click enqueues a timed notice, and dispatch fires notices
// whose target time has arrived, so the UI hears about a click near the
// moment it becomes audible rather than when it was scheduled.

use std::collections::VecDeque;
use std::time::Duration;

use crate::clock::AudioClock;

use super::config::{BeatDynamics, DynamicLevel, Pattern, Subdivision};
use super::{MAX_TEMPO_BPM, MIN_TEMPO_BPM, MetronomeError, PATTERN_BEATS};

/// How far ahead of "now" clicks are committed to the clock
pub const LOOKAHEAD_WINDOW_SECS: f64 = 0.1;

/// Re-arm cadence of the scheduling loop. Deliberately much shorter than
/// the look-ahead window so a briefly busy host never drains the window.
pub const SCHEDULER_TICK: Duration = Duration::from_millis(25);

/// Length of one synthesized click, start to full decay
const CLICK_DURATION_SECS: f64 = 0.05;

/// Upper bound for the volume multiplier
pub const MAX_VOLUME: f32 = 2.0;

type BeatCallback = Box<dyn FnMut(usize, u8)>;
type ClickCallback = Box<dyn FnMut()>;

/// Externally mutable configuration. The scheduling pass reads this by
/// reference on every iteration, so a mutation takes effect for the next
/// computed interval while already-committed clicks keep their timestamps.
#[derive(Debug, Clone)]
struct ClickConfig {
    tempo_bpm: u32,
    pattern: Pattern,
    subdivision: Subdivision,
    dynamics: BeatDynamics,
    volume: f32,
    muted: bool,
}

/// Run-state cursor owned exclusively by the scheduling loop
#[derive(Debug, Clone, Copy)]
struct Cursor {
    /// Absolute clock time of the next uncommitted click.
    /// Monotonically non-decreasing while playing.
    next_note_time: f64,
    /// Beat position in the 4-beat pattern cycle
    beat: usize,
    /// Click position within the current beat, always < clicks_per_beat
    click_in_beat: u32,
    /// The next click should carry this beat's notice. Set at start and at
    /// every beat wrap; a subdivision change does not re-arm it, so after a
    /// change no beat notice fires until a full beat at the new rate.
    beat_pending: bool,
}

#[derive(Debug, Clone, Copy)]
enum NoticeKind {
    Click,
    Beat { beat: usize, symbol: u8 },
}

/// A listener notification waiting for its target time
#[derive(Debug, Clone, Copy)]
struct Notice {
    due: f64,
    kind: NoticeKind,
}

/// Look-ahead click scheduler.
///
/// Owns the audio clock, the beat pattern, subdivision, per-beat dynamics
/// and volume/mute state. Beat listeners (multi-subscriber) fire at the
/// first click of each beat with `(beat_index, pattern_symbol)`; click
/// listeners fire for every click. Drive it by calling [`Metronome::tick`]
/// roughly every [`SCHEDULER_TICK`].
pub struct Metronome<C: AudioClock> {
    clock: C,
    config: ClickConfig,
    cursor: Cursor,
    playing: bool,
    pending: VecDeque<Notice>,
    beat_callbacks: Vec<BeatCallback>,
    click_callbacks: Vec<ClickCallback>,
}

impl<C: AudioClock> Metronome<C> {
    /// Create a metronome with an initial tempo and pattern.
    /// Tempo must be within [`MIN_TEMPO_BPM`]..=[`MAX_TEMPO_BPM`].
    pub fn new(clock: C, tempo_bpm: u32, pattern: Pattern) -> Result<Self, MetronomeError> {
        if !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&tempo_bpm) {
            return Err(MetronomeError::TempoOutOfRange(tempo_bpm));
        }
        Ok(Self {
            clock,
            config: ClickConfig {
                tempo_bpm,
                pattern,
                subdivision: Subdivision::default(),
                dynamics: BeatDynamics::default(),
                volume: 1.0,
                muted: false,
            },
            cursor: Cursor {
                next_note_time: 0.0,
                beat: 0,
                click_in_beat: 0,
                beat_pending: false,
            },
            playing: false,
            pending: VecDeque::new(),
            beat_callbacks: Vec::new(),
            click_callbacks: Vec::new(),
        })
    }

    /// Acquire/resume the audio clock without starting playback. Idempotent.
    pub fn initialize(&mut self) -> Result<(), MetronomeError> {
        self.clock.ensure_running()?;
        Ok(())
    }

    /// Start the scheduling loop. No-op when already playing; otherwise the
    /// clock is (re)acquired and the cursor resets to beat 0, click 0 at
    /// the clock's current time. Fails if the clock cannot run.
    pub fn start(&mut self) -> Result<(), MetronomeError> {
        if self.playing {
            return Ok(());
        }
        self.clock.ensure_running()?;
        self.pending.clear();
        self.cursor = Cursor {
            next_note_time: self.clock.now(),
            beat: 0,
            click_in_beat: 0,
            beat_pending: true,
        };
        self.playing = true;
        Ok(())
    }

    /// Halt the scheduling loop. Configuration is retained for a later
    /// `start()`. Clicks already committed to the clock still play to
    /// completion; stopping never cuts audio off mid-click.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Release the audio clock and consume the metronome. Returns the
    /// released clock. Terminal by construction: no further calls are
    /// possible on a disposed metronome.
    pub fn dispose(mut self) -> C {
        self.playing = false;
        self.clock.release();
        self.clock
    }

    /// One wake-up of the cooperative loop: top up the look-ahead window,
    /// then deliver notices that have come due. Call roughly every
    /// [`SCHEDULER_TICK`]. A late wake-up delivers overdue notices
    /// immediately (never dropped, never reordered) — beat/click
    /// notifications may be approximate under host scheduling pressure,
    /// the audio itself is not.
    pub fn tick(&mut self) {
        if self.playing {
            self.schedule_pass();
        }
        self.dispatch_due();
    }

    // --- configuration -----------------------------------------------------

    /// Set the tempo. Takes effect on the next computed inter-click
    /// interval; clicks whose timestamps are already computed keep them.
    pub fn set_tempo(&mut self, tempo_bpm: u32) -> Result<(), MetronomeError> {
        if !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&tempo_bpm) {
            return Err(MetronomeError::TempoOutOfRange(tempo_bpm));
        }
        self.config.tempo_bpm = tempo_bpm;
        Ok(())
    }

    /// Replace the 4-symbol beat pattern. Prior pattern is untouched on error.
    pub fn set_pattern(&mut self, symbols: &[u8]) -> Result<(), MetronomeError> {
        self.config.pattern = Pattern::from_slice(symbols)?;
        Ok(())
    }

    /// Change the subdivision. Resets the within-beat click counter so no
    /// partial beat plays at the old rate; the next beat notice fires only
    /// after a full beat at the new subdivision.
    pub fn set_subdivision(&mut self, subdivision: Subdivision) {
        self.config.subdivision = subdivision;
        self.cursor.click_in_beat = 0;
    }

    /// Replace the per-beat dynamics. Prior dynamics are untouched on error.
    pub fn set_beat_dynamics(&mut self, levels: &[DynamicLevel]) -> Result<(), MetronomeError> {
        self.config.dynamics = BeatDynamics::from_slice(levels)?;
        Ok(())
    }

    /// Mute or unmute. While muted no tones are committed, but beat/click
    /// notices keep flowing at the same cadence (rep counting continues
    /// through silent phases).
    pub fn set_muted(&mut self, muted: bool) {
        self.config.muted = muted;
    }

    /// Set the volume multiplier, clamped into [0, MAX_VOLUME].
    /// Zero mutes by attenuation. Always succeeds.
    pub fn set_volume(&mut self, volume: f32) {
        self.config.volume = volume.clamp(0.0, MAX_VOLUME);
    }

    pub fn tempo(&self) -> u32 {
        self.config.tempo_bpm
    }

    pub fn volume(&self) -> f32 {
        self.config.volume
    }

    pub fn subdivision(&self) -> Subdivision {
        self.config.subdivision
    }

    pub fn pattern(&self) -> &Pattern {
        &self.config.pattern
    }

    pub fn is_muted(&self) -> bool {
        self.config.muted
    }

    pub fn is_running(&self) -> bool {
        self.playing
    }

    /// Underlying clock, for inspection (virtual clocks record tones)
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable clock access, for driving a virtual clock in tests/headless
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    // --- listeners ---------------------------------------------------------

    /// Register a beat listener `(beat_index 0-3, pattern_symbol 1-3)`.
    /// Multi-subscriber: every registered listener fires for every beat.
    pub fn on_beat(&mut self, callback: impl FnMut(usize, u8) + 'static) {
        self.beat_callbacks.push(Box::new(callback));
    }

    /// Register a click listener. Multi-subscriber, fires for every click.
    pub fn on_click(&mut self, callback: impl FnMut() + 'static) {
        self.click_callbacks.push(Box::new(callback));
    }

    pub fn clear_beat_callbacks(&mut self) {
        self.beat_callbacks.clear();
    }

    pub fn clear_click_callbacks(&mut self) {
        self.click_callbacks.clear();
    }

    // --- scheduling loop ---------------------------------------------------

    /// Commit every click that falls inside the look-ahead window
    fn schedule_pass(&mut self) {
        let horizon = self.clock.now() + LOOKAHEAD_WINDOW_SECS;
        while self.cursor.next_note_time < horizon {
            self.schedule_click();
            self.advance_cursor();
        }
    }

    /// Commit one click at the cursor's timestamp and enqueue its notices
    fn schedule_click(&mut self) {
        let time = self.cursor.next_note_time;
        let dynamic = self.config.dynamics.level(self.cursor.beat);

        if !self.config.muted {
            let (frequency, gain) = dynamic.click_tone();
            self.clock.schedule_tone(
                time,
                time + CLICK_DURATION_SECS,
                frequency,
                gain * self.config.volume,
            );
        }

        if self.cursor.beat_pending {
            self.pending.push_back(Notice {
                due: time,
                kind: NoticeKind::Beat {
                    beat: self.cursor.beat,
                    symbol: self.config.pattern.symbol(self.cursor.beat),
                },
            });
            self.cursor.beat_pending = false;
        }
        self.pending.push_back(Notice {
            due: time,
            kind: NoticeKind::Click,
        });
    }

    /// Advance the cursor by one click interval at the current tempo and
    /// subdivision. Reading the config here, not at start(), is what makes
    /// tempo/subdivision changes land on the next interval.
    fn advance_cursor(&mut self) {
        let clicks_per_beat = self.config.subdivision.clicks_per_beat();
        let seconds_per_beat = 60.0 / self.config.tempo_bpm as f64;
        let click_interval = seconds_per_beat / clicks_per_beat as f64;

        self.cursor.next_note_time += click_interval;
        self.cursor.click_in_beat += 1;
        // >= rather than ==: a subdivision can shrink mid-beat
        if self.cursor.click_in_beat >= clicks_per_beat {
            self.cursor.click_in_beat = 0;
            self.cursor.beat = (self.cursor.beat + 1) % PATTERN_BEATS;
            self.cursor.beat_pending = true;
        }
    }

    /// Fire every notice whose target time has arrived, in commit order.
    /// Overdue notices (a late wake-up) fire immediately.
    fn dispatch_due(&mut self) {
        let now = self.clock.now();
        while let Some(notice) = self.pending.pop_front() {
            if notice.due > now {
                self.pending.push_front(notice);
                break;
            }
            match notice.kind {
                NoticeKind::Beat { beat, symbol } => {
                    for callback in self.beat_callbacks.iter_mut() {
                        callback(beat, symbol);
                    }
                }
                NoticeKind::Click => {
                    for callback in self.click_callbacks.iter_mut() {
                        callback();
                    }
                }
            }
        }
    }
}
