// CpalClock - Hardware audio clock backed by a CPAL output stream
//
// Time base: a sample counter advanced by the audio callback (the only
// ground truth for "now" that is in the same time domain the clicks play
// in). Tones travel from the control thread into the callback through a
// lock-free ring buffer; the callback synthesizes them as sine bursts with
// an exponential decay envelope, starting at the exact requested sample.
//
// The callback is a no-allocation, no-blocking zone: voices are stored in a
// pre-allocated Vec and the ring buffer is wait-free on both sides.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use super::audio_clock::{AudioClock, ClockError};

/// Capacity of the control-thread → audio-callback tone queue.
/// Far more than can ever sit inside one look-ahead window.
const TONE_QUEUE_CAPACITY: usize = 64;

/// Maximum simultaneously sounding click voices in the callback.
const MAX_VOICES: usize = 32;

/// Envelope decay constant: a tone is ~e^-8 (inaudible) of its initial
/// amplitude by its stop time.
const ENVELOPE_DECAY: f32 = 8.0;

/// A tone committed to the hardware clock, in sample coordinates
#[derive(Debug, Clone, Copy)]
struct ScheduledTone {
    start_sample: u64,
    stop_sample: u64,
    frequency: f32,
    gain: f32,
}

/// One sounding click inside the audio callback
#[derive(Debug, Clone, Copy)]
struct ClickVoice {
    tone: ScheduledTone,
}

impl ClickVoice {
    fn new(tone: ScheduledTone) -> Self {
        Self { tone }
    }

    /// Sample value at an absolute sample position. Zero before the start
    /// and after the stop; in between, a sine at `frequency` shaped by an
    /// exponential decay that reaches ~e^-8 at the stop time.
    fn sample_at(&self, position: u64, sample_rate: f32) -> f32 {
        if position < self.tone.start_sample || position >= self.tone.stop_sample {
            return 0.0;
        }
        let t = (position - self.tone.start_sample) as f32 / sample_rate;
        let duration =
            (self.tone.stop_sample - self.tone.start_sample).max(1) as f32 / sample_rate;
        let envelope = (-t * ENVELOPE_DECAY / duration).exp();
        (t * self.tone.frequency * TAU).sin() * envelope * self.tone.gain
    }

    fn finished(&self, position: u64) -> bool {
        position >= self.tone.stop_sample
    }
}

/// Hardware audio clock bound to the default output device.
///
/// Construction is cheap and infallible; the stream is built lazily on the
/// first `ensure_running` call so headless hosts surface `ClockError` at
/// start time rather than at construction.
pub struct CpalClock {
    stream: Option<Stream>,
    sample_rate: f64,
    sample_position: Arc<AtomicU64>,
    tone_tx: Option<HeapProd<ScheduledTone>>,
}

impl CpalClock {
    pub fn new() -> Self {
        Self {
            stream: None,
            sample_rate: 0.0,
            sample_position: Arc::new(AtomicU64::new(0)),
            tone_tx: None,
        }
    }

    /// Sample rate of the running stream, 0 until `ensure_running` succeeds
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn build(&mut self) -> Result<(), ClockError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(ClockError::NoDevice)?;

        let supported_config = device
            .default_output_config()
            .map_err(|e| ClockError::Config(e.to_string()))?;

        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f64;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let rb = HeapRb::<ScheduledTone>::new(TONE_QUEUE_CAPACITY);
        let (tone_tx, tone_rx) = rb.split();

        let position = Arc::clone(&self.sample_position);

        // Build the stream for whatever sample format the device prefers;
        // synthesis is always f32 internally, converted on write.
        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, tone_rx, position)
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, tone_rx, position)
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, tone_rx, position)
            }
            other => return Err(ClockError::UnsupportedFormat(format!("{other:?}"))),
        }?;

        self.sample_rate = sample_rate;
        self.tone_tx = Some(tone_tx);
        self.stream = Some(stream);
        Ok(())
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut tone_rx: HeapCons<ScheduledTone>,
        position: Arc<AtomicU64>,
    ) -> Result<Stream, ClockError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let mut voices: Vec<ClickVoice> = Vec::with_capacity(MAX_VOICES);

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    let buffer_start = position.load(Ordering::Relaxed);

                    // Pull newly committed tones into the voice pool.
                    // A full pool drops the oldest request rather than
                    // allocating inside the callback.
                    while let Some(tone) = tone_rx.try_pop() {
                        if voices.len() < MAX_VOICES {
                            voices.push(ClickVoice::new(tone));
                        }
                    }

                    for frame in 0..frames {
                        let pos = buffer_start + frame as u64;
                        let mut mix = 0.0f32;
                        for voice in voices.iter() {
                            mix += voice.sample_at(pos, sample_rate);
                        }
                        let value = T::from_sample(mix.clamp(-1.0, 1.0));
                        for channel in 0..channels {
                            data[frame * channels + channel] = value;
                        }
                    }

                    let buffer_end = buffer_start + frames as u64;
                    voices.retain(|voice| !voice.finished(buffer_end));
                    position.fetch_add(frames as u64, Ordering::Relaxed);
                },
                move |err| {
                    // Stream errors are transient on most hosts; the clock
                    // keeps its time base and the next buffer resumes.
                    eprintln!("audio stream error: {err}");
                },
                None,
            )
            .map_err(|e| ClockError::Stream(e.to_string()))
    }
}

impl Default for CpalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for CpalClock {
    fn ensure_running(&mut self) -> Result<(), ClockError> {
        if self.stream.is_none() {
            self.build()?;
        }
        // stream is Some after build; play() resumes an already-running
        // stream without effect, keeping this idempotent.
        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|e| ClockError::Stream(e.to_string()))?;
        }
        Ok(())
    }

    fn now(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.sample_position.load(Ordering::Relaxed) as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    fn schedule_tone(&mut self, start: f64, stop: f64, frequency: f32, gain: f32) {
        let sample_rate = self.sample_rate;
        if let Some(tx) = &mut self.tone_tx {
            let tone = ScheduledTone {
                start_sample: (start.max(0.0) * sample_rate) as u64,
                stop_sample: (stop.max(0.0) * sample_rate) as u64,
                frequency,
                gain,
            };
            // A full queue only happens if the scheduler misbehaves
            // (> TONE_QUEUE_CAPACITY clicks in one look-ahead window);
            // dropping the click is preferable to blocking.
            let _ = tx.try_push(tone);
        }
    }

    fn release(&mut self) {
        self.stream = None;
        self.tone_tx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_silent_outside_window() {
        let voice = ClickVoice::new(ScheduledTone {
            start_sample: 1000,
            stop_sample: 3400,
            frequency: 880.0,
            gain: 0.5,
        });

        assert_eq!(voice.sample_at(0, 48000.0), 0.0);
        assert_eq!(voice.sample_at(999, 48000.0), 0.0);
        assert_eq!(voice.sample_at(3400, 48000.0), 0.0);
        assert_eq!(voice.sample_at(10_000, 48000.0), 0.0);
    }

    #[test]
    fn test_voice_decays_toward_stop() {
        let voice = ClickVoice::new(ScheduledTone {
            start_sample: 0,
            stop_sample: 2400, // 50ms at 48kHz
            frequency: 880.0,
            gain: 1.0,
        });

        // Peak amplitude near the start must exceed amplitude near the end
        let early_peak = (0..200)
            .map(|p| voice.sample_at(p, 48000.0).abs())
            .fold(0.0f32, f32::max);
        let late_peak = (2200..2400)
            .map(|p| voice.sample_at(p, 48000.0).abs())
            .fold(0.0f32, f32::max);

        assert!(early_peak > 0.1);
        assert!(late_peak < early_peak * 0.1);
    }

    #[test]
    fn test_voice_gain_scaling() {
        let tone = ScheduledTone {
            start_sample: 0,
            stop_sample: 2400,
            frequency: 880.0,
            gain: 1.0,
        };
        let full = ClickVoice::new(tone);
        let half = ClickVoice::new(ScheduledTone { gain: 0.5, ..tone });

        for position in [10u64, 100, 500, 1000] {
            let f = full.sample_at(position, 48000.0);
            let h = half.sample_at(position, 48000.0);
            assert!((f * 0.5 - h).abs() < 1e-6);
        }
    }

    #[test]
    fn test_voice_finished() {
        let voice = ClickVoice::new(ScheduledTone {
            start_sample: 100,
            stop_sample: 200,
            frequency: 880.0,
            gain: 0.5,
        });

        assert!(!voice.finished(150));
        assert!(voice.finished(200));
        assert!(voice.finished(500));
    }
}
