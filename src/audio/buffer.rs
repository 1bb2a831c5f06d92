// Voice-activity-gated frame buffer
//
// Accumulates frames pushed by a capture channel while recording, tracks
// per-frame RMS energy, and stops recording on its own after sustained
// silence. One producer (the capture channel) and one drainer (the session's
// stop/extract path) share the buffer, so every read and write goes through
// a single mutex. The lock is only held for in-memory mutation; extraction
// returns a plain snapshot that callers hand to the transcriber after the
// lock is released.

use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

use super::frame::AudioFrame;

/// Buffer had fewer frames than required at extract time. Recoverable: the
/// user is asked to record again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("not enough audio captured ({frames} frames, need at least {min_frames})")]
pub struct InsufficientAudio {
    pub frames: usize,
    pub min_frames: usize,
}

/// Configuration for the frame buffer and its silence heuristic
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Expected sample rate of incoming frames
    pub sample_rate: u32,
    /// RMS energy below this counts as a silent frame
    pub silence_threshold: f32,
    /// Consecutive silent frames tolerated before auto-stop is considered
    pub max_silence_frames: usize,
    /// Minimum frames a recording must have to be worth transcribing
    pub min_frames: usize,
    /// Minimum time since the last loud frame before auto-stop fires (ms,
    /// measured on the frame timestamp clock)
    pub silence_cooldown_ms: u64,
    /// Peak amplitude target for the normalized waveform
    pub peak_ceiling: f32,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            silence_threshold: 0.015,
            max_silence_frames: 25,
            min_frames: 8,
            silence_cooldown_ms: 2000,
            peak_ceiling: 0.95,
        }
    }
}

/// Snapshot of buffer state handed to the stop policy after each push
#[derive(Debug, Clone, Copy)]
pub struct BufferState {
    /// Number of frames accumulated so far
    pub frame_count: usize,
    /// Consecutive frames below the silence threshold
    pub silence_streak: usize,
    /// Milliseconds since the last frame above the silence threshold
    /// (frame timestamp clock)
    pub ms_since_last_loud: u64,
}

/// Decides when a recording should stop on its own.
///
/// Alternative policies (fixed duration, push-to-talk, model-based VAD) can
/// be substituted without touching the buffer.
pub trait StopPolicy: Send + Sync {
    fn should_stop(&self, state: &BufferState) -> bool;
}

/// Default policy: sustained silence after enough audio has been captured.
///
/// A fixed energy threshold plus a cool-down window, not a voice-activity
/// model; it occasionally fires early on soft speech, which is why the
/// thresholds live in config.
#[derive(Debug, Clone)]
pub struct SilenceTimeout {
    pub max_silence_frames: usize,
    pub min_frames: usize,
    pub cooldown_ms: u64,
}

impl SilenceTimeout {
    pub fn from_config(config: &BufferConfig) -> Self {
        Self {
            max_silence_frames: config.max_silence_frames,
            min_frames: config.min_frames,
            cooldown_ms: config.silence_cooldown_ms,
        }
    }
}

impl StopPolicy for SilenceTimeout {
    fn should_stop(&self, state: &BufferState) -> bool {
        state.frame_count > self.min_frames
            && state.silence_streak > self.max_silence_frames
            && state.ms_since_last_loud > self.cooldown_ms
    }
}

/// Outcome of pushing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Frame appended
    Accepted,
    /// Buffer was not recording; frame dropped (expected after stop, the
    /// capture channel may keep emitting)
    Discarded,
    /// Frame appended and the stop policy fired; recording is now off
    AutoStopped,
}

struct BufferInner {
    frames: Vec<AudioFrame>,
    recording: bool,
    silence_streak: usize,
    /// Timestamp of the last frame above the silence threshold. Falls back
    /// to the first frame's timestamp when nothing loud has arrived yet.
    last_loud_ms: Option<u64>,
    auto_stopped: bool,
}

/// Accumulates a live stream of audio frames for one recording attempt
pub struct AudioFrameBuffer {
    inner: Mutex<BufferInner>,
    config: BufferConfig,
    policy: Box<dyn StopPolicy>,
}

impl AudioFrameBuffer {
    pub fn new(config: BufferConfig) -> Self {
        let policy = SilenceTimeout::from_config(&config);
        Self::with_policy(config, Box::new(policy))
    }

    pub fn with_policy(config: BufferConfig, policy: Box<dyn StopPolicy>) -> Self {
        Self {
            inner: Mutex::new(BufferInner {
                frames: Vec::new(),
                recording: false,
                silence_streak: 0,
                last_loud_ms: None,
                auto_stopped: false,
            }),
            config,
            policy,
        }
    }

    /// Begin a recording: drop any prior frames and reset energy state
    pub fn start(&self) {
        let mut inner = self.lock();
        inner.frames.clear();
        inner.silence_streak = 0;
        inner.last_loud_ms = None;
        inner.auto_stopped = false;
        inner.recording = true;
    }

    /// Append a frame if recording; otherwise drop it silently.
    ///
    /// Tracks the silence streak from the frame's RMS energy and evaluates
    /// the stop policy after appending.
    pub fn push(&self, frame: AudioFrame) -> PushOutcome {
        let energy = frame.rms();
        let timestamp_ms = frame.timestamp_ms;

        let mut inner = self.lock();
        if !inner.recording {
            return PushOutcome::Discarded;
        }

        if inner.last_loud_ms.is_none() {
            // Baseline the silence clock at the first frame
            inner.last_loud_ms = Some(timestamp_ms);
        }

        if energy < self.config.silence_threshold {
            inner.silence_streak += 1;
        } else {
            inner.silence_streak = 0;
            inner.last_loud_ms = Some(timestamp_ms);
        }

        inner.frames.push(frame);

        let state = BufferState {
            frame_count: inner.frames.len(),
            silence_streak: inner.silence_streak,
            ms_since_last_loud: timestamp_ms
                .saturating_sub(inner.last_loud_ms.unwrap_or(timestamp_ms)),
        };

        if self.policy.should_stop(&state) {
            inner.recording = false;
            inner.auto_stopped = true;
            debug!(
                "Auto-stop after {} frames ({} silent, {}ms since speech)",
                state.frame_count, state.silence_streak, state.ms_since_last_loud
            );
            return PushOutcome::AutoStopped;
        }

        PushOutcome::Accepted
    }

    /// Stop accepting frames. Idempotent.
    pub fn stop(&self) {
        self.lock().recording = false;
    }

    /// Concatenate all frames into one normalized 16-bit PCM waveform.
    ///
    /// Removes DC offset, scales the peak to the configured ceiling, and
    /// soft-limits through a bounded curve instead of hard clipping. Does not
    /// mutate buffer state; call `clear()` separately.
    pub fn extract(&self) -> Result<Vec<i16>, InsufficientAudio> {
        let samples: Vec<f32> = {
            let inner = self.lock();
            if inner.frames.len() < self.config.min_frames {
                return Err(InsufficientAudio {
                    frames: inner.frames.len(),
                    min_frames: self.config.min_frames,
                });
            }
            inner
                .frames
                .iter()
                .flat_map(|f| f.samples.iter().copied())
                .collect()
        };

        // Lock released; shaping works on the snapshot
        let shaped = shape_waveform(samples, self.config.peak_ceiling);
        Ok(to_pcm16(&shaped))
    }

    /// Discard all frames and energy state.
    ///
    /// Precondition: not recording. Calling this mid-recording is a defect in
    /// the caller, not a runtime condition.
    pub fn clear(&self) {
        let mut inner = self.lock();
        assert!(
            !inner.recording,
            "AudioFrameBuffer::clear() called while recording"
        );
        inner.frames.clear();
        inner.silence_streak = 0;
        inner.last_loud_ms = None;
        inner.auto_stopped = false;
    }

    pub fn is_recording(&self) -> bool {
        self.lock().recording
    }

    /// Whether the stop policy ended this recording (rather than `stop()`)
    pub fn auto_stopped(&self) -> bool {
        self.lock().auto_stopped
    }

    /// Number of frames accumulated
    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consecutive silent frames at the tail of the stream
    pub fn silence_streak(&self) -> usize {
        self.lock().silence_streak
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BufferInner> {
        // A poisoned lock means a panicking pusher; the samples are still
        // coherent (every mutation is a single append or reset)
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Remove DC offset, scale the peak to `ceiling`, then pass every sample
/// through `ceiling * tanh(x / ceiling)`.
///
/// The tanh stage bounds output below `ceiling` without the distortion of a
/// hard clip. Running an already-shaped signal through again reproduces it:
/// the peak scale maps the previous output peak back to `ceiling` and the
/// curve lands on the same values.
pub(crate) fn shape_waveform(mut samples: Vec<f32>, ceiling: f32) -> Vec<f32> {
    if samples.is_empty() {
        return samples;
    }

    let mean = samples.iter().sum::<f32>() / samples.len() as f32;
    for s in samples.iter_mut() {
        *s -= mean;
    }

    let peak = samples.iter().fold(0.0f32, |p, s| p.max(s.abs()));
    if peak > f32::EPSILON {
        let gain = ceiling / peak;
        for s in samples.iter_mut() {
            *s = ceiling * (*s * gain / ceiling).tanh();
        }
    }

    samples
}

/// Convert a [-1, 1] waveform to 16-bit signed PCM
pub(crate) fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| {
            let scaled = (s * i16::MAX as f32).round();
            scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
        })
        .collect()
}
