use serde::{Deserialize, Serialize};

use crate::audio::BufferConfig;

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Sample rate frames are expected at (speech recognition wants 16kHz)
    pub sample_rate: u32,

    /// Language hint passed to the transcriber (ISO code, e.g. "en")
    pub language_hint: Option<String>,

    /// RMS energy below this counts as silence
    pub silence_threshold: f32,

    /// Consecutive silent frames tolerated before auto-stop is considered
    pub max_silence_frames: usize,

    /// Minimum frames a recording needs before extraction is allowed
    pub min_frames: usize,

    /// Time since the last loud frame before auto-stop fires (ms)
    pub silence_cooldown_ms: u64,
}

impl SessionConfig {
    pub fn buffer_config(&self) -> BufferConfig {
        BufferConfig {
            sample_rate: self.sample_rate,
            silence_threshold: self.silence_threshold,
            max_silence_frames: self.max_silence_frames,
            min_frames: self.min_frames,
            silence_cooldown_ms: self.silence_cooldown_ms,
            ..BufferConfig::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        let buffer = BufferConfig::default();
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            sample_rate: buffer.sample_rate,
            language_hint: None,
            silence_threshold: buffer.silence_threshold,
            max_silence_frames: buffer.max_silence_frames,
            min_frames: buffer.min_frames,
            silence_cooldown_ms: buffer.silence_cooldown_ms,
        }
    }
}
