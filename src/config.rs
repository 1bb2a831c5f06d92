use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub capture: CaptureSettings,
    pub recording: RecordingSettings,
    pub transcribe: TranscribeSettings,
    pub translate: TranslateSettings,
    pub speech: SpeechSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureSettings {
    /// WAV file to stream frames from ("file" source). Live capture attaches
    /// externally to the frame channel instead.
    pub input_path: Option<String>,
    pub sample_rate: u32,
    pub frame_duration_ms: u64,
    /// Pace file delivery at real time
    pub realtime: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingSettings {
    pub silence_threshold: f32,
    pub max_silence_frames: usize,
    pub min_frames: usize,
    pub silence_cooldown_ms: u64,
    pub language_hint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscribeSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateSettings {
    pub base_url: String,
    /// Usually supplied via VOXLATE__TRANSLATE__API_KEY
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub site_url: String,
    pub site_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            // Environment overrides, e.g. VOXLATE__TRANSLATE__API_KEY
            .add_source(
                config::Environment::with_prefix("VOXLATE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
