//! Speech-to-text collaborator
//!
//! The session hands finished recordings (16-bit mono PCM) to a `Transcriber`.
//! The HTTP implementation wraps the PCM in a WAV container and posts it to a
//! hosted recognition endpoint; tests substitute their own implementations.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::audio::pcm_to_wav_bytes;

/// Why a transcription attempt failed. All variants are recoverable: the user
/// re-records, retries, or types instead.
#[derive(Debug, Clone, Error)]
pub enum TranscribeError {
    #[error("no speech detected in the recording")]
    NoSpeechDetected,
    #[error("speech recognition service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("speech recognition request timed out")]
    Timeout,
}

/// One finished recording to recognize
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    /// 16-bit signed mono PCM
    pub pcm: Vec<i16>,
    /// Sample rate of the PCM data
    pub sample_rate: u32,
    /// Optional language hint (ISO code, e.g. "en")
    pub language: Option<String>,
}

#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, request: TranscribeRequest) -> Result<String, TranscribeError>;
}

/// Configuration for the HTTP transcription client
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    /// Recognition endpoint (accepts audio/wav POST bodies)
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    text: String,
}

/// Transcriber that posts WAV audio to a hosted recognition endpoint
pub struct HttpTranscriber {
    client: reqwest::Client,
    config: TranscriberConfig,
}

impl HttpTranscriber {
    pub fn new(config: TranscriberConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, request: TranscribeRequest) -> Result<String, TranscribeError> {
        let wav = pcm_to_wav_bytes(&request.pcm, request.sample_rate)
            .map_err(|e| TranscribeError::ServiceUnavailable(e.to_string()))?;

        debug!(
            "Posting {} bytes of WAV audio to {}",
            wav.len(),
            self.config.endpoint
        );

        let mut req = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "audio/wav")
            .body(wav);

        if let Some(language) = &request.language {
            req = req.query(&[("language", language.as_str())]);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TranscribeError::Timeout
            } else {
                TranscribeError::ServiceUnavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscribeError::ServiceUnavailable(format!(
                "recognition endpoint returned {}",
                status
            )));
        }

        let body: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::ServiceUnavailable(e.to_string()))?;

        let text = body.text.trim().to_string();
        if text.is_empty() {
            return Err(TranscribeError::NoSpeechDetected);
        }

        info!("Transcription complete: {} chars", text.len());
        Ok(text)
    }
}
