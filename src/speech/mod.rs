//! Speech-synthesis collaborator
//!
//! Fetches MP3 audio for a piece of text from a hosted text-to-speech
//! endpoint (gTTS-style query interface). Input is validated against the
//! supported language table before any network call.

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::lang;

#[derive(Debug, Clone, Error)]
pub enum SpeakError {
    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),
    #[error("no text to synthesize")]
    EmptyInput,
    #[error("speech synthesis request failed: {0}")]
    Network(String),
}

/// Configuration for the synthesis client
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Synthesis endpoint; receives `q` (text) and `tl` (language) params
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.google.com/translate_tts".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

pub struct SpeechClient {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Synthesize `text` in the given language (ISO code), returning MP3 bytes
    pub async fn synthesize(&self, text: &str, lang_code: &str) -> Result<Vec<u8>, SpeakError> {
        if text.trim().is_empty() {
            return Err(SpeakError::EmptyInput);
        }
        if !lang::is_supported_code(lang_code) {
            return Err(SpeakError::UnsupportedLanguage(lang_code.to_string()));
        }

        debug!("Synthesizing {} chars in '{}'", text.len(), lang_code);

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("q", text),
                ("tl", lang_code),
            ])
            .send()
            .await
            .map_err(|e| SpeakError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeakError::Network(format!(
                "synthesis endpoint returned {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeakError::Network(e.to_string()))?;

        info!("Synthesized {} bytes of audio", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_rejected_before_network() {
        let client = SpeechClient::new(SpeechConfig::default()).unwrap();
        let err = client.synthesize("   ", "en").await.unwrap_err();
        assert!(matches!(err, SpeakError::EmptyInput));
    }

    #[tokio::test]
    async fn test_unknown_language_rejected_before_network() {
        let client = SpeechClient::new(SpeechConfig::default()).unwrap();
        let err = client.synthesize("hello", "xx").await.unwrap_err();
        assert!(matches!(err, SpeakError::UnsupportedLanguage(_)));
    }
}
