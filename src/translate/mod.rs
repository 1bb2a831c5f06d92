//! Translation collaborator
//!
//! Thin client over an OpenRouter-compatible chat-completions endpoint. The
//! prompt pins the model to returning only the translated text; the response
//! is cleaned of wrapping quotes before it reaches the caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Error)]
pub enum TranslateError {
    #[error("translation API rejected the credentials")]
    Auth,
    #[error("translation API rate limit exceeded")]
    RateLimited,
    #[error("translation API returned an empty response")]
    EmptyResponse,
    #[error("translation request failed: {0}")]
    Network(String),
}

/// Configuration for the translation client
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Referer / title headers some routers use for attribution
    pub site_url: String,
    pub site_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            model: "openai/gpt-4o".to_string(),
            site_url: "https://voxlate.example".to_string(),
            site_name: "Voxlate".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}

const SYSTEM_MESSAGE: &str = "You are a professional medical translator. Always \
return only the translated text without any additional explanations, formatting, \
or quotation marks.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub struct TranslateClient {
    client: reqwest::Client,
    config: TranslateConfig,
}

impl TranslateClient {
    pub fn new(config: TranslateConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Translate `text` into the target language (display name, e.g. "Spanish")
    pub async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        let prompt = build_prompt(text, target_lang);

        debug!("Translating {} chars to {}", text.len(), target_lang);

        let content = self
            .complete(vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ])
            .await?;

        let cleaned = clean_response(&content);
        if cleaned.is_empty() {
            return Err(TranslateError::EmptyResponse);
        }

        info!("Translation complete: {} chars", cleaned.len());
        Ok(cleaned)
    }

    /// Probe the API with a one-word translation to confirm it is reachable
    /// and the credentials work
    pub async fn check_availability(&self) -> Result<(), TranslateError> {
        self.complete(vec![ChatMessage {
            role: "user",
            content: "Translate 'Hello' to Spanish. Return only the translation.",
        }])
        .await
        .map(|_| ())
    }

    async fn complete(&self, messages: Vec<ChatMessage<'_>>) -> Result<String, TranslateError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", &self.config.site_name)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TranslateError::Auth);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslateError::RateLimited);
        }
        if !status.is_success() {
            // Routers usually return {"error": {"message": ...}} bodies
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<serde_json::Value>(&body).ok())
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(String::from)
                });

            return Err(TranslateError::Network(match detail {
                Some(message) => format!("translation endpoint returned {}: {}", status, message),
                None => format!("translation endpoint returned {}", status),
            }));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(TranslateError::EmptyResponse)
    }
}

/// Translation prompt: accurate terminology, same register, translation only
fn build_prompt(text: &str, target_lang: &str) -> String {
    format!(
        "You are a professional medical translator. Translate the following \
medical text from the source language into {target_lang}.\n\n\
IMPORTANT INSTRUCTIONS:\n\
- Keep all medical terminology accurate and precise\n\
- Maintain the same tone and formality level\n\
- Return ONLY the translated text, no explanations or additional notes\n\
- Do not add quotation marks around the translation\n\
- Preserve any formatting or structure from the original text\n\n\
Text to translate:\n{text}"
    )
}

/// Strip whitespace and one layer of wrapping quotes the model sometimes adds
fn clean_response(response: &str) -> String {
    let trimmed = response.trim();

    let unquoted = if (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2)
        || (trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2)
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    unquoted.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_response_strips_wrapping_quotes() {
        assert_eq!(clean_response("\"Hola\""), "Hola");
        assert_eq!(clean_response("'Hola'"), "Hola");
        assert_eq!(clean_response("  Hola  "), "Hola");
    }

    #[test]
    fn test_clean_response_keeps_interior_quotes() {
        assert_eq!(clean_response("El dijo \"hola\" ayer"), "El dijo \"hola\" ayer");
    }

    #[test]
    fn test_clean_response_empty() {
        assert_eq!(clean_response("  \"\"  "), "");
        assert_eq!(clean_response(""), "");
    }

    #[test]
    fn test_prompt_includes_text_and_target() {
        let prompt = build_prompt("Take two tablets daily", "Spanish");
        assert!(prompt.contains("Take two tablets daily"));
        assert!(prompt.contains("into Spanish"));
        assert!(prompt.contains("ONLY the translated text"));
    }
}
