use super::state::AppState;
use crate::audio::{CaptureConfig, CaptureFactory, CaptureSource};
use crate::lang;
use crate::session::{SessionError, SessionSnapshot};
use crate::speech::SpeakError;
use crate::translate::TranslateError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    /// Target language display name, e.g. "Spanish"
    pub target_language: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    /// ISO language code, e.g. "es"
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct SpeakResponse {
    pub audio_base64: String,
    pub format: String,
}

#[derive(Debug, Serialize)]
pub struct LanguageEntry {
    pub name: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Begin a recording attempt fed from the configured capture source
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.session.config().session_id.clone();
    info!("Start recording requested: {}", session_id);

    let capture_cfg = &state.config.capture;
    let source = match &capture_cfg.input_path {
        Some(path) => CaptureSource::File(PathBuf::from(path)),
        None => CaptureSource::Microphone,
    };

    let mut backend = match CaptureFactory::create(
        source,
        CaptureConfig {
            sample_rate: capture_cfg.sample_rate,
            frame_duration_ms: capture_cfg.frame_duration_ms,
            realtime: capture_cfg.realtime,
        },
    ) {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to create capture backend: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
    };

    let frames = match backend.start().await {
        Ok(rx) => rx,
        Err(e) => {
            error!("Failed to start capture: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
    };

    if let Err(e) = state.session.start(frames) {
        return match e {
            SessionError::AlreadyRecording | SessionError::Busy => {
                error_response(StatusCode::CONFLICT, e)
            }
            other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other),
        };
    }

    {
        let mut capture = state.capture.lock().await;
        *capture = Some(backend);
    }

    (
        StatusCode::OK,
        Json(StartRecordingResponse {
            session_id,
            status: "recording".to_string(),
        }),
    )
        .into_response()
}

/// POST /session/stop
/// Stop the recording, transcribe it, and return the recognized text
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    info!("Stop recording requested");

    // Shut the capture backend down first so the frame channel closes
    {
        let mut capture = state.capture.lock().await;
        if let Some(mut backend) = capture.take() {
            if let Err(e) = backend.stop().await {
                error!("Failed to stop capture backend: {}", e);
            }
        }
    }

    match state.session.stop().await {
        Ok(text) => (StatusCode::OK, Json(StopRecordingResponse { text })).into_response(),
        Err(e @ SessionError::InsufficientAudio(_)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e)
        }
        Err(e @ SessionError::Transcription(_)) => error_response(StatusCode::BAD_GATEWAY, e),
        Err(e) => error_response(StatusCode::CONFLICT, e),
    }
}

/// POST /session/clear
/// Reset the session to ready, discarding frames and recognized text
pub async fn clear_session(State(state): State<AppState>) -> impl IntoResponse {
    {
        let mut capture = state.capture.lock().await;
        if let Some(mut backend) = capture.take() {
            if let Err(e) = backend.stop().await {
                error!("Failed to stop capture backend: {}", e);
            }
        }
    }

    state.session.clear();
    StatusCode::OK
}

/// GET /session/status
pub async fn get_session_status(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

/// POST /translate
pub async fn translate_text(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "no text to translate");
    }
    if lang::code_for(&req.target_language).is_none() {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("unsupported target language: {}", req.target_language),
        );
    }

    match state.translator.translate(&req.text, &req.target_language).await {
        Ok(translated_text) => {
            (StatusCode::OK, Json(TranslateResponse { translated_text })).into_response()
        }
        Err(e @ TranslateError::Auth) => error_response(StatusCode::UNAUTHORIZED, e),
        Err(e @ TranslateError::RateLimited) => error_response(StatusCode::TOO_MANY_REQUESTS, e),
        Err(e) => error_response(StatusCode::BAD_GATEWAY, e),
    }
}

/// POST /speak
/// Synthesize speech and return it base64-encoded
pub async fn speak_text(
    State(state): State<AppState>,
    Json(req): Json<SpeakRequest>,
) -> impl IntoResponse {
    match state.speech.synthesize(&req.text, &req.language).await {
        Ok(audio) => {
            let audio_base64 = base64::engine::general_purpose::STANDARD.encode(audio);
            (
                StatusCode::OK,
                Json(SpeakResponse {
                    audio_base64,
                    format: "mp3".to_string(),
                }),
            )
                .into_response()
        }
        Err(e @ (SpeakError::EmptyInput | SpeakError::UnsupportedLanguage(_))) => {
            error_response(StatusCode::BAD_REQUEST, e)
        }
        Err(e) => error_response(StatusCode::BAD_GATEWAY, e),
    }
}

/// GET /languages
pub async fn list_languages() -> Json<Vec<LanguageEntry>> {
    Json(
        lang::LANGUAGES
            .iter()
            .map(|&(name, code)| LanguageEntry { name, code })
            .collect(),
    )
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
