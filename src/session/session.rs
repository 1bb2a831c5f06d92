use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::config::SessionConfig;
use crate::audio::{AudioFrame, AudioFrameBuffer, InsufficientAudio, PushOutcome};
use crate::transcribe::{TranscribeError, TranscribeRequest, Transcriber};

/// Where the session currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Idle, nothing captured or processing
    Ready,
    /// Frames are being accepted into the buffer
    Recording,
    /// Extraction / transcription in flight
    Processing,
    /// Recording ended by sustained silence; waiting for the user to
    /// process or discard it
    AutoStopped,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InsufficientAudio(#[from] InsufficientAudio),

    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscribeError),

    #[error("session is already recording")]
    AlreadyRecording,

    #[error("a transcription is already in progress")]
    Busy,
}

/// Serializable view of the session for status queries
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: SessionState,
    pub frames: usize,
    pub last_text: Option<String>,
    pub recording_started_at: Option<DateTime<Utc>>,
}

/// State machine driving one recording surface: ready → recording →
/// processing → ready, with an auto-stopped detour when the silence policy
/// ends a take.
///
/// One fresh `AudioFrameBuffer` is created per attempt. Frames arrive on a
/// channel from the capture backend and are pushed by a background pump task;
/// stop/clear come from the user-facing control flow. The transcription call
/// runs on an extracted snapshot after every buffer lock is released.
pub struct RecordingSession {
    config: SessionConfig,
    transcriber: Arc<dyn Transcriber>,
    /// Shared with the pump task, which flips recording → auto_stopped
    state: Arc<Mutex<SessionState>>,
    buffer: Mutex<Arc<AudioFrameBuffer>>,
    last_text: Mutex<Option<String>>,
    started_at: Mutex<Option<DateTime<Utc>>>,
}

impl RecordingSession {
    pub fn new(config: SessionConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        info!("Creating recording session: {}", config.session_id);

        let buffer = Arc::new(AudioFrameBuffer::new(config.buffer_config()));

        Self {
            config,
            transcriber,
            state: Arc::new(Mutex::new(SessionState::Ready)),
            buffer: Mutex::new(buffer),
            last_text: Mutex::new(None),
            started_at: Mutex::new(None),
        }
    }

    /// Begin a recording attempt, consuming frames from `frames` until the
    /// channel closes or recording stops.
    pub fn start(&self, mut frames: mpsc::Receiver<AudioFrame>) -> Result<(), SessionError> {
        let buffer = {
            let mut state = lock(&*self.state);
            match *state {
                SessionState::Ready | SessionState::AutoStopped => {}
                SessionState::Recording => return Err(SessionError::AlreadyRecording),
                SessionState::Processing => return Err(SessionError::Busy),
            }

            // Fresh buffer per attempt; any unprocessed take is discarded
            let buffer = Arc::new(AudioFrameBuffer::new(self.config.buffer_config()));
            buffer.start();
            *lock(&self.buffer) = Arc::clone(&buffer);
            *state = SessionState::Recording;
            buffer
        };

        *lock(&self.started_at) = Some(Utc::now());
        info!("Recording started: {}", self.config.session_id);

        // Pump task: the single producer feeding this attempt's buffer.
        // Frames delivered after the buffer stopped are discarded by push().
        let state = Arc::clone(&self.state);
        let session_id = self.config.session_id.clone();
        tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                if buffer.push(frame) == PushOutcome::AutoStopped {
                    // First transition out of recording wins; if the user
                    // already stopped, this is a no-op
                    let mut st = lock(&*state);
                    if *st == SessionState::Recording {
                        *st = SessionState::AutoStopped;
                        info!("Auto-stop: {}", session_id);
                    }
                }
            }
        });

        Ok(())
    }

    /// Stop the current take, extract the waveform, and transcribe it.
    ///
    /// Guard: a take with fewer than `min_frames` frames (including a stop
    /// with nothing recorded) is rejected with `InsufficientAudio` without
    /// entering the processing state.
    pub async fn stop(&self) -> Result<String, SessionError> {
        let buffer = {
            let mut state = lock(&*self.state);
            match *state {
                SessionState::Recording | SessionState::AutoStopped => {}
                SessionState::Ready => {
                    return Err(SessionError::InsufficientAudio(InsufficientAudio {
                        frames: 0,
                        min_frames: self.config.min_frames,
                    }));
                }
                SessionState::Processing => return Err(SessionError::Busy),
            }

            // The buffer identity is read under the state lock: a concurrent
            // clear-and-restart swaps the buffer and the state together, so
            // the guard above and the buffer it applies to cannot be split
            let buffer = self.buffer();
            buffer.stop();

            let frames = buffer.len();
            if frames < self.config.min_frames {
                warn!(
                    "Stop rejected: {} frames captured, need {}",
                    frames, self.config.min_frames
                );
                *state = SessionState::Ready;
                buffer.clear();
                return Err(SessionError::InsufficientAudio(InsufficientAudio {
                    frames,
                    min_frames: self.config.min_frames,
                }));
            }

            *state = SessionState::Processing;
            buffer
        };

        info!(
            "Processing take: {} frames, session {}",
            buffer.len(),
            self.config.session_id
        );

        // No session or buffer lock is held across the service call
        let extracted = buffer.extract();
        let result = match extracted {
            Ok(pcm) => {
                let request = TranscribeRequest {
                    pcm,
                    sample_rate: buffer.sample_rate(),
                    language: self.config.language_hint.clone(),
                };
                self.transcriber.transcribe(request).await.map_err(SessionError::from)
            }
            Err(e) => Err(SessionError::from(e)),
        };

        {
            let mut state = lock(&*self.state);
            *state = SessionState::Ready;
            buffer.clear();
        }
        *lock(&self.started_at) = None;

        match result {
            Ok(text) => {
                info!("Recognized {} chars", text.len());
                *lock(&self.last_text) = Some(text.clone());
                Ok(text)
            }
            Err(e) => {
                warn!("Take failed: {}", e);
                *lock(&self.last_text) = None;
                Err(e)
            }
        }
    }

    /// Reset to ready from any state, discarding frames and recognized text
    pub fn clear(&self) {
        let mut state = lock(&*self.state);

        // Same rule as stop(): read the buffer under the state lock so this
        // cannot clear a take that a racing start() already replaced
        let buffer = self.buffer();
        buffer.stop();
        buffer.clear();
        *state = SessionState::Ready;
        *lock(&self.last_text) = None;
        *lock(&self.started_at) = None;

        info!("Session cleared: {}", self.config.session_id);
    }

    pub fn state(&self) -> SessionState {
        *lock(&*self.state)
    }

    pub fn last_text(&self) -> Option<String> {
        lock(&self.last_text).clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            state: self.state(),
            frames: self.buffer().len(),
            last_text: self.last_text(),
            recording_started_at: *lock(&self.started_at),
        }
    }

    fn buffer(&self) -> Arc<AudioFrameBuffer> {
        Arc::clone(&lock(&self.buffer))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
