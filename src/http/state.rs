use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::CaptureBackend;
use crate::config::Config;
use crate::session::RecordingSession;
use crate::speech::SpeechClient;
use crate::translate::TranslateClient;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one user-facing recording session
    pub session: Arc<RecordingSession>,

    /// Capture backend for the active recording, if any
    pub capture: Arc<Mutex<Option<Box<dyn CaptureBackend>>>>,

    pub translator: Arc<TranslateClient>,
    pub speech: Arc<SpeechClient>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        session: Arc<RecordingSession>,
        translator: Arc<TranslateClient>,
        speech: Arc<SpeechClient>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            session,
            capture: Arc::new(Mutex::new(None)),
            translator,
            speech,
            config,
        }
    }
}
