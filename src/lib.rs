pub mod audio;
pub mod config;
pub mod http;
pub mod lang;
pub mod session;
pub mod speech;
pub mod transcribe;
pub mod translate;

pub use audio::{
    AudioFrame, AudioFrameBuffer, BufferConfig, BufferState, CaptureBackend, CaptureConfig,
    CaptureFactory, CaptureSource, InsufficientAudio, PushOutcome, SilenceTimeout, StopPolicy,
    WavFileCapture,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{RecordingSession, SessionConfig, SessionError, SessionSnapshot, SessionState};
pub use speech::{SpeakError, SpeechClient, SpeechConfig};
pub use transcribe::{
    HttpTranscriber, TranscribeError, TranscribeRequest, Transcriber, TranscriberConfig,
};
pub use translate::{TranslateClient, TranslateConfig, TranslateError};
