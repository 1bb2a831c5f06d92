//! Recording session management
//!
//! This module provides the `RecordingSession` state machine that owns one
//! frame buffer per recording attempt:
//! - ready → recording → processing → ready, with an auto-stopped detour
//! - start/stop/clear driven by the user-facing control flow
//! - extraction and hand-off to the transcription collaborator

mod config;
mod session;

pub use config::SessionConfig;
pub use session::{RecordingSession, SessionError, SessionSnapshot, SessionState};
