//! HTTP API for driving the translation workflow from a UI
//!
//! This module provides a REST API replacing the original user surface:
//! - POST /session/start - Begin capturing a recording
//! - POST /session/stop - Stop, extract, and transcribe
//! - POST /session/clear - Reset the session
//! - GET /session/status - Query session state
//! - POST /translate - Translate text
//! - POST /speak - Synthesize speech for text
//! - GET /languages - Supported language table
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
