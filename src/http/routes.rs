use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/session/start", post(handlers::start_recording))
        .route("/session/stop", post(handlers::stop_recording))
        .route("/session/clear", post(handlers::clear_session))
        .route("/session/status", get(handlers::get_session_status))
        // Translation workflow
        .route("/translate", post(handlers::translate_text))
        .route("/speak", post(handlers::speak_text))
        .route("/languages", get(handlers::list_languages))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
