use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use voxlate::config::Config;
use voxlate::http::{create_router, AppState};
use voxlate::session::{RecordingSession, SessionConfig};
use voxlate::speech::{SpeechClient, SpeechConfig};
use voxlate::transcribe::{HttpTranscriber, TranscriberConfig};
use voxlate::translate::{TranslateClient, TranslateConfig};

#[derive(Debug, Parser)]
#[command(name = "voxlate", about = "Voice translation service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/voxlate")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Arc::new(Config::load(&args.config)?);

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let transcriber = Arc::new(
        HttpTranscriber::new(TranscriberConfig {
            endpoint: cfg.transcribe.endpoint.clone(),
            timeout: Duration::from_secs(cfg.transcribe.timeout_secs),
        })
        .context("Failed to build transcription client")?,
    );

    let session = Arc::new(RecordingSession::new(
        SessionConfig {
            sample_rate: cfg.capture.sample_rate,
            language_hint: cfg.recording.language_hint.clone(),
            silence_threshold: cfg.recording.silence_threshold,
            max_silence_frames: cfg.recording.max_silence_frames,
            min_frames: cfg.recording.min_frames,
            silence_cooldown_ms: cfg.recording.silence_cooldown_ms,
            ..SessionConfig::default()
        },
        transcriber,
    ));

    let translator = Arc::new(
        TranslateClient::new(TranslateConfig {
            base_url: cfg.translate.base_url.clone(),
            api_key: cfg.translate.api_key.clone(),
            model: cfg.translate.model.clone(),
            site_url: cfg.translate.site_url.clone(),
            site_name: cfg.translate.site_name.clone(),
            temperature: cfg.translate.temperature,
            max_tokens: cfg.translate.max_tokens,
            timeout: Duration::from_secs(cfg.translate.timeout_secs),
        })
        .context("Failed to build translation client")?,
    );

    if let Err(e) = translator.check_availability().await {
        // The service still starts; translation requests surface the error
        tracing::warn!("Translation API probe failed: {}", e);
    } else {
        info!("Translation API is available");
    }

    let speech = Arc::new(
        SpeechClient::new(SpeechConfig {
            endpoint: cfg.speech.endpoint.clone(),
            timeout: Duration::from_secs(cfg.speech.timeout_secs),
        })
        .context("Failed to build speech client")?,
    );

    let state = AppState::new(session, translator, speech, Arc::clone(&cfg));
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
