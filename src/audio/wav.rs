use anyhow::{Context, Result};
use hound::{WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::frame::{AudioFrame, CaptureBackend, CaptureConfig};

/// Capture backend that streams a WAV file as fixed-duration frames
///
/// Used for tests and batch input. Stereo input is mixed down to mono;
/// i16 samples are converted to [-1, 1] floats.
pub struct WavFileCapture {
    path: PathBuf,
    config: CaptureConfig,
    capturing: Arc<AtomicBool>,
}

impl WavFileCapture {
    pub fn new(path: impl Into<PathBuf>, config: CaptureConfig) -> Self {
        Self {
            path: path.into(),
            config,
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }

    fn load_mono(&self) -> Result<(Vec<f32>, u32)> {
        let reader = WavReader::open(&self.path)
            .with_context(|| format!("Failed to open WAV file: {}", self.path.display()))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let mono: Vec<f32> = match spec.channels {
            1 => samples.iter().map(|&s| s as f32 / i16::MAX as f32).collect(),
            2 => samples
                .chunks_exact(2)
                .map(|lr| (lr[0] as f32 + lr[1] as f32) / (2.0 * i16::MAX as f32))
                .collect(),
            n => anyhow::bail!("Unsupported channel count: {}", n),
        };

        info!(
            "WAV file loaded: {} ({} samples, {}Hz, {} channels)",
            self.path.display(),
            mono.len(),
            spec.sample_rate,
            spec.channels
        );

        Ok((mono, spec.sample_rate))
    }
}

#[async_trait::async_trait]
impl CaptureBackend for WavFileCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (mono, sample_rate) = self.load_mono()?;

        if sample_rate != self.config.sample_rate {
            warn!(
                "WAV sample rate {}Hz differs from configured {}Hz; frames keep the file rate",
                sample_rate, self.config.sample_rate
            );
        }

        let samples_per_frame =
            (sample_rate as u64 * self.config.frame_duration_ms / 1000) as usize;
        let frame_duration_ms = self.config.frame_duration_ms;
        let realtime = self.config.realtime;

        self.capturing.store(true, Ordering::SeqCst);
        let capturing = Arc::clone(&self.capturing);

        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            let mut timestamp_ms = 0u64;

            for chunk in mono.chunks(samples_per_frame.max(1)) {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate,
                    timestamp_ms,
                };
                timestamp_ms += frame_duration_ms;

                if tx.send(frame).await.is_err() {
                    // Receiver dropped; nothing left to feed
                    break;
                }

                if realtime {
                    tokio::time::sleep(std::time::Duration::from_millis(frame_duration_ms)).await;
                }
            }

            capturing.store(false, Ordering::SeqCst);
            info!("WAV capture finished");
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

/// Wrap 16-bit mono PCM into in-memory WAV bytes (for the transcriber upload)
pub fn pcm_to_wav_bytes(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .context("Failed to write sample to WAV")?;
        }
        writer.finalize().context("Failed to finalize WAV data")?;
    }

    Ok(cursor.into_inner())
}

/// Write 16-bit mono PCM to a WAV file on disk
pub fn write_wav_file(path: impl AsRef<Path>, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.as_ref().display()))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .context("Failed to write sample to WAV")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    Ok(())
}
