use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// One chunk of captured audio (mono, floating-point amplitude in [-1, 1])
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Audio samples, one channel, amplitude in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Timestamp in milliseconds since capture started (stream clock)
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Root-mean-square energy of the frame
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = self.samples.iter().map(|s| s * s).sum();
        (sum_sq / self.samples.len() as f32).sqrt()
    }

    /// Frame duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        (self.samples.len() as u64 * 1000) / self.sample_rate as u64
    }
}

/// Configuration for capture backends
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sample rate frames are delivered at
    pub sample_rate: u32,
    /// Duration of each delivered frame in milliseconds
    pub frame_duration_ms: u64,
    /// Pace delivery at real time (false = deliver as fast as possible)
    pub realtime: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz mono for speech recognition
            frame_duration_ms: 100,
            realtime: false,
        }
    }
}

/// Audio capture backend trait
///
/// The live microphone path is an external collaborator (delivered over the
/// same channel contract); the in-tree implementation reads WAV files for
/// tests and batch input.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture source type
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// WAV file input (tests / batch processing)
    File(PathBuf),
    /// Live microphone (provided by an external capture process)
    Microphone,
}

/// Capture backend factory
pub struct CaptureFactory;

impl CaptureFactory {
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::File(path) => {
                let backend = super::wav::WavFileCapture::new(path, config);
                Ok(Box::new(backend))
            }
            CaptureSource::Microphone => {
                anyhow::bail!(
                    "Live microphone capture is not built in; attach an external \
                    capture process to the frame channel instead"
                )
            }
        }
    }
}
