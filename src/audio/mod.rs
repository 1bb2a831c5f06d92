pub mod buffer;
pub mod frame;
pub mod wav;

pub use buffer::{
    AudioFrameBuffer, BufferConfig, BufferState, InsufficientAudio, PushOutcome, SilenceTimeout,
    StopPolicy,
};
pub use frame::{AudioFrame, CaptureBackend, CaptureConfig, CaptureFactory, CaptureSource};
pub use wav::{pcm_to_wav_bytes, write_wav_file, WavFileCapture};
