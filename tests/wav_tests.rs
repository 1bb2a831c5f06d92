// Tests for WAV file capture and PCM wrapping

use anyhow::Result;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use tempfile::TempDir;

use voxlate::audio::{pcm_to_wav_bytes, write_wav_file, CaptureBackend, CaptureConfig, WavFileCapture};

fn write_stereo_fixture(path: &std::path::Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

#[tokio::test]
async fn test_wav_capture_streams_all_samples_in_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("fixture.wav");

    // 0.5s of 16kHz mono with a recognizable ramp
    let samples: Vec<i16> = (0..8000).map(|i| (i % 1000) as i16).collect();
    write_wav_file(&path, &samples, 16000)?;

    let mut backend = WavFileCapture::new(
        &path,
        CaptureConfig {
            sample_rate: 16000,
            frame_duration_ms: 100,
            realtime: false,
        },
    );

    let mut rx = backend.start().await?;

    let mut frames = Vec::new();
    while let Some(frame) = rx.recv().await {
        frames.push(frame);
    }

    // 8000 samples at 1600 per 100ms frame = 5 frames
    assert_eq!(frames.len(), 5);
    let total: usize = frames.iter().map(|f| f.samples.len()).sum();
    assert_eq!(total, 8000);

    // Timestamps advance by the frame duration, and each full frame
    // carries 100ms of audio
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.timestamp_ms, i as u64 * 100);
        assert_eq!(frame.sample_rate, 16000);
        assert_eq!(frame.duration_ms(), 100);
    }

    // Sample order survives the i16 → f32 conversion
    let first = &frames[0].samples;
    assert!(first[0].abs() < 1e-6);
    assert!((first[500] - 500.0 / i16::MAX as f32).abs() < 1e-6);

    Ok(())
}

#[tokio::test]
async fn test_wav_capture_mixes_stereo_to_mono() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("stereo.wav");

    // Interleaved L/R where L = 1000, R = 3000: mono mixdown is 2000
    let samples: Vec<i16> = (0..3200).map(|i| if i % 2 == 0 { 1000 } else { 3000 }).collect();
    write_stereo_fixture(&path, &samples, 16000)?;

    let mut backend = WavFileCapture::new(&path, CaptureConfig::default());
    let mut rx = backend.start().await?;

    let mut mono = Vec::new();
    while let Some(frame) = rx.recv().await {
        mono.extend(frame.samples);
    }

    assert_eq!(mono.len(), 1600);
    let expected = 2000.0 / i16::MAX as f32;
    assert!((mono[0] - expected).abs() < 1e-5);
    assert!((mono[1599] - expected).abs() < 1e-5);

    Ok(())
}

#[tokio::test]
async fn test_wav_capture_stop_halts_delivery() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("long.wav");

    // 10s of audio delivered at real time: stopping early must cut it short
    let samples = vec![100i16; 160_000];
    write_wav_file(&path, &samples, 16000)?;

    let mut backend = WavFileCapture::new(
        &path,
        CaptureConfig {
            sample_rate: 16000,
            frame_duration_ms: 100,
            realtime: true,
        },
    );

    let mut rx = backend.start().await?;
    assert!(backend.is_capturing());

    let _ = rx.recv().await.expect("first frame");
    backend.stop().await?;

    let mut remaining = 0;
    while rx.recv().await.is_some() {
        remaining += 1;
    }
    assert!(remaining < 100, "delivery should stop early, got {} frames", remaining);
    assert!(!backend.is_capturing());

    Ok(())
}

#[test]
fn test_pcm_to_wav_bytes_round_trips() -> Result<()> {
    let pcm: Vec<i16> = vec![0, 1000, -1000, i16::MAX, i16::MIN];
    let bytes = pcm_to_wav_bytes(&pcm, 16000)?;

    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.bits_per_sample, 16);

    let decoded: Vec<i16> = reader.into_samples::<i16>().collect::<Result<_, _>>()?;
    assert_eq!(decoded, pcm);

    Ok(())
}
