// Integration tests for the voice-activity-gated frame buffer
//
// These exercise the push/stop/extract/clear contract and the silence
// auto-stop boundaries with synthetic frame sequences.

use voxlate::audio::{AudioFrame, AudioFrameBuffer, BufferConfig, PushOutcome};

const SAMPLE_RATE: u32 = 16000;
const FRAME_LEN: usize = 1600; // 100ms at 16kHz

fn frame(amplitude: f32, timestamp_ms: u64) -> AudioFrame {
    AudioFrame {
        samples: vec![amplitude; FRAME_LEN],
        sample_rate: SAMPLE_RATE,
        timestamp_ms,
    }
}

fn config() -> BufferConfig {
    BufferConfig {
        sample_rate: SAMPLE_RATE,
        silence_threshold: 0.015,
        max_silence_frames: 25,
        min_frames: 8,
        silence_cooldown_ms: 2000,
        peak_ceiling: 0.95,
    }
}

#[test]
fn test_extract_preserves_arrival_order_and_length() {
    let buffer = AudioFrameBuffer::new(config());
    buffer.start();

    // Frames with distinct amplitudes so order is observable after shaping
    let amplitudes = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.85];
    for (i, &a) in amplitudes.iter().enumerate() {
        assert_eq!(
            buffer.push(frame(a, i as u64 * 100)),
            PushOutcome::Accepted
        );
    }
    buffer.stop();

    let pcm = buffer.extract().expect("extract should succeed");
    assert_eq!(pcm.len(), FRAME_LEN * amplitudes.len());

    // Shaping is monotone, so relative ordering of frame levels survives.
    // The first frame had the lowest amplitude, the ninth the highest.
    let level = |idx: usize| pcm[idx * FRAME_LEN + FRAME_LEN / 2];
    assert!(level(0) < level(1));
    assert!(level(7) < level(8));
    assert!(level(9) < level(8));
}

#[test]
fn test_extract_before_start_fails_without_mutation() {
    let buffer = AudioFrameBuffer::new(config());

    let err = buffer.extract().unwrap_err();
    assert_eq!(err.frames, 0);
    assert_eq!(err.min_frames, 8);

    assert_eq!(buffer.len(), 0);
    assert!(!buffer.is_recording());
}

#[test]
fn test_extract_under_min_frames_fails() {
    let buffer = AudioFrameBuffer::new(config());
    buffer.start();

    for i in 0..5 {
        buffer.push(frame(0.5, i * 100));
    }
    buffer.stop();

    let err = buffer.extract().unwrap_err();
    assert_eq!(err.frames, 5);
    assert_eq!(err.min_frames, 8);

    // Failed extraction leaves the buffer untouched
    assert_eq!(buffer.len(), 5);
}

#[test]
fn test_push_while_stopped_is_a_no_op() {
    let buffer = AudioFrameBuffer::new(config());
    buffer.start();
    for i in 0..10 {
        buffer.push(frame(0.5, i * 100));
    }
    buffer.stop();

    let frames_before = buffer.len();
    let streak_before = buffer.silence_streak();

    // Capture channels keep emitting after logical stop; that is expected
    assert_eq!(buffer.push(frame(0.5, 1000)), PushOutcome::Discarded);
    assert_eq!(buffer.push(frame(0.0, 1100)), PushOutcome::Discarded);

    assert_eq!(buffer.len(), frames_before);
    assert_eq!(buffer.silence_streak(), streak_before);
}

#[test]
fn test_push_before_start_is_discarded() {
    let buffer = AudioFrameBuffer::new(config());
    assert_eq!(buffer.push(frame(0.5, 0)), PushOutcome::Discarded);
    assert_eq!(buffer.len(), 0);
}

#[test]
fn test_auto_stop_does_not_fire_at_exact_streak_limit() {
    let cfg = BufferConfig {
        max_silence_frames: 5,
        min_frames: 3,
        silence_cooldown_ms: 0,
        ..config()
    };
    let buffer = AudioFrameBuffer::new(cfg);
    buffer.start();

    // Enough loud frames to clear the min_frames bar
    for i in 0..4 {
        buffer.push(frame(0.5, i * 100));
    }

    // Exactly max_silence_frames silent frames: streak == limit, must not fire
    for i in 0..5 {
        let outcome = buffer.push(frame(0.0, 400 + i * 100));
        assert_eq!(outcome, PushOutcome::Accepted, "frame {} should not trip auto-stop", i);
    }
    assert!(buffer.is_recording());
    assert!(!buffer.auto_stopped());

    // One more silent frame crosses the boundary
    assert_eq!(buffer.push(frame(0.0, 900)), PushOutcome::AutoStopped);
    assert!(!buffer.is_recording());
    assert!(buffer.auto_stopped());
}

#[test]
fn test_auto_stop_waits_for_cooldown() {
    let cfg = BufferConfig {
        max_silence_frames: 1,
        min_frames: 1,
        silence_cooldown_ms: 2000,
        ..config()
    };
    let buffer = AudioFrameBuffer::new(cfg);
    buffer.start();

    buffer.push(frame(0.5, 0)); // loud, baselines the silence clock
    buffer.push(frame(0.0, 1000));
    // Streak is past the limit but only 2000ms have elapsed: not strictly
    // greater than the cool-down, so no auto-stop yet
    assert_eq!(buffer.push(frame(0.0, 2000)), PushOutcome::Accepted);
    assert!(buffer.is_recording());

    assert_eq!(buffer.push(frame(0.0, 2100)), PushOutcome::AutoStopped);
}

#[test]
fn test_auto_stop_requires_min_frames() {
    let cfg = BufferConfig {
        max_silence_frames: 2,
        min_frames: 10,
        silence_cooldown_ms: 100,
        ..config()
    };
    let buffer = AudioFrameBuffer::new(cfg);
    buffer.start();

    // Ten silent frames: streak and cool-down conditions hold well before
    // the frame count does
    for i in 0..10 {
        let outcome = buffer.push(frame(0.0, i * 100));
        assert_eq!(outcome, PushOutcome::Accepted, "frame {}", i);
    }
    assert!(buffer.is_recording());

    // Frame 11 makes frame_count > min_frames
    assert_eq!(buffer.push(frame(0.0, 1000)), PushOutcome::AutoStopped);
}

#[test]
fn test_loud_frame_resets_silence_streak() {
    let cfg = BufferConfig {
        max_silence_frames: 3,
        min_frames: 1,
        silence_cooldown_ms: 0,
        ..config()
    };
    let buffer = AudioFrameBuffer::new(cfg);
    buffer.start();

    buffer.push(frame(0.5, 0));
    for i in 0..3 {
        buffer.push(frame(0.0, 100 + i * 100));
    }
    assert_eq!(buffer.silence_streak(), 3);

    buffer.push(frame(0.5, 400));
    assert_eq!(buffer.silence_streak(), 0);
    assert!(buffer.is_recording());
}

#[test]
fn test_twenty_loud_frames_extracts_dc_free_pcm() {
    let buffer = AudioFrameBuffer::new(config());
    buffer.start();

    // Constant 0.5 amplitude is pure DC: above the silence threshold, and
    // entirely removed by the offset subtraction
    for i in 0..20 {
        buffer.push(frame(0.5, i * 100));
    }
    buffer.stop();

    let pcm = buffer.extract().expect("extract should succeed");
    assert_eq!(pcm.len(), 20 * FRAME_LEN);

    let mean = pcm.iter().map(|&s| s as f64).sum::<f64>() / pcm.len() as f64;
    assert!(mean.abs() < 1.0, "DC-adjusted mean should be ~0, got {}", mean);
}

#[test]
fn test_extract_is_repeatable() {
    let buffer = AudioFrameBuffer::new(config());
    buffer.start();
    for i in 0..12 {
        let samples: Vec<f32> = (0..FRAME_LEN)
            .map(|j| ((i * FRAME_LEN + j) as f32 * 0.01).sin() * 0.6)
            .collect();
        buffer.push(AudioFrame {
            samples,
            sample_rate: SAMPLE_RATE,
            timestamp_ms: i as u64 * 100,
        });
    }
    buffer.stop();

    // extract() never mutates: two calls return identical PCM
    let first = buffer.extract().unwrap();
    let second = buffer.extract().unwrap();
    assert_eq!(first, second);
    assert_eq!(buffer.len(), 12);
}

#[test]
fn test_clear_resets_state_after_stop() {
    let buffer = AudioFrameBuffer::new(config());
    buffer.start();
    for i in 0..10 {
        buffer.push(frame(0.0, i * 100));
    }
    buffer.stop();
    buffer.clear();

    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.silence_streak(), 0);
    assert!(!buffer.auto_stopped());
}

#[test]
fn test_start_after_clear_accepts_frames_again() {
    let buffer = AudioFrameBuffer::new(config());
    buffer.start();
    buffer.push(frame(0.5, 0));
    buffer.stop();
    buffer.clear();

    buffer.start();
    assert_eq!(buffer.push(frame(0.5, 0)), PushOutcome::Accepted);
    assert_eq!(buffer.len(), 1);
}
