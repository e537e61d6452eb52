use ringbuf::traits::Producer;
use std::time::Duration;
use tokio::sync::mpsc;
use voicedrone_audio::{create_ring_buffer, to_pcm16, AudioPump};
use voicedrone_core::{AudioFormat, SpeechInput};

#[test]
fn test_captured_signal_reaches_recognizer_in_frames() {
    let (mut prod, cons) = create_ring_buffer(32000);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut pump = AudioPump::new(cons, AudioFormat::PCM_16K_MONO, Duration::from_millis(100), tx);

    // 250 ms of a 440 Hz tone
    let signal: Vec<f32> = (0..4000)
        .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / 16000.0).sin() * 0.5)
        .collect();
    assert_eq!(prod.push_slice(&signal), signal.len());

    let mut frames = Vec::new();
    while let Some(n) = pump.pump_once() {
        if n == 0 {
            break;
        }
        frames.push(n);
    }
    assert_eq!(frames, vec![1600, 1600]);

    let mut samples = Vec::new();
    while let Ok(SpeechInput::Audio(chunk)) = rx.try_recv() {
        samples.extend(chunk.samples);
    }
    assert_eq!(samples.len(), 3200);
    for (got, want) in samples.iter().zip(signal.iter()) {
        assert_eq!(*got, to_pcm16(*want));
    }
}
