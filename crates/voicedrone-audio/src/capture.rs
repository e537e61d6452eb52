use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use ringbuf::traits::Producer;
use ringbuf::HeapProd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use voicedrone_core::{AudioError, AudioFormat};

// ── CaptureHandle ─────────────────────────────────────────────

#[derive(Clone)]
pub struct CaptureHandle {
    enabled: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
}

impl CaptureHandle {
    fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, v: bool) {
        self.enabled.store(v, Ordering::Relaxed);
    }

    /// True once the device has reported a stream error.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }
}

// ── CaptureNode ───────────────────────────────────────────────

/// A live microphone stream writing raw samples into a ring buffer.
///
/// The stream runs at the recognizer's input format. No gain control or
/// echo cancellation is applied to the samples.
pub struct CaptureNode {
    stream: Stream,
}

impl CaptureNode {
    pub fn new(
        device: &Device,
        producer: HeapProd<f32>,
        format: AudioFormat,
    ) -> Result<(Self, CaptureHandle), AudioError> {
        let config = StreamConfig {
            channels: format.channels,
            sample_rate: SampleRate(format.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let producer = Arc::new(Mutex::new(producer));
        let handle = CaptureHandle::new();
        let enabled_flag = Arc::clone(&handle.enabled);
        let failed_flag = Arc::clone(&handle.failed);

        let err_callback = move |err: cpal::StreamError| {
            tracing::error!("capture stream error: {}", err);
            failed_flag.store(true, Ordering::Relaxed);
        };

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !enabled_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    if let Ok(mut prod) = producer.lock() {
                        // Overflow is silently dropped
                        prod.push_slice(data);
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        Ok((Self { stream }, handle))
    }

    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::StreamError(e.to_string()))
    }
}
