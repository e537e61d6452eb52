use crate::capture::{CaptureHandle, CaptureNode};
use crate::device::DeviceManager;
use crate::pump::{AudioPump, PumpHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use voicedrone_core::config::AudioConfig;
use voicedrone_core::{AudioError, AudioFormat, SpeechInput};

/// Audio carried by each chunk sent to the recognizer.
pub const FRAME_DURATION: Duration = Duration::from_millis(100);

/// Ring buffer space, in seconds of audio.
const BUFFER_SECONDS: usize = 2;

/// An open microphone feeding 16 kHz mono PCM into speech recognition.
pub struct Microphone {
    capture: CaptureNode,
    handle: CaptureHandle,
    pump: Option<PumpHandle>,
}

impl Microphone {
    pub fn open(
        devices: &DeviceManager,
        config: &AudioConfig,
        sender: mpsc::UnboundedSender<SpeechInput>,
    ) -> Result<Self, AudioError> {
        let format = AudioFormat::PCM_16K_MONO;
        if config.automatic_gain_control || config.echo_cancellation {
            tracing::warn!(
                agc = config.automatic_gain_control,
                echo_cancellation = config.echo_cancellation,
                "audio processing is not supported; capturing raw samples"
            );
        }

        let device = devices.get_input_device(&config.device_name)?;
        let capacity = format.sample_rate as usize * format.channels as usize * BUFFER_SECONDS;
        let (producer, consumer) = crate::create_ring_buffer(capacity);

        let (capture, handle) = CaptureNode::new(&device, producer, format)?;
        let pump = AudioPump::new(consumer, format, FRAME_DURATION, sender)
            .start(Duration::from_millis(5))?;

        tracing::info!(
            device = %config.device_name,
            sample_rate = format.sample_rate,
            bytes_per_second = format.average_bytes_per_second(),
            "microphone open"
        );
        Ok(Self {
            capture,
            handle,
            pump: Some(pump),
        })
    }

    pub fn capture_handle(&self) -> &CaptureHandle {
        &self.handle
    }

    /// Stop capturing and join the pump thread.
    pub fn close(mut self) {
        self.handle.set_enabled(false);
        if let Err(e) = self.capture.pause() {
            tracing::warn!("failed to pause capture stream: {e}");
        }
        if let Some(pump) = self.pump.take() {
            pump.stop();
        }
    }
}
