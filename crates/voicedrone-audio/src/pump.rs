use ringbuf::traits::{Consumer, Observer};
use ringbuf::HeapCons;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use voicedrone_core::{AudioChunk, AudioError, AudioFormat, SpeechInput};

/// Convert a float sample in `-1.0..=1.0` to 16-bit PCM, clamping overshoot.
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Moves captured samples from the ring buffer to the recognizer in
/// fixed-size frames.
pub struct AudioPump {
    consumer: HeapCons<f32>,
    format: AudioFormat,
    frame: Vec<f32>,
    sender: mpsc::UnboundedSender<SpeechInput>,
}

impl AudioPump {
    /// `frame_duration` sets how much audio each chunk carries.
    pub fn new(
        consumer: HeapCons<f32>,
        format: AudioFormat,
        frame_duration: Duration,
        sender: mpsc::UnboundedSender<SpeechInput>,
    ) -> Self {
        let frame_len = (format.sample_rate as f64 * frame_duration.as_secs_f64()) as usize
            * format.channels as usize;
        Self {
            consumer,
            format,
            frame: vec![0.0; frame_len.max(1)],
            sender,
        }
    }

    pub fn frame_len(&self) -> usize {
        self.frame.len()
    }

    /// Send one frame if a full frame is buffered. Returns samples sent, or
    /// `None` once the receiving side is gone.
    pub fn pump_once(&mut self) -> Option<usize> {
        if self.consumer.occupied_len() < self.frame.len() {
            return Some(0);
        }
        let n = self.consumer.pop_slice(&mut self.frame);
        let chunk = AudioChunk {
            samples: self.frame[..n].iter().copied().map(to_pcm16).collect(),
            format: self.format,
        };
        self.sender.send(SpeechInput::Audio(chunk)).ok()?;
        Some(n)
    }

    /// Pump until `running` is cleared or the receiver is dropped.
    pub fn run(&mut self, running: Arc<AtomicBool>, interval: Duration) {
        while running.load(Ordering::Relaxed) {
            match self.pump_once() {
                None => {
                    tracing::debug!("speech input closed, audio pump exiting");
                    break;
                }
                Some(0) => std::thread::sleep(interval),
                Some(_) => {}
            }
        }
    }

    /// Run the pump on a dedicated thread.
    pub fn start(mut self, interval: Duration) -> Result<PumpHandle, AudioError> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let thread = std::thread::Builder::new()
            .name("audio-pump".into())
            .spawn(move || {
                self.run(flag, interval);
            })
            .map_err(|e| AudioError::StreamError(format!("failed to spawn audio pump: {e}")))?;
        Ok(PumpHandle {
            running,
            thread: Some(thread),
        })
    }
}

pub struct PumpHandle {
    running: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl PumpHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the pump thread to stop and wait for it to finish.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(t) = self.thread.take() {
            if t.join().is_err() {
                tracing::error!("audio pump thread panicked");
            }
        }
    }
}
