use crate::engine_trait::RecognitionEngine;
use crate::grammar::Grammars;
use crate::registry::{RecognizerInfo, RecognizerRegistry, RecognizerRequirements};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use voicedrone_core::config::SpeechConfig;
use voicedrone_core::{AudioFormat, SpeechError, SpeechEvent, SpeechInput};

/// Owns one recognition engine and runs continuous recognition over it.
///
/// Input (audio chunks and transcripts) goes in through the sender returned by
/// [`start`](Self::start); recognition events come out of the receiver from
/// [`take_event_receiver`](Self::take_event_receiver).
pub struct SpeechStreamAdapter {
    event_tx: mpsc::UnboundedSender<SpeechEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<SpeechEvent>>,
    recognizer: Option<RecognizerInfo>,
    engine: Option<Arc<dyn RecognitionEngine>>,
    cancel_tx: Option<watch::Sender<bool>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl SpeechStreamAdapter {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            event_tx,
            event_rx: Some(event_rx),
            recognizer: None,
            engine: None,
            cancel_tx: None,
            task: None,
        }
    }

    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<SpeechEvent>> {
        self.event_rx.take()
    }

    /// The recognizer chosen by the last successful `start`.
    pub fn recognizer(&self) -> Option<&RecognizerInfo> {
        self.recognizer.as_ref()
    }

    /// Whether the started engine consumes audio chunks. False before `start`.
    pub fn accepts_audio(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| e.accepts_audio())
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub async fn start(
        &mut self,
        registry: &RecognizerRegistry,
        requirements: &RecognizerRequirements,
        config: &SpeechConfig,
        grammars: &Grammars,
    ) -> Result<mpsc::UnboundedSender<SpeechInput>, SpeechError> {
        if self.engine.is_some() {
            return Err(SpeechError::InitializationFailed(
                "recognition already started".to_string(),
            ));
        }

        let info = registry.select(requirements)?;
        tracing::info!(recognizer = %info.id, name = %info.name, culture = %info.culture, "recognizer selected");

        let mut engine = registry.create(&info.id, config)?;
        let (engine_tx, mut engine_rx) = mpsc::unbounded_channel();
        engine.set_event_sender(engine_tx);
        for grammar in grammars.all() {
            engine.load_grammar(grammar)?;
        }
        engine.set_input_format(AudioFormat::PCM_16K_MONO)?;

        let engine: Arc<dyn RecognitionEngine> = Arc::from(engine);
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<SpeechInput>();
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let shared_tx = self.event_tx.clone();
        let task_engine = Arc::clone(&engine);
        let recognizer_id = info.id.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => {
                        tracing::debug!(recognizer = %recognizer_id, "recognition cancelled");
                        break;
                    }
                    input = input_rx.recv() => {
                        match input {
                            Some(input) => {
                                if let Err(e) = task_engine.feed(input).await {
                                    tracing::warn!(recognizer = %recognizer_id, "recognition input failed: {e}");
                                }
                            }
                            None => {
                                tracing::debug!(recognizer = %recognizer_id, "input sender dropped, recognition ending");
                                break;
                            }
                        }
                    }
                    event = engine_rx.recv() => {
                        match event {
                            Some(event) => {
                                let _ = shared_tx.send(event);
                            }
                            None => break,
                        }
                    }
                }
            }
            // Forward anything the engine emitted before the loop ended.
            while let Ok(event) = engine_rx.try_recv() {
                let _ = shared_tx.send(event);
            }
        });

        self.recognizer = Some(info);
        self.engine = Some(engine);
        self.cancel_tx = Some(cancel_tx);
        self.task = Some(handle);
        Ok(input_tx)
    }

    /// Signal the recognition task to stop. No-op if it is not running.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(true);
        }
    }

    /// Wait for the recognition task to finish.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.task.take() {
            if let Err(e) = handle.await {
                tracing::warn!("recognition task ended abnormally: {e}");
            }
        }
    }

    /// Release the engine.
    pub async fn release(&mut self) {
        if let Some(engine) = self.engine.take() {
            if let Err(e) = engine.shutdown().await {
                tracing::warn!(engine = engine.name(), "engine shutdown failed: {e}");
            }
        }
    }

    /// Cancel, stop, then release. Safe to call before `start` and more than once.
    pub async fn shutdown(&mut self) {
        self.cancel();
        self.stop().await;
        self.release().await;
    }
}

impl Default for SpeechStreamAdapter {
    fn default() -> Self {
        Self::new()
    }
}
