use crate::command_loop::{CommandLoop, LoopExit};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use voicedrone_command::PresentationSink;
use voicedrone_core::config::AudioConfig;
use voicedrone_core::{
    AppConfig, HandPosition, SessionError, SharedCell, SpeechEvent, SpeechInput, SurfaceSize,
};
use voicedrone_sensor::{SensorRegistry, SkeletonSensor, SkeletonTracker};
use voicedrone_speech::{Grammars, RecognizerRegistry, RecognizerRequirements, SpeechStreamAdapter};

/// One run of the application: a started sensor, running speech
/// recognition and the command loop joining them.
pub struct Session {
    sensor: Option<Box<dyn SkeletonSensor>>,
    speech: SpeechStreamAdapter,
    speech_input: Option<mpsc::UnboundedSender<SpeechInput>>,
    loop_cancel: Option<watch::Sender<bool>>,
    loop_task: Option<tokio::task::JoinHandle<LoopExit>>,
    exit: Option<LoopExit>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            sensor: None,
            speech: SpeechStreamAdapter::new(),
            speech_input: None,
            loop_cancel: None,
            loop_task: None,
            exit: None,
        }
    }

    pub async fn start(
        &mut self,
        config: &AppConfig,
        sensors: &SensorRegistry,
        recognizers: &RecognizerRegistry,
        sink: Arc<dyn PresentationSink>,
        hand: SharedCell<HandPosition>,
        surface: SharedCell<SurfaceSize>,
    ) -> Result<(), SessionError> {
        if self.sensor.is_some() || self.loop_task.is_some() {
            return Err(SessionError::AlreadyStarted);
        }

        let mut sensor = sensors.create(&config.sensor)?;
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        sensor.set_frame_sender(frame_tx);
        sensor.enable_skeleton_stream(config.sensor.smoothing);
        sensor.start().await?;
        tracing::info!(sensor = sensor.name(), selection = ?config.sensor.selection, "skeleton stream enabled");

        let tracker = SkeletonTracker::new(
            sensor.projection(),
            config.sensor.selection,
            hand.clone(),
            surface,
        );
        self.sensor = Some(sensor);

        let speech_rx = match self.start_speech(config, recognizers).await {
            Ok(rx) => rx,
            Err(e) => {
                self.teardown().await;
                return Err(e);
            }
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let command_loop = CommandLoop::new(tracker, hand, sink);
        self.loop_task = Some(tokio::spawn(command_loop.run(frame_rx, speech_rx, cancel_rx)));
        self.loop_cancel = Some(cancel_tx);
        Ok(())
    }

    async fn start_speech(
        &mut self,
        config: &AppConfig,
        recognizers: &RecognizerRegistry,
    ) -> Result<mpsc::UnboundedReceiver<SpeechEvent>, SessionError> {
        let grammars = Grammars::standard(&config.speech.culture)?;
        let requirements = RecognizerRequirements::from_config(&config.speech);
        let input = self
            .speech
            .start(recognizers, &requirements, &config.speech, &grammars)
            .await?;
        self.speech_input = Some(input);
        self.speech
            .take_event_receiver()
            .ok_or(SessionError::AlreadyStarted)
    }

    /// Sender for audio chunks and typed utterances, once started.
    pub fn speech_input(&self) -> Option<mpsc::UnboundedSender<SpeechInput>> {
        self.speech_input.clone()
    }

    /// Whether microphone capture should be opened for `audio`. Warns when
    /// capture is enabled but the running recognizer cannot use audio.
    pub fn wants_microphone(&self, audio: &AudioConfig) -> bool {
        if !audio.enabled {
            return false;
        }
        if !self.speech.accepts_audio() {
            let recognizer = self
                .speech
                .recognizer()
                .map(|r| r.id.as_str())
                .unwrap_or("none");
            tracing::warn!(
                recognizer,
                "audio capture enabled but the recognizer does not consume audio; microphone not opened"
            );
            return false;
        }
        true
    }

    /// Wait for the command loop to end on its own. Returns immediately with
    /// the recorded exit if it already ended.
    pub async fn wait(&mut self) -> Option<LoopExit> {
        if let Some(handle) = self.loop_task.as_mut() {
            match handle.await {
                Ok(exit) => self.exit = Some(exit),
                Err(e) => tracing::warn!("command loop ended abnormally: {e}"),
            }
            self.loop_task = None;
        }
        self.exit
    }

    /// Release everything in order. Safe to call at any point and more than once.
    pub async fn teardown(&mut self) {
        if let Some(sensor) = self.sensor.as_ref() {
            sensor.disable_skeleton_stream();
        }

        self.speech_input = None;
        self.speech.cancel();
        self.speech.stop().await;
        self.speech.release().await;

        if let Some(sensor) = self.sensor.take() {
            sensor.stop().await;
            tracing::debug!(sensor = sensor.name(), "sensor stopped");
        }

        if let Some(tx) = self.loop_cancel.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.loop_task.take() {
            match handle.await {
                Ok(exit) => self.exit = Some(exit),
                Err(e) => tracing::warn!("command loop ended abnormally: {e}"),
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
