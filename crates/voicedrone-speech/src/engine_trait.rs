use crate::grammar::Grammar;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use voicedrone_core::{AudioFormat, SpeechError, SpeechEvent, SpeechInput};

/// A speech recognition engine bound to one installed recognizer.
///
/// Engines are configured (`load_grammar`, `set_input_format`,
/// `set_event_sender`) before recognition starts, then fed input until
/// released with [`shutdown`](Self::shutdown).
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    fn name(&self) -> &str;
    /// True if `SpeechInput::Audio` can produce recognition events.
    fn accepts_audio(&self) -> bool;
    fn load_grammar(&mut self, grammar: Arc<Grammar>) -> Result<(), SpeechError>;
    fn set_input_format(&mut self, format: AudioFormat) -> Result<(), SpeechError>;
    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<SpeechEvent>);
    async fn feed(&self, input: SpeechInput) -> Result<(), SpeechError>;
    async fn shutdown(&self) -> Result<(), SpeechError>;
}
