use crate::engine_trait::RecognitionEngine;
use crate::grammar::Grammar;
use crate::registry::RecognizerInfo;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use voicedrone_core::{AudioFormat, SpeechError, SpeechEvent, SpeechInput};

/// Accepts any input and never recognizes anything.
pub struct NullEngine {
    culture: String,
    grammars: Vec<Arc<Grammar>>,
    feed_count: AtomicUsize,
    event_sender: Mutex<Option<mpsc::UnboundedSender<SpeechEvent>>>,
}

impl NullEngine {
    pub fn new(info: &RecognizerInfo) -> Self {
        Self {
            culture: info.culture.clone(),
            grammars: Vec::new(),
            feed_count: AtomicUsize::new(0),
            event_sender: Mutex::new(None),
        }
    }

    pub fn feed_count(&self) -> usize {
        self.feed_count.load(Ordering::Relaxed)
    }

    pub fn grammar_count(&self) -> usize {
        self.grammars.len()
    }
}

#[async_trait]
impl RecognitionEngine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    fn accepts_audio(&self) -> bool {
        false
    }

    fn load_grammar(&mut self, grammar: Arc<Grammar>) -> Result<(), SpeechError> {
        if !grammar.culture().eq_ignore_ascii_case(&self.culture) {
            return Err(SpeechError::InvalidGrammar(format!(
                "grammar '{}' is {}, recognizer is {}",
                grammar.name(),
                grammar.culture(),
                self.culture
            )));
        }
        self.grammars.push(grammar);
        Ok(())
    }

    fn set_input_format(&mut self, format: AudioFormat) -> Result<(), SpeechError> {
        tracing::debug!(?format, "NullEngine input format set");
        Ok(())
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<SpeechEvent>) {
        if let Ok(mut slot) = self.event_sender.lock() {
            *slot = Some(sender);
        }
    }

    async fn feed(&self, input: SpeechInput) -> Result<(), SpeechError> {
        let count = self.feed_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("NullEngine fed input #{count}: {:?}", input_kind(&input));
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SpeechError> {
        if let Ok(mut slot) = self.event_sender.lock() {
            slot.take();
        }
        Ok(())
    }
}

fn input_kind(input: &SpeechInput) -> &'static str {
    match input {
        SpeechInput::Audio(_) => "audio",
        SpeechInput::Transcript(_) => "transcript",
    }
}
