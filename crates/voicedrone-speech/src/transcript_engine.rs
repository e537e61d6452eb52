//! A recognizer for typed utterances.
//!
//! Each transcript is one utterance. Its words are judged against the loaded
//! grammars the way an acoustic recognizer would judge a phrase: every
//! growing prefix still inside a grammar is reported as a hypothesis, then the
//! whole utterance is either recognized or rejected.

use crate::engine_trait::RecognitionEngine;
use crate::grammar::{Grammar, GrammarMatch};
use crate::registry::RecognizerInfo;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use voicedrone_core::{AudioFormat, RecognitionResult, SpeechError, SpeechEvent, SpeechInput};

pub struct TranscriptEngine {
    culture: String,
    confidence: f32,
    grammars: Vec<Arc<Grammar>>,
    format: Option<AudioFormat>,
    event_sender: Mutex<Option<mpsc::UnboundedSender<SpeechEvent>>>,
}

impl TranscriptEngine {
    /// `confidence` is reported on every recognized utterance.
    pub fn new(info: &RecognizerInfo, confidence: f32) -> Self {
        Self {
            culture: info.culture.clone(),
            confidence: confidence.clamp(0.0, 1.0),
            grammars: Vec::new(),
            format: None,
            event_sender: Mutex::new(None),
        }
    }

    pub fn input_format(&self) -> Option<AudioFormat> {
        self.format
    }

    /// Judge one utterance, returning the events it produces in order.
    pub fn judge(&self, transcript: &str) -> Vec<SpeechEvent> {
        let words: Vec<&str> = transcript.split_whitespace().collect();
        let mut events = Vec::new();
        if words.is_empty() {
            return events;
        }

        for len in 1..=words.len() {
            let prefix = &words[..len];
            if self.grammars.iter().any(|g| g.accepts_prefix(prefix)) {
                events.push(SpeechEvent::Hypothesized {
                    text: prefix.join(" ").to_lowercase(),
                });
            } else {
                break;
            }
        }

        let mut best = 0.0f32;
        for grammar in &self.grammars {
            match grammar.match_words(&words) {
                GrammarMatch::Complete(canonical) => {
                    events.push(SpeechEvent::Recognized(RecognitionResult::new(
                        canonical,
                        self.confidence,
                    )));
                    return events;
                }
                GrammarMatch::Partial { matched, expected } => {
                    // Overlong input counts against the score.
                    let denominator = expected.max(words.len()).max(1);
                    best = best.max(matched as f32 / denominator as f32);
                }
            }
        }

        events.push(SpeechEvent::Rejected {
            text: words.join(" ").to_lowercase(),
            confidence: best,
        });
        events
    }

    fn emit(&self, event: SpeechEvent) {
        if let Ok(sender) = self.event_sender.lock() {
            if let Some(tx) = sender.as_ref() {
                let _ = tx.send(event);
            }
        }
    }
}

#[async_trait]
impl RecognitionEngine for TranscriptEngine {
    fn name(&self) -> &str {
        "transcript"
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
        tracing::debug!(grammar = grammar.name(), "grammar loaded");
        self.grammars.push(grammar);
        Ok(())
    }

    fn set_input_format(&mut self, format: AudioFormat) -> Result<(), SpeechError> {
        if format != AudioFormat::PCM_16K_MONO {
            return Err(SpeechError::InitializationFailed(format!(
                "unsupported input format {:?}",
                format
            )));
        }
        self.format = Some(format);
        Ok(())
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<SpeechEvent>) {
        if let Ok(mut slot) = self.event_sender.lock() {
            *slot = Some(sender);
        }
    }

    async fn feed(&self, input: SpeechInput) -> Result<(), SpeechError> {
        match input {
            SpeechInput::Audio(chunk) => {
                tracing::trace!(samples = chunk.samples.len(), "audio ignored by transcript engine");
                Ok(())
            }
            SpeechInput::Transcript(text) => {
                if self.grammars.is_empty() {
                    return Err(SpeechError::ProcessingFailed(
                        "no grammar loaded".to_string(),
                    ));
                }
                for event in self.judge(&text) {
                    self.emit(event);
                }
                Ok(())
            }
        }
    }

    async fn shutdown(&self) -> Result<(), SpeechError> {
        if let Ok(mut slot) = self.event_sender.lock() {
            slot.take();
        }
        Ok(())
    }
}
