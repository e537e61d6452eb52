use crate::colors::ColorDirectionMap;
use crate::sink::PresentationSink;
use voicedrone_core::vocabulary::{ACTION_VERBS, QUIT_WORDS};
use voicedrone_core::{HandPosition, Marker, RecognitionResult};

/// Confidence at or above which a quit phrase is ignored.
pub const QUIT_CONFIDENCE_CEILING: f32 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Terminate,
    SpawnMarker(Marker),
}

impl Command {
    pub fn apply(self, sink: &dyn PresentationSink) {
        match self {
            Command::Terminate => sink.terminate(),
            Command::SpawnMarker(marker) => sink.spawn_marker(marker),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    /// Recognition confidence rounded to two decimals.
    pub display_confidence: f64,
    pub command: Option<Command>,
}

pub fn round_confidence(confidence: f32) -> f64 {
    (confidence as f64 * 100.0).round() / 100.0
}

/// Turns a final recognition result into at most one command.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandInterpreter {
    colors: ColorDirectionMap,
}

impl CommandInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interpret(&self, result: &RecognitionResult, hand: HandPosition) -> Interpretation {
        Interpretation {
            display_confidence: round_confidence(result.confidence),
            command: self.command_for(result, hand),
        }
    }

    fn command_for(&self, result: &RecognitionResult, hand: HandPosition) -> Option<Command> {
        let first = result.word(0)?;

        // Only a quit heard below the ceiling terminates; a confident one is ignored.
        if first == QUIT_WORDS[0]
            && result.word(1) == Some(QUIT_WORDS[1])
            && result.confidence < QUIT_CONFIDENCE_CEILING
        {
            return Some(Command::Terminate);
        }

        if ACTION_VERBS.contains(&first) {
            // Index 1 is the free shape word.
            let direction = result.word(2)?;
            let Some(color) = self.colors.color_for(direction) else {
                tracing::debug!(direction, "no colour for direction");
                return None;
            };
            return Some(Command::SpawnMarker(Marker::new(hand, color)));
        }

        None
    }
}
