pub mod adapter;
pub mod engine_trait;
pub mod grammar;
pub mod null_engine;
pub mod registry;
pub mod transcript_engine;

pub use adapter::SpeechStreamAdapter;
pub use engine_trait::RecognitionEngine;
pub use grammar::{Grammar, GrammarBuilder, GrammarMatch, Grammars, Slot};
pub use null_engine::NullEngine;
pub use registry::{RecognizerInfo, RecognizerRegistry, RecognizerRequirements};
pub use transcript_engine::TranscriptEngine;
