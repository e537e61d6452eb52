pub mod colors;
pub mod interpreter;
pub mod sink;

pub use colors::ColorDirectionMap;
pub use interpreter::{round_confidence, Command, CommandInterpreter, Interpretation};
pub use sink::{LogSink, PresentationEffect, PresentationSink, RecordingSink};
