//! The fixed command vocabulary shared by the grammars and the interpreter.

pub const ACTION_VERBS: [&str; 2] = ["move", "go"];

pub const DIRECTIONS: [&str; 6] = ["front", "left", "right", "back", "up", "down"];

pub const CONFIRMATION_PHRASE: &str = "roger that";

pub const QUIT_PHRASE: &str = "quit application";

pub const QUIT_WORDS: [&str; 2] = ["quit", "application"];
