//! Declarative recognition grammars.
//!
//! A [`Grammar`] is an ordered list of slots. Each slot is a finite set of
//! alternative words, a wildcard that accepts exactly one free word, or a
//! literal phrase. Grammars are built once with [`GrammarBuilder`] and never
//! change afterwards; engines share them through `Arc`.

use std::sync::Arc;
use voicedrone_core::vocabulary::{ACTION_VERBS, CONFIRMATION_PHRASE, DIRECTIONS, QUIT_PHRASE};
use voicedrone_core::SpeechError;

#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Choice(Vec<String>),
    Wildcard,
    Literal(Vec<String>),
}

impl Slot {
    fn word_count(&self) -> usize {
        match self {
            Slot::Choice(_) | Slot::Wildcard => 1,
            Slot::Literal(words) => words.len(),
        }
    }
}

/// Result of matching a word sequence against a grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarMatch {
    /// Every slot matched. Holds the words in the grammar's spelling.
    Complete(Vec<String>),
    /// The first `matched` of `expected` words matched.
    Partial { matched: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    name: String,
    culture: String,
    slots: Vec<Slot>,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn culture(&self) -> &str {
        &self.culture
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of words in every sentence this grammar accepts.
    pub fn word_count(&self) -> usize {
        self.slots.iter().map(Slot::word_count).sum()
    }

    /// The expected word at each position; `None` marks a wildcard.
    fn positions(&self) -> Vec<Option<&[String]>> {
        let mut out = Vec::with_capacity(self.word_count());
        for slot in &self.slots {
            match slot {
                Slot::Choice(choices) => out.push(Some(choices.as_slice())),
                Slot::Wildcard => out.push(None),
                Slot::Literal(words) => {
                    out.extend(words.iter().map(|w| Some(std::slice::from_ref(w))))
                }
            }
        }
        out
    }

    pub fn match_words(&self, words: &[&str]) -> GrammarMatch {
        let expected = self.word_count();
        let mut canonical = Vec::with_capacity(words.len());

        for (word, position) in words.iter().zip(self.positions()) {
            match position {
                None => canonical.push(word.to_lowercase()),
                Some(options) => match options.iter().find(|o| o.eq_ignore_ascii_case(word)) {
                    Some(o) => canonical.push(o.clone()),
                    None => break,
                },
            }
        }

        let matched = canonical.len();
        if matched == expected && words.len() == expected {
            GrammarMatch::Complete(canonical)
        } else {
            GrammarMatch::Partial { matched, expected }
        }
    }

    /// True if `words` could still grow into a sentence of this grammar.
    pub fn accepts_prefix(&self, words: &[&str]) -> bool {
        match self.match_words(words) {
            GrammarMatch::Complete(_) => true,
            GrammarMatch::Partial { matched, .. } => matched == words.len(),
        }
    }
}

/// Builds a [`Grammar`] slot by slot.
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    name: String,
    culture: String,
    slots: Vec<Slot>,
}

impl GrammarBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            culture: String::new(),
            slots: Vec::new(),
        }
    }

    pub fn culture(mut self, culture: &str) -> Self {
        self.culture = culture.to_string();
        self
    }

    pub fn append_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots
            .push(Slot::Choice(choices.into_iter().map(Into::into).collect()));
        self
    }

    pub fn append_wildcard(mut self) -> Self {
        self.slots.push(Slot::Wildcard);
        self
    }

    pub fn append_phrase(mut self, phrase: &str) -> Self {
        self.slots.push(Slot::Literal(
            phrase.split_whitespace().map(str::to_string).collect(),
        ));
        self
    }

    pub fn build(self) -> Result<Grammar, SpeechError> {
        if self.slots.is_empty() {
            return Err(SpeechError::InvalidGrammar(format!(
                "grammar '{}' has no slots",
                self.name
            )));
        }
        if self.culture.is_empty() {
            return Err(SpeechError::InvalidGrammar(format!(
                "grammar '{}' has no culture",
                self.name
            )));
        }
        for slot in &self.slots {
            match slot {
                Slot::Choice(choices) if choices.is_empty() => {
                    return Err(SpeechError::InvalidGrammar(format!(
                        "grammar '{}' has an empty choice set",
                        self.name
                    )));
                }
                Slot::Choice(choices) if choices.iter().any(|c| c.split_whitespace().count() != 1) => {
                    return Err(SpeechError::InvalidGrammar(format!(
                        "grammar '{}' choices must be single words",
                        self.name
                    )));
                }
                Slot::Literal(words) if words.is_empty() => {
                    return Err(SpeechError::InvalidGrammar(format!(
                        "grammar '{}' has an empty phrase",
                        self.name
                    )));
                }
                _ => {}
            }
        }
        Ok(Grammar {
            name: self.name,
            culture: self.culture,
            slots: self.slots,
        })
    }
}

/// The two grammars loaded for a session.
#[derive(Debug, Clone)]
pub struct Grammars {
    pub command: Arc<Grammar>,
    pub quit: Arc<Grammar>,
}

impl Grammars {
    /// `{move|go} <any word> {front|left|right|back|up|down} roger that`
    /// and `quit application`, compiled for `culture`.
    pub fn standard(culture: &str) -> Result<Self, SpeechError> {
        // The wildcard holds the place of a shape word.
        let command = GrammarBuilder::new("command")
            .culture(culture)
            .append_choices(ACTION_VERBS)
            .append_wildcard()
            .append_choices(DIRECTIONS)
            .append_phrase(CONFIRMATION_PHRASE)
            .build()?;

        let quit = GrammarBuilder::new("quit")
            .culture(culture)
            .append_phrase(QUIT_PHRASE)
            .build()?;

        Ok(Self {
            command: Arc::new(command),
            quit: Arc::new(quit),
        })
    }

    pub fn all(&self) -> [Arc<Grammar>; 2] {
        [Arc::clone(&self.command), Arc::clone(&self.quit)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Grammars {
        Grammars::standard("en-US").unwrap()
    }

    #[test]
    fn test_command_grammar_shape() {
        let g = standard();
        assert_eq!(g.command.name(), "command");
        assert_eq!(g.command.culture(), "en-US");
        assert_eq!(g.command.slots().len(), 4);
        assert_eq!(g.command.slots()[1], Slot::Wildcard);
        assert_eq!(g.command.word_count(), 5);
        assert_eq!(g.quit.word_count(), 2);
    }

    #[test]
    fn test_command_grammar_accepts_full_command() {
        let g = standard();
        let m = g
            .command
            .match_words(&["move", "banana", "left", "roger", "that"]);
        assert_eq!(
            m,
            GrammarMatch::Complete(vec![
                "move".into(),
                "banana".into(),
                "left".into(),
                "roger".into(),
                "that".into()
            ])
        );
    }

    #[test]
    fn test_matching_is_case_insensitive_and_canonicalizes() {
        let g = standard();
        let m = g.command.match_words(&["GO", "Circle", "Up", "Roger", "THAT"]);
        assert_eq!(
            m,
            GrammarMatch::Complete(vec![
                "go".into(),
                "circle".into(),
                "up".into(),
                "roger".into(),
                "that".into()
            ])
        );
    }

    #[test]
    fn test_unknown_direction_is_partial() {
        let g = standard();
        let m = g
            .command
            .match_words(&["move", "x", "purple", "roger", "that"]);
        assert_eq!(
            m,
            GrammarMatch::Partial {
                matched: 2,
                expected: 5
            }
        );
    }

    #[test]
    fn test_missing_confirmation_is_partial() {
        let g = standard();
        let m = g.command.match_words(&["move", "x", "left"]);
        assert_eq!(
            m,
            GrammarMatch::Partial {
                matched: 3,
                expected: 5
            }
        );
        assert!(g.command.accepts_prefix(&["move", "x", "left"]));
    }

    #[test]
    fn test_extra_words_are_not_complete() {
        let g = standard();
        let m = g.quit.match_words(&["quit", "application", "now"]);
        assert_eq!(
            m,
            GrammarMatch::Partial {
                matched: 2,
                expected: 2
            }
        );
        assert!(!g.quit.accepts_prefix(&["quit", "application", "now"]));
    }

    #[test]
    fn test_quit_grammar() {
        let g = standard();
        assert_eq!(
            g.quit.match_words(&["quit", "application"]),
            GrammarMatch::Complete(vec!["quit".into(), "application".into()])
        );
        assert!(!g.quit.accepts_prefix(&["move"]));
    }

    #[test]
    fn test_build_rejects_empty_grammar() {
        let result = GrammarBuilder::new("empty").culture("en-US").build();
        assert!(matches!(result, Err(SpeechError::InvalidGrammar(_))));
    }

    #[test]
    fn test_build_rejects_empty_choices() {
        let result = GrammarBuilder::new("bad")
            .culture("en-US")
            .append_choices(Vec::<String>::new())
            .build();
        assert!(matches!(result, Err(SpeechError::InvalidGrammar(_))));
    }

    #[test]
    fn test_build_rejects_multi_word_choice() {
        let result = GrammarBuilder::new("bad")
            .culture("en-US")
            .append_choices(["over there"])
            .build();
        assert!(matches!(result, Err(SpeechError::InvalidGrammar(_))));
    }

    #[test]
    fn test_build_requires_culture() {
        let result = GrammarBuilder::new("bad").append_phrase("hello").build();
        assert!(matches!(result, Err(SpeechError::InvalidGrammar(_))));
    }
}
