use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyEvent};
use voicedrone_command::PresentationEffect;
use voicedrone_core::{Feedback, HandPosition, Marker, SurfaceSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Surface,
    Logs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    None,
    Quit,
    /// A typed utterance to hand to the recognizer.
    Utterance(String),
}

pub struct App {
    pub tab: Tab,
    pub markers: Vec<Marker>,
    pub hand: HandPosition,
    pub surface: SurfaceSize,
    pub feedback: Feedback,
    pub input: String,
    pub should_quit: bool,
    pub logs: Arc<Mutex<VecDeque<String>>>,
    pub log_scroll: usize,
    pub log_auto_scroll: bool,
}

impl App {
    pub fn new(logs: Arc<Mutex<VecDeque<String>>>) -> Self {
        Self {
            tab: Tab::Surface,
            markers: Vec::new(),
            hand: HandPosition::default(),
            surface: SurfaceSize::default(),
            feedback: Feedback::default(),
            input: String::new(),
            should_quit: false,
            logs,
            log_scroll: 0,
            log_auto_scroll: true,
        }
    }

    /// Apply one effect from the command loop.
    pub fn apply(&mut self, effect: PresentationEffect) {
        match effect {
            PresentationEffect::Marker(marker) => self.markers.push(marker),
            PresentationEffect::Feedback(feedback) => self.feedback = feedback,
            PresentationEffect::Terminate => self.should_quit = true,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return AppAction::Quit;
            }
            KeyCode::Tab => {
                self.tab = match self.tab {
                    Tab::Surface => Tab::Logs,
                    Tab::Logs => Tab::Surface,
                };
                return AppAction::None;
            }
            _ => {}
        }

        match self.tab {
            Tab::Surface => self.handle_surface_key(key),
            Tab::Logs => self.handle_logs_key(key),
        }
    }

    fn handle_surface_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char(c) => {
                self.input.push(c);
                AppAction::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                AppAction::None
            }
            KeyCode::Enter => {
                let utterance = std::mem::take(&mut self.input);
                let utterance = utterance.trim();
                if utterance.is_empty() {
                    AppAction::None
                } else {
                    AppAction::Utterance(utterance.to_string())
                }
            }
            _ => AppAction::None,
        }
    }

    fn handle_logs_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Up => {
                self.log_scroll = self.log_scroll.saturating_add(1);
                self.log_auto_scroll = false;
            }
            KeyCode::Down => {
                self.log_scroll = self.log_scroll.saturating_sub(1);
            }
            KeyCode::End => {
                self.log_scroll = 0;
                self.log_auto_scroll = true;
            }
            _ => {}
        }
        AppAction::None
    }
}
