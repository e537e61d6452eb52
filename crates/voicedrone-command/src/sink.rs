use std::sync::{Arc, Mutex};
use voicedrone_core::{Feedback, Marker};

/// The surface commands take effect on.
///
/// All calls come from the single command loop task, in order.
pub trait PresentationSink: Send + Sync {
    fn name(&self) -> &str;
    /// Add `marker` to the surface. The sink owns it from here on.
    fn spawn_marker(&self, marker: Marker);
    /// End the application.
    fn terminate(&self);
    fn show_feedback(&self, feedback: Feedback);
}

/// Logs every effect and renders nothing.
#[derive(Debug, Default)]
pub struct LogSink;

impl PresentationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn spawn_marker(&self, marker: Marker) {
        tracing::info!(
            x = marker.position.x,
            y = marker.position.y,
            color = ?marker.color,
            "marker spawned"
        );
    }

    fn terminate(&self) {
        tracing::info!("terminate requested");
    }

    fn show_feedback(&self, feedback: Feedback) {
        match feedback.confidence {
            Some(confidence) => tracing::info!(text = %feedback.text, confidence, "recognition"),
            None => tracing::debug!(text = %feedback.text, "hypothesis"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEffect {
    Marker(Marker),
    Terminate,
    Feedback(Feedback),
}

/// Records every effect. Clones share one record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    effects: Arc<Mutex<Vec<PresentationEffect>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> Vec<PresentationEffect> {
        self.effects.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                PresentationEffect::Marker(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn feedback(&self) -> Vec<Feedback> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                PresentationEffect::Feedback(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn terminated(&self) -> bool {
        self.effects()
            .iter()
            .any(|e| matches!(e, PresentationEffect::Terminate))
    }

    fn record(&self, effect: PresentationEffect) {
        if let Ok(mut effects) = self.effects.lock() {
            effects.push(effect);
        }
    }
}

impl PresentationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn spawn_marker(&self, marker: Marker) {
        self.record(PresentationEffect::Marker(marker));
    }

    fn terminate(&self) {
        self.record(PresentationEffect::Terminate);
    }

    fn show_feedback(&self, feedback: Feedback) {
        self.record(PresentationEffect::Feedback(feedback));
    }
}
