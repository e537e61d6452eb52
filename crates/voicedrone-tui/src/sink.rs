use tokio::sync::mpsc;
use voicedrone_command::{PresentationEffect, PresentationSink};
use voicedrone_core::{Feedback, Marker};

/// Forwards effects from the command loop to the terminal UI task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PresentationEffect>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresentationEffect>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, effect: PresentationEffect) {
        // The UI may already be gone during shutdown.
        let _ = self.tx.send(effect);
    }
}

impl PresentationSink for ChannelSink {
    fn name(&self) -> &str {
        "tui"
    }

    fn spawn_marker(&self, marker: Marker) {
        self.send(PresentationEffect::Marker(marker));
    }

    fn terminate(&self) {
        self.send(PresentationEffect::Terminate);
    }

    fn show_feedback(&self, feedback: Feedback) {
        self.send(PresentationEffect::Feedback(feedback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicedrone_core::{HandPosition, MarkerColor};

    #[test]
    fn test_channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.show_feedback(Feedback {
            text: "go".into(),
            confidence: None,
        });
        sink.spawn_marker(Marker::new(HandPosition::default(), MarkerColor::Cyan));
        sink.terminate();

        assert!(matches!(rx.try_recv().unwrap(), PresentationEffect::Feedback(_)));
        assert!(matches!(rx.try_recv().unwrap(), PresentationEffect::Marker(_)));
        assert_eq!(rx.try_recv().unwrap(), PresentationEffect::Terminate);
    }

    #[test]
    fn test_channel_sink_survives_closed_ui() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.terminate();
    }
}
