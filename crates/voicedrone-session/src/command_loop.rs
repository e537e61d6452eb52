use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use voicedrone_command::{round_confidence, Command, CommandInterpreter, PresentationSink};
use voicedrone_core::{Feedback, FrameReady, HandPosition, RecognitionResult, SharedCell, SpeechEvent};
use voicedrone_sensor::SkeletonTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A recognized quit command ended the session.
    Terminated,
    Cancelled,
    /// Both the frame and speech channels closed.
    InputsClosed,
}

/// The single consumer of sensor frames and speech events.
///
/// Frames update the shared hand position; speech events become feedback
/// and commands. Every presentation call is made from this loop.
pub struct CommandLoop {
    tracker: SkeletonTracker,
    interpreter: CommandInterpreter,
    hand: SharedCell<HandPosition>,
    sink: Arc<dyn PresentationSink>,
    displayed: String,
}

impl CommandLoop {
    pub fn new(
        tracker: SkeletonTracker,
        hand: SharedCell<HandPosition>,
        sink: Arc<dyn PresentationSink>,
    ) -> Self {
        Self {
            tracker,
            interpreter: CommandInterpreter::new(),
            hand,
            sink,
            displayed: String::new(),
        }
    }

    pub fn handle_frame(&self, FrameReady(frame): FrameReady) {
        if let Some(position) = self.tracker.on_frame_ready(frame.as_ref()) {
            tracing::trace!(x = position.x, y = position.y, "hand moved");
        }
    }

    /// Returns `true` if the event terminated the session.
    pub fn handle_speech(&mut self, event: SpeechEvent) -> bool {
        match event {
            SpeechEvent::Hypothesized { text } => {
                self.displayed = text.clone();
                self.sink.show_feedback(Feedback {
                    text,
                    confidence: None,
                });
                false
            }
            SpeechEvent::Rejected { text, confidence } => {
                tracing::debug!(%text, confidence, "utterance rejected");
                self.displayed.push_str(" Rejected");
                self.sink.show_feedback(Feedback {
                    text: self.displayed.trim_start().to_string(),
                    confidence: Some(round_confidence(confidence)),
                });
                false
            }
            SpeechEvent::Recognized(result) => self.handle_recognized(result),
        }
    }

    fn handle_recognized(&mut self, result: RecognitionResult) -> bool {
        let hand = self.hand.get();
        let interpretation = self.interpreter.interpret(&result, hand);
        tracing::info!(
            text = %result.text(),
            confidence = interpretation.display_confidence,
            "speech recognized"
        );

        self.displayed = result.text();
        self.sink.show_feedback(Feedback {
            text: self.displayed.clone(),
            confidence: Some(interpretation.display_confidence),
        });

        match interpretation.command {
            Some(Command::Terminate) => {
                Command::Terminate.apply(self.sink.as_ref());
                true
            }
            Some(command) => {
                command.apply(self.sink.as_ref());
                false
            }
            None => false,
        }
    }

    pub async fn run(
        mut self,
        mut frames: mpsc::UnboundedReceiver<FrameReady>,
        mut speech: mpsc::UnboundedReceiver<SpeechEvent>,
        mut cancel: watch::Receiver<bool>,
    ) -> LoopExit {
        let mut frames_open = true;
        let mut speech_open = true;

        let exit = loop {
            if !frames_open && !speech_open {
                break LoopExit::InputsClosed;
            }
            tokio::select! {
                biased;
                _ = cancel.changed() => break LoopExit::Cancelled,
                event = speech.recv(), if speech_open => match event {
                    Some(event) => {
                        if self.handle_speech(event) {
                            break LoopExit::Terminated;
                        }
                    }
                    None => speech_open = false,
                },
                frame = frames.recv(), if frames_open => match frame {
                    Some(frame) => self.handle_frame(frame),
                    None => frames_open = false,
                },
            }
        };

        tracing::debug!(?exit, sink = self.sink.name(), "command loop finished");
        exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;
    use voicedrone_command::RecordingSink;
    use voicedrone_core::{
        JointType, MarkerColor, SelectionPolicy, Skeleton, SkeletonFrame, SkeletonPoint,
        SurfaceSize, TrackingState,
    };
    use voicedrone_sensor::PinholeProjection;

    fn command_loop() -> (CommandLoop, SharedCell<HandPosition>, RecordingSink) {
        let hand = SharedCell::new(HandPosition { x: 5.0, y: 6.0 });
        let surface = SharedCell::new(SurfaceSize {
            width: 640.0,
            height: 480.0,
        });
        let tracker = SkeletonTracker::new(
            Arc::new(PinholeProjection),
            SelectionPolicy::LastTracked,
            hand.clone(),
            surface,
        );
        let sink = RecordingSink::new();
        let cl = CommandLoop::new(tracker, hand.clone(), Arc::new(sink.clone()));
        (cl, hand, sink)
    }

    fn centred_frame() -> FrameReady {
        let mut joints = HashMap::new();
        joints.insert(
            JointType::HandRight,
            SkeletonPoint {
                x: 0.0,
                y: 0.0,
                z: 2.0,
            },
        );
        FrameReady(Some(SkeletonFrame {
            timestamp_ms: 0,
            skeletons: vec![Skeleton {
                tracking_id: 1,
                tracking_state: TrackingState::Tracked,
                position: SkeletonPoint::default(),
                joints,
            }],
        }))
    }

    fn recognized(words: &[&str], confidence: f32) -> SpeechEvent {
        SpeechEvent::Recognized(RecognitionResult::new(words.iter().copied(), confidence))
    }

    #[test]
    fn test_frame_updates_hand() {
        let (cl, hand, _) = command_loop();
        cl.handle_frame(centred_frame());
        assert_eq!(hand.get(), HandPosition { x: 320.0, y: 240.0 });
    }

    #[test]
    fn test_unavailable_frame_keeps_hand() {
        let (cl, hand, _) = command_loop();
        cl.handle_frame(FrameReady(None));
        assert_eq!(hand.get(), HandPosition { x: 5.0, y: 6.0 });
    }

    #[test]
    fn test_hypothesis_then_rejection_feedback() {
        let (mut cl, _, sink) = command_loop();
        assert!(!cl.handle_speech(SpeechEvent::Hypothesized {
            text: "move x".into()
        }));
        assert!(!cl.handle_speech(SpeechEvent::Rejected {
            text: "move x purple".into(),
            confidence: 0.404,
        }));

        let feedback = sink.feedback();
        assert_eq!(feedback[0], Feedback { text: "move x".into(), confidence: None });
        assert_eq!(
            feedback[1],
            Feedback {
                text: "move x Rejected".into(),
                confidence: Some(0.4)
            }
        );
        assert!(sink.markers().is_empty());
    }

    #[test]
    fn test_rejection_without_hypothesis() {
        let (mut cl, _, sink) = command_loop();
        cl.handle_speech(SpeechEvent::Rejected {
            text: "hum".into(),
            confidence: 0.0,
        });
        assert_eq!(sink.feedback()[0].text, "Rejected");
    }

    #[test]
    fn test_recognized_command_uses_current_hand() {
        let (mut cl, _, sink) = command_loop();
        cl.handle_frame(centred_frame());
        assert!(!cl.handle_speech(recognized(&["go", "x", "right", "roger", "that"], 0.876)));

        let markers = sink.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].color, MarkerColor::Magenta);
        assert_eq!(markers[0].position, HandPosition { x: 320.0, y: 240.0 });
        assert_eq!(sink.feedback()[0].confidence, Some(0.88));
    }

    #[test]
    fn test_recognized_quit_terminates() {
        let (mut cl, _, sink) = command_loop();
        assert!(cl.handle_speech(recognized(&["quit", "application"], 0.9)));
        assert!(sink.terminated());
    }

    #[tokio::test]
    async fn test_run_exits_on_terminate() {
        let (cl, _, sink) = command_loop();
        let (_frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (speech_tx, speech_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(cl.run(frame_rx, speech_rx, cancel_rx));

        speech_tx.send(recognized(&["quit", "application"], 0.5)).unwrap();
        let exit = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("timed out")
            .unwrap();
        assert_eq!(exit, LoopExit::Terminated);
        assert!(sink.terminated());
    }

    #[tokio::test]
    async fn test_run_exits_on_cancel() {
        let (cl, _, _) = command_loop();
        let (_frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (_speech_tx, speech_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(cl.run(frame_rx, speech_rx, cancel_rx));

        cancel_tx.send(true).unwrap();
        let exit = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("timed out")
            .unwrap();
        assert_eq!(exit, LoopExit::Cancelled);
    }

    #[tokio::test]
    async fn test_run_exits_when_inputs_close() {
        let (cl, hand, _) = command_loop();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (speech_tx, speech_rx) = mpsc::unbounded_channel::<SpeechEvent>();
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(cl.run(frame_rx, speech_rx, cancel_rx));

        frame_tx.send(centred_frame()).unwrap();
        drop(frame_tx);
        drop(speech_tx);
        let exit = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("timed out")
            .unwrap();
        assert_eq!(exit, LoopExit::InputsClosed);
        assert_eq!(hand.get(), HandPosition { x: 320.0, y: 240.0 });
    }
}
