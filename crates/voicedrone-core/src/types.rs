use std::collections::HashMap;

// ── Screen space ──────────────────────────────────────────────

/// Last known screen-space position of the tracked hand.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandPosition {
    pub x: f64,
    pub y: f64,
}

/// Current size of the rendering surface markers are placed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

// ── Sensor space ──────────────────────────────────────────────

/// A point in skeleton space, in metres, relative to the sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkeletonPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A point on the depth image plane, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthResolution {
    pub width: f64,
    pub height: f64,
}

impl DepthResolution {
    pub const R640X480: DepthResolution = DepthResolution {
        width: 640.0,
        height: 480.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    #[default]
    NotTracked,
    PositionOnly,
    Tracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    HipCenter,
    Spine,
    ShoulderCenter,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub tracking_id: u32,
    pub tracking_state: TrackingState,
    /// Centre of mass; the only populated field for `PositionOnly` skeletons.
    pub position: SkeletonPoint,
    pub joints: HashMap<JointType, SkeletonPoint>,
}

impl Skeleton {
    pub fn joint(&self, joint: JointType) -> Option<SkeletonPoint> {
        self.joints.get(&joint).copied()
    }

    pub fn is_tracked(&self) -> bool {
        self.tracking_state == TrackingState::Tracked
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonFrame {
    pub timestamp_ms: u64,
    pub skeletons: Vec<Skeleton>,
}

/// A frame-ready notification. `None` means the sensor signalled a frame that
/// was no longer available by the time it was opened.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReady(pub Option<SkeletonFrame>);

// ── Audio / speech ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl AudioFormat {
    pub const PCM_16K_MONO: AudioFormat = AudioFormat {
        sample_rate: 16000,
        bits_per_sample: 16,
        channels: 1,
    };

    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn average_bytes_per_second(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
    pub format: AudioFormat,
}

/// Input fed to a recognition engine.
#[derive(Debug, Clone)]
pub enum SpeechInput {
    Audio(AudioChunk),
    /// A complete typed utterance, for engines that judge text directly.
    Transcript(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub words: Vec<String>,
    pub confidence: f32,
}

impl RecognitionResult {
    pub fn new<I, S>(words: I, confidence: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            confidence,
        }
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(|s| s.as_str())
    }

    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Hypothesized { text: String },
    Rejected { text: String, confidence: f32 },
    Recognized(RecognitionResult),
}

// ── Presentation ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Cyan,
    Yellow,
    Magenta,
    Blue,
    Green,
    Red,
}

impl MarkerColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            MarkerColor::Cyan => (0x00, 0xFF, 0xFF),
            MarkerColor::Yellow => (0xFF, 0xFF, 0x00),
            MarkerColor::Magenta => (0xFF, 0x00, 0xFF),
            MarkerColor::Blue => (0x00, 0x00, 0xFF),
            MarkerColor::Green => (0x00, 0x80, 0x00),
            MarkerColor::Red => (0xFF, 0x00, 0x00),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerShape {
    Ellipse { width: f64, height: f64 },
}

impl MarkerShape {
    pub const DEFAULT: MarkerShape = MarkerShape::Ellipse {
        width: 150.0,
        height: 150.0,
    };
}

/// A coloured shape spawned at the hand position. `position` is the
/// top-left corner of the shape's bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: HandPosition,
    pub color: MarkerColor,
    pub shape: MarkerShape,
}

impl Marker {
    pub fn new(position: HandPosition, color: MarkerColor) -> Self {
        Self {
            position,
            color,
            shape: MarkerShape::DEFAULT,
        }
    }
}

/// Live recognition feedback for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feedback {
    pub text: String,
    pub confidence: Option<f64>,
}
