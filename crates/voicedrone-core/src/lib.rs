pub mod config;
pub mod error;
pub mod shared;
pub mod types;
pub mod vocabulary;

pub use config::{AppConfig, SelectionPolicy, SmoothingParameters};
pub use error::{AudioError, ConfigError, SensorError, SessionError, SpeechError};
pub use shared::SharedCell;
pub use types::{
    AudioChunk, AudioFormat, DepthPoint, DepthResolution, Feedback, FrameReady, HandPosition,
    JointType, Marker, MarkerColor, MarkerShape, RecognitionResult, Skeleton, SkeletonFrame,
    SkeletonPoint, SpeechEvent, SpeechInput, SurfaceSize, TrackingState,
};
