use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use voicedrone_core::{
    DepthPoint, DepthResolution, FrameReady, SensorError, SkeletonPoint, SmoothingParameters,
};

/// Converts skeleton-space points onto the sensor's depth image plane.
pub trait DepthProjection: Send + Sync {
    fn map_skeleton_point_to_depth(
        &self,
        point: SkeletonPoint,
        resolution: DepthResolution,
    ) -> DepthPoint;
}

/// A body-tracking sensor that publishes skeleton frames.
///
/// Frame-ready notifications are pushed onto the sender installed with
/// [`set_frame_sender`](Self::set_frame_sender). Implementations must never
/// block while sending, and must stop sending once
/// [`disable_skeleton_stream`](Self::disable_skeleton_stream) returns.
#[async_trait]
pub trait SkeletonSensor: Send + Sync {
    /// Registry name of the sensor (e.g. `"simulated"`).
    fn name(&self) -> &str;
    fn set_frame_sender(&mut self, sender: mpsc::UnboundedSender<FrameReady>);
    /// Enable skeleton tracking with the given joint smoothing.
    fn enable_skeleton_stream(&mut self, smoothing: SmoothingParameters);
    async fn start(&mut self) -> Result<(), SensorError>;
    /// Stop delivering frames. Safe to call at any time, any number of times.
    fn disable_skeleton_stream(&self);
    /// Release the sensor. Safe to call at any time, any number of times.
    async fn stop(&self);
    fn projection(&self) -> Arc<dyn DepthProjection>;
}
