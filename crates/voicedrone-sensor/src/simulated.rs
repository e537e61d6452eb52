use crate::sensor_trait::{DepthProjection, SkeletonSensor};
use crate::smoothing::JointFilter;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use voicedrone_core::{
    DepthPoint, DepthResolution, FrameReady, JointType, SensorError, Skeleton, SkeletonFrame,
    SkeletonPoint, SmoothingParameters, TrackingState,
};

/// Depth-camera focal length in pixels at 320x240, scaled per resolution.
const FOCAL_LENGTH_320X240: f64 = 285.63;

/// Pinhole projection with the depth camera's nominal intrinsics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinholeProjection;

impl DepthProjection for PinholeProjection {
    fn map_skeleton_point_to_depth(
        &self,
        point: SkeletonPoint,
        resolution: DepthResolution,
    ) -> DepthPoint {
        if point.z <= f32::EPSILON {
            return DepthPoint::default();
        }
        let fx = FOCAL_LENGTH_320X240 * resolution.width / 320.0;
        let fy = FOCAL_LENGTH_320X240 * resolution.height / 240.0;
        let z = point.z as f64;
        DepthPoint {
            x: resolution.width / 2.0 + point.x as f64 * fx / z,
            y: resolution.height / 2.0 - point.y as f64 * fy / z,
        }
    }
}

/// A sensor that reports one tracked user whose right hand traces a circle
/// in front of the camera, plus one position-only bystander.
pub struct SimulatedSensor {
    frame_rate: u32,
    smoothing: Option<SmoothingParameters>,
    frame_sender: Option<mpsc::UnboundedSender<FrameReady>>,
    stream_enabled: Arc<AtomicBool>,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self::with_frame_rate(30)
    }

    pub fn with_frame_rate(frame_rate: u32) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
            smoothing: None,
            frame_sender: None,
            stream_enabled: Arc::new(AtomicBool::new(false)),
            stop_tx: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    pub fn is_stream_enabled(&self) -> bool {
        self.stream_enabled.load(Ordering::Relaxed)
    }

    /// The frame the simulation reports `index` frames after start, before smoothing.
    pub fn frame_at(index: u64, frame_rate: u32) -> SkeletonFrame {
        let t = index as f64 / frame_rate.max(1) as f64;
        let angle = t * std::f64::consts::PI;

        let body = SkeletonPoint {
            x: 0.0,
            y: 0.0,
            z: 2.0,
        };
        let hand = SkeletonPoint {
            x: 0.25 + 0.3 * angle.cos() as f32,
            y: 0.1 + 0.3 * angle.sin() as f32,
            z: 1.7,
        };

        let mut joints = HashMap::new();
        joints.insert(JointType::HipCenter, body);
        joints.insert(
            JointType::Head,
            SkeletonPoint {
                y: 0.6,
                ..body
            },
        );
        joints.insert(JointType::HandRight, hand);
        joints.insert(
            JointType::HandLeft,
            SkeletonPoint {
                x: -0.3,
                y: -0.2,
                z: 1.9,
            },
        );

        SkeletonFrame {
            timestamp_ms: (t * 1000.0) as u64,
            skeletons: vec![
                Skeleton {
                    tracking_id: 1,
                    tracking_state: TrackingState::Tracked,
                    position: body,
                    joints,
                },
                Skeleton {
                    tracking_id: 2,
                    tracking_state: TrackingState::PositionOnly,
                    position: SkeletonPoint {
                        x: 1.2,
                        y: 0.0,
                        z: 3.1,
                    },
                    joints: HashMap::new(),
                },
            ],
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SkeletonSensor for SimulatedSensor {
    fn name(&self) -> &str {
        "simulated"
    }

    fn set_frame_sender(&mut self, sender: mpsc::UnboundedSender<FrameReady>) {
        self.frame_sender = Some(sender);
    }

    fn enable_skeleton_stream(&mut self, smoothing: SmoothingParameters) {
        self.smoothing = Some(smoothing);
        self.stream_enabled.store(true, Ordering::Relaxed);
    }

    async fn start(&mut self) -> Result<(), SensorError> {
        let sender = self
            .frame_sender
            .clone()
            .ok_or_else(|| SensorError::StreamFailed("no frame sender installed".to_string()))?;

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let enabled = Arc::clone(&self.stream_enabled);
        let frame_rate = self.frame_rate;
        let mut filter = self.smoothing.map(JointFilter::new);

        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs_f64(1.0 / frame_rate as f64));
            let mut index = 0u64;
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = stop_rx.changed() => break,
                }
                if !enabled.load(Ordering::Relaxed) {
                    continue;
                }

                let mut frame = SimulatedSensor::frame_at(index, frame_rate);
                index += 1;
                if let Some(filter) = filter.as_mut() {
                    filter.smooth_frame(&mut frame);
                }

                if sender.send(FrameReady(Some(frame))).is_err() {
                    tracing::debug!("frame receiver dropped, stopping simulated sensor");
                    break;
                }
            }
        });

        if let Ok(mut slot) = self.stop_tx.lock() {
            *slot = Some(stop_tx);
        }
        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(handle);
        }
        tracing::info!(frame_rate, "simulated sensor started");
        Ok(())
    }

    fn disable_skeleton_stream(&self) {
        self.stream_enabled.store(false, Ordering::Relaxed);
    }

    async fn stop(&self) {
        let stop_tx = self.stop_tx.lock().ok().and_then(|mut s| s.take());
        if let Some(tx) = stop_tx {
            let _ = tx.send(true);
        }
        let handle = self.task.lock().ok().and_then(|mut t| t.take());
        if let Some(handle) = handle {
            let _ = handle.await;
            tracing::debug!("simulated sensor stopped");
        }
    }

    fn projection(&self) -> Arc<dyn DepthProjection> {
        Arc::new(PinholeProjection)
    }
}
