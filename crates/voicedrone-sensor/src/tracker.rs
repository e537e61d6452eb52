use crate::mapper::map_to_surface;
use crate::sensor_trait::DepthProjection;
use std::sync::Arc;
use voicedrone_core::{
    DepthResolution, HandPosition, JointType, SelectionPolicy, SharedCell, Skeleton,
    SkeletonFrame, SkeletonPoint, SurfaceSize,
};

/// Turns skeleton frames into the shared right-hand screen position.
pub struct SkeletonTracker {
    projection: Arc<dyn DepthProjection>,
    policy: SelectionPolicy,
    hand: SharedCell<HandPosition>,
    surface: SharedCell<SurfaceSize>,
}

impl SkeletonTracker {
    pub fn new(
        projection: Arc<dyn DepthProjection>,
        policy: SelectionPolicy,
        hand: SharedCell<HandPosition>,
        surface: SharedCell<SurfaceSize>,
    ) -> Self {
        Self {
            projection,
            policy,
            hand,
            surface,
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Handle one frame-ready notification. Returns the hand position written,
    /// or `None` if the frame was unavailable or nobody was tracked.
    pub fn on_frame_ready(&self, frame: Option<&SkeletonFrame>) -> Option<HandPosition> {
        let frame = frame?;
        let Some((skeleton, hand)) = self.select(frame) else {
            tracing::trace!(
                skeletons = frame.skeletons.len(),
                "no tracked skeleton with a right hand joint"
            );
            return None;
        };
        tracing::trace!(tracking_id = skeleton.tracking_id, "right hand tracked");

        let depth = self
            .projection
            .map_skeleton_point_to_depth(hand, DepthResolution::R640X480);
        let position = map_to_surface(depth, DepthResolution::R640X480, self.surface.get());
        self.hand.set(position);
        Some(position)
    }

    /// Applies the selection policy to tracked skeletons that carry a right hand.
    fn select<'a>(&self, frame: &'a SkeletonFrame) -> Option<(&'a Skeleton, SkeletonPoint)> {
        let mut candidates = frame
            .skeletons
            .iter()
            .filter(|s| s.is_tracked())
            .filter_map(|s| s.joint(JointType::HandRight).map(|hand| (s, hand)));
        match self.policy {
            SelectionPolicy::LastTracked => candidates.last(),
            SelectionPolicy::FirstTracked => candidates.next(),
            SelectionPolicy::Nearest => {
                candidates.min_by(|a, b| a.0.position.z.total_cmp(&b.0.position.z))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use voicedrone_core::{DepthPoint, TrackingState};

    /// Treats skeleton x/y as depth pixels directly.
    struct IdentityProjection;

    impl DepthProjection for IdentityProjection {
        fn map_skeleton_point_to_depth(
            &self,
            point: SkeletonPoint,
            _resolution: DepthResolution,
        ) -> DepthPoint {
            DepthPoint {
                x: point.x as f64,
                y: point.y as f64,
            }
        }
    }

    fn skeleton(id: u32, state: TrackingState, hand: (f32, f32), z: f32) -> Skeleton {
        let mut joints = HashMap::new();
        joints.insert(
            JointType::HandRight,
            SkeletonPoint {
                x: hand.0,
                y: hand.1,
                z,
            },
        );
        Skeleton {
            tracking_id: id,
            tracking_state: state,
            position: SkeletonPoint { x: 0.0, y: 0.0, z },
            joints,
        }
    }

    fn tracker(policy: SelectionPolicy) -> (SkeletonTracker, SharedCell<HandPosition>) {
        let hand = SharedCell::new(HandPosition { x: -1.0, y: -1.0 });
        let surface = SharedCell::new(SurfaceSize {
            width: 1280.0,
            height: 960.0,
        });
        let t = SkeletonTracker::new(Arc::new(IdentityProjection), policy, hand.clone(), surface);
        (t, hand)
    }

    #[test]
    fn test_missing_frame_leaves_hand_unchanged() {
        let (t, hand) = tracker(SelectionPolicy::LastTracked);
        assert!(t.on_frame_ready(None).is_none());
        assert_eq!(hand.get(), HandPosition { x: -1.0, y: -1.0 });
    }

    #[test]
    fn test_no_tracked_skeleton_leaves_hand_unchanged() {
        let (t, hand) = tracker(SelectionPolicy::LastTracked);
        let frame = SkeletonFrame {
            timestamp_ms: 0,
            skeletons: vec![
                skeleton(1, TrackingState::NotTracked, (10.0, 10.0), 2.0),
                skeleton(2, TrackingState::PositionOnly, (20.0, 20.0), 2.0),
            ],
        };
        assert!(t.on_frame_ready(Some(&frame)).is_none());
        assert_eq!(hand.get(), HandPosition { x: -1.0, y: -1.0 });
    }

    #[test]
    fn test_empty_frame_leaves_hand_unchanged() {
        let (t, hand) = tracker(SelectionPolicy::LastTracked);
        assert!(t.on_frame_ready(Some(&SkeletonFrame::default())).is_none());
        assert_eq!(hand.get(), HandPosition { x: -1.0, y: -1.0 });
    }

    #[test]
    fn test_tracked_skeleton_maps_right_hand() {
        let (t, hand) = tracker(SelectionPolicy::LastTracked);
        let frame = SkeletonFrame {
            timestamp_ms: 0,
            skeletons: vec![skeleton(1, TrackingState::Tracked, (320.0, 120.0), 2.0)],
        };
        let written = t.on_frame_ready(Some(&frame)).unwrap();
        assert_eq!(written, HandPosition { x: 640.0, y: 240.0 });
        assert_eq!(hand.get(), written);
    }

    fn two_tracked() -> SkeletonFrame {
        SkeletonFrame {
            timestamp_ms: 0,
            skeletons: vec![
                skeleton(1, TrackingState::Tracked, (64.0, 48.0), 1.5),
                skeleton(2, TrackingState::NotTracked, (0.0, 0.0), 0.5),
                skeleton(3, TrackingState::Tracked, (128.0, 96.0), 3.0),
            ],
        }
    }

    #[test]
    fn test_last_tracked_wins_by_default() {
        let (t, hand) = tracker(SelectionPolicy::default());
        t.on_frame_ready(Some(&two_tracked()));
        assert_eq!(hand.get(), HandPosition { x: 256.0, y: 192.0 });
    }

    #[test]
    fn test_first_tracked_policy() {
        let (t, hand) = tracker(SelectionPolicy::FirstTracked);
        t.on_frame_ready(Some(&two_tracked()));
        assert_eq!(hand.get(), HandPosition { x: 128.0, y: 96.0 });
    }

    #[test]
    fn test_nearest_policy_ignores_untracked() {
        let (t, hand) = tracker(SelectionPolicy::Nearest);
        t.on_frame_ready(Some(&two_tracked()));
        assert_eq!(hand.get(), HandPosition { x: 128.0, y: 96.0 });
    }

    #[test]
    fn test_tracked_skeleton_without_hand_is_skipped() {
        let mut handless = skeleton(2, TrackingState::Tracked, (0.0, 0.0), 1.0);
        handless.joints.clear();
        let frame = SkeletonFrame {
            timestamp_ms: 0,
            skeletons: vec![
                skeleton(1, TrackingState::Tracked, (64.0, 48.0), 2.0),
                handless,
            ],
        };
        for policy in [
            SelectionPolicy::LastTracked,
            SelectionPolicy::FirstTracked,
            SelectionPolicy::Nearest,
        ] {
            let (t, hand) = tracker(policy);
            let written = t.on_frame_ready(Some(&frame));
            assert_eq!(written, Some(HandPosition { x: 128.0, y: 96.0 }), "{policy:?}");
            assert_eq!(hand.get(), HandPosition { x: 128.0, y: 96.0 });
        }
    }

    #[test]
    fn test_surface_resize_applies_on_next_frame() {
        let hand = SharedCell::new(HandPosition::default());
        let surface = SharedCell::new(SurfaceSize {
            width: 640.0,
            height: 480.0,
        });
        let t = SkeletonTracker::new(
            Arc::new(IdentityProjection),
            SelectionPolicy::LastTracked,
            hand.clone(),
            surface.clone(),
        );
        let frame = SkeletonFrame {
            timestamp_ms: 0,
            skeletons: vec![skeleton(1, TrackingState::Tracked, (100.0, 100.0), 2.0)],
        };
        t.on_frame_ready(Some(&frame));
        assert_eq!(hand.get(), HandPosition { x: 100.0, y: 100.0 });

        surface.set(SurfaceSize {
            width: 320.0,
            height: 240.0,
        });
        t.on_frame_ready(Some(&frame));
        assert_eq!(hand.get(), HandPosition { x: 50.0, y: 50.0 });
    }
}
