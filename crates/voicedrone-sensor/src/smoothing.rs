use std::collections::HashMap;
use voicedrone_core::{JointType, SkeletonFrame, SkeletonPoint, SmoothingParameters};

#[derive(Debug, Clone, Copy, Default)]
struct FilterState {
    raw: SkeletonPoint,
    filtered: SkeletonPoint,
    trend: SkeletonPoint,
    frame_count: u32,
}

/// Holt double-exponential filter over skeleton joints, with jitter
/// suppression and a bound on how far the output may drift from the raw
/// measurement.
///
/// History is kept per tracked skeleton and joint.
#[derive(Debug, Clone)]
pub struct JointFilter {
    params: SmoothingParameters,
    history: HashMap<(u32, JointType), FilterState>,
}

impl JointFilter {
    pub fn new(params: SmoothingParameters) -> Self {
        Self {
            params,
            history: HashMap::new(),
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Forget every joint of one skeleton.
    pub fn reset_skeleton(&mut self, tracking_id: u32) {
        self.history.retain(|(id, _), _| *id != tracking_id);
    }

    pub fn tracked_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.history.keys().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Smooth every joint of every tracked skeleton in place. Skeletons that
    /// are no longer tracked lose their history.
    pub fn smooth_frame(&mut self, frame: &mut SkeletonFrame) {
        let tracked: Vec<u32> = frame
            .skeletons
            .iter()
            .filter(|s| s.is_tracked())
            .map(|s| s.tracking_id)
            .collect();
        for id in self.tracked_ids() {
            if !tracked.contains(&id) {
                tracing::trace!(tracking_id = id, "skeleton lost, smoothing history dropped");
                self.reset_skeleton(id);
            }
        }

        for skeleton in frame.skeletons.iter_mut().filter(|s| s.is_tracked()) {
            let id = skeleton.tracking_id;
            for (joint, point) in skeleton.joints.iter_mut() {
                *point = self.update(id, *joint, *point);
            }
        }
    }

    pub fn update(
        &mut self,
        tracking_id: u32,
        joint: JointType,
        raw: SkeletonPoint,
    ) -> SkeletonPoint {
        let p = self.params;
        let key = (tracking_id, joint);
        let prev = self.history.get(&key).copied().unwrap_or_default();

        let (filtered, trend) = match prev.frame_count {
            0 => (raw, SkeletonPoint::default()),
            1 => {
                let filtered = scale(add(raw, prev.raw), 0.5);
                let diff = sub(filtered, prev.filtered);
                let trend = lerp(prev.trend, diff, p.correction);
                (filtered, trend)
            }
            _ => {
                let mut input = raw;
                let jitter = length(sub(raw, prev.filtered));
                if p.jitter_radius > 0.0 && jitter <= p.jitter_radius {
                    input = lerp(prev.filtered, raw, jitter / p.jitter_radius);
                }
                let filtered = lerp(add(prev.filtered, prev.trend), input, 1.0 - p.smoothing);
                let diff = sub(filtered, prev.filtered);
                let trend = lerp(prev.trend, diff, p.correction);
                (filtered, trend)
            }
        };

        let mut predicted = add(filtered, scale(trend, p.prediction));
        let deviation = length(sub(predicted, raw));
        if deviation > p.max_deviation_radius {
            predicted = lerp(raw, predicted, p.max_deviation_radius / deviation);
        }

        self.history.insert(
            key,
            FilterState {
                raw,
                filtered,
                trend,
                frame_count: prev.frame_count.saturating_add(1),
            },
        );

        predicted
    }
}

fn add(a: SkeletonPoint, b: SkeletonPoint) -> SkeletonPoint {
    SkeletonPoint {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
}

fn sub(a: SkeletonPoint, b: SkeletonPoint) -> SkeletonPoint {
    SkeletonPoint {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
}

fn scale(a: SkeletonPoint, k: f32) -> SkeletonPoint {
    SkeletonPoint {
        x: a.x * k,
        y: a.y * k,
        z: a.z * k,
    }
}

/// `a + (b - a) * t`
fn lerp(a: SkeletonPoint, b: SkeletonPoint, t: f32) -> SkeletonPoint {
    add(a, scale(sub(b, a), t))
}

fn length(a: SkeletonPoint) -> f32 {
    (a.x * a.x + a.y * a.y + a.z * a.z).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicedrone_core::{Skeleton, TrackingState};

    fn pt(x: f32, y: f32, z: f32) -> SkeletonPoint {
        SkeletonPoint { x, y, z }
    }

    #[test]
    fn test_first_sample_passes_through() {
        let mut filter = JointFilter::new(SmoothingParameters::default());
        let out = filter.update(1, JointType::HandRight, pt(0.1, 0.2, 2.0));
        assert_eq!(out, pt(0.1, 0.2, 2.0));
    }

    #[test]
    fn test_constant_input_converges() {
        let mut filter = JointFilter::new(SmoothingParameters::default());
        let target = pt(0.3, -0.1, 1.8);
        let mut out = SkeletonPoint::default();
        for _ in 0..50 {
            out = filter.update(1, JointType::HandRight, target);
        }
        assert!(length(sub(out, target)) < 1e-4, "did not converge: {:?}", out);
    }

    #[test]
    fn test_small_jitter_is_damped() {
        let mut filter = JointFilter::new(SmoothingParameters::default());
        let base = pt(0.0, 0.0, 2.0);
        for _ in 0..10 {
            filter.update(1, JointType::HandRight, base);
        }
        // 1 cm twitch, well inside the 5 cm jitter radius
        let out = filter.update(1, JointType::HandRight, pt(0.01, 0.0, 2.0));
        assert!(out.x < 0.01, "jitter passed through: {:?}", out);
        assert!(out.x >= 0.0);
    }

    #[test]
    fn test_output_stays_within_max_deviation() {
        let params = SmoothingParameters::default();
        let mut filter = JointFilter::new(params);
        for i in 0..30 {
            let raw = pt(i as f32 * 0.1, 0.0, 2.0);
            let out = filter.update(1, JointType::HandRight, raw);
            assert!(
                length(sub(out, raw)) <= params.max_deviation_radius + 1e-5,
                "frame {i}: {:?} too far from {:?}",
                out,
                raw
            );
        }
    }

    #[test]
    fn test_joints_filtered_independently() {
        let mut filter = JointFilter::new(SmoothingParameters::default());
        filter.update(1, JointType::HandRight, pt(1.0, 1.0, 2.0));
        let left = filter.update(1, JointType::HandLeft, pt(-1.0, 1.0, 2.0));
        assert_eq!(left, pt(-1.0, 1.0, 2.0));
    }

    #[test]
    fn test_skeletons_filtered_independently() {
        let mut filter = JointFilter::new(SmoothingParameters::default());
        for _ in 0..5 {
            filter.update(1, JointType::HandRight, pt(1.0, 1.0, 2.0));
        }
        let other = filter.update(2, JointType::HandRight, pt(-1.0, 0.0, 3.0));
        assert_eq!(other, pt(-1.0, 0.0, 3.0));
        assert_eq!(filter.tracked_ids(), vec![1, 2]);
    }

    fn tracked(id: u32, hand: SkeletonPoint) -> Skeleton {
        let mut joints = HashMap::new();
        joints.insert(JointType::HandRight, hand);
        Skeleton {
            tracking_id: id,
            tracking_state: TrackingState::Tracked,
            position: hand,
            joints,
        }
    }

    #[test]
    fn test_smooth_frame_drops_lost_skeletons() {
        let mut filter = JointFilter::new(SmoothingParameters::default());
        let mut both = SkeletonFrame {
            timestamp_ms: 0,
            skeletons: vec![tracked(1, pt(0.0, 0.0, 2.0)), tracked(2, pt(0.5, 0.0, 2.5))],
        };
        filter.smooth_frame(&mut both);
        assert_eq!(filter.tracked_ids(), vec![1, 2]);

        let mut lost = tracked(2, pt(0.5, 0.0, 2.5));
        lost.tracking_state = TrackingState::NotTracked;
        let mut one = SkeletonFrame {
            timestamp_ms: 33,
            skeletons: vec![tracked(1, pt(0.0, 0.0, 2.0)), lost],
        };
        filter.smooth_frame(&mut one);
        assert_eq!(filter.tracked_ids(), vec![1]);

        // A returning user starts from a fresh history.
        let mut back = SkeletonFrame {
            timestamp_ms: 66,
            skeletons: vec![tracked(2, pt(-1.0, 0.0, 2.0))],
        };
        filter.smooth_frame(&mut back);
        assert_eq!(
            back.skeletons[0].joint(JointType::HandRight),
            Some(pt(-1.0, 0.0, 2.0))
        );
        assert_eq!(filter.tracked_ids(), vec![2]);
    }

    #[test]
    fn test_smooth_frame_leaves_untracked_joints_alone() {
        let mut filter = JointFilter::new(SmoothingParameters::default());
        let mut skeleton = tracked(7, pt(0.3, 0.3, 2.0));
        skeleton.tracking_state = TrackingState::PositionOnly;
        let mut frame = SkeletonFrame {
            timestamp_ms: 0,
            skeletons: vec![skeleton],
        };
        filter.smooth_frame(&mut frame);
        assert!(filter.tracked_ids().is_empty());
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut filter = JointFilter::new(SmoothingParameters::default());
        filter.update(1, JointType::HandRight, pt(1.0, 1.0, 2.0));
        filter.update(1, JointType::HandRight, pt(1.0, 1.0, 2.0));
        filter.reset();
        let out = filter.update(1, JointType::HandRight, pt(-2.0, 0.0, 3.0));
        assert_eq!(out, pt(-2.0, 0.0, 3.0));
    }
}
