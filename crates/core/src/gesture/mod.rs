//! Per-frame gesture detection pipeline
//!
//! Combines the static classifier with the wave detector:
//!
//! 1. Classify the raw pose into a base label (native units)
//! 2. Append the normalized wrist x to the rolling history
//! 3. Upgrade `Open` to `Wave` when the history contains a wave
//! 4. Extract a normalized target position from the palm center
//!
//! The pipeline owns the wrist history exclusively. When no hand is
//! present the history is cleared and the label falls back to `Idle`.

pub mod classifier;
pub mod wave;

pub use classifier::{average_fingertip_distance, classify, classify_distances, pinch_distance};
pub use wave::{count_reversals, detect_wave, WaveDetector, WristSample};

use crate::core_types::{GestureLabel, HandPose, Landmark, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coordinate convention of the upstream pose producer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// Coordinates already in `[0, 1]` relative to the camera frame
    #[default]
    Normalized,
    /// Coordinates in pixels of a frame with the given size
    Pixels { width: f32, height: f32 },
}

impl CoordinateSpace {
    /// Map a native landmark to `[0, 1]` frame coordinates (x, y only)
    pub fn normalize(&self, point: &Landmark) -> Vec2 {
        let raw = match *self {
            Self::Normalized => Vec2::new(point.x, point.y),
            Self::Pixels { width, height } => Vec2::new(
                point.x / width.max(f32::EPSILON),
                point.y / height.max(f32::EPSILON),
            ),
        };
        Vec2::new(raw.x.clamp(0.0, 1.0), raw.y.clamp(0.0, 1.0))
    }
}

/// Result of running the pipeline on one pose snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureReading {
    /// Final label after the wave upgrade
    pub label: GestureLabel,
    /// Label from the static classifier alone
    pub base_label: GestureLabel,
    /// Normalized target in `[0, 1]`, mirrored for a selfie view.
    /// `None` when no complete hand was seen.
    pub target: Option<Vec2>,
}

impl GestureReading {
    /// Reading for a frame with no hand
    pub const fn absent() -> Self {
        Self {
            label: GestureLabel::Idle,
            base_label: GestureLabel::Idle,
            target: None,
        }
    }
}

/// Stateful detection pipeline over a stream of pose snapshots
#[derive(Debug, Clone)]
pub struct GesturePipeline {
    space: CoordinateSpace,
    mirror_x: bool,
    wave: WaveDetector,
    last_label: GestureLabel,
}

impl Default for GesturePipeline {
    fn default() -> Self {
        Self::new(CoordinateSpace::default())
    }
}

impl GesturePipeline {
    pub fn new(space: CoordinateSpace) -> Self {
        Self {
            space,
            mirror_x: true,
            wave: WaveDetector::new(),
            last_label: GestureLabel::Idle,
        }
    }

    /// Disable horizontal mirroring of the target (rear-facing cameras)
    pub fn without_mirror(mut self) -> Self {
        self.mirror_x = false;
        self
    }

    /// Process the pose observed at time `t` (seconds)
    pub fn observe(&mut self, t: f64, pose: Option<&HandPose>) -> GestureReading {
        let reading = match pose.filter(|p| p.is_complete()) {
            Some(pose) => self.observe_hand(t, pose),
            None => {
                self.wave.clear();
                GestureReading::absent()
            }
        };

        if reading.label != self.last_label {
            debug!(
                "Gesture changed: {} -> {} (base {})",
                self.last_label, reading.label, reading.base_label
            );
            self.last_label = reading.label;
        }
        reading
    }

    fn observe_hand(&mut self, t: f64, pose: &HandPose) -> GestureReading {
        let base_label = classify(Some(pose));

        if let Some(wrist) = pose.wrist() {
            let wrist_x = self.space.normalize(wrist).x;
            self.wave.push(t, wrist_x);
        }

        let label = if base_label == GestureLabel::Open && self.wave.detect() {
            GestureLabel::Wave
        } else {
            base_label
        };

        let target = pose.palm_center().map(|palm| {
            let n = self.space.normalize(&palm);
            if self.mirror_x {
                Vec2::new(1.0 - n.x, n.y)
            } else {
                n
            }
        });

        GestureReading {
            label,
            base_label,
            target,
        }
    }

    /// Most recent final label
    pub fn label(&self) -> GestureLabel {
        self.last_label
    }

    pub fn history_len(&self) -> usize {
        self.wave.len()
    }

    /// Forget all temporal state
    pub fn reset(&mut self) {
        self.wave.clear();
        self.last_label = GestureLabel::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::landmark::{FINGERTIPS, LANDMARK_COUNT, WRIST};
    use crate::core_types::Vec3;

    /// Open hand with the wrist at `(x, 0.5)` and fingertips 0.3 above it
    fn open_hand_at(x: f32) -> HandPose {
        let mut points = vec![Vec3::new(x, 0.5, 0.0); LANDMARK_COUNT];
        for &tip in &FINGERTIPS {
            points[tip] = Vec3::new(x, 0.2, 0.0);
        }
        HandPose::new(points)
    }

    #[test]
    fn test_pixel_space_normalization() {
        let space = CoordinateSpace::Pixels {
            width: 640.0,
            height: 480.0,
        };
        let n = space.normalize(&Vec3::new(320.0, 120.0, 0.0));
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 0.25).abs() < 1e-6);

        let clamped = space.normalize(&Vec3::new(-10.0, 900.0, 0.0));
        assert_eq!(clamped, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_open_hand_upgrades_to_wave() {
        let mut pipeline = GesturePipeline::default();
        let xs = [0.2, 0.6, 0.2, 0.6, 0.2, 0.6];
        let mut last = GestureReading::absent();
        for (i, &x) in xs.iter().enumerate() {
            last = pipeline.observe(i as f64 * 0.18, Some(&open_hand_at(x)));
        }
        assert_eq!(last.base_label, GestureLabel::Open);
        assert_eq!(last.label, GestureLabel::Wave);
        assert_eq!(pipeline.label(), GestureLabel::Wave);
    }

    #[test]
    fn test_absent_hand_clears_history() {
        let mut pipeline = GesturePipeline::default();
        pipeline.observe(0.0, Some(&open_hand_at(0.3)));
        pipeline.observe(0.1, Some(&open_hand_at(0.4)));
        assert_eq!(pipeline.history_len(), 2);

        let reading = pipeline.observe(0.2, None);
        assert_eq!(reading, GestureReading::absent());
        assert_eq!(pipeline.history_len(), 0);
    }

    #[test]
    fn test_target_is_mirrored_palm_center() {
        let mut pipeline = GesturePipeline::default();
        let reading = pipeline.observe(0.0, Some(&open_hand_at(0.25)));
        let target = reading.target.unwrap();
        assert!((target.x - 0.75).abs() < 1e-6);
        assert!((target.y - 0.5).abs() < 1e-6);

        let mut unmirrored = GesturePipeline::default().without_mirror();
        let target = unmirrored
            .observe(0.0, Some(&open_hand_at(0.25)))
            .target
            .unwrap();
        assert!((target.x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_truncated_pose_treated_as_absent() {
        let mut pipeline = GesturePipeline::default();
        pipeline.observe(0.0, Some(&open_hand_at(0.3)));
        let truncated = HandPose::new(open_hand_at(0.3).landmarks()[..WRIST + 10].to_vec());
        let reading = pipeline.observe(0.1, Some(&truncated));
        assert_eq!(reading.label, GestureLabel::Idle);
        assert_eq!(pipeline.history_len(), 0);
    }

    #[test]
    fn test_reset_forgets_wave() {
        let mut pipeline = GesturePipeline::default();
        for (i, &x) in [0.2, 0.6, 0.2, 0.6, 0.2, 0.6].iter().enumerate() {
            pipeline.observe(i as f64 * 0.18, Some(&open_hand_at(x)));
        }
        assert_eq!(pipeline.label(), GestureLabel::Wave);

        pipeline.reset();
        assert_eq!(pipeline.label(), GestureLabel::Idle);
        assert_eq!(pipeline.history_len(), 0);

        let reading = pipeline.observe(1.2, Some(&open_hand_at(0.2)));
        assert_eq!(reading.label, GestureLabel::Open);
    }
}
