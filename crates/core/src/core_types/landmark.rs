//! Hand landmarks as produced by an external pose estimator
//!
//! A hand pose is 21 tracked points indexed by anatomical role. The engine
//! never produces landmarks itself; it only reads the wrist, the fingertips
//! and the finger base joints.

use crate::core_types::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// Number of landmarks in a complete hand pose.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

/// Fingertip indices in thumb, index, middle, ring, pinky order.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Wrist plus the four finger base joints, used to locate the palm center.
pub const PALM_JOINTS: [usize; 5] = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// One tracked point in the producer's native coordinate space.
pub type Landmark = Vec3;

/// Ordered landmarks for one detected hand
///
/// Construction accepts any number of points so that truncated producer
/// output can still flow through the pipeline; consumers check
/// [`HandPose::is_complete`] before reading anatomical indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPose {
    landmarks: Vec<Landmark>,
}

impl HandPose {
    /// Create a pose from landmarks in anatomical order
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Create a pose from raw `[x, y, z]` triples
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        Self {
            landmarks: points.iter().map(|&[x, y, z]| Vec3::new(x, y, z)).collect(),
        }
    }

    /// Whether all 21 anatomical landmarks are present
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Landmark at an anatomical index, if present
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn wrist(&self) -> Option<&Landmark> {
        self.landmark(WRIST)
    }

    /// Mean of the wrist and the four finger base joints
    ///
    /// Returns `None` for incomplete poses.
    pub fn palm_center(&self) -> Option<Landmark> {
        if !self.is_complete() {
            return None;
        }
        let sum = PALM_JOINTS
            .iter()
            .fold(Vec3::zeros(), |acc, &i| acc + self.landmarks[i]);
        Some(sum / PALM_JOINTS.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_pose() {
        let pose = HandPose::from_points(&[[0.0, 0.0, 0.0]; 20]);
        assert!(!pose.is_complete());
        assert_eq!(pose.palm_center(), None);
        assert!(pose.landmark(WRIST).is_some());
        assert!(pose.landmark(PINKY_TIP).is_none());
    }

    #[test]
    fn test_palm_center_averages_base_joints() {
        let mut points = [[0.0_f32; 3]; LANDMARK_COUNT];
        for &i in &PALM_JOINTS {
            points[i] = [1.0, 2.0, 0.5];
        }
        points[WRIST] = [6.0, 2.0, 0.5];
        let pose = HandPose::from_points(&points);

        let center = pose.palm_center().unwrap();
        assert!((center.x - 2.0).abs() < 1e-6);
        assert!((center.y - 2.0).abs() < 1e-6);
        assert!((center.z - 0.5).abs() < 1e-6);
    }
}
