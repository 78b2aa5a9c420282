//! Static hand pose classification
//!
//! Distances are measured in the producer's native units. The thresholds
//! assume a producer that reports coordinates normalized to the camera
//! frame; pixel-space producers will classify nearly every hand as open.

use crate::core_types::landmark::{HandPose, FINGERTIPS, INDEX_TIP, THUMB_TIP, WRIST};
use crate::core_types::GestureLabel;

/// Mean wrist-to-fingertip distance above which the hand is open
pub const OPEN_THRESHOLD: f32 = 0.2;

/// Mean wrist-to-fingertip distance below which the hand is a fist
pub const FIST_THRESHOLD: f32 = 0.12;

/// Thumb-tip to index-tip distance below which the hand is pinching
pub const PINCH_THRESHOLD: f32 = 0.05;

/// Mean Euclidean distance from the wrist to the five fingertips
///
/// Returns `None` for incomplete poses.
pub fn average_fingertip_distance(pose: &HandPose) -> Option<f32> {
    if !pose.is_complete() {
        return None;
    }
    let landmarks = pose.landmarks();
    let wrist = landmarks[WRIST];
    let total: f32 = FINGERTIPS
        .iter()
        .map(|&tip| (landmarks[tip] - wrist).norm())
        .sum();
    Some(total / FINGERTIPS.len() as f32)
}

/// Distance between the thumb tip and the index fingertip
pub fn pinch_distance(pose: &HandPose) -> Option<f32> {
    if !pose.is_complete() {
        return None;
    }
    let landmarks = pose.landmarks();
    Some((landmarks[THUMB_TIP] - landmarks[INDEX_TIP]).norm())
}

/// Classify a single pose into a base gesture label
///
/// Absent or incomplete poses are `Idle`. Never returns `Wave`.
pub fn classify(pose: Option<&HandPose>) -> GestureLabel {
    let Some(pose) = pose else {
        return GestureLabel::Idle;
    };
    match (average_fingertip_distance(pose), pinch_distance(pose)) {
        (Some(avg_dist), Some(pinch_dist)) => classify_distances(avg_dist, pinch_dist),
        _ => GestureLabel::Idle,
    }
}

/// Threshold decision over precomputed distances
///
/// Open and fist are decided from the fingertip spread before the pinch
/// distance is consulted, so pinch only applies inside the inclusive band
/// `FIST_THRESHOLD..=OPEN_THRESHOLD`.
pub fn classify_distances(avg_dist: f32, pinch_dist: f32) -> GestureLabel {
    if avg_dist > OPEN_THRESHOLD {
        GestureLabel::Open
    } else if avg_dist < FIST_THRESHOLD {
        GestureLabel::Fist
    } else if pinch_dist < PINCH_THRESHOLD {
        GestureLabel::Pinch
    } else {
        GestureLabel::Idle
    }
}
