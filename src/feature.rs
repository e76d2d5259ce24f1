//! Feature extraction from poses.
//!
//! The model consumes a flat numeric vector, not a [`Pose`]. Extraction interleaves the raw pixel
//! coordinates of every keypoint as `(x₀, y₀, x₁, y₁, …)`, producing a vector of fixed length
//! [`FEATURE_LEN`].
//!
//! Keypoint scores are *not* consulted: a barely-visible keypoint contributes its position just
//! like a confident one, and no normalization or clipping is applied. Score filtering exists only
//! on the rendering side ([`crate::pose::RENDER_THRESHOLD`]).

use crate::pose::{Pose, KEYPOINT_COUNT};

/// Length of every extracted feature vector (x and y per keypoint).
pub const FEATURE_LEN: usize = 2 * KEYPOINT_COUNT;

/// Flattens `pose` into a feature vector of length [`FEATURE_LEN`].
pub fn extract(pose: &Pose) -> Vec<f32> {
    let mut features = Vec::with_capacity(FEATURE_LEN);
    for kp in pose.keypoints() {
        features.push(kp.x());
        features.push(kp.y());
    }
    features
}
