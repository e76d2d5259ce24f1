//! Pose and keypoint data types.
//!
//! A [`Pose`] is one detected body instance: a fixed set of 17 named keypoints, each with a
//! position in input image coordinates and a per-keypoint confidence score. Poses are
//! frame-scoped values produced by a pose detector; the session keeps only the current frame's
//! detections and overwrites them wholesale when the next frame arrives.

use std::ops::Index;

/// Number of keypoints per pose.
pub const KEYPOINT_COUNT: usize = 17;

/// Minimum keypoint score for *rendering* a keypoint dot.
///
/// This threshold only affects drawing. Feature extraction deliberately ignores keypoint scores
/// and always uses all 17 positions (see [`crate::feature`]).
pub const RENDER_THRESHOLD: f32 = 0.2;

/// Assigns a name to each keypoint index.
///
/// "Left" and "Right" are from the point of view of the depicted person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypointIdx {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

/// Keypoint pairs connected by a bone when drawing the skeleton overlay.
pub const SKELETON: [(KeypointIdx, KeypointIdx); 12] = {
    use KeypointIdx::*;
    [
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
    ]
};

/// A named body-part position with a confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    x: f32,
    y: f32,
    score: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Confidence that this keypoint was correctly located, between 0.0 and 1.0.
    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }
}

/// One detected body instance.
#[derive(Debug, Clone)]
pub struct Pose {
    keypoints: [Keypoint; KEYPOINT_COUNT],
}

impl Pose {
    pub fn new(keypoints: [Keypoint; KEYPOINT_COUNT]) -> Self {
        Self { keypoints }
    }

    /// Returns all keypoints in [`KeypointIdx`] order.
    #[inline]
    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    /// Returns the keypoints whose score exceeds `threshold`.
    ///
    /// Rendering code typically passes [`RENDER_THRESHOLD`] here to suppress dots for occluded
    /// body parts.
    pub fn visible_keypoints(&self, threshold: f32) -> impl Iterator<Item = &Keypoint> + '_ {
        self.keypoints.iter().filter(move |kp| kp.score > threshold)
    }

    /// Returns the keypoint pairs making up the skeleton overlay, in [`SKELETON`] order.
    pub fn skeleton(&self) -> impl Iterator<Item = (&Keypoint, &Keypoint)> + '_ {
        SKELETON.iter().map(|&(a, b)| (&self[a], &self[b]))
    }
}

impl Index<KeypointIdx> for Pose {
    type Output = Keypoint;

    fn index(&self, index: KeypointIdx) -> &Self::Output {
        &self.keypoints[index as usize]
    }
}
