//! The pose source seam.
//!
//! Pose detection itself is not this crate's business. Whatever produces poses (a webcam frame
//! fed through a detection network, a recording, a synthetic generator) implements [`PoseSource`]
//! and is polled once per frame by the embedder's loop, which pushes the result into
//! [`crate::session::Session::update_poses`].

use crate::{pose::Pose, Error};

/// Produces zero or more detected poses per frame.
///
/// Element 0 of the returned buffer is the *primary* pose, the one used for feature extraction;
/// any further poses are only of interest to rendering.
pub trait PoseSource {
    /// Detects poses in the next frame.
    ///
    /// An empty vector is a normal outcome (nobody in front of the camera), not an error.
    fn next_frame(&mut self) -> Result<Vec<Pose>, Error>;
}

impl<S: PoseSource + ?Sized> PoseSource for Box<S> {
    fn next_frame(&mut self) -> Result<Vec<Pose>, Error> {
        (**self).next_frame()
    }
}
