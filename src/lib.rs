//! Interactive pose-to-label training.
//!
//! This crate implements the application core of a "teach it with your body" demo: poses detected
//! in webcam frames are flattened into feature vectors, tagged with a user-chosen label vector,
//! and fed to a small regression model that the user trains and queries interactively.
//!
//! The pose detector, the renderer, and the video source are *not* part of this crate. Poses
//! arrive through the [`source::PoseSource`] seam (or are pushed directly into the session), and
//! drawing is left to the embedder, which can use [`pose::SKELETON`] and
//! [`pose::RENDER_THRESHOLD`] to reproduce the usual dots-and-bones overlay.
//!
//! The model backend is pluggable via [`model::Model`]. [`model::linear::LinearRegressor`] is a
//! self-contained backend; [`model::worker::ModelWorker`] runs any backend on its own thread and
//! reports completions as [`session::Event`]s, so the [`session::Session`] never blocks the frame
//! loop.

use log::LevelFilter;

pub mod feature;
pub mod label;
pub mod model;
pub mod pose;
pub mod session;
pub mod source;

pub type Error = Box<dyn std::error::Error + Sync + Send>;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and `poselab` will log at *debug* level; everything else follows `RUST_LOG`.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
