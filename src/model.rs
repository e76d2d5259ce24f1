//! The model backend seam.
//!
//! The session does not care how examples are stored, how training works, or what produces a
//! prediction; it only needs the operations in [`Model`]. Backends are free to be anything from
//! the in-crate [`linear::LinearRegressor`] to a wrapper around an external inference engine.
//!
//! [`Model`] is a synchronous interface. To keep the frame loop responsive, backends are normally
//! driven through [`worker::ModelWorker`], which owns the model on a dedicated thread and reports
//! completions as [`crate::session::Event`]s.

pub mod linear;
pub mod worker;

use std::path::{Path, PathBuf};

use crate::Error;

/// Training run configuration.
#[derive(Debug, Clone, Copy)]
pub struct TrainConfig {
    pub epochs: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self { epochs: 50 }
    }
}

/// Locations of the three artifacts making up a saved model.
///
/// The artifact contents are the backend's concern; this type only names where they live.
#[derive(Debug, Clone)]
pub struct ModelRef {
    /// Network topology descriptor.
    pub topology: PathBuf,
    /// Auxiliary metadata (normalization statistics etc.).
    pub metadata: PathBuf,
    /// Raw weights blob.
    pub weights: PathBuf,
}

impl ModelRef {
    /// Uses the conventional artifact names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            topology: dir.join("model.json"),
            metadata: dir.join("model_meta.json"),
            weights: dir.join("model.weights.bin"),
        }
    }
}

/// A trainable regression model consuming flat feature vectors.
pub trait Model: Send {
    /// Adds one `(input, target)` pair to the collected training set.
    fn add_example(&mut self, input: &[f32], target: &[f32]);

    /// Computes normalization statistics over the collected training set.
    ///
    /// Called once before [`train`](Self::train); training and inference both apply the
    /// statistics from the most recent call.
    fn normalize(&mut self);

    /// Runs a training pass over the collected examples.
    ///
    /// `on_epoch` is invoked once per epoch with the epoch index and current loss.
    fn train(
        &mut self,
        config: &TrainConfig,
        on_epoch: &mut dyn FnMut(usize, f32),
    ) -> Result<(), Error>;

    /// Produces a prediction for `input`.
    fn predict(&self, input: &[f32]) -> Result<Vec<f32>, Error>;

    /// Exports the collected training set to `path`.
    fn save_data(&self, path: &Path) -> Result<(), Error>;

    /// Exports the trained model to the locations in `bundle`.
    fn save_model(&self, bundle: &ModelRef) -> Result<(), Error>;

    /// Replaces the model state with the artifacts in `bundle`.
    fn load_model(&mut self, bundle: &ModelRef) -> Result<(), Error>;
}
