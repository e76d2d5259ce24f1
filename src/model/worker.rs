//! Runs a [`Model`] on its own thread.
//!
//! Training and inference must not stall the frame loop, so the session never calls into a
//! [`Model`] directly. Instead it talks to a [`ModelHandle`]: every operation is fire-and-forget,
//! and completions (training progress, inference results, load confirmation) come back as
//! [`Event`]s on a channel that the frame loop drains once per frame.
//!
//! [`ModelWorker`] is the production handle: a worker thread owning the model, processing
//! requests strictly in order. Note that in-order processing does *not* remove the stale-result
//! race inherent to the design: an inference result is delivered on a later frame than the pose
//! it was extracted from, and may be applied after newer poses have already arrived.

use std::io;
use std::path::PathBuf;

use crossbeam_channel::Sender;
use pawawwewism::Worker;

use crate::{
    model::{Model, ModelRef, TrainConfig},
    session::Event,
};

/// The session-facing side of a model backend.
///
/// All operations return immediately; outcomes are reported as [`Event`]s where applicable.
pub trait ModelHandle {
    fn add_example(&mut self, input: Vec<f32>, target: Vec<f32>);
    fn normalize(&mut self);
    fn train(&mut self, config: TrainConfig);
    fn predict(&mut self, input: Vec<f32>);
    fn save_data(&mut self, path: PathBuf);
    fn save_model(&mut self, bundle: ModelRef);
    fn load_model(&mut self, bundle: ModelRef);
}

enum Request {
    AddExample { input: Vec<f32>, target: Vec<f32> },
    Normalize,
    Train(TrainConfig),
    Predict(Vec<f32>),
    SaveData(PathBuf),
    SaveModel(ModelRef),
    LoadModel(ModelRef),
}

/// A [`ModelHandle`] backed by a dedicated worker thread.
///
/// Dropping the worker joins the thread after it has drained its queue.
pub struct ModelWorker {
    worker: Worker<Request>,
}

impl ModelWorker {
    /// Spawns a worker thread owning `model`.
    ///
    /// Completions are sent to `events`; failures of fire-and-forget operations (data/model
    /// export, training errors) are logged and otherwise swallowed, matching the interactive
    /// tool's log-and-continue policy.
    pub fn spawn<M: Model + 'static>(mut model: M, events: Sender<Event>) -> io::Result<Self> {
        let worker = Worker::builder()
            .name("model")
            .spawn(move |req| match req {
                Request::AddExample { input, target } => model.add_example(&input, &target),
                Request::Normalize => model.normalize(),
                Request::Train(config) => {
                    let progress = &events;
                    let result = model.train(&config, &mut |epoch, loss| {
                        progress.send(Event::Epoch { epoch, loss }).ok();
                    });
                    match result {
                        Ok(()) => {
                            events.send(Event::TrainingFinished).ok();
                        }
                        Err(e) => log::error!("training failed: {e}"),
                    }
                }
                Request::Predict(input) => {
                    events.send(Event::Inference(model.predict(&input))).ok();
                }
                Request::SaveData(path) => {
                    if let Err(e) = model.save_data(&path) {
                        log::error!("failed to export collected data: {e}");
                    }
                }
                Request::SaveModel(bundle) => {
                    if let Err(e) = model.save_model(&bundle) {
                        log::error!("failed to export model: {e}");
                    }
                }
                Request::LoadModel(bundle) => match model.load_model(&bundle) {
                    Ok(()) => {
                        events.send(Event::ModelLoaded).ok();
                    }
                    Err(e) => log::error!("failed to load model: {e}"),
                },
            })?;

        Ok(Self { worker })
    }
}

impl ModelHandle for ModelWorker {
    fn add_example(&mut self, input: Vec<f32>, target: Vec<f32>) {
        self.worker.send(Request::AddExample { input, target });
    }

    fn normalize(&mut self) {
        self.worker.send(Request::Normalize);
    }

    fn train(&mut self, config: TrainConfig) {
        self.worker.send(Request::Train(config));
    }

    fn predict(&mut self, input: Vec<f32>) {
        self.worker.send(Request::Predict(input));
    }

    fn save_data(&mut self, path: PathBuf) {
        self.worker.send(Request::SaveData(path));
    }

    fn save_model(&mut self, bundle: ModelRef) {
        self.worker.send(Request::SaveModel(bundle));
    }

    fn load_model(&mut self, bundle: ModelRef) {
        self.worker.send(Request::LoadModel(bundle));
    }
}
