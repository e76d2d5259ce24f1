//! The interactive collect/train/predict session.
//!
//! [`Session`] is the application-level state machine. It owns the per-frame predictions buffer,
//! the label registry, the current [`Mode`], and the continuous-prediction retry flag, and routes
//! user actions and backend completions between them.
//!
//! The embedder drives the session from a single frame loop:
//!
//! 1. push the current frame's detections with [`Session::update_poses`],
//! 2. forward user actions ([`Session::pointer_pressed`], [`Session::start_training`], …),
//! 3. drain the backend event channel into [`Session::handle_event`],
//! 4. after drawing, call [`Session::tick`] once.
//!
//! Everything runs to completion on the caller's thread; the only asynchrony is the model
//! backend behind the [`ModelHandle`] seam.

use std::path::PathBuf;

use crate::{
    feature,
    label::{LabelRegistry, LABEL_LEN},
    model::{worker::ModelHandle, ModelRef, TrainConfig},
    pose::Pose,
    Error,
};

/// What the next pointer press means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Pointer presses record labeled examples.
    Collection,
    /// A training run is in progress; pointer presses are ignored.
    Training,
    /// Pointer presses start the continuous prediction loop.
    Prediction,
}

/// Session tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Epoch count passed to the backend when training starts.
    pub epochs: usize,
    /// Mode to enter when training finishes.
    ///
    /// `None` keeps the session in [`Mode::Training`] until the user explicitly starts
    /// prediction, which mirrors the historical behavior of this tool.
    pub after_training: Option<Mode>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            after_training: None,
        }
    }
}

/// A completion reported by the model backend.
#[derive(Debug)]
pub enum Event {
    /// One training epoch finished.
    Epoch { epoch: usize, loss: f32 },
    /// The training run completed.
    TrainingFinished,
    /// An inference call returned.
    Inference(Result<Vec<f32>, Error>),
    /// A model bundle was loaded.
    ModelLoaded,
}

/// The interactive session state machine.
pub struct Session<H: ModelHandle> {
    model: H,
    config: SessionConfig,
    mode: Mode,
    /// Detections for the current frame; element 0 is the primary pose.
    predictions: Vec<Pose>,
    label: LabelRegistry,
    /// Set when the continuous prediction loop stalled on a pose-less frame.
    loop_broken: bool,
    last_outcome: Option<Vec<f32>>,
}

impl<H: ModelHandle> Session<H> {
    pub fn new(model: H, config: SessionConfig) -> Self {
        Self {
            model,
            config,
            mode: Mode::Collection,
            predictions: Vec::new(),
            label: LabelRegistry::new(),
            loop_broken: false,
            last_outcome: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The detections of the current frame, for rendering.
    #[inline]
    pub fn poses(&self) -> &[Pose] {
        &self.predictions
    }

    /// The most recent prediction outcome, if any.
    #[inline]
    pub fn last_outcome(&self) -> Option<&[f32]> {
        self.last_outcome.as_deref()
    }

    /// The label currently applied to collected examples.
    pub fn label(&self) -> Option<&[f32; LABEL_LEN]> {
        self.label.current()
    }

    /// Replaces the predictions buffer with this frame's detections.
    ///
    /// Called once per processed frame; older detections are discarded wholesale.
    pub fn update_poses(&mut self, poses: Vec<Pose>) {
        self.predictions = poses;
    }

    /// Regenerates the target label with fresh uniform draws.
    pub fn randomize_label(&mut self) {
        let label = self.label.randomize();
        log::info!("new target label: {label:?}");
    }

    /// The primary interaction: record an example or kick off prediction, depending on mode.
    ///
    /// A frame without a primary pose makes this a silent no-op.
    pub fn pointer_pressed(&mut self) {
        let input = match self.predictions.first() {
            Some(pose) => feature::extract(pose),
            None => return,
        };

        match self.mode {
            Mode::Collection => match self.label.current() {
                Some(target) => {
                    log::debug!("recording example for label {target:?}");
                    self.model.add_example(input, target.to_vec());
                }
                None => log::warn!("target label not set, example dropped"),
            },
            Mode::Prediction => self.model.predict(input),
            Mode::Training => {}
        }
    }

    /// Starts a training run over the collected examples.
    ///
    /// The backend first normalizes the collected data, then trains for the configured epoch
    /// count; progress arrives as [`Event::Epoch`] / [`Event::TrainingFinished`].
    pub fn start_training(&mut self) {
        log::info!("starting training");
        self.mode = Mode::Training;
        self.model.normalize();
        self.model.train(TrainConfig {
            epochs: self.config.epochs,
        });
    }

    /// Switches to prediction mode. Valid from any mode.
    pub fn start_prediction(&mut self) {
        self.mode = Mode::Prediction;
    }

    /// Exports the collected training set. Fire-and-forget; does not change the mode.
    pub fn export_data(&mut self, path: PathBuf) {
        self.model.save_data(path);
    }

    /// Exports the trained model. Fire-and-forget; does not change the mode.
    pub fn export_model(&mut self, bundle: ModelRef) {
        self.model.save_model(bundle);
    }

    /// Asks the backend to load a previously exported model bundle.
    pub fn load_model(&mut self, bundle: ModelRef) {
        self.model.load_model(bundle);
    }

    /// Processes one backend completion.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Epoch { epoch, loss } => log::debug!("epoch {epoch}: loss {loss}"),
            Event::TrainingFinished => {
                log::info!("finished training");
                if let Some(mode) = self.config.after_training {
                    self.mode = mode;
                }
            }
            Event::Inference(result) => self.inference_result(result),
            Event::ModelLoaded => log::info!("model loaded"),
        }
    }

    /// Per-frame housekeeping; call once per frame, after drawing.
    ///
    /// Restarts the continuous prediction loop if it stalled on a pose-less frame. At most one
    /// retry is issued per tick; a frame that is still pose-less re-arms the flag for the next
    /// tick instead of erroring.
    pub fn tick(&mut self) {
        if self.loop_broken {
            self.loop_broken = false;
            self.classify();
        }
    }

    /// Handles the outcome of one inference call.
    ///
    /// On success the outcome is stored and a new classification cycle starts immediately,
    /// keeping prediction continuous. On error the pending cycle is abandoned and the retry flag
    /// is armed, so the loop recovers on the next tick.
    fn inference_result(&mut self, result: Result<Vec<f32>, Error>) {
        match result {
            Ok(outcome) => {
                log::debug!("prediction outcome: {outcome:?}");
                self.last_outcome = Some(outcome);
                self.classify();
            }
            Err(e) => {
                log::error!("inference failed: {e}");
                self.loop_broken = true;
            }
        }
    }

    /// One classification cycle: submit the primary pose for inference, or mark the loop broken
    /// so [`tick`](Self::tick) retries next frame.
    fn classify(&mut self) {
        let input = match self.predictions.first() {
            Some(pose) => feature::extract(pose),
            None => {
                self.loop_broken = true;
                return;
            }
        };
        self.model.predict(input);
    }
}

#[cfg(test)]
mod tests {
    use crate::feature::FEATURE_LEN;
    use crate::pose::tests::test_pose;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        AddExample(Vec<f32>, Vec<f32>),
        Normalize,
        Train(usize),
        Predict(Vec<f32>),
        SaveData(PathBuf),
        SaveModel,
        LoadModel,
    }

    #[derive(Default)]
    struct RecordingHandle {
        calls: Vec<Call>,
    }

    impl ModelHandle for RecordingHandle {
        fn add_example(&mut self, input: Vec<f32>, target: Vec<f32>) {
            self.calls.push(Call::AddExample(input, target));
        }
        fn normalize(&mut self) {
            self.calls.push(Call::Normalize);
        }
        fn train(&mut self, config: TrainConfig) {
            self.calls.push(Call::Train(config.epochs));
        }
        fn predict(&mut self, input: Vec<f32>) {
            self.calls.push(Call::Predict(input));
        }
        fn save_data(&mut self, path: PathBuf) {
            self.calls.push(Call::SaveData(path));
        }
        fn save_model(&mut self, _bundle: ModelRef) {
            self.calls.push(Call::SaveModel);
        }
        fn load_model(&mut self, _bundle: ModelRef) {
            self.calls.push(Call::LoadModel);
        }
    }

    fn session() -> Session<RecordingHandle> {
        Session::new(RecordingHandle::default(), SessionConfig::default())
    }

    fn calls(session: &Session<RecordingHandle>) -> &[Call] {
        &session.model.calls
    }

    #[test]
    fn starts_in_collection_mode() {
        assert_eq!(session().mode(), Mode::Collection);
    }

    #[test]
    fn start_prediction_works_from_any_mode() {
        for initial in [Mode::Collection, Mode::Training, Mode::Prediction] {
            let mut s = session();
            s.mode = initial;
            s.start_prediction();
            assert_eq!(s.mode(), Mode::Prediction);
        }
    }

    #[test]
    fn collection_records_example_with_current_label() {
        let mut s = session();
        s.randomize_label();
        let label = s.label().unwrap().to_vec();
        s.update_poses(vec![test_pose(5.0, 0.8)]);

        s.pointer_pressed();

        let expected_input = feature::extract(&test_pose(5.0, 0.8));
        assert_eq!(calls(&s), &[Call::AddExample(expected_input, label)]);
        // The label persists, so a second press records under the same label.
        s.pointer_pressed();
        assert_eq!(calls(&s).len(), 2);
    }

    #[test]
    fn collection_without_label_drops_example() {
        let mut s = session();
        s.update_poses(vec![test_pose(0.0, 0.9)]);
        s.pointer_pressed();
        assert!(calls(&s).is_empty());
    }

    #[test]
    fn pointer_press_without_pose_is_a_noop() {
        let mut s = session();
        s.randomize_label();
        s.pointer_pressed();
        assert!(calls(&s).is_empty());

        s.start_prediction();
        s.pointer_pressed();
        assert!(calls(&s).is_empty());
    }

    #[test]
    fn pointer_press_during_training_is_a_noop() {
        let mut s = session();
        s.randomize_label();
        s.update_poses(vec![test_pose(0.0, 0.9)]);
        s.mode = Mode::Training;
        s.pointer_pressed();
        assert!(calls(&s).is_empty());
    }

    #[test]
    fn prediction_submits_extracted_features() {
        let mut s = session();
        s.update_poses(vec![test_pose(3.0, 0.1)]);
        s.start_prediction();
        s.pointer_pressed();

        let expected = feature::extract(&test_pose(3.0, 0.1));
        assert_eq!(expected.len(), FEATURE_LEN);
        assert_eq!(calls(&s), &[Call::Predict(expected)]);
    }

    #[test]
    fn train_action_normalizes_then_trains() {
        let mut s = session();
        s.start_training();
        assert_eq!(s.mode(), Mode::Training);
        assert_eq!(calls(&s), &[Call::Normalize, Call::Train(50)]);
    }

    #[test]
    fn training_completion_transition_is_configurable() {
        // Default: stay in training.
        let mut s = session();
        s.start_training();
        s.handle_event(Event::TrainingFinished);
        assert_eq!(s.mode(), Mode::Training);

        let mut s = Session::new(
            RecordingHandle::default(),
            SessionConfig {
                after_training: Some(Mode::Prediction),
                ..SessionConfig::default()
            },
        );
        s.start_training();
        s.handle_event(Event::TrainingFinished);
        assert_eq!(s.mode(), Mode::Prediction);
    }

    #[test]
    fn successful_inference_stores_outcome_and_reissues() {
        let mut s = session();
        s.update_poses(vec![test_pose(1.0, 0.5)]);
        s.start_prediction();

        s.handle_event(Event::Inference(Ok(vec![0.25; 10])));

        assert_eq!(s.last_outcome(), Some(&[0.25; 10][..]));
        assert_eq!(
            calls(&s),
            [Call::Predict(feature::extract(&test_pose(1.0, 0.5)))]
        );
    }

    #[test]
    fn inference_error_is_logged_and_retried_next_tick() {
        let mut s = session();
        s.update_poses(vec![test_pose(1.0, 0.5)]);
        s.start_prediction();

        s.handle_event(Event::Inference(Err("backend exploded".into())));
        assert!(s.last_outcome().is_none());
        assert!(calls(&s).is_empty());

        // The continuous loop picks back up on the next tick.
        s.tick();
        assert_eq!(calls(&s).len(), 1);
    }

    #[test]
    fn loop_broken_retries_once_per_tick() {
        let mut s = session();
        s.start_prediction();

        // A successful result with no pose in the buffer breaks the loop.
        s.handle_event(Event::Inference(Ok(vec![0.5; 10])));
        assert!(calls(&s).is_empty());

        // Still no pose: the tick re-arms the flag instead of erroring.
        s.tick();
        assert!(calls(&s).is_empty());

        // A pose arrives: exactly one new inference call is issued.
        s.update_poses(vec![test_pose(2.0, 0.7)]);
        s.tick();
        assert_eq!(
            calls(&s),
            [Call::Predict(feature::extract(&test_pose(2.0, 0.7)))]
        );

        // The flag was cleared; further ticks stay quiet.
        s.tick();
        assert_eq!(calls(&s).len(), 1);
    }

    #[test]
    fn exports_do_not_change_mode() {
        let mut s = session();
        s.export_data(PathBuf::from("data.json"));
        s.export_model(ModelRef::in_dir("."));
        assert_eq!(s.mode(), Mode::Collection);
        assert_eq!(calls(&s).len(), 2);
    }
}
