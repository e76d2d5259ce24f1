//! Demo binary: drives a full collect → train → predict session against a synthetic pose source.
//!
//! There is no camera or pose network here; a wandering synthetic skeleton stands in for the
//! detector so the whole interactive loop can be exercised (and watched via the logs) on any
//! machine. Frames where the "person" leaves the view are simulated too, which exercises the
//! continuous-prediction retry path.

use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use poselab::model::linear::LinearRegressor;
use poselab::model::worker::ModelWorker;
use poselab::pose::{Keypoint, Pose, KEYPOINT_COUNT};
use poselab::session::{Mode, Session, SessionConfig};
use poselab::source::PoseSource;
use poselab::{feature, label};

const FRAME: Duration = Duration::from_millis(33);

/// A fake detector: one body wandering around a 640×480 view, absent every now and then.
struct SyntheticSource {
    frame: u32,
}

impl PoseSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Vec<Pose>, poselab::Error> {
        self.frame += 1;
        // Nobody in view for a few frames out of every 40.
        if self.frame % 40 < 3 {
            return Ok(Vec::new());
        }

        let cx = 320.0 + 200.0 * (self.frame as f32 / 25.0).sin();
        let cy = 240.0 + 60.0 * (self.frame as f32 / 40.0).cos();
        let mut i = 0;
        let keypoints = [(); KEYPOINT_COUNT].map(|()| {
            let kp = Keypoint::new(
                cx + (i % 4) as f32 * 12.0 + fastrand::f32() * 4.0,
                cy + (i / 4) as f32 * 30.0 + fastrand::f32() * 4.0,
                0.5 + fastrand::f32() * 0.5,
            );
            i += 1;
            kp
        });
        Ok(vec![Pose::new(keypoints)])
    }
}

fn main() -> Result<(), poselab::Error> {
    poselab::init_logger!();

    let (events_tx, events_rx) = unbounded();
    let model = LinearRegressor::new(feature::FEATURE_LEN, label::LABEL_LEN);
    let worker = ModelWorker::spawn(model, events_tx)?;
    let mut session = Session::new(
        worker,
        SessionConfig {
            after_training: Some(Mode::Prediction),
            ..SessionConfig::default()
        },
    );

    let mut source = SyntheticSource { frame: 0 };

    // Scripted stand-ins for the user's key presses: two labels with a batch of pointer presses
    // each, then `t`, then the prediction loop.
    for round in 0..2 {
        session.randomize_label();
        log::info!("collecting batch {}", round + 1);
        for _ in 0..30 {
            step(&mut session, &mut source)?;
            session.pointer_pressed();
        }
    }

    session.start_training();

    // Keep the frame loop running while training progresses, then predict for a while. The
    // first pointer press in prediction mode starts the continuous loop; after that it sustains
    // itself through the inference events and the per-tick retry.
    let mut pressed = false;
    for _ in 0..600 {
        step(&mut session, &mut source)?;
        if session.mode() == Mode::Prediction && !pressed {
            session.pointer_pressed();
            pressed = true;
        }
        while let Ok(event) = events_rx.try_recv() {
            session.handle_event(event);
        }
        session.tick();
        thread::sleep(FRAME);
    }

    if let Some(outcome) = session.last_outcome() {
        log::info!("final prediction outcome: {outcome:?}");
    }
    Ok(())
}

/// One frame: poll the source and refresh the predictions buffer.
fn step<S: PoseSource>(
    session: &mut Session<ModelWorker>,
    source: &mut S,
) -> Result<(), poselab::Error> {
    let poses = source.next_frame()?;
    session.update_poses(poses);
    Ok(())
}
