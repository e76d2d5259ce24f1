//! A min-max normalizing linear regressor trained with SGD.
//!
//! This is the in-crate [`Model`] backend. It is intentionally simple: each output component is
//! an independent affine function of the (normalized) input, fitted by plain stochastic gradient
//! descent over the collected examples. For the "pose position → label vector" task this is
//! enough to make the demo loop observable end to end.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    model::{Model, ModelRef, TrainConfig},
    Error,
};

const LEARNING_RATE: f32 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Example {
    input: Vec<f32>,
    target: Vec<f32>,
}

/// Per-dimension min-max statistics, mapping each input component to `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Normalization {
    min: Vec<f32>,
    max: Vec<f32>,
}

impl Normalization {
    fn compute(examples: &[Example], inputs: usize) -> Self {
        let mut min = vec![f32::INFINITY; inputs];
        let mut max = vec![f32::NEG_INFINITY; inputs];
        for ex in examples {
            for (i, &v) in ex.input.iter().enumerate() {
                min[i] = min[i].min(v);
                max[i] = max[i].max(v);
            }
        }
        Self { min, max }
    }

    fn apply(&self, input: &[f32]) -> Vec<f32> {
        input
            .iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&v, (&min, &max))| {
                let range = max - min;
                if range > f32::EPSILON {
                    (v - min) / range
                } else {
                    0.0
                }
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Topology {
    inputs: usize,
    outputs: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct Metadata {
    normalization: Option<Normalization>,
}

/// A linear regression model with one weight row (plus bias) per output component.
pub struct LinearRegressor {
    inputs: usize,
    outputs: usize,
    /// `outputs` rows of `inputs + 1` values each; the last value of a row is the bias.
    weights: Vec<f32>,
    examples: Vec<Example>,
    norm: Option<Normalization>,
}

impl LinearRegressor {
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            weights: vec![0.0; outputs * (inputs + 1)],
            examples: Vec::new(),
            norm: None,
        }
    }

    /// Number of collected training examples.
    pub fn example_count(&self) -> usize {
        self.examples.len()
    }

    fn normalized(&self, input: &[f32]) -> Vec<f32> {
        match &self.norm {
            Some(norm) => norm.apply(input),
            None => input.to_vec(),
        }
    }

    /// Evaluates the affine map on an already-normalized input.
    fn raw_predict(&self, input: &[f32]) -> Vec<f32> {
        let stride = self.inputs + 1;
        (0..self.outputs)
            .map(|o| {
                let row = &self.weights[o * stride..(o + 1) * stride];
                let bias = row[self.inputs];
                row[..self.inputs]
                    .iter()
                    .zip(input)
                    .fold(bias, |acc, (&w, &x)| acc + w * x)
            })
            .collect()
    }

    fn check_input(&self, input: &[f32]) -> Result<(), Error> {
        if input.len() != self.inputs {
            return Err(format!(
                "input has {} components, model takes {}",
                input.len(),
                self.inputs
            )
            .into());
        }
        Ok(())
    }
}

impl Model for LinearRegressor {
    fn add_example(&mut self, input: &[f32], target: &[f32]) {
        if input.len() != self.inputs || target.len() != self.outputs {
            log::warn!(
                "dropping malformed example ({}→{} values, model is {}→{})",
                input.len(),
                target.len(),
                self.inputs,
                self.outputs
            );
            return;
        }
        self.examples.push(Example {
            input: input.to_vec(),
            target: target.to_vec(),
        });
    }

    fn normalize(&mut self) {
        if self.examples.is_empty() {
            log::warn!("no examples collected, skipping normalization");
            return;
        }
        self.norm = Some(Normalization::compute(&self.examples, self.inputs));
    }

    fn train(
        &mut self,
        config: &TrainConfig,
        on_epoch: &mut dyn FnMut(usize, f32),
    ) -> Result<(), Error> {
        if self.examples.is_empty() {
            return Err("no training data collected".into());
        }

        let stride = self.inputs + 1;
        let examples: Vec<(Vec<f32>, Vec<f32>)> = self
            .examples
            .iter()
            .map(|ex| (self.normalized(&ex.input), ex.target.clone()))
            .collect();

        for epoch in 0..config.epochs {
            let mut total_loss = 0.0;
            for (input, target) in &examples {
                let predicted = self.raw_predict(input);
                for o in 0..self.outputs {
                    let err = predicted[o] - target[o];
                    total_loss += err * err;

                    let row = &mut self.weights[o * stride..(o + 1) * stride];
                    for (w, &x) in row[..input.len()].iter_mut().zip(input) {
                        *w -= LEARNING_RATE * err * x;
                    }
                    row[input.len()] -= LEARNING_RATE * err;
                }
            }
            let loss = total_loss / (examples.len() * self.outputs) as f32;
            on_epoch(epoch, loss);
        }
        Ok(())
    }

    fn predict(&self, input: &[f32]) -> Result<Vec<f32>, Error> {
        self.check_input(input)?;
        Ok(self.raw_predict(&self.normalized(input)))
    }

    fn save_data(&self, path: &Path) -> Result<(), Error> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, &self.examples)?;
        Ok(())
    }

    fn save_model(&self, bundle: &ModelRef) -> Result<(), Error> {
        let topology = BufWriter::new(File::create(&bundle.topology)?);
        serde_json::to_writer_pretty(
            topology,
            &Topology {
                inputs: self.inputs,
                outputs: self.outputs,
            },
        )?;

        let metadata = BufWriter::new(File::create(&bundle.metadata)?);
        serde_json::to_writer_pretty(
            metadata,
            &Metadata {
                normalization: self.norm.clone(),
            },
        )?;

        let mut blob = Vec::with_capacity(self.weights.len() * 4);
        for w in &self.weights {
            blob.extend_from_slice(&w.to_le_bytes());
        }
        fs::write(&bundle.weights, blob)?;
        Ok(())
    }

    fn load_model(&mut self, bundle: &ModelRef) -> Result<(), Error> {
        let topology: Topology =
            serde_json::from_reader(BufReader::new(File::open(&bundle.topology)?))?;
        let metadata: Metadata =
            serde_json::from_reader(BufReader::new(File::open(&bundle.metadata)?))?;

        let blob = fs::read(&bundle.weights)?;
        if blob.len() % 4 != 0 {
            return Err("weights blob is not a whole number of f32 values".into());
        }
        let weights: Vec<f32> = blob
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect();

        let expected = topology.outputs * (topology.inputs + 1);
        if weights.len() != expected {
            return Err(format!(
                "weights blob holds {} values, topology requires {}",
                weights.len(),
                expected
            )
            .into());
        }

        self.inputs = topology.inputs;
        self.outputs = topology.outputs;
        self.weights = weights;
        self.norm = metadata.normalization;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn trained_model() -> LinearRegressor {
        let mut model = LinearRegressor::new(2, 1);
        // target = 0.05 * x0 + 0.002 * x1, inputs in pixel-ish ranges
        for i in 0..20 {
            let x0 = i as f32;
            let x1 = (i * 7 % 20) as f32 * 10.0;
            model.add_example(&[x0, x1], &[0.05 * x0 + 0.002 * x1]);
        }
        model.normalize();
        model
            .train(&TrainConfig { epochs: 500 }, &mut |_, _| {})
            .unwrap();
        model
    }

    #[test]
    fn training_reduces_loss() {
        let mut model = LinearRegressor::new(2, 1);
        for i in 0..10 {
            model.add_example(&[i as f32, (10 - i) as f32], &[i as f32 / 10.0]);
        }
        model.normalize();

        let mut losses = Vec::new();
        model
            .train(&TrainConfig { epochs: 300 }, &mut |epoch, loss| {
                assert_eq!(epoch, losses.len());
                losses.push(loss);
            })
            .unwrap();

        assert_eq!(losses.len(), 300);
        assert!(losses.last().unwrap() < &losses[0]);
        assert!(losses.last().unwrap() < &0.001);
    }

    #[test]
    fn trained_model_predicts() {
        let model = trained_model();
        let prediction = model.predict(&[10.0, 50.0]).unwrap();
        assert_eq!(prediction.len(), 1);
        assert_abs_diff_eq!(prediction[0], 0.05 * 10.0 + 0.002 * 50.0, epsilon = 0.05);
    }

    #[test]
    fn training_without_examples_fails() {
        let mut model = LinearRegressor::new(2, 1);
        assert!(model.train(&TrainConfig::default(), &mut |_, _| {}).is_err());
    }

    #[test]
    fn predict_rejects_wrong_input_length() {
        let model = LinearRegressor::new(4, 2);
        assert!(model.predict(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn malformed_examples_are_dropped() {
        let mut model = LinearRegressor::new(4, 2);
        model.add_example(&[1.0], &[0.0, 0.0]);
        model.add_example(&[1.0, 2.0, 3.0, 4.0], &[0.0]);
        assert_eq!(model.example_count(), 0);
    }

    #[test]
    fn save_load_roundtrip() {
        let model = trained_model();
        let dir = tempfile::tempdir().unwrap();
        let bundle = ModelRef::in_dir(dir.path());
        model.save_model(&bundle).unwrap();

        let mut restored = LinearRegressor::new(2, 1);
        restored.load_model(&bundle).unwrap();

        let input = [7.0, 120.0];
        assert_eq!(
            model.predict(&input).unwrap(),
            restored.predict(&input).unwrap()
        );
    }

    #[test]
    fn save_data_exports_examples() {
        let mut model = LinearRegressor::new(2, 1);
        model.add_example(&[1.0, 2.0], &[0.5]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        model.save_data(&path).unwrap();

        let examples: Vec<Example> =
            serde_json::from_reader(BufReader::new(File::open(&path).unwrap())).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].input, vec![1.0, 2.0]);
        assert_eq!(examples[0].target, vec![0.5]);
    }
}
