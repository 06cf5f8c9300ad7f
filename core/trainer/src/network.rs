// Path and File Name : /home/decepticloud/core/trainer/src/network.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Q-value network - dense ReLU MLP over ndarray, batch MSE backpropagation, Adam optimizer, finite-parameter guard

use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::TrainerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DenseLayer {
    /// `input x output`
    weights: Array2<f64>,
    biases: Array1<f64>,
}

impl DenseLayer {
    fn xavier<R: Rng + ?Sized>(input: usize, output: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (input + output) as f64).sqrt();
        Self {
            weights: Array2::random_using((input, output), Uniform::new(-limit, limit), rng),
            biases: Array1::zeros(output),
        }
    }

    fn is_finite(&self) -> bool {
        self.weights.iter().all(|w| w.is_finite()) && self.biases.iter().all(|b| b.is_finite())
    }
}

/// Gradients laid out like the network's layers.
#[derive(Debug, Clone)]
pub struct Gradients {
    layers: Vec<(Array2<f64>, Array1<f64>)>,
}

impl Gradients {
    pub fn is_finite(&self) -> bool {
        self.layers
            .iter()
            .all(|(w, b)| w.iter().all(|x| x.is_finite()) && b.iter().all(|x| x.is_finite()))
    }
}

/// Fully connected network: ReLU on hidden layers, linear output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QNetwork {
    layers: Vec<DenseLayer>,
}

impl QNetwork {
    /// `sizes` = `[input, hidden.., output]`.
    pub fn new<R: Rng + ?Sized>(sizes: &[usize], rng: &mut R) -> Result<Self, TrainerError> {
        if sizes.len() < 2 || sizes.iter().any(|s| *s == 0) {
            return Err(TrainerError::ConfigurationError(format!(
                "FAIL-CLOSED: invalid network layout {:?}",
                sizes
            )));
        }
        let layers = sizes
            .windows(2)
            .map(|pair| DenseLayer::xavier(pair[0], pair[1], rng))
            .collect();
        Ok(Self { layers })
    }

    /// Layer widths, input first.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        if let Some(first) = self.layers.first() {
            sizes.push(first.weights.nrows());
        }
        sizes.extend(self.layers.iter().map(|l| l.weights.ncols()));
        sizes
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.weights.nrows()).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.weights.ncols()).unwrap_or(0)
    }

    /// Internal consistency of a deserialized network.
    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.layers.is_empty() {
            return Err(TrainerError::Checkpoint("network has no layers".to_string()));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.biases.len() != layer.weights.ncols() {
                return Err(TrainerError::Checkpoint(format!("layer {} bias width mismatch", i)));
            }
            if i > 0 && layer.weights.nrows() != self.layers[i - 1].weights.ncols() {
                return Err(TrainerError::Checkpoint(format!("layer {} input width mismatch", i)));
            }
        }
        if !self.is_finite() {
            return Err(TrainerError::Checkpoint("network contains non-finite parameters".to_string()));
        }
        Ok(())
    }

    pub fn forward(&self, input: ArrayView1<f64>) -> Array1<f64> {
        let last = self.layers.len() - 1;
        let mut activation = input.to_owned();
        for (i, layer) in self.layers.iter().enumerate() {
            let z = activation.dot(&layer.weights) + &layer.biases;
            activation = if i < last { z.mapv(relu) } else { z };
        }
        activation
    }

    /// Row-wise forward pass over a `batch x input` matrix.
    pub fn forward_batch(&self, inputs: &Array2<f64>) -> Array2<f64> {
        self.forward_trace(inputs).0
    }

    /// Output plus every layer input and hidden pre-activation, for backprop.
    fn forward_trace(&self, inputs: &Array2<f64>) -> (Array2<f64>, Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let last = self.layers.len() - 1;
        let mut layer_inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(last);
        let mut activation = inputs.clone();

        for (i, layer) in self.layers.iter().enumerate() {
            let z = activation.dot(&layer.weights) + &layer.biases;
            layer_inputs.push(activation);
            activation = if i < last {
                let a = z.mapv(relu);
                pre_activations.push(z);
                a
            } else {
                z
            };
        }
        (activation, layer_inputs, pre_activations)
    }

    /// Mean squared error between `Q(s, a)` and `targets` over the batch, with its gradients.
    pub fn loss_and_gradients(
        &self,
        inputs: &Array2<f64>,
        actions: &[usize],
        targets: &[f64],
    ) -> Result<(f64, Gradients), TrainerError> {
        let batch = inputs.nrows();
        if batch == 0 || actions.len() != batch || targets.len() != batch {
            return Err(TrainerError::ConfigurationError(format!(
                "batch shape mismatch: {} rows, {} actions, {} targets",
                batch,
                actions.len(),
                targets.len()
            )));
        }
        let outputs = self.output_size();
        if let Some(bad) = actions.iter().find(|a| **a >= outputs) {
            return Err(TrainerError::ConfigurationError(format!("action index {} out of range", bad)));
        }

        let (q, layer_inputs, pre_activations) = self.forward_trace(inputs);
        let n = batch as f64;

        let mut loss = 0.0;
        let mut delta = Array2::<f64>::zeros((batch, outputs));
        for (row, (&action, &target)) in actions.iter().zip(targets).enumerate() {
            let error = q[[row, action]] - target;
            loss += error * error;
            delta[[row, action]] = 2.0 * error / n;
        }
        loss /= n;

        let mut layers = Vec::with_capacity(self.layers.len());
        for i in (0..self.layers.len()).rev() {
            let grad_w = layer_inputs[i].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            if i > 0 {
                let upstream = delta.dot(&self.layers[i].weights.t());
                delta = upstream * pre_activations[i - 1].mapv(relu_derivative);
            }
            layers.push((grad_w, grad_b));
        }
        layers.reverse();

        Ok((loss, Gradients { layers }))
    }

    pub fn copy_from(&mut self, other: &QNetwork) {
        self.layers.clone_from(&other.layers);
    }

    pub fn is_finite(&self) -> bool {
        self.layers.iter().all(DenseLayer::is_finite)
    }
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn relu_derivative(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Adam with bias correction. Moments are part of the checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamOptimizer {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step: u64,
    first_moments: Vec<(Array2<f64>, Array1<f64>)>,
    second_moments: Vec<(Array2<f64>, Array1<f64>)>,
}

impl AdamOptimizer {
    pub fn new(network: &QNetwork, learning_rate: f64) -> Self {
        let zeros: Vec<(Array2<f64>, Array1<f64>)> = network
            .layers
            .iter()
            .map(|l| (Array2::zeros(l.weights.raw_dim()), Array1::zeros(l.biases.len())))
            .collect();
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            step: 0,
            first_moments: zeros.clone(),
            second_moments: zeros,
        }
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Moment shapes must match `network`.
    pub fn matches(&self, network: &QNetwork) -> bool {
        self.first_moments.len() == network.layers.len()
            && self.second_moments.len() == network.layers.len()
            && network.layers.iter().enumerate().all(|(i, l)| {
                self.first_moments[i].0.raw_dim() == l.weights.raw_dim()
                    && self.second_moments[i].0.raw_dim() == l.weights.raw_dim()
                    && self.first_moments[i].1.len() == l.biases.len()
                    && self.second_moments[i].1.len() == l.biases.len()
            })
    }

    pub fn apply(&mut self, network: &mut QNetwork, gradients: &Gradients) {
        self.step += 1;
        let t = self.step as i32;
        let correction1 = 1.0 - self.beta1.powi(t);
        let correction2 = 1.0 - self.beta2.powi(t);
        let (beta1, beta2, lr, eps) = (self.beta1, self.beta2, self.learning_rate, self.epsilon);

        for (i, (grad_w, grad_b)) in gradients.layers.iter().enumerate() {
            let (m_w, m_b) = &mut self.first_moments[i];
            let (v_w, v_b) = &mut self.second_moments[i];
            let layer = &mut network.layers[i];

            m_w.zip_mut_with(grad_w, |m, g| *m = beta1 * *m + (1.0 - beta1) * g);
            v_w.zip_mut_with(grad_w, |v, g| *v = beta2 * *v + (1.0 - beta2) * g * g);
            m_b.zip_mut_with(grad_b, |m, g| *m = beta1 * *m + (1.0 - beta1) * g);
            v_b.zip_mut_with(grad_b, |v, g| *v = beta2 * *v + (1.0 - beta2) * g * g);

            ndarray::Zip::from(&mut layer.weights)
                .and(&*m_w)
                .and(&*v_w)
                .for_each(|w, &m, &v| *w -= lr * (m / correction1) / ((v / correction2).sqrt() + eps));
            ndarray::Zip::from(&mut layer.biases)
                .and(&*m_b)
                .and(&*v_b)
                .for_each(|b, &m, &v| *b -= lr * (m / correction1) / ((v / correction2).sqrt() + eps));
        }
    }
}

/// One guarded gradient step. The update is computed on copies and committed
/// only if loss, gradients and resulting parameters are all finite.
pub fn train_step(
    network: &mut QNetwork,
    optimizer: &mut AdamOptimizer,
    inputs: &Array2<f64>,
    actions: &[usize],
    targets: &[f64],
) -> Result<f64, TrainerError> {
    if let Some(bad) = targets.iter().find(|t| !t.is_finite()) {
        return Err(TrainerError::NumericalFailure(format!("non-finite TD target {}", bad)));
    }

    let (loss, gradients) = network.loss_and_gradients(inputs, actions, targets)?;
    if !loss.is_finite() {
        return Err(TrainerError::NumericalFailure(format!("non-finite loss {}", loss)));
    }
    if !gradients.is_finite() {
        return Err(TrainerError::NumericalFailure("non-finite gradients".to_string()));
    }

    let mut candidate = network.clone();
    let mut candidate_optimizer = optimizer.clone();
    candidate_optimizer.apply(&mut candidate, &gradients);
    if !candidate.is_finite() {
        return Err(TrainerError::NumericalFailure(
            "update produced non-finite parameters".to_string(),
        ));
    }

    *network = candidate;
    *optimizer = candidate_optimizer;
    Ok(loss)
}
