//! Feed-forward binary classifier: ReLU hidden layers, sigmoid output, Adam optimiser.
//!
//! Training reads the n-gram block sparsely, so the first layer never materialises the dense
//! input matrix.

use anyhow::{anyhow, Result};
use ndarray::{Array, Array1, Array2, Axis, Dimension, Zip};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{matrix::FeatureMatrix, SpoilerClassifier};
use crate::config::{HIDDEN_LAYERS, N_ITER_NO_CHANGE, TOLERANCE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    /// L2 penalty.
    pub alpha: f64,
    pub batch_size: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub n_iter_no_change: usize,
    pub seed: u64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: HIDDEN_LAYERS.to_vec(),
            learning_rate: 1e-3,
            alpha: 1e-4,
            batch_size: 200,
            max_iter: 200,
            tol: TOLERANCE,
            n_iter_no_change: N_ITER_NO_CHANGE,
            seed: 42,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Trained network parameters plus the training trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mlp {
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    pub loss_curve: Vec<f64>,
    /// False when training stopped at `max_iter`.
    pub converged: bool,
}

struct Gradients {
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Mlp {
    pub fn fit(x: &FeatureMatrix, y: &[bool], config: &MlpConfig) -> Result<Self> {
        let n = x.n_rows();
        if n == 0 || n != y.len() {
            return Err(anyhow!("{n} feature rows but {} labels", y.len()));
        }
        if y.iter().all(|&v| v) || y.iter().all(|&v| !v) {
            return Err(anyhow!("training labels contain a single class"));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut model = Self::initialise(x.n_cols(), &config.hidden_layers, &mut rng);
        let targets = Array2::from_shape_fn((n, 1), |(row, _)| if y[row] { 1.0 } else { 0.0 });
        let batch = config.batch_size.clamp(1, n);
        let mut adam = Adam::new(&model, config);

        let mut order: Vec<usize> = (0..n).collect();
        let mut best = f64::INFINITY;
        let mut stale = 0;
        for epoch in 1..=config.max_iter {
            order.shuffle(&mut rng);
            let mut total = 0.0;
            for chunk in order.chunks(batch) {
                let xb = x.select_rows(chunk);
                let yb = targets.select(Axis(0), chunk);
                let (loss, grads) = model.backprop(&xb, &yb, config.alpha);
                adam.step(&mut model, &grads);
                total += loss * chunk.len() as f64;
            }
            let loss = total / n as f64;
            model.loss_curve.push(loss);
            debug!(epoch, loss, "epoch finished");

            if loss > best - config.tol {
                stale += 1;
            } else {
                stale = 0;
            }
            best = best.min(loss);
            if stale >= config.n_iter_no_change {
                model.converged = true;
                break;
            }
        }
        let epochs = model.loss_curve.len();
        if model.converged {
            info!(epochs, loss = best, "classifier converged");
        } else {
            warn!(epochs, loss = best, "classifier hit the iteration cap before converging");
        }
        Ok(model)
    }

    /// Glorot-uniform weights and biases; the sigmoid output layer uses the narrower bound.
    fn initialise(n_inputs: usize, hidden: &[usize], rng: &mut StdRng) -> Self {
        let sizes: Vec<usize> = std::iter::once(n_inputs)
            .chain(hidden.iter().copied())
            .chain(std::iter::once(1))
            .collect();
        let layers = sizes.len() - 1;
        let mut weights = Vec::with_capacity(layers);
        let mut biases = Vec::with_capacity(layers);
        for (layer, pair) in sizes.windows(2).enumerate() {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let factor = if layer + 1 == layers { 2.0 } else { 6.0 };
            let bound = (factor / (fan_in + fan_out) as f64).sqrt();
            weights.push(Array2::from_shape_fn((fan_in, fan_out), |_| {
                rng.gen_range(-bound..bound)
            }));
            biases.push(Array1::from_shape_fn(fan_out, |_| rng.gen_range(-bound..bound)));
        }
        Self {
            weights,
            biases,
            loss_curve: Vec::new(),
            converged: false,
        }
    }

    pub fn n_inputs(&self) -> usize {
        self.weights[0].nrows()
    }

    /// Activations of every layer; the last holds P(true).
    fn forward(&self, x: &FeatureMatrix) -> Vec<Array2<f64>> {
        let last = self.weights.len() - 1;
        let mut activations: Vec<Array2<f64>> = Vec::with_capacity(self.weights.len());
        for layer in 0..=last {
            let mut z = match activations.last() {
                None => x.dot(&self.weights[0]),
                Some(previous) => previous.dot(&self.weights[layer]),
            };
            z += &self.biases[layer];
            if layer == last {
                z.mapv_inplace(sigmoid);
            } else {
                z.mapv_inplace(|v| v.max(0.0));
            }
            activations.push(z);
        }
        activations
    }

    /// Mean batch loss (log loss plus L2) and parameter gradients.
    fn backprop(&self, x: &FeatureMatrix, y: &Array2<f64>, alpha: f64) -> (f64, Gradients) {
        let n = x.n_rows() as f64;
        let activations = self.forward(x);
        let last = self.weights.len() - 1;
        let output = &activations[last];

        let eps = f64::EPSILON;
        let log_loss = Zip::from(output)
            .and(y)
            .fold(0.0, |acc, &p, &t| {
                let p = p.clamp(eps, 1.0 - eps);
                acc - (t * p.ln() + (1.0 - t) * (1.0 - p).ln())
            })
            / n;
        let penalty: f64 = self
            .weights
            .iter()
            .map(|w| w.iter().map(|v| v * v).sum::<f64>())
            .sum();
        let loss = log_loss + 0.5 * alpha * penalty / n;

        let mut delta = output - y;
        let mut weight_grads = Vec::with_capacity(last + 1);
        let mut bias_grads = Vec::with_capacity(last + 1);
        for layer in (0..=last).rev() {
            let raw = if layer == 0 {
                x.t_dot(&delta)
            } else {
                activations[layer - 1].t().dot(&delta)
            };
            weight_grads.push((raw + &(&self.weights[layer] * alpha)) / n);
            bias_grads.push(delta.sum_axis(Axis(0)) / n);
            if layer > 0 {
                let mut upstream = delta.dot(&self.weights[layer].t());
                Zip::from(&mut upstream)
                    .and(&activations[layer - 1])
                    .for_each(|d, &a| {
                        if a <= 0.0 {
                            *d = 0.0;
                        }
                    });
                delta = upstream;
            }
        }
        weight_grads.reverse();
        bias_grads.reverse();
        (
            loss,
            Gradients {
                weights: weight_grads,
                biases: bias_grads,
            },
        )
    }
}

impl SpoilerClassifier for Mlp {
    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Array2<f64>> {
        if x.n_cols() != self.n_inputs() {
            return Err(anyhow!(
                "matrix has {} columns, model expects {}",
                x.n_cols(),
                self.n_inputs()
            ));
        }
        let activations = self.forward(x);
        let positive = activations
            .last()
            .map(|out| out.column(0).to_owned())
            .unwrap_or_default();
        Ok(Array2::from_shape_fn((x.n_rows(), 2), |(row, col)| {
            if col == 1 {
                positive[row]
            } else {
                1.0 - positive[row]
            }
        }))
    }
}

struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step: i32,
    weight_moments: Vec<(Array2<f64>, Array2<f64>)>,
    bias_moments: Vec<(Array1<f64>, Array1<f64>)>,
}

impl Adam {
    fn new(model: &Mlp, config: &MlpConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            beta1: config.beta1,
            beta2: config.beta2,
            epsilon: config.epsilon,
            step: 0,
            weight_moments: model
                .weights
                .iter()
                .map(|w| (Array2::zeros(w.raw_dim()), Array2::zeros(w.raw_dim())))
                .collect(),
            bias_moments: model
                .biases
                .iter()
                .map(|b| (Array1::zeros(b.raw_dim()), Array1::zeros(b.raw_dim())))
                .collect(),
        }
    }

    fn step(&mut self, model: &mut Mlp, grads: &Gradients) {
        self.step += 1;
        let rate = self.learning_rate * (1.0 - self.beta2.powi(self.step)).sqrt()
            / (1.0 - self.beta1.powi(self.step));
        let (b1, b2, eps) = (self.beta1, self.beta2, self.epsilon);
        for ((param, (m, v)), grad) in model
            .weights
            .iter_mut()
            .zip(self.weight_moments.iter_mut())
            .zip(&grads.weights)
        {
            adam_update(param, m, v, grad, b1, b2, eps, rate);
        }
        for ((param, (m, v)), grad) in model
            .biases
            .iter_mut()
            .zip(self.bias_moments.iter_mut())
            .zip(&grads.biases)
        {
            adam_update(param, m, v, grad, b1, b2, eps, rate);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn adam_update<D: Dimension>(
    param: &mut Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    rate: f64,
) {
    Zip::from(param)
        .and(m)
        .and(v)
        .and(grad)
        .for_each(|p, m, v, &g| {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            *p -= rate * *m / (v.sqrt() + epsilon);
        });
}
