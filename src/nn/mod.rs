//! Feed-forward network with sigmoid activations.
//!
//! A small fully-connected classifier: layers are added by width, weights
//! and biases start from N(0, 1) draws, and training runs mini-batch SGD
//! with hand-derived backpropagation under the quadratic cost.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{MatrizError, Result};
use crate::model_selection::MatrixShuffler;
use crate::primitives::{Matrix, Vector};

/// Fully-connected feed-forward network.
///
/// Layer `l` owns a weight matrix of shape `sizes[l+1] x sizes[l]` and a
/// bias vector of length `sizes[l+1]`. Activations are sigmoid throughout.
///
/// # Example
///
/// ```
/// use matriz::nn::Network;
///
/// let mut net = Network::with_seed(42);
/// net.add_layer(4);
/// net.add_layer(8);
/// net.add_layer(3);
/// assert_eq!(net.sizes(), &[4, 8, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct Network {
    /// Neuron count per layer, input layer first.
    sizes: Vec<usize>,
    /// One weight matrix per non-input layer.
    weights: Vec<Matrix<f32>>,
    /// One bias vector per non-input layer.
    biases: Vec<Vector<f32>>,
    rng: StdRng,
}

impl Network {
    /// Creates an empty network with entropy-seeded initialization.
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Creates an empty network with a fixed seed for reproducible
    /// initialization and shuffling.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            sizes: Vec::new(),
            weights: Vec::new(),
            biases: Vec::new(),
            rng,
        }
    }

    /// Appends a layer of the given width and returns the layer count.
    ///
    /// From the second layer on, the connecting weights and biases are
    /// drawn from N(0, 1) immediately.
    pub fn add_layer(&mut self, size: usize) -> usize {
        self.sizes.push(size);
        let n_layers = self.sizes.len();

        if n_layers > 1 {
            let fan_in = self.sizes[n_layers - 2];
            let mut weight = Matrix::zeros(size, fan_in);
            for idx in 0..size * fan_in {
                weight.set_at(idx, gaussian(&mut self.rng));
            }
            let mut bias = Vector::zeros(size);
            for j in 0..size {
                bias.set(j, gaussian(&mut self.rng));
            }
            self.weights.push(weight);
            self.biases.push(bias);
        }

        n_layers
    }

    /// Returns the neuron count per layer.
    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Returns the number of layers, the input layer included.
    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.sizes.len()
    }

    /// Checks that the network can train and that `data`/`labels` agree
    /// with the input and output layer widths.
    fn check_dataset(&self, data: &Matrix<f32>, labels: &Matrix<f32>) -> Result<()> {
        if self.num_layers() < 2 {
            return Err(MatrizError::empty_input("network layers"));
        }
        if data.n_rows() == 0 {
            return Err(MatrizError::empty_input("training rows"));
        }
        if data.n_rows() != labels.n_rows() {
            return Err(MatrizError::dimension_mismatch(
                "label rows",
                data.n_rows(),
                labels.n_rows(),
            ));
        }
        if data.n_cols() != self.sizes[0] {
            return Err(MatrizError::dimension_mismatch(
                "input features",
                self.sizes[0],
                data.n_cols(),
            ));
        }
        let output_dim = self.sizes[self.sizes.len() - 1];
        if labels.n_cols() != output_dim {
            return Err(MatrizError::dimension_mismatch(
                "label columns",
                output_dim,
                labels.n_cols(),
            ));
        }
        Ok(())
    }

    /// Runs the input through every layer and returns the output activation.
    ///
    /// # Errors
    ///
    /// Returns an error if the network has no layers or the input length
    /// does not match the input layer.
    pub fn feed_forward(&self, input: &Vector<f32>) -> Result<Vector<f32>> {
        if self.num_layers() < 2 {
            return Err(MatrizError::empty_input("network layers"));
        }
        if input.len() != self.sizes[0] {
            return Err(MatrizError::dimension_mismatch(
                "input features",
                self.sizes[0],
                input.len(),
            ));
        }

        let mut activation = input.clone();
        for (weight, bias) in self.weights.iter().zip(self.biases.iter()) {
            let mut z = weight.matvec(&activation)?;
            for j in 0..z.len() {
                z.set(j, sigmoid(z[j] + bias[j]));
            }
            activation = z;
        }
        Ok(activation)
    }

    /// Predicts the class index with the strongest output activation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not fit the network.
    pub fn predict(&self, input: &Vector<f32>) -> Result<usize> {
        let output = self.feed_forward(input)?;
        output
            .argmax()
            .ok_or_else(|| MatrizError::empty_input("network output"))
    }

    /// Counts how many rows are classified as the argmax of their one-hot
    /// label row.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset does not fit the network.
    pub fn evaluate(&self, data: &Matrix<f32>, labels: &Matrix<f32>) -> Result<usize> {
        self.check_dataset(data, labels)?;

        let mut correct = 0;
        for i in 0..data.n_rows() {
            let predicted = self.predict(&data.row(i))?;
            let target = labels
                .row(i)
                .argmax()
                .ok_or_else(|| MatrizError::empty_input("label row"))?;
            if predicted == target {
                correct += 1;
            }
        }
        Ok(correct)
    }

    /// Mean quadratic cost `0.5 * ||a - y||^2` over the dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset does not fit the network.
    pub fn loss(&self, data: &Matrix<f32>, labels: &Matrix<f32>) -> Result<f32> {
        self.check_dataset(data, labels)?;

        let mut total = 0.0;
        for i in 0..data.n_rows() {
            let output = self.feed_forward(&data.row(i))?;
            let label = labels.row(i);
            let mut cost = 0.0;
            for j in 0..output.len() {
                let diff = output[j] - label[j];
                cost += diff * diff;
            }
            total += 0.5 * cost;
        }
        Ok(total / data.n_rows() as f32)
    }

    /// Trains with shuffled mini-batch SGD and returns the per-epoch loss
    /// history.
    ///
    /// Each epoch visits the rows in a fresh shuffled order, accumulates
    /// per-sample gradients over each mini-batch, and moves every
    /// parameter by `eta / batch len` times the summed gradient.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset does not fit the network or
    /// `batch_size` is zero.
    pub fn sgd(
        &mut self,
        data: &Matrix<f32>,
        labels: &Matrix<f32>,
        epochs: usize,
        eta: f32,
        batch_size: usize,
    ) -> Result<Vec<f32>> {
        self.check_dataset(data, labels)?;
        if batch_size == 0 {
            return Err(MatrizError::empty_input("batch_size"));
        }

        let shuffle_seed = self.rng.gen();
        let mut shuffler = MatrixShuffler::with_seed(data.n_rows(), shuffle_seed);

        let mut history = Vec::with_capacity(epochs);
        for _ in 0..epochs {
            shuffler.shuffle();
            for batch in shuffler.order().chunks(batch_size) {
                self.update_batch(data, labels, batch, eta)?;
            }
            history.push(self.loss(data, labels)?);
        }
        Ok(history)
    }

    /// Applies one averaged gradient step over the given rows.
    fn update_batch(
        &mut self,
        data: &Matrix<f32>,
        labels: &Matrix<f32>,
        batch: &[usize],
        eta: f32,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut nabla_w: Vec<Matrix<f32>> = self
            .weights
            .iter()
            .map(|w| Matrix::zeros(w.n_rows(), w.n_cols()))
            .collect();
        let mut nabla_b: Vec<Vector<f32>> =
            self.biases.iter().map(|b| Vector::zeros(b.len())).collect();

        for &row in batch {
            self.back_propagation(&data.row(row), &labels.row(row), &mut nabla_w, &mut nabla_b)?;
        }

        let scale = eta / batch.len() as f32;
        for (weight, nabla) in self.weights.iter_mut().zip(nabla_w.iter_mut()) {
            nabla.mul_scalar(scale);
            weight.sub(nabla)?;
        }
        for (bias, nabla) in self.biases.iter_mut().zip(nabla_b.iter()) {
            for j in 0..bias.len() {
                bias.set(j, bias[j] - scale * nabla[j]);
            }
        }
        Ok(())
    }

    /// Accumulates the gradients of the quadratic cost for one sample.
    ///
    /// The sigmoid derivative is read off the stored activations as
    /// `a * (1 - a)`, so no pre-activation values are kept.
    fn back_propagation(
        &self,
        x: &Vector<f32>,
        y: &Vector<f32>,
        nabla_w: &mut [Matrix<f32>],
        nabla_b: &mut [Vector<f32>],
    ) -> Result<()> {
        let n_weights = self.weights.len();

        let mut activations = Vec::with_capacity(n_weights + 1);
        activations.push(x.clone());
        for (weight, bias) in self.weights.iter().zip(self.biases.iter()) {
            let prev = &activations[activations.len() - 1];
            let mut z = weight.matvec(prev)?;
            for j in 0..z.len() {
                z.set(j, sigmoid(z[j] + bias[j]));
            }
            activations.push(z);
        }

        // Output error under the quadratic cost.
        let output = &activations[n_weights];
        let mut delta = Vector::zeros(output.len());
        for j in 0..output.len() {
            let a = output[j];
            delta.set(j, (a - y[j]) * a * (1.0 - a));
        }

        for layer in (0..n_weights).rev() {
            let prev_activation = &activations[layer];
            for j in 0..delta.len() {
                nabla_b[layer].set(j, nabla_b[layer][j] + delta[j]);
                for k in 0..prev_activation.len() {
                    let grad = nabla_w[layer].get(j, k) + delta[j] * prev_activation[k];
                    nabla_w[layer].set(j, k, grad);
                }
            }

            if layer > 0 {
                let weight = &self.weights[layer];
                let mut next_delta = Vector::zeros(prev_activation.len());
                for k in 0..prev_activation.len() {
                    let mut sum = 0.0;
                    for j in 0..delta.len() {
                        sum += weight.get(j, k) * delta[j];
                    }
                    let a = prev_activation[k];
                    next_delta.set(k, sum * a * (1.0 - a));
                }
                delta = next_delta;
            }
        }
        Ok(())
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

/// σ(z) = 1 / (1 + exp(-z)).
fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

/// Standard normal draw via the Box-Muller transform.
fn gaussian(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.gen_range(0.0001_f32..1.0_f32);
    let u2: f32 = rng.gen_range(0.0_f32..1.0_f32);
    (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * std::f32::consts::PI * u2).cos()
}
