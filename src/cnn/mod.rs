//! Layered convolutional network over the matrix engine.
//!
//! Channels are plain matrices. A network is a stack of layers: a data
//! layer that shapes the flat input row into an image, convolution and
//! mean-pooling layers in the middle, and a full-connection layer that
//! maps the flattened channels to class scores. Training is per-sample
//! SGD with hand-derived backward passes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{MatrizError, Result};
use crate::primitives::{Matrix, Vector};

/// Layer description passed to [`Cnn::add_layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerSpec {
    /// Input image shape.
    Data { rows: usize, cols: usize },
    /// Square-kernel convolution with a shared scalar bias per
    /// out-channel and sigmoid activation.
    Convolution {
        kernel: usize,
        out_channels: usize,
        stride: usize,
    },
    /// Non-overlapping mean pooling over `scale x scale` blocks.
    MeanPooling { scale: usize },
    /// Flattens all channels and applies an affine map plus sigmoid.
    FullConnection { classes: usize },
}

impl LayerSpec {
    /// Input layer holding a `rows x cols` image.
    #[must_use]
    pub fn data(rows: usize, cols: usize) -> Self {
        Self::Data { rows, cols }
    }

    /// Convolution layer with stride 1.
    #[must_use]
    pub fn convolution(kernel: usize, out_channels: usize) -> Self {
        Self::Convolution {
            kernel,
            out_channels,
            stride: 1,
        }
    }

    /// Convolution layer with an explicit stride.
    #[must_use]
    pub fn convolution_with_stride(kernel: usize, out_channels: usize, stride: usize) -> Self {
        Self::Convolution {
            kernel,
            out_channels,
            stride,
        }
    }

    /// Mean pooling layer.
    #[must_use]
    pub fn mean_pooling(scale: usize) -> Self {
        Self::MeanPooling { scale }
    }

    /// Output layer with one neuron per class.
    #[must_use]
    pub fn full_connection(classes: usize) -> Self {
        Self::FullConnection { classes }
    }
}

/// Materialized layer with its parameters.
#[derive(Debug, Clone)]
enum Layer {
    Data {
        rows: usize,
        cols: usize,
    },
    Convolution {
        kernel: usize,
        stride: usize,
        /// Kernels indexed `[in_channel][out_channel]`.
        kernels: Vec<Vec<Matrix<f32>>>,
        bias: Vec<f32>,
    },
    MeanPooling {
        scale: usize,
    },
    FullConnection {
        weight: Matrix<f32>,
        bias: Vector<f32>,
    },
}

/// Convolutional network assembled layer by layer.
///
/// # Example
///
/// ```
/// use matriz::cnn::{Cnn, LayerSpec};
///
/// let mut cnn = Cnn::with_seed(42);
/// cnn.add_layer(LayerSpec::data(8, 8)).unwrap();
/// cnn.add_layer(LayerSpec::convolution(3, 2)).unwrap();
/// cnn.add_layer(LayerSpec::mean_pooling(2)).unwrap();
/// cnn.add_layer(LayerSpec::full_connection(2)).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Cnn {
    layers: Vec<Layer>,
    /// Output shape `(channels, rows, cols)` after each layer.
    shapes: Vec<(usize, usize, usize)>,
    rng: StdRng,
}

impl Cnn {
    /// Creates an empty network with entropy-seeded initialization.
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Creates an empty network with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            layers: Vec::new(),
            shapes: Vec::new(),
            rng,
        }
    }

    /// Returns the number of layers added so far.
    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Appends a layer, checking it fits the current stack.
    ///
    /// The first layer must be a data layer, nothing may follow a
    /// full-connection layer, and pooling requires block-aligned inputs.
    ///
    /// # Errors
    ///
    /// Returns an error for a structurally invalid layer.
    pub fn add_layer(&mut self, spec: LayerSpec) -> Result<()> {
        if matches!(self.layers.last(), Some(Layer::FullConnection { .. })) {
            return Err(MatrizError::Other(
                "no layer can follow the full-connection layer".to_string(),
            ));
        }

        match spec {
            LayerSpec::Data { rows, cols } => {
                if !self.layers.is_empty() {
                    return Err(MatrizError::Other(
                        "the data layer must be the first layer".to_string(),
                    ));
                }
                if rows == 0 || cols == 0 {
                    return Err(MatrizError::empty_input("data layer shape"));
                }
                self.layers.push(Layer::Data { rows, cols });
                self.shapes.push((1, rows, cols));
            }
            LayerSpec::Convolution {
                kernel,
                out_channels,
                stride,
            } => {
                let (in_channels, in_rows, in_cols) = self.previous_shape()?;
                if kernel == 0 || out_channels == 0 || stride == 0 {
                    return Err(MatrizError::empty_input("convolution layer shape"));
                }
                if in_rows < kernel || in_cols < kernel {
                    return Err(MatrizError::Other(format!(
                        "kernel {kernel} does not fit a {in_rows}x{in_cols} input"
                    )));
                }
                if (in_rows - kernel) % stride != 0 || (in_cols - kernel) % stride != 0 {
                    return Err(MatrizError::Other(format!(
                        "stride {stride} does not tile a {in_rows}x{in_cols} input with kernel {kernel}"
                    )));
                }

                let bound = 1.0 / ((kernel * kernel * in_channels) as f32).sqrt();
                let mut kernels = Vec::with_capacity(in_channels);
                for _ in 0..in_channels {
                    let mut row = Vec::with_capacity(out_channels);
                    for _ in 0..out_channels {
                        let mut k = Matrix::zeros(kernel, kernel);
                        for idx in 0..kernel * kernel {
                            k.set_at(idx, self.rng.gen_range(-bound..bound));
                        }
                        row.push(k);
                    }
                    kernels.push(row);
                }

                let out_rows = (in_rows - kernel) / stride + 1;
                let out_cols = (in_cols - kernel) / stride + 1;
                self.layers.push(Layer::Convolution {
                    kernel,
                    stride,
                    kernels,
                    bias: vec![0.0; out_channels],
                });
                self.shapes.push((out_channels, out_rows, out_cols));
            }
            LayerSpec::MeanPooling { scale } => {
                let (channels, in_rows, in_cols) = self.previous_shape()?;
                if scale == 0 {
                    return Err(MatrizError::empty_input("pooling scale"));
                }
                if in_rows % scale != 0 || in_cols % scale != 0 {
                    return Err(MatrizError::Other(format!(
                        "pooling scale {scale} does not tile a {in_rows}x{in_cols} input"
                    )));
                }
                self.layers.push(Layer::MeanPooling { scale });
                self.shapes
                    .push((channels, in_rows / scale, in_cols / scale));
            }
            LayerSpec::FullConnection { classes } => {
                let (channels, in_rows, in_cols) = self.previous_shape()?;
                if classes == 0 {
                    return Err(MatrizError::empty_input("class count"));
                }
                let flat_dim = channels * in_rows * in_cols;
                let bound = 1.0 / (flat_dim as f32).sqrt();
                let mut weight = Matrix::zeros(classes, flat_dim);
                for idx in 0..classes * flat_dim {
                    weight.set_at(idx, self.rng.gen_range(-bound..bound));
                }
                self.layers.push(Layer::FullConnection {
                    weight,
                    bias: Vector::zeros(classes),
                });
                self.shapes.push((1, 1, classes));
            }
        }
        Ok(())
    }

    fn previous_shape(&self) -> Result<(usize, usize, usize)> {
        match self.shapes.last() {
            Some(&shape) => Ok(shape),
            None => Err(MatrizError::Other(
                "the data layer must be the first layer".to_string(),
            )),
        }
    }

    /// Checks the stack is trainable and the dataset fits it.
    fn check_structure(&self, data: &Matrix<f32>, labels: &Matrix<f32>) -> Result<()> {
        if self.layers.len() < 3 {
            return Err(MatrizError::Other(
                "a convolutional network needs at least three layers".to_string(),
            ));
        }
        let Some(Layer::FullConnection { weight, .. }) = self.layers.last() else {
            return Err(MatrizError::Other(
                "the last layer must be a full-connection layer".to_string(),
            ));
        };
        let Some(Layer::Data { rows, cols }) = self.layers.first() else {
            return Err(MatrizError::Other(
                "the data layer must be the first layer".to_string(),
            ));
        };

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
        if data.n_cols() != rows * cols {
            return Err(MatrizError::dimension_mismatch(
                "image pixels",
                rows * cols,
                data.n_cols(),
            ));
        }
        if labels.n_cols() != weight.n_rows() {
            return Err(MatrizError::dimension_mismatch(
                "label columns",
                weight.n_rows(),
                labels.n_cols(),
            ));
        }
        Ok(())
    }

    /// Runs one flat image row through every layer.
    ///
    /// Returns the channel outputs of each layer, data layer first.
    fn forward(&self, image_row: &Vector<f32>) -> Result<Vec<Vec<Matrix<f32>>>> {
        let mut outputs: Vec<Vec<Matrix<f32>>> = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let next = match layer {
                Layer::Data { rows, cols } => {
                    if image_row.len() != rows * cols {
                        return Err(MatrizError::dimension_mismatch(
                            "image pixels",
                            rows * cols,
                            image_row.len(),
                        ));
                    }
                    vec![Matrix::from_vec(
                        *rows,
                        *cols,
                        image_row.as_slice().to_vec(),
                    )?]
                }
                Layer::Convolution {
                    kernel,
                    stride,
                    kernels,
                    bias,
                } => {
                    let input = last_output(&outputs)?;
                    let (in_rows, in_cols) = input[0].shape();
                    let out_rows = (in_rows - kernel) / stride + 1;
                    let out_cols = (in_cols - kernel) / stride + 1;

                    let mut channels = Vec::with_capacity(bias.len());
                    for (q, b) in bias.iter().enumerate() {
                        let mut acc = Matrix::zeros(out_rows, out_cols);
                        for (p, in_channel) in input.iter().enumerate() {
                            correlate_valid(in_channel, &kernels[p][q], *stride, &mut acc);
                        }
                        for idx in 0..out_rows * out_cols {
                            acc.set_at(idx, sigmoid(acc.get_at(idx) + b));
                        }
                        channels.push(acc);
                    }
                    channels
                }
                Layer::MeanPooling { scale } => {
                    let input = last_output(&outputs)?;
                    input.iter().map(|ch| mean_pool(ch, *scale)).collect()
                }
                Layer::FullConnection { weight, bias } => {
                    let input = last_output(&outputs)?;
                    let flat = flatten(input);
                    let mut z = weight.matvec(&flat)?;
                    for j in 0..z.len() {
                        z.set(j, sigmoid(z[j] + bias[j]));
                    }
                    vec![Matrix::from_vec(1, z.len(), z.into_vec())?]
                }
            };
            outputs.push(next);
        }
        Ok(outputs)
    }

    /// Backward pass over one sample, updating parameters in place.
    fn backward(
        &mut self,
        outputs: &[Vec<Matrix<f32>>],
        label: &Vector<f32>,
        alpha: f32,
    ) -> Result<()> {
        // Delta with respect to each layer's output, walked backwards.
        let mut delta: Vec<Matrix<f32>> = Vec::new();

        for k in (0..self.layers.len()).rev() {
            match &mut self.layers[k] {
                Layer::FullConnection { weight, bias } => {
                    let output = &outputs[k][0];
                    let classes = output.n_cols();
                    if label.len() != classes {
                        return Err(MatrizError::dimension_mismatch(
                            "label columns",
                            classes,
                            label.len(),
                        ));
                    }

                    let mut d_z = Vector::zeros(classes);
                    for j in 0..classes {
                        let a = output.get(0, j);
                        d_z.set(j, (a - label[j]) * a * (1.0 - a));
                    }

                    let flat = flatten(&outputs[k - 1]);

                    // Delta for the flattened previous output.
                    let mut flat_delta = Vector::zeros(flat.len());
                    for i in 0..flat.len() {
                        let mut sum = 0.0;
                        for j in 0..classes {
                            sum += weight.get(j, i) * d_z[j];
                        }
                        flat_delta.set(i, sum);
                    }

                    for j in 0..classes {
                        for i in 0..flat.len() {
                            let w = weight.get(j, i) - alpha * d_z[j] * flat[i];
                            weight.set(j, i, w);
                        }
                        bias.set(j, bias[j] - alpha * d_z[j]);
                    }

                    delta = unflatten(&flat_delta, &outputs[k - 1]);
                }
                Layer::MeanPooling { scale } => {
                    delta = delta
                        .iter()
                        .map(|d| upsample_mean_delta(d, *scale))
                        .collect();
                }
                Layer::Convolution {
                    kernel,
                    stride,
                    kernels,
                    bias,
                } => {
                    let (kernel, stride) = (*kernel, *stride);
                    let input = &outputs[k - 1];
                    let output = &outputs[k];
                    let (in_rows, in_cols) = input[0].shape();
                    let out_channels = bias.len();

                    // Pre-activation deltas per out-channel.
                    let mut d_z = Vec::with_capacity(out_channels);
                    for q in 0..out_channels {
                        let mut d = delta[q].clone();
                        for idx in 0..d.n_rows() * d.n_cols() {
                            let a = output[q].get_at(idx);
                            d.set_at(idx, d.get_at(idx) * a * (1.0 - a));
                        }
                        d_z.push(d);
                    }

                    // Delta for the previous layer, scattered through the
                    // kernels before they move.
                    let mut prev_delta: Vec<Matrix<f32>> = input
                        .iter()
                        .map(|_| Matrix::zeros(in_rows, in_cols))
                        .collect();
                    for (p, prev) in prev_delta.iter_mut().enumerate() {
                        for (q, d) in d_z.iter().enumerate() {
                            scatter_delta(d, &kernels[p][q], stride, prev);
                        }
                    }

                    for (p, in_channel) in input.iter().enumerate() {
                        for (q, d) in d_z.iter().enumerate() {
                            for i in 0..kernel {
                                for j in 0..kernel {
                                    let mut grad = 0.0;
                                    for u in 0..d.n_rows() {
                                        for v in 0..d.n_cols() {
                                            grad += d.get(u, v)
                                                * in_channel.get(u * stride + i, v * stride + j);
                                        }
                                    }
                                    let w = kernels[p][q].get(i, j) - alpha * grad;
                                    kernels[p][q].set(i, j, w);
                                }
                            }
                        }
                    }
                    for (q, d) in d_z.iter().enumerate() {
                        let mut grad = 0.0;
                        for idx in 0..d.n_rows() * d.n_cols() {
                            grad += d.get_at(idx);
                        }
                        bias[q] -= alpha * grad;
                    }

                    delta = prev_delta;
                }
                Layer::Data { .. } => {}
            }
        }
        Ok(())
    }

    /// Trains per-sample SGD over the dataset and returns the per-epoch
    /// mean quadratic cost.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack is structurally invalid or the
    /// dataset does not fit it.
    pub fn train(
        &mut self,
        data: &Matrix<f32>,
        labels: &Matrix<f32>,
        epochs: usize,
        alpha: f32,
    ) -> Result<Vec<f32>> {
        self.check_structure(data, labels)?;

        let mut history = Vec::with_capacity(epochs);
        for _ in 0..epochs {
            for i in 0..data.n_rows() {
                let outputs = self.forward(&data.row(i))?;
                self.backward(&outputs, &labels.row(i), alpha)?;
            }
            history.push(self.loss(data, labels)?);
        }
        Ok(history)
    }

    /// Mean quadratic cost `0.5 * ||a - y||^2` over the dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset does not fit the network.
    pub fn loss(&self, data: &Matrix<f32>, labels: &Matrix<f32>) -> Result<f32> {
        self.check_structure(data, labels)?;

        let mut total = 0.0;
        for i in 0..data.n_rows() {
            let outputs = self.forward(&data.row(i))?;
            let output = &outputs[outputs.len() - 1][0];
            let label = labels.row(i);
            let mut cost = 0.0;
            for j in 0..output.n_cols() {
                let diff = output.get(0, j) - label[j];
                cost += diff * diff;
            }
            total += 0.5 * cost;
        }
        Ok(total / data.n_rows() as f32)
    }

    /// Predicts the class of one flat image row.
    ///
    /// # Errors
    ///
    /// Returns an error if the image does not fit the data layer.
    pub fn predict(&self, image_row: &Vector<f32>) -> Result<usize> {
        if self.layers.len() < 3 {
            return Err(MatrizError::Other(
                "a convolutional network needs at least three layers".to_string(),
            ));
        }
        if !matches!(self.layers.last(), Some(Layer::FullConnection { .. })) {
            return Err(MatrizError::Other(
                "the last layer must be a full-connection layer".to_string(),
            ));
        }
        let outputs = self.forward(image_row)?;
        let output = &outputs[outputs.len() - 1][0];
        output
            .row(0)
            .argmax()
            .ok_or_else(|| MatrizError::empty_input("network output"))
    }
}

impl Default for Cnn {
    fn default() -> Self {
        Self::new()
    }
}

fn last_output<'a>(outputs: &'a [Vec<Matrix<f32>>]) -> Result<&'a Vec<Matrix<f32>>> {
    outputs
        .last()
        .ok_or_else(|| MatrizError::empty_input("layer outputs"))
}

/// Squashes a pre-activation into (0, 1).
fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

/// Valid cross-correlation accumulated into `out`.
fn correlate_valid(input: &Matrix<f32>, kernel: &Matrix<f32>, stride: usize, out: &mut Matrix<f32>) {
    let (k_rows, k_cols) = kernel.shape();
    for u in 0..out.n_rows() {
        for v in 0..out.n_cols() {
            let mut sum = out.get(u, v);
            for i in 0..k_rows {
                for j in 0..k_cols {
                    sum += input.get(u * stride + i, v * stride + j) * kernel.get(i, j);
                }
            }
            out.set(u, v, sum);
        }
    }
}

/// Scatters an output delta back through a kernel into the input-shaped
/// accumulator.
fn scatter_delta(delta: &Matrix<f32>, kernel: &Matrix<f32>, stride: usize, out: &mut Matrix<f32>) {
    let (k_rows, k_cols) = kernel.shape();
    for u in 0..delta.n_rows() {
        for v in 0..delta.n_cols() {
            let d = delta.get(u, v);
            for i in 0..k_rows {
                for j in 0..k_cols {
                    let r = u * stride + i;
                    let c = v * stride + j;
                    out.set(r, c, out.get(r, c) + d * kernel.get(i, j));
                }
            }
        }
    }
}

/// Mean over non-overlapping `scale x scale` blocks.
fn mean_pool(input: &Matrix<f32>, scale: usize) -> Matrix<f32> {
    let out_rows = input.n_rows() / scale;
    let out_cols = input.n_cols() / scale;
    let norm = (scale * scale) as f32;

    let mut out = Matrix::zeros(out_rows, out_cols);
    for u in 0..out_rows {
        for v in 0..out_cols {
            let mut sum = 0.0;
            for i in 0..scale {
                for j in 0..scale {
                    sum += input.get(u * scale + i, v * scale + j);
                }
            }
            out.set(u, v, sum / norm);
        }
    }
    out
}

/// Spreads a pooled delta evenly back over each block.
fn upsample_mean_delta(delta: &Matrix<f32>, scale: usize) -> Matrix<f32> {
    let norm = (scale * scale) as f32;
    let mut out = Matrix::zeros(delta.n_rows() * scale, delta.n_cols() * scale);
    for u in 0..delta.n_rows() {
        for v in 0..delta.n_cols() {
            let share = delta.get(u, v) / norm;
            for i in 0..scale {
                for j in 0..scale {
                    out.set(u * scale + i, v * scale + j, share);
                }
            }
        }
    }
    out
}

/// Channels flattened row-major in channel order.
fn flatten(channels: &[Matrix<f32>]) -> Vector<f32> {
    let mut flat = Vec::new();
    for channel in channels {
        flat.extend_from_slice(channel.as_slice());
    }
    Vector::from_vec(flat)
}

/// Splits a flat delta back into the channel shapes of `reference`.
fn unflatten(flat: &Vector<f32>, reference: &[Matrix<f32>]) -> Vec<Matrix<f32>> {
    let mut channels = Vec::with_capacity(reference.len());
    let mut offset = 0;
    for channel in reference {
        let (rows, cols) = channel.shape();
        let mut out = Matrix::zeros(rows, cols);
        for idx in 0..rows * cols {
            out.set_at(idx, flat[offset + idx]);
        }
        offset += rows * cols;
        channels.push(out);
    }
    channels
}
