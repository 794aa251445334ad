//! Recurrent network over one-hot sequences.
//!
//! The trainer runs mini-batch SGD where each batch fans out across OS
//! threads: every sample gets its own zeroed gradient accumulator, waves
//! of scoped threads fill the accumulators in parallel while the
//! parameters are only read, and a sequential reduction folds the
//! accumulators together before one scaled update. Run-to-run results
//! for a given batch do not depend on the thread count.

mod layer;

pub use layer::RnnLayer;

use std::num::NonZeroUsize;
use std::path::Path;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{MatrizError, Result};
use crate::primitives::Matrix;
use crate::serialization::{load_matrices, save_matrices};

/// Model tag stored in saved archives.
const MODEL_TAG: &str = "rnn";

/// Truncation depth used unless overridden.
const DEFAULT_BPTT_TRUNCATE: usize = 4;

/// Recurrent network with one hidden layer.
///
/// Weights follow the usual three-matrix layout: `U` maps input rows into
/// the hidden state, `W` carries the hidden state across timesteps, and
/// `V` maps the hidden state to output scores.
#[derive(Debug, Clone)]
pub struct Rnn {
    /// Input and output width (vocabulary size for one-hot sequences).
    feature_dim: usize,
    /// Hidden state width.
    hidden_dim: usize,
    /// Input weights, `hidden_dim x feature_dim`.
    u: Matrix<f32>,
    /// Recurrent weights, `hidden_dim x hidden_dim`.
    w: Matrix<f32>,
    /// Output weights, `feature_dim x hidden_dim`.
    v: Matrix<f32>,
    /// Forward and backward passes.
    layer: RnnLayer,
    /// Thread count override for batch updates.
    workers: Option<usize>,
}

impl Rnn {
    /// Creates a network with entropy-seeded uniform initialization.
    ///
    /// Each weight is drawn from `±1/sqrt(incoming dimension)`.
    #[must_use]
    pub fn new(feature_dim: usize, hidden_dim: usize) -> Self {
        Self::init(feature_dim, hidden_dim, StdRng::from_entropy())
    }

    /// Creates a network with a fixed seed for reproducible initialization.
    #[must_use]
    pub fn with_seed(feature_dim: usize, hidden_dim: usize, seed: u64) -> Self {
        Self::init(feature_dim, hidden_dim, StdRng::seed_from_u64(seed))
    }

    fn init(feature_dim: usize, hidden_dim: usize, mut rng: StdRng) -> Self {
        let input_bound = 1.0 / (feature_dim as f32).sqrt();
        let hidden_bound = 1.0 / (hidden_dim as f32).sqrt();

        let mut fill = |rows: usize, cols: usize, bound: f32| {
            let mut weights = Matrix::zeros(rows, cols);
            for idx in 0..rows * cols {
                weights.set_at(idx, rng.gen_range(-bound..bound));
            }
            weights
        };

        let u = fill(hidden_dim, feature_dim, input_bound);
        let w = fill(hidden_dim, hidden_dim, hidden_bound);
        let v = fill(feature_dim, hidden_dim, hidden_bound);

        Self {
            feature_dim,
            hidden_dim,
            u,
            w,
            v,
            layer: RnnLayer::new(hidden_dim, DEFAULT_BPTT_TRUNCATE),
            workers: None,
        }
    }

    /// Sets the truncation depth for backpropagation through time.
    #[must_use]
    pub fn with_bptt_truncate(mut self, bptt_truncate: usize) -> Self {
        self.layer = RnnLayer::new(self.hidden_dim, bptt_truncate);
        self
    }

    /// Pins the number of worker threads per batch wave.
    ///
    /// Without an override the wave width follows the machine's available
    /// parallelism. The trained result is the same either way; the
    /// override exists to exercise fixed partitions.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Returns the input and output width.
    #[must_use]
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// Returns the hidden state width.
    #[must_use]
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Returns the input weights.
    #[must_use]
    pub fn u(&self) -> &Matrix<f32> {
        &self.u
    }

    /// Returns the recurrent weights.
    #[must_use]
    pub fn w(&self) -> &Matrix<f32> {
        &self.w
    }

    /// Returns the output weights.
    #[must_use]
    pub fn v(&self) -> &Matrix<f32> {
        &self.v
    }

    fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) if n > 0 => n,
            _ => thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }

    /// Checks every sample against its label and the vocabulary width.
    fn check_dataset(&self, data: &[Matrix<f32>], labels: &[Matrix<f32>]) -> Result<()> {
        if data.len() != labels.len() {
            return Err(MatrizError::dimension_mismatch(
                "sequences",
                data.len(),
                labels.len(),
            ));
        }
        if data.is_empty() {
            return Err(MatrizError::empty_input("training sequences"));
        }
        for (sample, label) in data.iter().zip(labels.iter()) {
            if sample.n_rows() != label.n_rows() {
                return Err(MatrizError::dimension_mismatch(
                    "label timesteps",
                    sample.n_rows(),
                    label.n_rows(),
                ));
            }
            if sample.n_cols() != self.feature_dim {
                return Err(MatrizError::dimension_mismatch(
                    "sequence columns",
                    self.feature_dim,
                    sample.n_cols(),
                ));
            }
            if label.n_cols() != self.feature_dim {
                return Err(MatrizError::dimension_mismatch(
                    "label columns",
                    self.feature_dim,
                    label.n_cols(),
                ));
            }
        }
        Ok(())
    }

    /// Trains with mini-batch SGD and returns the per-epoch loss history.
    ///
    /// The whole dataset is validated before any batch work starts, so a
    /// malformed dataset never leaves the parameters partially updated.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` for a malformed dataset and an error if
    /// `batch_size` is zero or a worker thread fails.
    pub fn sgd(
        &mut self,
        data: &[Matrix<f32>],
        labels: &[Matrix<f32>],
        epochs: usize,
        alpha: f32,
        batch_size: usize,
    ) -> Result<Vec<f32>> {
        self.check_dataset(data, labels)?;
        if batch_size == 0 {
            return Err(MatrizError::empty_input("batch_size"));
        }

        let mut history = Vec::with_capacity(epochs);
        for _ in 0..epochs {
            for (batch_data, batch_labels) in
                data.chunks(batch_size).zip(labels.chunks(batch_size))
            {
                self.mini_batch_update(batch_data, batch_labels, alpha)?;
            }
            history.push(self.loss(data, labels)?);
        }
        Ok(history)
    }

    /// Applies one averaged gradient step for a batch of samples.
    ///
    /// Each sample gets its own zeroed accumulator triple. Samples are
    /// processed in waves of `min(batch len, workers)` scoped threads;
    /// every wave is joined before the next starts. The accumulators are
    /// then folded into the first slot in sample order and the parameters
    /// move by `alpha / batch len` times the folded gradient.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` for malformed samples and an error if a
    /// worker thread panics. The parameters are untouched on error.
    pub fn mini_batch_update(
        &mut self,
        batch_data: &[Matrix<f32>],
        batch_labels: &[Matrix<f32>],
        alpha: f32,
    ) -> Result<()> {
        let batch_len = batch_data.len();
        if batch_len == 0 {
            return Ok(());
        }
        if batch_len != batch_labels.len() {
            return Err(MatrizError::dimension_mismatch(
                "batch labels",
                batch_len,
                batch_labels.len(),
            ));
        }

        let mut accumulators: Vec<(Matrix<f32>, Matrix<f32>, Matrix<f32>)> = (0..batch_len)
            .map(|_| {
                (
                    Matrix::zeros(self.hidden_dim, self.feature_dim),
                    Matrix::zeros(self.hidden_dim, self.hidden_dim),
                    Matrix::zeros(self.feature_dim, self.hidden_dim),
                )
            })
            .collect();

        let wave_width = self.worker_count().min(batch_len);
        let (u, w, v, layer) = (&self.u, &self.w, &self.v, &self.layer);

        for ((data_wave, label_wave), acc_wave) in batch_data
            .chunks(wave_width)
            .zip(batch_labels.chunks(wave_width))
            .zip(accumulators.chunks_mut(wave_width))
        {
            let outcomes = thread::scope(|scope| {
                let mut handles = Vec::with_capacity(data_wave.len());
                for ((sample, label), acc) in
                    data_wave.iter().zip(label_wave.iter()).zip(acc_wave.iter_mut())
                {
                    let (g_u, g_w, g_v) = acc;
                    handles.push(scope.spawn(move || {
                        layer.back_propagation(sample, label, u, w, v, g_u, g_w, g_v)
                    }));
                }
                handles
                    .into_iter()
                    .map(|handle| handle.join())
                    .collect::<Vec<_>>()
            });

            for outcome in outcomes {
                match outcome {
                    Ok(result) => result?,
                    Err(_) => {
                        return Err(MatrizError::Other(
                            "worker thread panicked during backpropagation".to_string(),
                        ));
                    }
                }
            }
        }

        // Fold in sample order so the update is identical for any wave width.
        let mut slots = accumulators.into_iter();
        let Some((mut sum_u, mut sum_w, mut sum_v)) = slots.next() else {
            return Ok(());
        };
        for (g_u, g_w, g_v) in slots {
            sum_u.add(&g_u)?;
            sum_w.add(&g_w)?;
            sum_v.add(&g_v)?;
        }

        let scale = alpha / batch_len as f32;
        sum_u.mul_scalar(scale);
        sum_w.mul_scalar(scale);
        sum_v.mul_scalar(scale);

        self.u.sub(&sum_u)?;
        self.w.sub(&sum_w)?;
        self.v.sub(&sum_v)?;
        Ok(())
    }

    /// Mean cross-entropy against the argmax of each label row.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` for a malformed dataset and an error if
    /// the dataset carries no timesteps at all.
    pub fn loss(&self, data: &[Matrix<f32>], labels: &[Matrix<f32>]) -> Result<f32> {
        self.check_dataset(data, labels)?;

        let mut total = 0.0_f32;
        let mut timesteps = 0_usize;
        let mut state = Matrix::new();
        let mut activation = Matrix::new();

        for (sample, label) in data.iter().zip(labels.iter()) {
            self.layer
                .feed_forward(sample, &self.u, &self.w, &self.v, &mut state, &mut activation)?;
            for t in 0..label.n_rows() {
                let target = label
                    .row(t)
                    .argmax()
                    .ok_or_else(|| MatrizError::empty_input("label row"))?;
                total -= activation.get(t, target).ln();
                timesteps += 1;
            }
        }

        if timesteps == 0 {
            return Err(MatrizError::empty_input("label timesteps"));
        }
        Ok(total / timesteps as f32)
    }

    /// Saves the parameter matrices to a tensor archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_matrices(
            path,
            MODEL_TAG,
            &[("u", &self.u), ("w", &self.w), ("v", &self.v)],
        )
    }

    /// Loads a network from a tensor archive written by [`Rnn::save`].
    ///
    /// Each stored tensor is assigned to the parameter of the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read, carries a different
    /// model tag, or its tensors are missing or inconsistently shaped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut tensors = load_matrices(path, MODEL_TAG)?;
        let mut take = |name: &str| {
            tensors.remove(name).ok_or_else(|| MatrizError::FormatError {
                message: format!("archive is missing tensor '{name}'"),
            })
        };
        let u = take("u")?;
        let w = take("w")?;
        let v = take("v")?;

        let (hidden_dim, feature_dim) = u.shape();
        if w.shape() != (hidden_dim, hidden_dim) {
            return Err(MatrizError::shape_mismatch((hidden_dim, hidden_dim), w.shape()));
        }
        if v.shape() != (feature_dim, hidden_dim) {
            return Err(MatrizError::shape_mismatch((feature_dim, hidden_dim), v.shape()));
        }

        Ok(Self {
            feature_dim,
            hidden_dim,
            u,
            w,
            v,
            layer: RnnLayer::new(hidden_dim, DEFAULT_BPTT_TRUNCATE),
            workers: None,
        })
    }
}
