//! Binary classifiers.
//!
//! Logistic regression with three gradient descent schedules:
//! full-batch, per-sample stochastic, and stochastic with a decaying
//! step size and random draw order.
//!
//! # Example
//!
//! ```
//! use matriz::classification::LogisticRegression;
//! use matriz::prelude::*;
//!
//! // OR gate: linearly separable
//! let x = Matrix::from_vec(4, 2, vec![
//!     0.0_f32, 0.0,
//!     0.0, 1.0,
//!     1.0, 0.0,
//!     1.0, 1.0,
//! ]).expect("4*2=8 elements");
//! let y = Vector::from_slice(&[0.0, 1.0, 1.0, 1.0]);
//!
//! let mut model = LogisticRegression::new()
//!     .with_learning_rate(0.5)
//!     .with_epochs(500);
//! model.fit(&x, &y).expect("labels are all 0 or 1");
//!
//! assert!(model.score(&x, &y) > 0.99);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::accuracy;
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;

/// Gradient descent schedule for [`LogisticRegression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradientDescent {
    /// Full-gradient steps over the whole dataset each epoch.
    #[default]
    Batch,
    /// Per-sample updates, visiting rows in order.
    Stochastic,
    /// Per-sample updates with a decaying step size and random
    /// draw order without replacement.
    SmoothStochastic,
}

/// Sigmoid-activated binary classifier trained by gradient descent.
///
/// The update
/// schedule is selected with [`GradientDescent`]; all three schedules move
/// the weights along `α · error · x` for each contributing sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Per-feature weights, `None` until trained.
    coefficients: Option<Vector<f32>>,
    /// Bias added to every decision value.
    intercept: f32,
    /// Step size `α` applied to each gradient.
    learning_rate: f32,
    /// Number of training epochs
    epochs: usize,
    /// Update schedule
    mode: GradientDescent,
    /// Seed for the random draw order of `SmoothStochastic`
    seed: Option<u64>,
}

impl LogisticRegression {
    /// Creates an untrained classifier with batch updates and `α = 0.01`.
    ///
    /// # Example
    ///
    /// ```
    /// use matriz::classification::LogisticRegression;
    ///
    /// let model = LogisticRegression::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            learning_rate: 0.01,
            epochs: 150,
            mode: GradientDescent::Batch,
            seed: None,
        }
    }

    /// Overrides the gradient step size.
    #[must_use]
    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the number of training epochs.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the gradient descent schedule.
    #[must_use]
    pub fn with_mode(mut self, mode: GradientDescent) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the seed for the random draw order of `SmoothStochastic`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the learned weights, one per feature column.
    ///
    /// # Panics
    ///
    /// Panics when called before a successful `fit`.
    #[must_use]
    pub fn coefficients(&self) -> &Vector<f32> {
        self.coefficients
            .as_ref()
            .expect("model not fitted; call fit() first")
    }

    /// Returns the fitted intercept, `0.0` until `fit` runs.
    #[must_use]
    pub fn intercept(&self) -> f32 {
        self.intercept
    }

    /// Reports whether `fit` has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Logistic sigmoid, 1 / (1 + e^(-z)).
    fn sigmoid(z: f32) -> f32 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Returns `P(class == 1)` for every row of `x`.
    ///
    /// # Panics
    ///
    /// Panics when called before a successful `fit`.
    #[must_use]
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Vector<f32> {
        let coef = self
            .coefficients
            .as_ref()
            .expect("model not fitted; call fit() first");
        let (n_samples, _) = x.shape();

        let mut probas = Vec::with_capacity(n_samples);
        for row in 0..n_samples {
            let mut z = self.intercept;
            for col in 0..coef.len() {
                z += coef[col] * x.get(row, col);
            }
            probas.push(Self::sigmoid(z));
        }

        Vector::from_vec(probas)
    }

    /// One full-gradient epoch: accumulate `error · x` over every sample,
    /// then step once.
    fn batch_epoch(x: &Matrix<f32>, y: &Vector<f32>, w: &mut [f32], b: &mut f32, alpha: f32) {
        let (n_samples, n_features) = x.shape();
        let mut coef_grad = vec![0.0; n_features];
        let mut intercept_grad = 0.0;

        for i in 0..n_samples {
            let error = y[i] - Self::sigmoid(decision(x, i, w, *b));
            intercept_grad += error;
            for (j, grad) in coef_grad.iter_mut().enumerate() {
                *grad += error * x.get(i, j);
            }
        }

        *b += alpha * intercept_grad;
        for (wj, grad) in w.iter_mut().zip(coef_grad.iter()) {
            *wj += alpha * grad;
        }
    }

    /// One per-sample update step against row `i`.
    fn sample_step(x: &Matrix<f32>, y: &Vector<f32>, w: &mut [f32], b: &mut f32, alpha: f32, i: usize) {
        let error = y[i] - Self::sigmoid(decision(x, i, w, *b));
        *b += alpha * error;
        for (j, wj) in w.iter_mut().enumerate() {
            *wj += alpha * error * x.get(i, j);
        }
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// Decision value `w · x_i + b` for row `i`.
fn decision(x: &Matrix<f32>, row: usize, w: &[f32], b: f32) -> f32 {
    let mut z = b;
    for (j, wj) in w.iter().enumerate() {
        z += wj * x.get(row, j);
    }
    z
}

impl Estimator for LogisticRegression {
    /// Fits the model with the configured gradient descent schedule.
    ///
    /// # Arguments
    ///
    /// * `x` - Feature matrix (`n_samples` × `n_features`)
    /// * `y` - Binary labels (`n_samples`), must be 0.0 or 1.0
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match, the dataset is empty,
    /// or any label is not 0.0 or 1.0.
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples != y.len() {
            return Err("Number of samples in X and y must match".into());
        }
        if n_samples == 0 {
            return Err("Cannot fit with zero samples".into());
        }
        for i in 0..y.len() {
            let label = y[i];
            if label != 0.0 && label != 1.0 {
                return Err("Labels must be 0 or 1 for binary classification".into());
            }
        }

        let mut w = vec![0.0; n_features];
        let mut b = 0.0;

        match self.mode {
            GradientDescent::Batch => {
                for _ in 0..self.epochs {
                    Self::batch_epoch(x, y, &mut w, &mut b, self.learning_rate);
                }
            }
            GradientDescent::Stochastic => {
                for _ in 0..self.epochs {
                    for i in 0..n_samples {
                        Self::sample_step(x, y, &mut w, &mut b, self.learning_rate, i);
                    }
                }
            }
            GradientDescent::SmoothStochastic => {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                for epoch in 0..self.epochs {
                    let mut pool: Vec<usize> = (0..n_samples).collect();
                    for i in 0..n_samples {
                        // Step size decays with progress but never
                        // reaches zero.
                        let alpha = 4.0 / (1.0 + epoch as f32 + i as f32) + 0.01;
                        let pick = rng.gen_range(0..pool.len());
                        let row = pool.swap_remove(pick);
                        Self::sample_step(x, y, &mut w, &mut b, alpha, row);
                    }
                }
            }
        }

        self.coefficients = Some(Vector::from_vec(w));
        self.intercept = b;
        Ok(())
    }

    /// Predicts class labels (0.0 or 1.0) with a 0.5 threshold.
    ///
    /// # Panics
    ///
    /// Panics when called before a successful `fit`.
    fn predict(&self, x: &Matrix<f32>) -> Vector<f32> {
        let probas = self.predict_proba(x);
        let labels = probas
            .as_slice()
            .iter()
            .map(|&p| if p >= 0.5 { 1.0 } else { 0.0 })
            .collect();
        Vector::from_vec(labels)
    }

    /// Computes accuracy on the given data.
    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> f32 {
        accuracy(&self.predict(x), y)
    }
}
