//! The shared contract for supervised models trained on a feature matrix
//! and a target vector.

use crate::error::Result;
use crate::primitives::{Matrix, Vector};

/// Fit/predict/score contract for supervised estimators.
///
/// Rows of `x` are samples and columns are features; `y` carries one
/// target per row.
///
/// # Examples
///
/// ```
/// use matriz::prelude::*;
///
/// // Recover y = 0.5x from three points.
/// let x = Matrix::from_vec(3, 1, vec![2.0_f32, 4.0, 6.0]).unwrap();
/// let y = Vector::from_slice(&[1.0, 2.0, 3.0]);
///
/// let mut model = LinearRegression::new();
/// model.fit(&x, &y).unwrap();
/// assert!(model.score(&x, &y) > 0.99);
/// ```
pub trait Estimator {
    /// Learns parameters from the rows of `x` and their targets `y`.
    ///
    /// # Errors
    ///
    /// Returns an error when the inputs are malformed for this model
    /// (mismatched sample counts, collinear features, bad labels).
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()>;

    /// Predicts one target value per row of `x`.
    fn predict(&self, x: &Matrix<f32>) -> Vector<f32>;

    /// Computes the score (R² for regression, accuracy for classification).
    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> f32;
}
