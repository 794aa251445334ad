//! Least-squares regression on the dense matrix engine.
//!
//! Ordinary Least Squares solved through the normal equations:
//! transpose, multiply, invert.

use crate::error::{MatrizError, Result};
use crate::metrics::r_squared;
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;

/// Ordinary least squares over the dense engine.
///
/// # Solver
///
/// Normal equations, materialized step by step through the matrix engine:
/// `β = (XᵀX)⁻¹ Xᵀy` via `transpose_into`, `matmul_into`, and `inverse`.
/// A singular `XᵀX` (collinear features) surfaces as a `SingularMatrix`
/// error.
///
/// # Examples
///
/// ```
/// use matriz::prelude::*;
///
/// // Four collinear points on y = 4x - 3.
/// let x = Matrix::from_vec(4, 1, vec![1.0_f32, 2.0, 3.0, 4.0]).unwrap();
/// let y = Vector::from_slice(&[1.0, 5.0, 9.0, 13.0]);
///
/// let mut model = LinearRegression::new();
/// model.fit(&x, &y).unwrap();
///
/// assert!(model.score(&x, &y) > 0.99);
/// assert!((model.intercept() - (-3.0)).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct LinearRegression {
    /// Learned feature weights, intercept excluded.
    coefficients: Option<Vector<f32>>,
    /// Learned bias, `0.0` when the intercept is disabled.
    intercept: f32,
    /// Controls the ones column prepended during `fit`.
    fit_intercept: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Creates an unfitted model; the intercept is enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            fit_intercept: true,
        }
    }

    /// Enables or disables the intercept column.
    #[must_use]
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
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

    /// Prepends a constant column of ones for the intercept.
    fn add_intercept_column(x: &Matrix<f32>) -> Matrix<f32> {
        let (n_rows, n_cols) = x.shape();
        let mut design = Matrix::zeros(n_rows, n_cols + 1);
        for i in 0..n_rows {
            design.set(i, 0, 1.0);
            for j in 0..n_cols {
                design.set(i, j + 1, x.get(i, j));
            }
        }
        design
    }
}

impl Estimator for LinearRegression {
    /// Solves the normal equations `(XᵀX)β = Xᵀy` by explicit inversion.
    ///
    /// # Errors
    ///
    /// Fails when `x` and `y` disagree on the sample count, when there
    /// are fewer samples than unknowns, or when `XᵀX` is singular
    /// (collinear features).
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples != y.len() {
            return Err(MatrizError::dimension_mismatch(
                "samples",
                n_samples,
                y.len(),
            ));
        }

        if n_samples == 0 {
            return Err(MatrizError::empty_input("design matrix"));
        }

        let required_samples = if self.fit_intercept {
            n_features + 1
        } else {
            n_features
        };

        if n_samples < required_samples {
            return Err(MatrizError::dimension_mismatch(
                "minimum samples",
                required_samples,
                n_samples,
            ));
        }

        let x_design = if self.fit_intercept {
            Self::add_intercept_column(x)
        } else {
            x.clone()
        };

        let mut xt = Matrix::new();
        x_design.transpose_into(&mut xt);

        let mut xtx = Matrix::new();
        xt.matmul_into(&x_design, &mut xtx)?;

        let mut xtx_inv = Matrix::new();
        xtx.inverse(&mut xtx_inv)?;

        let xty = xt.matvec(y)?;
        let beta = xtx_inv.matvec(&xty)?;

        if self.fit_intercept {
            self.intercept = beta[0];
            self.coefficients = Some(Vector::from_slice(&beta.as_slice()[1..]));
        } else {
            self.intercept = 0.0;
            self.coefficients = Some(beta);
        }

        Ok(())
    }

    /// Predicts one target value per row of `x`.
    ///
    /// # Panics
    ///
    /// Panics when called before a successful `fit`.
    fn predict(&self, x: &Matrix<f32>) -> Vector<f32> {
        let coefficients = self
            .coefficients
            .as_ref()
            .expect("model not fitted; call fit() first");
        let mut predictions = Vec::with_capacity(x.n_rows());
        for i in 0..x.n_rows() {
            predictions.push(x.row(i).dot(coefficients) + self.intercept);
        }
        Vector::from_vec(predictions)
    }

    /// Computes R² on the given data.
    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> f32 {
        r_squared(&self.predict(x), y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_recovers_line() {
        // y = 2x + 1
        let x = Matrix::from_vec(4, 1, vec![1.0_f32, 2.0, 3.0, 4.0]).expect("4*1=4 elements");
        let y = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0]);

        let mut model = LinearRegression::new();
        model.fit(&x, &y).expect("well-conditioned system");

        assert!((model.coefficients()[0] - 2.0).abs() < 1e-3);
        assert!((model.intercept() - 1.0).abs() < 1e-3);
        assert!(model.score(&x, &y) > 0.99);
    }

    #[test]
    fn test_fit_without_intercept() {
        // y = 3x through the origin
        let x = Matrix::from_vec(3, 1, vec![1.0_f32, 2.0, 3.0]).expect("3*1=3 elements");
        let y = Vector::from_slice(&[3.0, 6.0, 9.0]);

        let mut model = LinearRegression::new().with_intercept(false);
        model.fit(&x, &y).expect("well-conditioned system");

        assert!((model.coefficients()[0] - 3.0).abs() < 1e-3);
        assert!(model.intercept().abs() < 1e-6);
    }

    #[test]
    fn test_fit_two_features() {
        // y = x0 + 2*x1
        let x = Matrix::from_vec(
            4,
            2,
            vec![1.0_f32, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0],
        )
        .expect("4*2=8 elements");
        let y = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]);

        let mut model = LinearRegression::new();
        model.fit(&x, &y).expect("well-conditioned system");

        let predictions = model.predict(&x);
        for (p, t) in predictions.as_slice().iter().zip(y.as_slice().iter()) {
            assert!((p - t).abs() < 1e-3);
        }
    }

    #[test]
    fn test_fit_singular_design() {
        // Second column is a copy of the first: X^T X is singular.
        let x = Matrix::from_vec(3, 2, vec![1.0_f32, 1.0, 2.0, 2.0, 3.0, 3.0])
            .expect("3*2=6 elements");
        let y = Vector::from_slice(&[1.0, 2.0, 3.0]);

        let mut model = LinearRegression::new();
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_fit_dimension_mismatch() {
        let x = Matrix::from_vec(3, 1, vec![1.0_f32, 2.0, 3.0]).expect("3*1=3 elements");
        let y = Vector::from_slice(&[1.0, 2.0]);

        let mut model = LinearRegression::new();
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_is_fitted() {
        let mut model = LinearRegression::new();
        assert!(!model.is_fitted());

        let x = Matrix::from_vec(2, 1, vec![1.0_f32, 2.0]).expect("2*1=2 elements");
        let y = Vector::from_slice(&[1.0, 2.0]);
        model.fit(&x, &y).expect("well-conditioned system");
        assert!(model.is_fitted());
    }

    #[test]
    #[should_panic(expected = "not fitted")]
    fn test_predict_unfitted_panics() {
        let model = LinearRegression::new();
        let x = Matrix::from_vec(1, 1, vec![1.0_f32]).expect("1*1=1 element");
        let _ = model.predict(&x);
    }
}
