//! Evaluation metrics for regression and classification.

use crate::primitives::Vector;

/// Coefficient of determination, R² = 1 - SS_res / SS_tot.
///
/// # Examples
///
/// ```
/// use matriz::metrics::r_squared;
/// use matriz::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0]);
/// let y_pred = Vector::from_slice(&[2.1, 3.8, 6.2, 7.9]);
/// let r2 = r_squared(&y_pred, &y_true);
/// assert!(r2 > 0.99);
/// ```
///
/// # Panics
///
/// Panics when the vectors differ in length.
#[must_use]
pub fn r_squared(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "vectors must have the same length");

    let mean = y_true.mean();
    let residual: f32 = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let total: f32 = y_true.as_slice().iter().map(|t| (t - mean).powi(2)).sum();

    // A constant target has no variance to explain.
    if total == 0.0 {
        return 0.0;
    }
    1.0 - residual / total
}

/// Mean squared error, Σ(y_true - y_pred)² / n.
///
/// # Panics
///
/// Panics when the vectors differ in length or are empty.
#[must_use]
pub fn mse(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "vectors must have the same length");
    assert!(!y_true.is_empty(), "vectors must be non-empty");

    let squared_total: f32 = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    squared_total / y_true.len() as f32
}

/// Fraction of predictions that exactly match their labels.
///
/// # Examples
///
/// ```
/// use matriz::metrics::accuracy;
/// use matriz::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[1.0, 0.0, 1.0, 1.0]);
/// let y_pred = Vector::from_slice(&[1.0, 0.0, 0.0, 1.0]);
/// assert!((accuracy(&y_pred, &y_true) - 0.75).abs() < 1e-6);
/// ```
///
/// # Panics
///
/// Panics when the vectors differ in length or are empty.
#[must_use]
pub fn accuracy(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "vectors must have the same length");
    assert!(!y_true.is_empty(), "vectors must be non-empty");

    let hits = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .filter(|(t, p)| (*t - *p).abs() < f32::EPSILON)
        .count();
    hits as f32 / y_true.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r_squared_perfect_fit() {
        let y = Vector::from_slice(&[1.0, 2.0, 3.0]);
        assert!((r_squared(&y, &y) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_r_squared_constant_truth_is_zero() {
        let y_true = Vector::from_slice(&[2.0, 2.0, 2.0]);
        let y_pred = Vector::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(r_squared(&y_pred, &y_true), 0.0);
    }

    #[test]
    fn test_mse() {
        let y_true = Vector::from_slice(&[1.0, 2.0]);
        let y_pred = Vector::from_slice(&[2.0, 4.0]);
        // (1 + 4) / 2 = 2.5
        assert!((mse(&y_pred, &y_true) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_mse_zero_for_exact_predictions() {
        let y = Vector::from_slice(&[1.5, -2.0, 0.0]);
        assert!(mse(&y, &y).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy() {
        let y_true = Vector::from_slice(&[1.0, 0.0, 1.0, 0.0]);
        let y_pred = Vector::from_slice(&[1.0, 1.0, 1.0, 0.0]);
        assert!((accuracy(&y_pred, &y_true) - 0.75).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_length_mismatch_panics() {
        let a = Vector::from_slice(&[1.0]);
        let b = Vector::from_slice(&[1.0, 2.0]);
        let _ = mse(&a, &b);
    }
}
