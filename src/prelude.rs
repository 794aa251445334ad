//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use matriz::prelude::*;
//! ```

pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::Estimator;
pub use crate::data::{CountingMap, LabeledMatrix};
pub use crate::model_selection::MatrixShuffler;
pub use crate::linear_model::LinearRegression;
pub use crate::classification::{GradientDescent, LogisticRegression};
pub use crate::nn::Network;
pub use crate::rnn::{Rnn, RnnLayer};
pub use crate::cnn::{Cnn, LayerSpec};
pub use crate::metrics::{accuracy, mse, r_squared};
