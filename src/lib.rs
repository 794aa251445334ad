//! Matriz: dense-matrix machine learning toolkit in pure Rust.
//!
//! Matriz provides a small dense-matrix engine and the classic models
//! built on top of it, from least-squares regression to recurrent and
//! convolutional networks, with deterministic seeded training.
//!
//! # Quick Start
//!
//! ```
//! use matriz::prelude::*;
//!
//! // The dense engine: invert a 2x2 and check the product.
//! let mut m = Matrix::from_vec(2, 2, vec![4.0_f32, 7.0, 2.0, 6.0]).unwrap();
//! let mut inv = Matrix::new();
//! m.inverse(&mut inv).unwrap();
//! let mut product = inv.clone();
//! product.matmul(&m).unwrap();
//! assert!((product.get(0, 0) - 1.0).abs() < 1e-5);
//!
//! // A model on top of it: fit y = 3x - 2.
//! let x = Matrix::from_vec(4, 1, vec![1.0_f32, 2.0, 3.0, 4.0]).unwrap();
//! let y = Vector::from_slice(&[1.0, 4.0, 7.0, 10.0]);
//! let mut model = LinearRegression::new();
//! model.fit(&x, &y).unwrap();
//! assert!(model.score(&x, &y) > 0.99);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Dense row-major matrices and vectors
//! - [`data`]: CountingMap and LabeledMatrix containers
//! - [`model_selection`]: Epoch-level row shuffling
//! - [`linear_model`]: Ordinary least squares regression
//! - [`classification`]: Logistic regression with gradient-descent schedules
//! - [`nn`]: Fully connected feed-forward networks
//! - [`rnn`]: Recurrent networks with truncated BPTT
//! - [`cnn`]: Layered convolutional networks
//! - [`metrics`]: MSE, R² and accuracy
//! - [`serialization`]: Model archive format
//! - [`datasets`]: IDX and tokenized-corpus readers

pub mod classification;
pub mod cnn;
pub mod data;
/// Readers for the datasets used by the bundled demos.
pub mod datasets;
pub mod error;
pub mod linear_model;
pub mod metrics;
pub mod model_selection;
pub mod nn;
pub mod prelude;
pub mod primitives;
/// Recurrent networks trained by wave-scheduled mini-batch SGD.
pub mod rnn;
pub mod serialization;
pub mod traits;

pub use error::{MatrizError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::Estimator;
