//! Core compute primitives (Scalar, Vector, Matrix).
//!
//! These types provide the foundation for everything else in the crate.

mod matrix;
mod scalar;
mod vector;

pub use matrix::Matrix;
pub use scalar::Scalar;
pub use vector::Vector;
