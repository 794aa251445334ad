//! Vector type for 1D numeric data.

use serde::{Deserialize, Serialize};
use std::ops::Index;

use super::scalar::Scalar;

/// A 1D vector of numeric values.
///
/// Used for labels, coefficients and predictions alongside
/// [`Matrix`](super::Matrix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector<T> {
    data: Vec<T>,
}

impl<T: Scalar> Vector<T> {
    /// Creates an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates a vector from a Vec.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Creates a vector by copying a slice.
    #[must_use]
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Creates a vector of zeros.
    #[must_use]
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![T::zero(); n],
        }
    }

    /// Creates a vector of ones.
    #[must_use]
    pub fn ones(n: usize) -> Self {
        Self {
            data: vec![T::one(); n],
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn get(&self, idx: usize) -> T {
        self.data[idx]
    }

    /// Sets element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn set(&mut self, idx: usize, value: T) {
        self.data[idx] = value;
    }

    /// Appends an element.
    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    /// Returns the underlying data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the vector and returns the underlying buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Dot product with another vector.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    #[must_use]
    pub fn dot(&self, other: &Self) -> T {
        assert_eq!(self.len(), other.len(), "dot product length mismatch");
        let mut sum = T::zero();
        for (a, b) in self.data.iter().zip(other.data.iter()) {
            sum += *a * *b;
        }
        sum
    }

    /// Sum of all elements.
    #[must_use]
    pub fn sum(&self) -> T {
        let mut sum = T::zero();
        for x in &self.data {
            sum += *x;
        }
        sum
    }

    /// Arithmetic mean of the elements as `f32`.
    ///
    /// Returns 0.0 for an empty vector.
    #[must_use]
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let total: f32 = self.data.iter().map(|x| x.to_f32_lossy()).sum();
        total / self.data.len() as f32
    }

    /// Index of the first maximum element, or `None` for an empty vector.
    #[must_use]
    pub fn argmax(&self) -> Option<usize> {
        if self.data.is_empty() {
            return None;
        }
        let mut best = 0;
        for i in 1..self.data.len() {
            if self.data[i] > self.data[best] {
                best = i;
            }
        }
        Some(best)
    }
}

impl<T: Scalar> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.data[idx]
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
