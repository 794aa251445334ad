//! Readers for the datasets used by the bundled demos.
//!
//! [`mnist`] parses the IDX image and label files of the MNIST
//! handwriting set into binarized feature matrices. [`sequence`] parses
//! tokenized text corpora into one-hot timestep matrices for recurrent
//! models.

pub mod mnist;
pub mod sequence;

/// Caps a record count to an optional limit.
pub(crate) fn apply_limit(count: usize, limit: Option<usize>) -> usize {
    match limit {
        Some(cap) if cap < count => cap,
        _ => count,
    }
}
