//! Labeled datasets and label statistics.
//!
//! [`LabeledMatrix`] pairs a feature matrix with a label vector and caches
//! the statistics decision-tree style algorithms keep asking for (label
//! frequencies, per-feature value frequencies, shannon entropy).
//! [`CountingMap`] is the frequency map behind those statistics.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{MatrizError, Result};
use crate::primitives::{Matrix, Scalar, Vector};

/// Frequency map with a cached arg-max.
///
/// Counts how many times each value has been inserted. Keys are stored in
/// sorted order, so iteration and tie-breaking are deterministic: when two
/// values share the maximum count, [`max`](CountingMap::max) returns the
/// smallest value.
///
/// # Examples
///
/// ```
/// use matriz::data::CountingMap;
///
/// let mut map = CountingMap::new();
/// map.insert(1);
/// map.insert(1);
/// map.insert(7);
/// assert_eq!(map.max(), Some((1, 2)));
/// ```
#[derive(Debug, Clone)]
pub struct CountingMap<T: Scalar> {
    counts: BTreeMap<T::Key, usize>,
    cache_max: Option<(T, usize)>,
}

impl<T: Scalar> CountingMap<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
            cache_max: None,
        }
    }

    /// Increments the count for `value`.
    pub fn insert(&mut self, value: T) {
        *self.counts.entry(value.key()).or_insert(0) += 1;
        self.cache_max = None;
    }

    /// Returns the count recorded for `value` (0 if never inserted).
    #[must_use]
    pub fn count(&self, value: T) -> usize {
        self.counts.get(&value.key()).copied().unwrap_or(0)
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of insertions (sum of all counts).
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterates over `(value, count)` pairs in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (T, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (T::from_key(*k), *v))
    }

    /// Returns the most frequent value and its count.
    ///
    /// `None` when the map is empty. Ties resolve to the smallest value.
    /// The result is cached until the next insertion.
    pub fn max(&mut self) -> Option<(T, usize)> {
        if self.cache_max.is_none() {
            let mut best: Option<(T, usize)> = None;
            for (value, count) in self.iter() {
                match best {
                    Some((_, best_count)) if count <= best_count => {}
                    _ => best = Some((value, count)),
                }
            }
            self.cache_max = best;
        }
        self.cache_max
    }
}

impl<T: Scalar> Default for CountingMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A feature matrix paired with one label per row.
///
/// Feature columns carry numeric names (defaulting to their indices) so a
/// column keeps its identity after [`split`](LabeledMatrix::split) drops a
/// column. Label statistics are computed lazily and cached; every data or
/// label replacement clears the caches.
#[derive(Debug, Clone)]
pub struct LabeledMatrix<T: Scalar> {
    matrix: Matrix<T>,
    labels: Vector<T>,
    feature_names: Vec<usize>,
    cache_shannon_entropy: Option<f32>,
    cache_label_counts: Option<CountingMap<T>>,
    cache_feature_counts: BTreeMap<usize, CountingMap<T>>,
}

impl<T: Scalar> LabeledMatrix<T> {
    /// Creates a labeled matrix. Feature names default to column indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the label count doesn't match the row count.
    pub fn new(matrix: Matrix<T>, labels: Vector<T>) -> Result<Self> {
        if labels.len() != matrix.n_rows() {
            return Err(MatrizError::dimension_mismatch(
                "labels",
                matrix.n_rows(),
                labels.len(),
            ));
        }
        let feature_names = (0..matrix.n_cols()).collect();
        Ok(Self {
            matrix,
            labels,
            feature_names,
            cache_shannon_entropy: None,
            cache_label_counts: None,
            cache_feature_counts: BTreeMap::new(),
        })
    }

    /// Creates a labeled matrix with explicit feature names.
    ///
    /// # Errors
    ///
    /// Returns an error if the label count doesn't match the row count or
    /// the name count doesn't match the column count.
    pub fn with_feature_names(
        matrix: Matrix<T>,
        labels: Vector<T>,
        feature_names: Vec<usize>,
    ) -> Result<Self> {
        if feature_names.len() != matrix.n_cols() {
            return Err(MatrizError::dimension_mismatch(
                "feature names",
                matrix.n_cols(),
                feature_names.len(),
            ));
        }
        let mut labeled = Self::new(matrix, labels)?;
        labeled.feature_names = feature_names;
        Ok(labeled)
    }

    /// The feature matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix<T> {
        &self.matrix
    }

    /// The label vector.
    #[must_use]
    pub fn labels(&self) -> &Vector<T> {
        &self.labels
    }

    /// Number of samples (rows).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.matrix.n_rows()
    }

    /// Number of features (columns).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.matrix.n_cols()
    }

    /// The feature name carried by column `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    #[must_use]
    pub fn feature_name(&self, idx: usize) -> usize {
        self.feature_names[idx]
    }

    /// All feature names, one per column.
    #[must_use]
    pub fn feature_names(&self) -> &[usize] {
        &self.feature_names
    }

    /// The label of row `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    #[must_use]
    pub fn get_label(&self, idx: usize) -> T {
        self.labels.get(idx)
    }

    /// Replaces data and labels by copying, clearing every cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length doesn't match `rows * cols`
    /// or the label count doesn't match `rows`.
    pub fn set_data(&mut self, data: &[T], labels: &[T], rows: usize, cols: usize) -> Result<()> {
        if labels.len() != rows {
            return Err(MatrizError::dimension_mismatch(
                "labels",
                rows,
                labels.len(),
            ));
        }
        self.matrix.set_data(data, rows, cols)?;
        self.labels = Vector::from_slice(labels);
        self.feature_names = (0..cols).collect();
        self.clear_cache();
        Ok(())
    }

    /// Replaces data and labels by adopting the caller's buffers, clearing
    /// every cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length doesn't match `rows * cols`
    /// or the label count doesn't match `rows`.
    pub fn set_shallow_data(
        &mut self,
        data: Vec<T>,
        labels: Vec<T>,
        rows: usize,
        cols: usize,
    ) -> Result<()> {
        if labels.len() != rows {
            return Err(MatrizError::dimension_mismatch(
                "labels",
                rows,
                labels.len(),
            ));
        }
        self.matrix.set_shallow_data(data, rows, cols)?;
        self.labels = Vector::from_vec(labels);
        self.feature_names = (0..cols).collect();
        self.clear_cache();
        Ok(())
    }

    /// Shannon entropy of the label distribution, `-sum(p * log2(p))`.
    ///
    /// 0.0 for a single-label (or empty) set, `log2(k)` for a uniform
    /// k-way split. Cached until the next data replacement.
    pub fn shannon_entropy(&mut self) -> f32 {
        if let Some(e) = self.cache_shannon_entropy {
            return e;
        }
        let n = self.labels.len() as f32;
        let entropy = if n == 0.0 {
            0.0
        } else {
            let mut e = 0.0;
            for (_, count) in self.label_counts().iter() {
                let p = count as f32 / n;
                e -= p * p.log2();
            }
            e
        };
        self.cache_shannon_entropy = Some(entropy);
        entropy
    }

    /// Frequencies of each label value. Lazily built and cached.
    pub fn label_counts(&mut self) -> &mut CountingMap<T> {
        if self.cache_label_counts.is_none() {
            let mut map = CountingMap::new();
            for label in self.labels.iter() {
                map.insert(*label);
            }
            self.cache_label_counts = Some(map);
        }
        self.cache_label_counts.get_or_insert_with(CountingMap::new)
    }

    /// Frequencies of the values in feature column `feature_idx`.
    /// Lazily built and cached per column.
    ///
    /// # Errors
    ///
    /// Returns an error if `feature_idx` is out of bounds.
    pub fn feature_counts(&mut self, feature_idx: usize) -> Result<&mut CountingMap<T>> {
        if feature_idx >= self.matrix.n_cols() {
            return Err(MatrizError::index_out_of_bounds(
                feature_idx,
                self.matrix.n_cols(),
            ));
        }
        let matrix = &self.matrix;
        Ok(self
            .cache_feature_counts
            .entry(feature_idx)
            .or_insert_with(|| {
                let mut map = CountingMap::new();
                for r in 0..matrix.n_rows() {
                    map.insert(matrix.get(r, feature_idx));
                }
                map
            }))
    }

    /// Copies the rows whose `feature_idx` value equals `split_value` into
    /// `out`, dropping that column (and its feature name).
    ///
    /// `out` is fully rebuilt: it ends with one row per matching sample,
    /// `n_cols() - 1` columns, and empty caches.
    ///
    /// # Errors
    ///
    /// Returns an error if `feature_idx` is out of bounds.
    pub fn split(&self, feature_idx: usize, split_value: T, out: &mut Self) -> Result<()> {
        if feature_idx >= self.matrix.n_cols() {
            return Err(MatrizError::index_out_of_bounds(
                feature_idx,
                self.matrix.n_cols(),
            ));
        }
        let cols = self.matrix.n_cols();
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for r in 0..self.matrix.n_rows() {
            if self.matrix.get(r, feature_idx) == split_value {
                for c in 0..cols {
                    if c != feature_idx {
                        data.push(self.matrix.get(r, c));
                    }
                }
                labels.push(self.labels.get(r));
            }
        }
        let n_match = labels.len();
        out.matrix.set_shallow_data(data, n_match, cols - 1)?;
        out.labels = Vector::from_vec(labels);
        out.feature_names = self
            .feature_names
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != feature_idx)
            .map(|(_, name)| *name)
            .collect();
        out.clear_cache();
        Ok(())
    }

    fn clear_cache(&mut self) {
        self.cache_shannon_entropy = None;
        self.cache_label_counts = None;
        self.cache_feature_counts.clear();
    }
}

impl<T: Scalar> Default for LabeledMatrix<T> {
    /// An empty labeled matrix, ready to receive
    /// [`split`](LabeledMatrix::split) output.
    fn default() -> Self {
        Self {
            matrix: Matrix::new(),
            labels: Vector::new(),
            feature_names: Vec::new(),
            cache_shannon_entropy: None,
            cache_label_counts: None,
            cache_feature_counts: BTreeMap::new(),
        }
    }
}

impl<T: Scalar> fmt::Display for LabeledMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.matrix.n_rows() {
            for c in 0..self.matrix.n_cols() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.matrix.get(r, c))?;
            }
            write!(f, " | {}", self.labels.get(r))?;
            if r + 1 < self.matrix.n_rows() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
