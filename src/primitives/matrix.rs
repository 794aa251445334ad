//! Dense matrix type for 2D numeric data.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scalar::Scalar;
use super::Vector;
use crate::error::{MatrizError, Result};

/// Determinants below this magnitude are treated as singular.
const SINGULAR_EPS: f32 = 1e-6;

/// A dense 2D matrix of numeric values (row-major storage).
///
/// The element type is any [`Scalar`] (`i32` or `f32`). Binary operations
/// come in two forms: an in-place form (`add`, `sub`, `matmul`, ...) that
/// rewrites `self`, and an `_into` form that leaves both operands untouched
/// and writes a caller-supplied result matrix, resizing it as needed.
///
/// The determinant is cached after the first computation and the cache is
/// invalidated by every mutating call.
///
/// # Examples
///
/// ```
/// use matriz::primitives::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("data length matches rows * cols");
/// assert_eq!(m.shape(), (2, 3));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matrix<T: Scalar> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
    #[serde(skip)]
    cache_det: Option<T>,
}

impl<T: Scalar> Matrix<T> {
    /// Creates an empty 0x0 matrix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            cols: 0,
            cache_det: None,
        }
    }

    /// Creates a new matrix from a vector of data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MatrizError::dimension_mismatch(
                "data length",
                rows * cols,
                data.len(),
            ));
        }
        Ok(Self {
            data,
            rows,
            cols,
            cache_det: None,
        })
    }

    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    /// Creates a matrix of ones.
    #[must_use]
    pub fn ones(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::one())
    }

    /// Creates a matrix with every element set to `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
            cache_det: None,
        }
    }

    /// Creates an identity matrix.
    #[must_use]
    pub fn eye(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    /// Creates a 1 x n row matrix from a slice.
    #[must_use]
    pub fn from_row(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
            rows: 1,
            cols: data.len(),
            cache_det: None,
        }
    }

    /// Creates an n x 1 column matrix from a slice.
    #[must_use]
    pub fn from_col(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
            rows: data.len(),
            cols: 1,
            cache_det: None,
        }
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the matrix holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(col < self.cols, "column index {col} out of bounds");
        self.data[row * self.cols + col]
    }

    /// Sets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(col < self.cols, "column index {col} out of bounds");
        self.data[row * self.cols + col] = value;
        self.cache_det = None;
    }

    /// Gets element at a linear (row-major) index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn get_at(&self, idx: usize) -> T {
        self.data[idx]
    }

    /// Sets element at a linear (row-major) index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn set_at(&mut self, idx: usize, value: T) {
        self.data[idx] = value;
        self.cache_det = None;
    }

    /// Returns a row as a Vector.
    #[must_use]
    pub fn row(&self, row_idx: usize) -> Vector<T> {
        let start = row_idx * self.cols;
        let end = start + self.cols;
        Vector::from_slice(&self.data[start..end])
    }

    /// Returns a column as a Vector.
    #[must_use]
    pub fn column(&self, col_idx: usize) -> Vector<T> {
        let data: Vec<T> = (0..self.rows)
            .map(|row| self.data[row * self.cols + col_idx])
            .collect();
        Vector::from_vec(data)
    }

    /// Returns the underlying data as a slice (row-major order).
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the matrix and returns the underlying buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Replaces the contents with a copy of `data`, reshaping to
    /// rows x cols.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn set_data(&mut self, data: &[T], rows: usize, cols: usize) -> Result<()> {
        if data.len() != rows * cols {
            return Err(MatrizError::dimension_mismatch(
                "data length",
                rows * cols,
                data.len(),
            ));
        }
        self.data.clear();
        self.data.extend_from_slice(data);
        self.rows = rows;
        self.cols = cols;
        self.cache_det = None;
        Ok(())
    }

    /// Adopts `data` as the new backing buffer without copying, reshaping
    /// to rows x cols. The previous buffer is dropped; ownership of the
    /// new one transfers to the matrix, so no aliasing can occur.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn set_shallow_data(&mut self, data: Vec<T>, rows: usize, cols: usize) -> Result<()> {
        if data.len() != rows * cols {
            return Err(MatrizError::dimension_mismatch(
                "data length",
                rows * cols,
                data.len(),
            ));
        }
        self.data = data;
        self.rows = rows;
        self.cols = cols;
        self.cache_det = None;
        Ok(())
    }

    /// Copies row `row` out into a fresh 1 x cols matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if `row` is out of bounds.
    pub fn get_row(&self, row: usize) -> Result<Self> {
        if row >= self.rows {
            return Err(MatrizError::index_out_of_bounds(row, self.rows));
        }
        let start = row * self.cols;
        Ok(Self {
            data: self.data[start..start + self.cols].to_vec(),
            rows: 1,
            cols: self.cols,
            cache_det: None,
        })
    }

    /// Writes the rows of `mat` starting at position `row`.
    ///
    /// Rows that land inside the current shape are overwritten; rows that
    /// land past the end grow the matrix (`row == n_rows()` is a pure
    /// append). Writing into an empty matrix adopts `mat`'s shape.
    ///
    /// # Errors
    ///
    /// Returns an error if `row > n_rows()` or the column counts differ.
    pub fn set_row(&mut self, mat: &Matrix<T>, row: usize) -> Result<()> {
        if mat.rows == 0 {
            return Ok(());
        }
        if self.rows == 0 && self.cols == 0 {
            if row != 0 {
                return Err(MatrizError::index_out_of_bounds(row, 0));
            }
            self.data.clear();
            self.data.extend_from_slice(&mat.data);
            self.rows = mat.rows;
            self.cols = mat.cols;
            self.cache_det = None;
            return Ok(());
        }
        if mat.cols != self.cols {
            return Err(MatrizError::dimension_mismatch("cols", self.cols, mat.cols));
        }
        if row > self.rows {
            return Err(MatrizError::index_out_of_bounds(row, self.rows));
        }
        let end = row + mat.rows;
        if end > self.rows {
            self.data.resize(end * self.cols, T::zero());
            self.rows = end;
        }
        self.data[row * self.cols..end * self.cols].copy_from_slice(&mat.data);
        self.cache_det = None;
        Ok(())
    }

    /// Appends the rows of `mat` below the current rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the column counts differ.
    pub fn extend(&mut self, mat: &Matrix<T>) -> Result<()> {
        self.set_row(mat, self.rows)
    }

    /// Swaps two elements.
    ///
    /// # Errors
    ///
    /// Returns an error if either position is out of bounds.
    pub fn swap(&mut self, a_row: usize, a_col: usize, b_row: usize, b_col: usize) -> Result<()> {
        for &(r, c) in &[(a_row, a_col), (b_row, b_col)] {
            if r >= self.rows {
                return Err(MatrizError::index_out_of_bounds(r, self.rows));
            }
            if c >= self.cols {
                return Err(MatrizError::index_out_of_bounds(c, self.cols));
            }
        }
        self.data
            .swap(a_row * self.cols + a_col, b_row * self.cols + b_col);
        self.cache_det = None;
        Ok(())
    }

    /// Swaps two rows.
    ///
    /// # Errors
    ///
    /// Returns an error if either row index is out of bounds.
    pub fn swap_row(&mut self, a: usize, b: usize) -> Result<()> {
        if a >= self.rows {
            return Err(MatrizError::index_out_of_bounds(a, self.rows));
        }
        if b >= self.rows {
            return Err(MatrizError::index_out_of_bounds(b, self.rows));
        }
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
        self.cache_det = None;
        Ok(())
    }

    /// Swaps two columns.
    ///
    /// # Errors
    ///
    /// Returns an error if either column index is out of bounds.
    pub fn swap_col(&mut self, a: usize, b: usize) -> Result<()> {
        if a >= self.cols {
            return Err(MatrizError::index_out_of_bounds(a, self.cols));
        }
        if b >= self.cols {
            return Err(MatrizError::index_out_of_bounds(b, self.cols));
        }
        for r in 0..self.rows {
            self.data.swap(r * self.cols + a, r * self.cols + b);
        }
        self.cache_det = None;
        Ok(())
    }

    /// Adds another matrix element-wise, in place.
    ///
    /// On error `self` is left unmodified.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(MatrizError::shape_mismatch(
                (self.rows, self.cols),
                (other.rows, other.cols),
            ));
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += *b;
        }
        self.cache_det = None;
        Ok(())
    }

    /// Adds two matrices element-wise into `result`, leaving both operands
    /// untouched. `result` is resized as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn add_into(&self, other: &Self, result: &mut Self) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(MatrizError::shape_mismatch(
                (self.rows, self.cols),
                (other.rows, other.cols),
            ));
        }
        result.data.clear();
        result
            .data
            .extend(self.data.iter().zip(other.data.iter()).map(|(a, b)| *a + *b));
        result.rows = self.rows;
        result.cols = self.cols;
        result.cache_det = None;
        Ok(())
    }

    /// Subtracts another matrix element-wise, in place.
    ///
    /// On error `self` is left unmodified.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn sub(&mut self, other: &Self) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(MatrizError::shape_mismatch(
                (self.rows, self.cols),
                (other.rows, other.cols),
            ));
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a -= *b;
        }
        self.cache_det = None;
        Ok(())
    }

    /// Subtracts two matrices element-wise into `result`, leaving both
    /// operands untouched. `result` is resized as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn sub_into(&self, other: &Self, result: &mut Self) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(MatrizError::shape_mismatch(
                (self.rows, self.cols),
                (other.rows, other.cols),
            ));
        }
        result.data.clear();
        result
            .data
            .extend(self.data.iter().zip(other.data.iter()).map(|(a, b)| *a - *b));
        result.rows = self.rows;
        result.cols = self.cols;
        result.cache_det = None;
        Ok(())
    }

    /// Matrix-matrix multiplication, in place: `self` becomes
    /// `self * other` with shape rows x other.cols.
    ///
    /// On error `self` is left unmodified.
    ///
    /// # Errors
    ///
    /// Returns an error if `self.n_cols() != other.n_rows()`.
    pub fn matmul(&mut self, other: &Self) -> Result<()> {
        if self.cols != other.rows {
            return Err(MatrizError::dimension_mismatch(
                "cols",
                self.cols,
                other.rows,
            ));
        }
        let mut result = vec![T::zero(); self.rows * other.cols];
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = T::zero();
                for k in 0..self.cols {
                    sum += self.data[i * self.cols + k] * other.data[k * other.cols + j];
                }
                result[i * other.cols + j] = sum;
            }
        }
        self.data = result;
        self.cols = other.cols;
        self.cache_det = None;
        Ok(())
    }

    /// Matrix-matrix multiplication into `result`, leaving both operands
    /// untouched. `result` is resized to rows x other.cols. Safe to call
    /// from multiple threads with distinct result matrices.
    ///
    /// # Errors
    ///
    /// Returns an error if `self.n_cols() != other.n_rows()`.
    pub fn matmul_into(&self, other: &Self, result: &mut Self) -> Result<()> {
        if self.cols != other.rows {
            return Err(MatrizError::dimension_mismatch(
                "cols",
                self.cols,
                other.rows,
            ));
        }
        result.data.clear();
        result.data.resize(self.rows * other.cols, T::zero());
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = T::zero();
                for k in 0..self.cols {
                    sum += self.data[i * self.cols + k] * other.data[k * other.cols + j];
                }
                result.data[i * other.cols + j] = sum;
            }
        }
        result.rows = self.rows;
        result.cols = other.cols;
        result.cache_det = None;
        Ok(())
    }

    /// Matrix-vector multiplication.
    ///
    /// # Errors
    ///
    /// Returns an error if matrix columns don't match the vector length.
    pub fn matvec(&self, vec: &Vector<T>) -> Result<Vector<T>> {
        if self.cols != vec.len() {
            return Err(MatrizError::dimension_mismatch(
                "cols",
                self.cols,
                vec.len(),
            ));
        }
        let result: Vec<T> = (0..self.rows)
            .map(|i| {
                let mut sum = T::zero();
                for k in 0..self.cols {
                    sum += self.data[i * self.cols + k] * vec[k];
                }
                sum
            })
            .collect();
        Ok(Vector::from_vec(result))
    }

    /// Multiplies each element by a scalar, in place.
    pub fn mul_scalar(&mut self, scalar: T) {
        for x in &mut self.data {
            *x *= scalar;
        }
        self.cache_det = None;
    }

    /// Multiplies each element by a scalar into `result`, leaving `self`
    /// untouched.
    pub fn mul_scalar_into(&self, scalar: T, result: &mut Self) {
        result.data.clear();
        result.data.extend(self.data.iter().map(|x| *x * scalar));
        result.rows = self.rows;
        result.cols = self.cols;
        result.cache_det = None;
    }

    /// Transposes the matrix in place.
    pub fn transpose(&mut self) {
        let mut data = vec![T::zero(); self.rows * self.cols];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        self.data = data;
        std::mem::swap(&mut self.rows, &mut self.cols);
        self.cache_det = None;
    }

    /// Writes the transpose into `result`, leaving `self` untouched.
    pub fn transpose_into(&self, result: &mut Self) {
        result.data.clear();
        result.data.resize(self.rows * self.cols, T::zero());
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        result.rows = self.cols;
        result.cols = self.rows;
        result.cache_det = None;
    }

    /// Computes the determinant by Laplace cofactor expansion.
    ///
    /// Exact for integer elements. Exponential in the matrix order, so it
    /// is intended for small matrices. The result is cached; any mutation
    /// invalidates the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square.
    pub fn det(&mut self) -> Result<T> {
        if self.rows != self.cols {
            return Err(MatrizError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if let Some(d) = self.cache_det {
            return Ok(d);
        }
        let d = Self::cofactor_det(&self.data, self.rows);
        self.cache_det = Some(d);
        Ok(d)
    }

    fn cofactor_det(data: &[T], n: usize) -> T {
        if n == 0 {
            return T::one();
        }
        if n == 1 {
            return data[0];
        }
        if n == 2 {
            return data[0] * data[3] - data[1] * data[2];
        }
        let mut det = T::zero();
        let mut sign = T::one();
        let mut minor = vec![T::zero(); (n - 1) * (n - 1)];
        for col in 0..n {
            let mut m = 0;
            for r in 1..n {
                for c in 0..n {
                    if c != col {
                        minor[m] = data[r * n + c];
                        m += 1;
                    }
                }
            }
            det += sign * data[col] * Self::cofactor_det(&minor, n - 1);
            sign = T::zero() - sign;
        }
        det
    }

    /// Inverts the matrix by Gauss-Jordan elimination with partial
    /// pivoting, writing the inverse into `result`.
    ///
    /// Inversion is not closed over the integers, so the result element
    /// type is always `f32`. The matrix data is never modified; only the
    /// determinant cache may be filled in.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square, or if its determinant
    /// is zero (within `1e-6` for floating elements).
    pub fn inverse(&mut self, result: &mut Matrix<f32>) -> Result<()> {
        if self.rows != self.cols {
            return Err(MatrizError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let det = self.det()?;
        let det_f = det.to_f64().unwrap_or(f64::NAN);
        if !(det_f.abs() > f64::from(SINGULAR_EPS)) {
            return Err(MatrizError::SingularMatrix { det: det_f });
        }

        let n = self.rows;
        let mut work: Vec<f32> = self.data.iter().map(|x| x.to_f32_lossy()).collect();
        result.data.clear();
        result.data.resize(n * n, 0.0);
        result.rows = n;
        result.cols = n;
        result.cache_det = None;
        for i in 0..n {
            result.data[i * n + i] = 1.0;
        }

        for col in 0..n {
            let mut pivot = col;
            for r in (col + 1)..n {
                if work[r * n + col].abs() > work[pivot * n + col].abs() {
                    pivot = r;
                }
            }
            if pivot != col {
                for c in 0..n {
                    work.swap(col * n + c, pivot * n + c);
                    result.data.swap(col * n + c, pivot * n + c);
                }
            }
            let p = work[col * n + col];
            if p.abs() < SINGULAR_EPS {
                return Err(MatrizError::SingularMatrix { det: det_f });
            }
            let inv_p = 1.0 / p;
            for c in 0..n {
                work[col * n + c] *= inv_p;
                result.data[col * n + c] *= inv_p;
            }
            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = work[r * n + col];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    work[r * n + c] -= factor * work[col * n + c];
                    result.data[r * n + c] -= factor * result.data[col * n + c];
                }
            }
        }
        Ok(())
    }
}

impl<T: Scalar> Default for Matrix<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.data == other.data
    }
}

impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .data
            .iter()
            .map(|v| format!("{v}").len())
            .max()
            .unwrap_or(1);
        for r in 0..self.rows {
            for c in 0..self.cols {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$}", format!("{}", self.data[r * self.cols + c]))?;
            }
            if r + 1 < self.rows {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
