//! Error type and `Result` alias shared by every fallible operation in
//! the crate.

use std::fmt;

/// Error type covering algebra preconditions, indexing, and file I/O.
///
/// Shape violations carry both the expected and the observed dimensions
/// so callers can report exactly which operand was wrong.
///
/// # Examples
///
/// ```
/// use matriz::error::MatrizError;
///
/// let err = MatrizError::shape_mismatch((2, 3), (4, 2));
/// assert!(err.to_string().contains("2x3"));
/// assert!(err.to_string().contains("4x2"));
/// ```
#[derive(Debug)]
pub enum MatrizError {
    /// Operand shapes violate an operation's algebraic precondition.
    DimensionMismatch {
        /// What the operation required, e.g. `"rows=3"`.
        expected: String,
        /// What the caller supplied.
        actual: String,
    },

    /// Determinant or inverse requested for a non-square matrix.
    NotSquare {
        /// Row count found
        rows: usize,
        /// Column count found
        cols: usize,
    },

    /// Inversion was requested but the determinant is numerically zero.
    SingularMatrix {
        /// The offending determinant.
        det: f64,
    },

    /// Row or column index outside the matrix shape.
    IndexOutOfBounds {
        /// Index requested
        index: usize,
        /// Valid length
        len: usize,
    },

    /// I/O failure while reading a dataset or writing a model.
    Io(std::io::Error),

    /// JSON encoding or decoding failed.
    Serialization(String),

    /// A persisted model failed structural validation.
    FormatError {
        /// Human-readable detail.
        message: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for MatrizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrizError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Matrix dimension mismatch: expected {expected}, got {actual}"
                )
            }
            MatrizError::NotSquare { rows, cols } => {
                write!(f, "Matrix is not square: {rows}x{cols}")
            }
            MatrizError::SingularMatrix { det } => {
                write!(
                    f,
                    "Singular matrix detected: determinant = {det}, cannot invert"
                )
            }
            MatrizError::IndexOutOfBounds { index, len } => {
                write!(f, "Index {index} out of bounds (len={len})")
            }
            MatrizError::Io(e) => write!(f, "I/O error: {e}"),
            MatrizError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            MatrizError::FormatError { message } => {
                write!(f, "Invalid model format: {message}")
            }
            MatrizError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for MatrizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatrizError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MatrizError {
    fn from(err: std::io::Error) -> Self {
        MatrizError::Io(err)
    }
}

impl From<&str> for MatrizError {
    fn from(msg: &str) -> Self {
        MatrizError::Other(msg.to_string())
    }
}

impl From<String> for MatrizError {
    fn from(msg: String) -> Self {
        MatrizError::Other(msg)
    }
}

impl MatrizError {
    /// Builds a dimension mismatch error for a named scalar dimension.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Builds a dimension mismatch error from two (rows, cols) pairs.
    #[must_use]
    pub fn shape_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }

    /// Builds an index out of bounds error.
    #[must_use]
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Builds an error for an input that must not be empty.
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::Other(format!("empty input: {context}"))
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for MatrizError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<MatrizError> for &str {
    fn eq(&self, other: &MatrizError) -> bool {
        *self == other.to_string()
    }
}

/// Crate-wide shorthand for results carrying [`MatrizError`].
pub type Result<T> = std::result::Result<T, MatrizError>;
