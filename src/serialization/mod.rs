//! Model serialization.
//!
//! Stores named weight matrices in a single binary archive:
//! ```text
//! [8-byte header: u64 header length (little-endian)]
//! [JSON header: model tag, tensor names, dtypes, shapes, data offsets]
//! [Raw tensor data: F32 values in little-endian]
//! ```
//!
//! The JSON header carries a `__metadata__` section with a `model` tag so a
//! loader can reject archives written by a different model kind.
//!
//! Example:
//! ```rust
//! use matriz::primitives::Matrix;
//! use matriz::serialization::{load_matrices, save_matrices};
//!
//! let weights = Matrix::from_vec(2, 2, vec![1.0_f32, 2.0, 3.0, 4.0]).unwrap();
//! let dir = std::env::temp_dir().join("matriz_doc_archive");
//! std::fs::create_dir_all(&dir).unwrap();
//! let path = dir.join("model.bin");
//!
//! save_matrices(&path, "demo", &[("weights", &weights)]).unwrap();
//! let loaded = load_matrices(&path, "demo").unwrap();
//! assert_eq!(loaded["weights"], weights);
//! # std::fs::remove_file(&path).ok();
//! ```

mod archive;

pub use archive::{load_matrices, save_matrices, TensorIndex, TensorMetadata};
