//! Binary tensor archive reader and writer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MatrizError, Result};
use crate::primitives::Matrix;

/// Metadata for a single tensor in the archive header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorMetadata {
    /// Data type of the tensor (always "F32").
    pub dtype: String,
    /// Shape of the tensor as `[rows, cols]`.
    pub shape: Vec<usize>,
    /// Data offsets `[start, end]` in the raw data section.
    pub data_offsets: [usize; 2],
}

/// Tensor name to metadata mapping.
/// Uses `BTreeMap` for deterministic serialization (sorted keys).
pub type TensorIndex = BTreeMap<String, TensorMetadata>;

/// Key inside `__metadata__` that names the model kind.
const MODEL_TAG_KEY: &str = "model";

/// Saves named matrices to a tensor archive.
///
/// Tensors are laid out in name order so identical inputs always produce
/// identical bytes.
///
/// # Arguments
///
/// * `path` - File path to write to
/// * `tag` - Model tag stored under `__metadata__`, checked on load
/// * `tensors` - Named matrices to store
///
/// # Errors
///
/// Returns an error if a tensor name repeats, JSON serialization fails,
/// or the file cannot be written.
pub fn save_matrices<P: AsRef<Path>>(
    path: P,
    tag: &str,
    tensors: &[(&str, &Matrix<f32>)],
) -> Result<()> {
    let mut sorted: BTreeMap<&str, &Matrix<f32>> = BTreeMap::new();
    for &(name, matrix) in tensors {
        if sorted.insert(name, matrix).is_some() {
            return Err(MatrizError::FormatError {
                message: format!("duplicate tensor name '{name}'"),
            });
        }
    }

    let mut header = serde_json::Map::new();
    let mut meta_obj = serde_json::Map::new();
    meta_obj.insert(
        MODEL_TAG_KEY.to_string(),
        serde_json::Value::String(tag.to_string()),
    );
    header.insert(
        "__metadata__".to_string(),
        serde_json::Value::Object(meta_obj),
    );

    let mut raw_data = Vec::new();
    let mut current_offset = 0;

    for (name, matrix) in &sorted {
        let data = matrix.as_slice();
        let start_offset = current_offset;
        let end_offset = current_offset + data.len() * 4;

        let tensor_meta = TensorMetadata {
            dtype: "F32".to_string(),
            shape: vec![matrix.n_rows(), matrix.n_cols()],
            data_offsets: [start_offset, end_offset],
        };
        let value = serde_json::to_value(&tensor_meta)
            .map_err(|e| MatrizError::Serialization(format!("JSON serialization failed: {e}")))?;
        header.insert((*name).to_string(), value);

        for &element in data {
            raw_data.extend_from_slice(&element.to_le_bytes());
        }
        current_offset = end_offset;
    }

    let header_json = serde_json::to_string(&serde_json::Value::Object(header))
        .map_err(|e| MatrizError::Serialization(format!("JSON serialization failed: {e}")))?;
    let header_bytes = header_json.as_bytes();
    let header_len = header_bytes.len() as u64;

    let mut output = Vec::with_capacity(8 + header_bytes.len() + raw_data.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(header_bytes);
    output.extend_from_slice(&raw_data);

    fs::write(path, output)?;
    Ok(())
}

/// Loads named matrices from a tensor archive.
///
/// # Arguments
///
/// * `path` - File path to read from
/// * `expected_tag` - Model tag the archive must carry
///
/// # Errors
///
/// Returns an error if the file cannot be read, the header is malformed,
/// the model tag does not match, or any tensor entry is inconsistent with
/// the raw data section.
pub fn load_matrices<P: AsRef<Path>>(
    path: P,
    expected_tag: &str,
) -> Result<BTreeMap<String, Matrix<f32>>> {
    let bytes = fs::read(path)?;
    let header_len = validate_and_read_header(&bytes)?;
    let (index, tag) = parse_header(&bytes, header_len)?;

    match tag {
        Some(found) if found == expected_tag => {}
        Some(found) => {
            return Err(MatrizError::FormatError {
                message: format!("expected model tag '{expected_tag}', found '{found}'"),
            });
        }
        None => {
            return Err(MatrizError::FormatError {
                message: format!("archive carries no model tag, expected '{expected_tag}'"),
            });
        }
    }

    let raw_data = &bytes[8 + header_len..];
    let mut matrices = BTreeMap::new();
    for (name, meta) in &index {
        matrices.insert(name.clone(), extract_matrix(raw_data, name, meta)?);
    }
    Ok(matrices)
}

/// Validates the fixed-size header and returns the JSON header length.
fn validate_and_read_header(bytes: &[u8]) -> Result<usize> {
    if bytes.len() < 8 {
        return Err(MatrizError::FormatError {
            message: format!(
                "file is {} bytes, need at least 8 bytes for header",
                bytes.len()
            ),
        });
    }

    let header_bytes: [u8; 8] = bytes[0..8].try_into().map_err(|_| MatrizError::FormatError {
        message: "failed to read header bytes".to_string(),
    })?;
    let header_len = u64::from_le_bytes(header_bytes) as usize;

    if header_len == 0 {
        return Err(MatrizError::FormatError {
            message: "header length is 0".to_string(),
        });
    }
    if 8 + header_len > bytes.len() {
        return Err(MatrizError::FormatError {
            message: format!("header length {header_len} exceeds file size"),
        });
    }

    Ok(header_len)
}

/// Parses the JSON header into a tensor index and the model tag.
fn parse_header(bytes: &[u8], header_len: usize) -> Result<(TensorIndex, Option<String>)> {
    let header_json = &bytes[8..8 + header_len];
    let header_str = std::str::from_utf8(header_json).map_err(|e| MatrizError::FormatError {
        message: format!("header is not valid UTF-8: {e}"),
    })?;

    let raw_header: serde_json::Value = serde_json::from_str(header_str)
        .map_err(|e| MatrizError::Serialization(format!("JSON parsing failed: {e}")))?;

    let serde_json::Value::Object(map) = raw_header else {
        return Err(MatrizError::FormatError {
            message: "header is not a JSON object".to_string(),
        });
    };

    let mut index = TensorIndex::new();
    let mut tag = None;

    for (key, value) in map {
        if key == "__metadata__" {
            if let serde_json::Value::Object(meta_map) = value {
                if let Some(serde_json::Value::String(model)) = meta_map.get(MODEL_TAG_KEY) {
                    tag = Some(model.clone());
                }
            }
            continue;
        }
        if key.starts_with("__") {
            continue;
        }
        let tensor_meta = serde_json::from_value::<TensorMetadata>(value).map_err(|e| {
            MatrizError::FormatError {
                message: format!("malformed tensor entry '{key}': {e}"),
            }
        })?;
        index.insert(key, tensor_meta);
    }

    Ok((index, tag))
}

/// Extracts one matrix from the raw data section.
fn extract_matrix(raw_data: &[u8], name: &str, meta: &TensorMetadata) -> Result<Matrix<f32>> {
    if meta.dtype != "F32" {
        return Err(MatrizError::FormatError {
            message: format!("unsupported dtype for '{name}': {}", meta.dtype),
        });
    }
    if meta.shape.len() != 2 {
        return Err(MatrizError::FormatError {
            message: format!(
                "tensor '{name}' has {}-dimensional shape, expected 2",
                meta.shape.len()
            ),
        });
    }

    let [start, end] = meta.data_offsets;
    if start > end || end > raw_data.len() {
        return Err(MatrizError::FormatError {
            message: format!("tensor '{name}' data offsets [{start}, {end}] out of bounds"),
        });
    }

    let tensor_bytes = &raw_data[start..end];
    if tensor_bytes.len() % 4 != 0 {
        return Err(MatrizError::FormatError {
            message: format!(
                "tensor '{name}' has {} data bytes, not a multiple of 4",
                tensor_bytes.len()
            ),
        });
    }

    let values: Vec<f32> = tensor_bytes
        .chunks_exact(4)
        .map(|chunk| {
            let mut le = [0u8; 4];
            le.copy_from_slice(chunk);
            f32::from_le_bytes(le)
        })
        .collect();

    let (rows, cols) = (meta.shape[0], meta.shape[1]);
    if values.len() != rows * cols {
        return Err(MatrizError::FormatError {
            message: format!(
                "tensor '{name}' has {} values, shape {rows}x{cols} needs {}",
                values.len(),
                rows * cols
            ),
        });
    }

    Matrix::from_vec(rows, cols, values)
}
