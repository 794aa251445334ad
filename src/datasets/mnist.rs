//! IDX-format reader for the MNIST image and label files.
//!
//! Pixels binarize against a threshold so the downstream models see
//! 0/1 features. Labels come back either one-hot or raw.

use std::fs;
use std::path::Path;

use crate::data::LabeledMatrix;
use crate::datasets::apply_limit;
use crate::error::{MatrizError, Result};
use crate::primitives::{Matrix, Vector};

const IMAGE_MAGIC: u32 = 0x803;
const LABEL_MAGIC: u32 = 0x801;
const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

/// Pixels at or above this value binarize to 1.
pub const DEFAULT_THRESHOLD: u8 = 30;

/// Default number of digit classes.
pub const DEFAULT_CLASSES: usize = 10;

/// Reads an IDX image file into a `count x pixels` matrix of 0/1
/// features.
///
/// `limit` caps the number of images read; `threshold` is the
/// binarization cutoff.
///
/// # Errors
///
/// Returns [`MatrizError::FormatError`] for a bad magic number or a
/// file shorter than its header claims, and an empty-input error when
/// no images remain.
pub fn read_images<P: AsRef<Path>>(
    path: P,
    limit: Option<usize>,
    threshold: u8,
) -> Result<Matrix<f32>> {
    let (payload, count, pixels) = load_image_file(path)?;
    let count = apply_limit(count, limit);
    if count == 0 {
        return Err(MatrizError::empty_input("image file"));
    }

    let data = payload[..count * pixels]
        .iter()
        .map(|&pixel| if pixel >= threshold { 1.0 } else { 0.0 })
        .collect();
    Matrix::from_vec(count, pixels, data)
}

/// Reads an IDX label file into a one-hot `count x classes` matrix.
///
/// # Errors
///
/// Returns [`MatrizError::FormatError`] for a bad magic number, a
/// truncated file, or a label outside `classes`.
pub fn read_labels<P: AsRef<Path>>(
    path: P,
    limit: Option<usize>,
    classes: usize,
) -> Result<Matrix<f32>> {
    if classes == 0 {
        return Err(MatrizError::empty_input("class count"));
    }
    let (payload, count) = load_label_file(path)?;
    let count = apply_limit(count, limit);
    if count == 0 {
        return Err(MatrizError::empty_input("label file"));
    }

    let mut data = vec![0.0; count * classes];
    for (i, &label) in payload[..count].iter().enumerate() {
        let class = label as usize;
        if class >= classes {
            return Err(MatrizError::FormatError {
                message: format!("label {label} outside {classes} classes"),
            });
        }
        data[i * classes + class] = 1.0;
    }
    Matrix::from_vec(count, classes, data)
}

/// Reads paired image and label files into a [`LabeledMatrix`] with raw
/// digit labels.
///
/// # Errors
///
/// Returns an error if either file is malformed or the two files
/// disagree on the record count.
pub fn read_labeled<P, Q>(
    image_path: P,
    label_path: Q,
    limit: Option<usize>,
    threshold: u8,
) -> Result<LabeledMatrix<f32>>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (image_payload, image_count, pixels) = load_image_file(image_path)?;
    let (label_payload, label_count) = load_label_file(label_path)?;
    if image_count != label_count {
        return Err(MatrizError::dimension_mismatch(
            "label records",
            image_count,
            label_count,
        ));
    }

    let count = apply_limit(image_count, limit);
    if count == 0 {
        return Err(MatrizError::empty_input("image file"));
    }

    let data = image_payload[..count * pixels]
        .iter()
        .map(|&pixel| if pixel >= threshold { 1.0 } else { 0.0 })
        .collect();
    let labels: Vec<f32> = label_payload[..count].iter().map(|&l| f32::from(l)).collect();

    LabeledMatrix::new(
        Matrix::from_vec(count, pixels, data)?,
        Vector::from_vec(labels),
    )
}

/// Reads and validates an image file, returning the pixel payload,
/// record count, and pixels per image.
fn load_image_file<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize)> {
    let bytes = fs::read(path)?;
    let magic = be_header(&bytes, 0)?;
    if magic != IMAGE_MAGIC {
        return Err(MatrizError::FormatError {
            message: format!("bad image magic 0x{magic:x}, expected 0x803"),
        });
    }
    let count = be_header(&bytes, 1)? as usize;
    let rows = be_header(&bytes, 2)? as usize;
    let cols = be_header(&bytes, 3)? as usize;

    let pixels = rows
        .checked_mul(cols)
        .ok_or_else(|| MatrizError::FormatError {
            message: format!("image dimensions {rows}x{cols} overflow"),
        })?;
    let total = count
        .checked_mul(pixels)
        .ok_or_else(|| MatrizError::FormatError {
            message: format!("image payload of {count} records overflows"),
        })?;
    if bytes.len() < IMAGE_HEADER_LEN + total {
        return Err(MatrizError::FormatError {
            message: format!(
                "image file holds {} payload bytes, header claims {total}",
                bytes.len().saturating_sub(IMAGE_HEADER_LEN)
            ),
        });
    }

    Ok((
        bytes[IMAGE_HEADER_LEN..IMAGE_HEADER_LEN + total].to_vec(),
        count,
        pixels,
    ))
}

/// Reads and validates a label file, returning the label bytes and
/// record count.
fn load_label_file<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize)> {
    let bytes = fs::read(path)?;
    let magic = be_header(&bytes, 0)?;
    if magic != LABEL_MAGIC {
        return Err(MatrizError::FormatError {
            message: format!("bad label magic 0x{magic:x}, expected 0x801"),
        });
    }
    let count = be_header(&bytes, 1)? as usize;
    if bytes.len() < LABEL_HEADER_LEN + count {
        return Err(MatrizError::FormatError {
            message: format!(
                "label file holds {} payload bytes, header claims {count}",
                bytes.len().saturating_sub(LABEL_HEADER_LEN)
            ),
        });
    }
    Ok((bytes[LABEL_HEADER_LEN..LABEL_HEADER_LEN + count].to_vec(), count))
}

/// Big-endian u32 at word `index` of the header.
fn be_header(bytes: &[u8], index: usize) -> Result<u32> {
    let offset = index * 4;
    if bytes.len() < offset + 4 {
        return Err(MatrizError::FormatError {
            message: format!("truncated header at word {index}"),
        });
    }
    Ok(u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]))
}
