//! Text readers for tokenized sequence corpora.
//!
//! A corpus is a pair of files: one sequence of token indices per line
//! in the data file, and the shifted next-token indices on the matching
//! line of the label file. Each line becomes a one-hot
//! `timesteps x vocabulary` matrix.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::datasets::apply_limit;
use crate::error::{MatrizError, Result};
use crate::primitives::Matrix;

/// Reads a vocabulary file of `word<TAB>index` lines.
///
/// Blank lines are skipped; a repeated word keeps its last index.
///
/// # Errors
///
/// Returns [`MatrizError::FormatError`] for a line without a tab or
/// with a non-numeric index.
pub fn read_word_index<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, usize>> {
    let reader = BufReader::new(File::open(path)?);
    let mut map = BTreeMap::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((word, index)) = trimmed.split_once('\t') else {
            return Err(MatrizError::FormatError {
                message: format!("line {}: expected word<TAB>index", line_no + 1),
            });
        };
        let index = index
            .trim()
            .parse::<usize>()
            .map_err(|_| MatrizError::FormatError {
                message: format!("line {}: bad index {index:?}", line_no + 1),
            })?;
        map.insert(word.to_string(), index);
    }
    Ok(map)
}

/// Reads paired data and label corpora into one-hot sequence matrices.
///
/// Each kept line becomes a `timesteps x vocab_dim` matrix; `limit`
/// caps the number of sequences.
///
/// # Errors
///
/// Returns an error if the two files hold a different number of lines,
/// if a line's token count differs from its label line, or if a token
/// index falls outside `vocab_dim`.
pub fn read_sequences<P, Q>(
    data_path: P,
    label_path: Q,
    vocab_dim: usize,
    limit: Option<usize>,
) -> Result<(Vec<Matrix<f32>>, Vec<Matrix<f32>>)>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    if vocab_dim == 0 {
        return Err(MatrizError::empty_input("vocabulary size"));
    }

    let data_lines = token_lines(data_path)?;
    let label_lines = token_lines(label_path)?;
    if data_lines.len() != label_lines.len() {
        return Err(MatrizError::dimension_mismatch(
            "label sequences",
            data_lines.len(),
            label_lines.len(),
        ));
    }

    let count = apply_limit(data_lines.len(), limit);
    if count == 0 {
        return Err(MatrizError::empty_input("sequence corpus"));
    }

    let mut data = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);
    for (i, (tokens, targets)) in data_lines.iter().zip(&label_lines).take(count).enumerate() {
        if tokens.len() != targets.len() {
            return Err(MatrizError::FormatError {
                message: format!(
                    "sequence {i}: {} tokens but {} labels",
                    tokens.len(),
                    targets.len()
                ),
            });
        }
        data.push(one_hot_sequence(tokens, vocab_dim)?);
        labels.push(one_hot_sequence(targets, vocab_dim)?);
    }
    Ok((data, labels))
}

/// Parses a file into per-line token index lists, skipping blank lines.
fn token_lines<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<usize>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut tokens = Vec::new();
        for token in trimmed.split_whitespace() {
            let index = token.parse::<usize>().map_err(|_| MatrizError::FormatError {
                message: format!("line {}: bad token index {token:?}", line_no + 1),
            })?;
            tokens.push(index);
        }
        lines.push(tokens);
    }
    Ok(lines)
}

/// One-hot encodes a token sequence as a `timesteps x vocab_dim` matrix.
fn one_hot_sequence(tokens: &[usize], vocab_dim: usize) -> Result<Matrix<f32>> {
    let mut out = Matrix::zeros(tokens.len(), vocab_dim);
    for (t, &token) in tokens.iter().enumerate() {
        if token >= vocab_dim {
            return Err(MatrizError::FormatError {
                message: format!("token index {token} outside vocabulary of {vocab_dim}"),
            });
        }
        out.set(t, token, 1.0);
    }
    Ok(out)
}
