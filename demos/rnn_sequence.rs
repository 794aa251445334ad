//! # Recurrent Network Training Example
//!
//! Trains a small RNN on a cyclic next-token task using wave-scheduled
//! mini-batch SGD, then saves the model and restores it from disk.

use matriz::prelude::*;

/// One-hot encodes a token sequence over a vocabulary.
fn one_hot(vocab: usize, tokens: &[usize]) -> Matrix<f32> {
    let mut m = Matrix::zeros(tokens.len(), vocab);
    for (t, &token) in tokens.iter().enumerate() {
        m.set(t, token, 1.0);
    }
    m
}

fn main() {
    let vocab = 4;

    // Cyclic corpus: each token predicts its successor mod the vocabulary
    let data: Vec<Matrix<f32>> = (0..vocab)
        .map(|start| {
            let tokens: Vec<usize> = (0..6).map(|t| (start + t) % vocab).collect();
            one_hot(vocab, &tokens)
        })
        .collect();
    let labels: Vec<Matrix<f32>> = (0..vocab)
        .map(|start| {
            let tokens: Vec<usize> = (0..6).map(|t| (start + t + 1) % vocab).collect();
            one_hot(vocab, &tokens)
        })
        .collect();

    println!("=== Training a 4-token cyclic predictor ===\n");

    let mut rnn = Rnn::with_seed(vocab, 8, 7).with_workers(2);
    let history = rnn
        .sgd(&data, &labels, 120, 0.1, 2)
        .expect("Training should succeed");

    println!("epoch   1 loss: {:.4}", history[0]);
    println!("epoch  30 loss: {:.4}", history[29]);
    println!("epoch 120 loss: {:.4}\n", history[history.len() - 1]);

    // Round-trip the weights through the archive format
    let path = std::env::temp_dir().join("rnn_sequence_demo.mtz");
    rnn.save(&path).expect("Save should succeed");
    let restored = Rnn::load(&path).expect("Load should succeed");

    let original = rnn.loss(&data, &labels).expect("Loss should succeed");
    let reloaded = restored.loss(&data, &labels).expect("Loss should succeed");
    println!("loss before save: {original:.6}");
    println!("loss after load:  {reloaded:.6}");

    std::fs::remove_file(&path).ok();
}
