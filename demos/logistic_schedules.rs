//! # Logistic Regression Schedule Examples
//!
//! Trains the same separable dataset under all three gradient-descent
//! schedules and compares the learned boundaries:
//! - Batch: full-dataset gradient per epoch
//! - Stochastic: one sample per step, drawn with a seeded RNG
//! - SmoothStochastic: per-step decaying learning rate

use matriz::prelude::*;

fn train_with(mode: GradientDescent, x: &Matrix<f32>, y: &Vector<f32>) {
    let mut model = LogisticRegression::new()
        .with_mode(mode)
        .with_epochs(150)
        .with_seed(42);
    model.fit(x, y).expect("Fit should succeed");

    let boundary = -model.intercept() / model.coefficients()[0];
    println!("--- {mode:?} ---");
    println!("coefficient: {:.4}", model.coefficients()[0]);
    println!("intercept:   {:.4}", model.intercept());
    println!("boundary:    x = {boundary:.4}");
    println!("accuracy:    {:.2}\n", model.score(x, y));
}

fn main() {
    // One feature, classes split around x = 0
    let x = Matrix::from_vec(8, 1, vec![-4.0, -3.0, -2.0, -1.0, 1.0, 2.0, 3.0, 4.0])
        .expect("Valid matrix");
    let y = Vector::from_slice(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);

    println!("=== Gradient-descent schedules on a separable line ===\n");
    for mode in [
        GradientDescent::Batch,
        GradientDescent::Stochastic,
        GradientDescent::SmoothStochastic,
    ] {
        train_with(mode, &x, &y);
    }

    // Probabilities from the batch-trained model
    let mut model = LogisticRegression::new().with_epochs(150);
    model.fit(&x, &y).expect("Fit should succeed");
    let proba = model.predict_proba(&x);
    println!("--- Batch probabilities ---");
    for i in 0..x.n_rows() {
        println!("P(class=1 | x={:+.1}) = {:.4}", x.get(i, 0), proba[i]);
    }
}
