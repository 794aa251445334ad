//! # Ordinary Least Squares Examples
//!
//! Demonstrates linear regression on small synthetic problems:
//! - Fitting a line with an intercept
//! - Fitting a plane over two features
//! - Forcing the fit through the origin

use matriz::prelude::*;

/// Example 1: recover y = 2x + 1 from four points.
fn fit_line() {
    println!("=== Example 1: Line with intercept ===\n");

    let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("Valid matrix");
    let y = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0]);

    let mut model = LinearRegression::new();
    model.fit(&x, &y).expect("Fit should succeed");

    println!("coefficient: {:.4}", model.coefficients()[0]);
    println!("intercept:   {:.4}", model.intercept());
    println!("R²:          {:.4}\n", model.score(&x, &y));
}

/// Example 2: recover y = x1 + 2*x2 - 1 over two features.
fn fit_plane() {
    println!("=== Example 2: Plane over two features ===\n");

    let x = Matrix::from_vec(
        5,
        2,
        vec![1.0, 1.0, 2.0, 4.0, 3.0, 2.0, 4.0, 5.0, 5.0, 3.0],
    )
    .expect("Valid matrix");
    let y = Vector::from_slice(&[2.0, 9.0, 6.0, 13.0, 10.0]);

    let mut model = LinearRegression::new();
    model.fit(&x, &y).expect("Fit should succeed");

    let coef = model.coefficients();
    println!("coefficients: [{:.4}, {:.4}]", coef[0], coef[1]);
    println!("intercept:    {:.4}", model.intercept());

    let probe = Matrix::from_vec(1, 2, vec![6.0, 7.0]).expect("Valid matrix");
    println!("f(6, 7) =     {:.4}\n", model.predict(&probe)[0]);
}

/// Example 3: y = 3x with the intercept pinned at zero.
fn fit_through_origin() {
    println!("=== Example 3: Fit through the origin ===\n");

    let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("Valid matrix");
    let y = Vector::from_slice(&[3.0, 6.0, 9.0]);

    let mut model = LinearRegression::new().with_intercept(false);
    model.fit(&x, &y).expect("Fit should succeed");

    println!("coefficient: {:.4}", model.coefficients()[0]);
    println!("intercept:   {:.4}", model.intercept());
}

fn main() {
    fit_line();
    fit_plane();
    fit_through_origin();
}
