//! Recurrent layer: forward pass and truncated backpropagation through time.

use crate::error::{MatrizError, Result};
use crate::primitives::{Matrix, Vector};

/// Single recurrent layer over one-hot input rows.
///
/// For each timestep `t` the layer computes
/// `s_t = tanh(U·x_t + W·s_{t-1})` and `o_t = softmax(V·s_t)`, with the
/// initial hidden state at zero. States and activations are written one
/// row per timestep.
#[derive(Debug, Clone)]
pub struct RnnLayer {
    /// Width of the hidden state.
    hidden_dim: usize,
    /// How many timesteps the gradient walk follows back from each output.
    bptt_truncate: usize,
}

impl RnnLayer {
    /// Creates a layer with the given hidden width and truncation depth.
    #[must_use]
    pub fn new(hidden_dim: usize, bptt_truncate: usize) -> Self {
        Self {
            hidden_dim,
            bptt_truncate,
        }
    }

    /// Returns the hidden state width.
    #[must_use]
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Returns the truncation depth.
    #[must_use]
    pub fn bptt_truncate(&self) -> usize {
        self.bptt_truncate
    }

    /// Checks that `u`, `w`, `v` agree with this layer and the input width.
    fn check_parameter_shapes(
        &self,
        feature_dim: usize,
        u: &Matrix<f32>,
        w: &Matrix<f32>,
        v: &Matrix<f32>,
    ) -> Result<()> {
        if u.shape() != (self.hidden_dim, feature_dim) {
            return Err(MatrizError::shape_mismatch(
                (self.hidden_dim, feature_dim),
                u.shape(),
            ));
        }
        if w.shape() != (self.hidden_dim, self.hidden_dim) {
            return Err(MatrizError::shape_mismatch(
                (self.hidden_dim, self.hidden_dim),
                w.shape(),
            ));
        }
        if v.shape() != (feature_dim, self.hidden_dim) {
            return Err(MatrizError::shape_mismatch(
                (feature_dim, self.hidden_dim),
                v.shape(),
            ));
        }
        Ok(())
    }

    /// Runs the forward pass over a whole sequence.
    ///
    /// `state` is resized to `timesteps x hidden_dim` and `activation` to
    /// `timesteps x feature_dim`. The input and parameters are only read.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if a parameter matrix does not agree
    /// with the layer width or the input width.
    pub fn feed_forward(
        &self,
        input: &Matrix<f32>,
        u: &Matrix<f32>,
        w: &Matrix<f32>,
        v: &Matrix<f32>,
        state: &mut Matrix<f32>,
        activation: &mut Matrix<f32>,
    ) -> Result<()> {
        let timesteps = input.n_rows();
        let feature_dim = input.n_cols();
        self.check_parameter_shapes(feature_dim, u, w, v)?;

        state.set_shallow_data(
            vec![0.0; timesteps * self.hidden_dim],
            timesteps,
            self.hidden_dim,
        )?;
        activation.set_shallow_data(vec![0.0; timesteps * feature_dim], timesteps, feature_dim)?;

        let mut prev = Vector::from_vec(vec![0.0; self.hidden_dim]);
        for t in 0..timesteps {
            let x_t = input.row(t);
            let from_input = u.matvec(&x_t)?;
            let from_state = w.matvec(&prev)?;

            let mut s_t = Vector::from_vec(vec![0.0; self.hidden_dim]);
            for j in 0..self.hidden_dim {
                s_t.set(j, (from_input[j] + from_state[j]).tanh());
            }

            let scores = v.matvec(&s_t)?;
            let probs = softmax(scores.as_slice());

            for j in 0..self.hidden_dim {
                state.set(t, j, s_t[j]);
            }
            for (k, p) in probs.iter().enumerate() {
                activation.set(t, k, *p);
            }
            prev = s_t;
        }
        Ok(())
    }

    /// Accumulates parameter gradients for one `(sequence, label)` pair.
    ///
    /// The accumulators are reset to zeros shaped like `u`, `w`, `v`, then
    /// filled by truncated backpropagation through time: at each timestep
    /// the output error `o_t - y_t` flows into `gV`, and a hidden-state
    /// error walks back up to `bptt_truncate` steps, feeding `gW` and `gU`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if label and input shapes differ or a
    /// parameter matrix does not agree with the layer width.
    #[allow(clippy::too_many_arguments)]
    pub fn back_propagation(
        &self,
        input: &Matrix<f32>,
        label: &Matrix<f32>,
        u: &Matrix<f32>,
        w: &Matrix<f32>,
        v: &Matrix<f32>,
        g_u: &mut Matrix<f32>,
        g_w: &mut Matrix<f32>,
        g_v: &mut Matrix<f32>,
    ) -> Result<()> {
        let timesteps = input.n_rows();
        let feature_dim = input.n_cols();
        self.check_parameter_shapes(feature_dim, u, w, v)?;
        if label.shape() != input.shape() {
            return Err(MatrizError::shape_mismatch(input.shape(), label.shape()));
        }

        let mut state = Matrix::new();
        let mut activation = Matrix::new();
        self.feed_forward(input, u, w, v, &mut state, &mut activation)?;

        let hidden = self.hidden_dim;
        g_u.set_shallow_data(vec![0.0; hidden * feature_dim], hidden, feature_dim)?;
        g_w.set_shallow_data(vec![0.0; hidden * hidden], hidden, hidden)?;
        g_v.set_shallow_data(vec![0.0; feature_dim * hidden], feature_dim, hidden)?;

        for t in (0..timesteps).rev() {
            let mut delta_o = Vec::with_capacity(feature_dim);
            for k in 0..feature_dim {
                delta_o.push(activation.get(t, k) - label.get(t, k));
            }

            for k in 0..feature_dim {
                for j in 0..hidden {
                    g_v.set(k, j, g_v.get(k, j) + delta_o[k] * state.get(t, j));
                }
            }

            // Hidden-state error entering timestep t.
            let mut delta = vec![0.0; hidden];
            for (j, d) in delta.iter_mut().enumerate() {
                let mut sum = 0.0;
                for k in 0..feature_dim {
                    sum += v.get(k, j) * delta_o[k];
                }
                let s = state.get(t, j);
                *d = sum * (1.0 - s * s);
            }

            let start = t.saturating_sub(self.bptt_truncate);
            for step in (start..=t).rev() {
                for j in 0..hidden {
                    for i in 0..hidden {
                        let prev = if step == 0 { 0.0 } else { state.get(step - 1, i) };
                        g_w.set(j, i, g_w.get(j, i) + delta[j] * prev);
                    }
                }
                for j in 0..hidden {
                    for k in 0..feature_dim {
                        g_u.set(j, k, g_u.get(j, k) + delta[j] * input.get(step, k));
                    }
                }

                let mut next_delta = vec![0.0; hidden];
                for (i, d) in next_delta.iter_mut().enumerate() {
                    let mut sum = 0.0;
                    for j in 0..hidden {
                        sum += w.get(j, i) * delta[j];
                    }
                    let prev = if step == 0 { 0.0 } else { state.get(step - 1, i) };
                    *d = sum * (1.0 - prev * prev);
                }
                delta = next_delta;
            }
        }
        Ok(())
    }
}

/// Numerically stable softmax over a score slice.
fn softmax(scores: &[f32]) -> Vec<f32> {
    let mut max = f32::NEG_INFINITY;
    for &s in scores {
        if s > max {
            max = s;
        }
    }
    let mut exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    for e in &mut exps {
        *e /= sum;
    }
    exps
}
