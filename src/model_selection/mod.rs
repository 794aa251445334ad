//! Epoch-level row shuffling for trainers.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Randomized row-permutation view over a matrix.
///
/// Holds a permutation of `0..n_rows` and a reshuffleable RNG. Trainers
/// walk [`order`](MatrixShuffler::order) to visit rows in permuted order;
/// the underlying matrix is never touched. Reshuffling advances the RNG
/// stream, so every epoch sees a fresh permutation.
///
/// # Examples
///
/// ```
/// use matriz::model_selection::MatrixShuffler;
///
/// let mut shuffler = MatrixShuffler::with_seed(5, 42);
/// shuffler.shuffle();
/// let mut seen: Vec<usize> = shuffler.order().to_vec();
/// seen.sort_unstable();
/// assert_eq!(seen, vec![0, 1, 2, 3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct MatrixShuffler {
    order: Vec<usize>,
    rng: StdRng,
}

impl MatrixShuffler {
    /// Creates a shuffler over `n_rows` rows with an entropy-seeded RNG.
    /// The initial order is the identity permutation.
    #[must_use]
    pub fn new(n_rows: usize) -> Self {
        Self {
            order: (0..n_rows).collect(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a shuffler with a fixed seed for reproducible permutations.
    #[must_use]
    pub fn with_seed(n_rows: usize, seed: u64) -> Self {
        Self {
            order: (0..n_rows).collect(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Re-randomizes the row order (Fisher-Yates).
    pub fn shuffle(&mut self) {
        self.order.shuffle(&mut self.rng);
    }

    /// The current permutation.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// The row visited at permuted position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn index(&self, i: usize) -> usize {
        self.order[i]
    }

    /// Number of rows covered by the permutation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the shuffler covers no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
