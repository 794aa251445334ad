//! Element trait shared by integer and real matrices.

use std::fmt::{Debug, Display};

use num_traits::{Num, NumAssign, NumCast};
use ordered_float::OrderedFloat;

/// Numeric element type for [`Matrix`](super::Matrix) and
/// [`Vector`](super::Vector).
///
/// Unifies `i32` and `f32` matrices behind one bound. The associated
/// [`Key`](Scalar::Key) is a totally ordered stand-in for the value itself,
/// so frequency maps can count float labels without tripping over `NaN`
/// ordering.
pub trait Scalar:
    Num + NumAssign + NumCast + Copy + PartialOrd + Debug + Display + Send + Sync + 'static
{
    /// Totally ordered counting key for this element type.
    type Key: Ord + Eq + Copy + Debug + Send + Sync;

    /// Converts the value into its counting key.
    fn key(self) -> Self::Key;

    /// Recovers the value from its counting key.
    fn from_key(key: Self::Key) -> Self;

    /// Widens to `f32` for real-valued results (inversion, entropy, loss).
    fn to_f32_lossy(self) -> f32 {
        self.to_f32().unwrap_or(0.0)
    }
}

impl Scalar for i32 {
    type Key = i32;

    fn key(self) -> Self::Key {
        self
    }

    fn from_key(key: Self::Key) -> Self {
        key
    }
}

impl Scalar for f32 {
    type Key = OrderedFloat<f32>;

    fn key(self) -> Self::Key {
        OrderedFloat(self)
    }

    fn from_key(key: Self::Key) -> Self {
        key.into_inner()
    }
}
