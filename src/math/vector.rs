//! Basic linear algebra traits
//!
//! Observations are stored as plain coordinate slices, so the operations the
//! analyzer needs (difference of two means, inner products) are free
//! functions over `&[F]`. The [`Vector`] trait only describes the element
//! type that can be accumulated with compensated summation.

use num_traits::{Float, FromPrimitive};
use std::ops::{Add, Div, Mul, Sub};

/// Vector space over a float.
///
/// The `Copy` bound restricts this trait to stack-allocated types.
pub trait Vector:
    Add<Self, Output = Self>
    + Sub<Self, Output = Self>
    + Mul<Self::Field, Output = Self>
    + Div<Self::Field, Output = Self>
    + Sized
    + Copy
{
    /// Scalar field of the space.
    type Field: Float + FromPrimitive + Copy;

    /// Zero vector of this space.
    fn zero() -> Self;

    /// Convert `usize` to the scalar field.
    ///
    /// Every `Float` in use (`f32`, `f64`) represents any `usize` up to
    /// rounding, so the conversion saturates to `NaN` only for exotic fields.
    #[inline(always)]
    fn from_usize(u: usize) -> Self::Field {
        <Self::Field as FromPrimitive>::from_usize(u).unwrap_or_else(<Self::Field as Float>::nan)
    }
}

impl<F> Vector for F
where
    F: Float + FromPrimitive + Copy,
{
    type Field = F;

    #[inline(always)]
    fn zero() -> Self {
        F::zero()
    }
}

/// Inner product of two coordinate slices.
///
/// Slices of different length are truncated to the shorter one; callers
/// validate dimensionality before projecting.
#[inline]
pub fn dot<F: Float>(a: &[F], b: &[F]) -> F {
    a.iter()
        .zip(b)
        .fold(F::zero(), |acc, (&x, &y)| x.mul_add(y, acc))
}

/// Component-wise difference `a - b`.
#[inline]
pub fn sub<F: Float>(a: &[F], b: &[F]) -> Vec<F> {
    a.iter().zip(b).map(|(&x, &y)| x - y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dot_of_orthogonal_vectors_is_zero() {
        assert_abs_diff_eq!(dot(&[1.0_f64, 0.0], &[0.0, 3.0]), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn dot_matches_hand_computation() {
        assert_abs_diff_eq!(dot(&[1.0_f64, 2.0, 3.0], &[4.0, -5.0, 6.0]), 12.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dot(&[0.5_f32, 0.5], &[2.0, 2.0]), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn sub_is_component_wise() {
        let diff = sub(&[1.0_f64, 5.0, -2.0], &[11.0, 5.0, 2.0]);
        assert_eq!(diff.len(), 3);
        assert_abs_diff_eq!(diff[0], -10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(diff[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(diff[2], -4.0, epsilon = 1e-12);
    }

    #[test]
    fn from_usize_converts_counts() {
        assert_abs_diff_eq!(<f64 as Vector>::from_usize(1_000), 1_000.0, epsilon = 1e-12);
    }
}
