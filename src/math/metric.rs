use num_traits::Float;

use super::vector;

/// Inner-product structure on coordinate slices.
///
/// `norm` and `normalize` are derived from `dot`, so an implementation only
/// has to provide the bilinear form.
pub trait Metric<F: Float> {
    /// Inner product `<v, w>`.
    fn dot(&self, v: &[F], w: &[F]) -> F;

    /// Length of `v` induced by the inner product.
    fn norm(&self, v: &[F]) -> F {
        self.dot(v, v).sqrt()
    }

    /// Rescale `v` to unit length.
    ///
    /// Returns `None` when the norm is zero or not finite: a zero-length
    /// vector has no direction and dividing by it would only produce NaN.
    fn normalize(&self, v: &[F]) -> Option<Vec<F>> {
        let norm = self.norm(v);
        if !norm.is_finite() || norm <= F::zero() {
            return None;
        }
        Some(v.iter().map(|&x| x / norm).collect())
    }
}

/// The standard Euclidean inner product.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl<F: Float> Metric<F> for Euclidean {
    #[inline]
    fn dot(&self, v: &[F], w: &[F]) -> F {
        vector::dot(v, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn norm_of_pythagorean_triple() {
        assert_abs_diff_eq!(Euclidean.norm(&[3.0_f64, 4.0]), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn normalize_yields_unit_length() {
        let unit = Euclidean.normalize(&[-10.0_f64, 0.0, 0.0]).expect("non-zero vector");
        assert_abs_diff_eq!(Euclidean.norm(&unit), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(unit[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        assert!(Euclidean.normalize(&[0.0_f64, 0.0]).is_none());
        assert!(Euclidean.normalize(&[] as &[f64]).is_none());
    }

    #[test]
    fn normalize_rejects_nan() {
        assert!(Euclidean.normalize(&[f64::NAN, 1.0]).is_none());
    }
}
