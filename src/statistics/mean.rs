use num_traits::{Float, FromPrimitive};

use crate::math::Vector;
use crate::sample::Observations;
use super::Statistic;

/// Computes component-wise arithmetic mean using **Kahan summation** to
/// minimize floating-point error accumulation. This is critical when:
/// - Summing >10⁴ values
/// - Values have large dynamic range
/// - High precision required for downstream statistics
#[derive(Clone, Copy, Default)]
pub struct Mean;

impl<D, T> Statistic<D, T> for Mean
where
    D: AsRef<[T]>,
    T: Vector,
{
    fn compute(&self, data: &D) -> T {
        kahan_mean(data.as_ref().iter().copied())
    }
}

/// Per-column [`Mean`] of an observation matrix: the centroid of a group.
///
/// An empty matrix yields `NaN` in every column.
#[derive(Clone, Copy, Default)]
pub struct ColumnMean;

impl<F> Statistic<Observations<F>, Vec<F>> for ColumnMean
where
    F: Float + FromPrimitive,
{
    fn compute(&self, data: &Observations<F>) -> Vec<F> {
        (0..data.dim()).map(|j| kahan_mean(data.column(j))).collect()
    }
}

fn kahan_mean<T: Vector>(values: impl Iterator<Item = T>) -> T {
    let mut sum = T::zero();
    let mut c = T::zero();
    let mut n = 0_usize;

    for x in values {
        let y = x - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
        n += 1;
    }

    // 0/0 is NaN, which is the mean of nothing
    sum * T::from_usize(n).recip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn empty_slice_returns_nan() {
        let mean_f32: f32 = Mean.compute(&Vec::<f32>::new());
        assert!(mean_f32.is_nan(), "Empty slice must return NaN (got: {})", mean_f32);

        let mean_f64: f64 = Mean.compute(&Vec::<f64>::new());
        assert!(mean_f64.is_nan(), "Empty slice must return NaN (got: {})", mean_f64);
    }

    #[test]
    fn exact_integer_means() {
        assert_abs_diff_eq!(Mean.compute(&[1.0_f32, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(Mean.compute(&[1.0_f64, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn kahan_reduces_accumulation_error() {
        // Summing 0.1 × 10,000 exposes naive summation drift
        let n = 10_000;
        let data: Vec<f32> = vec![0.1_f32; n];
        let expected = 0.1_f32;

        let kahan_mean = Mean.compute(&data);
        let naive_mean: f32 = data.iter().sum::<f32>() / (n as f32);

        let kahan_error = (kahan_mean - expected).abs();
        let naive_error = (naive_mean - expected).abs();
        assert!(
            kahan_error < naive_error * 0.5,
            "Kahan error ({:.2e}) should be <50% of naive error ({:.2e})",
            kahan_error,
            naive_error
        );
    }

    #[test]
    fn column_mean_is_group_centroid() {
        let obs = Observations::from_rows(&[[0.0_f64, 0.0], [2.0, 0.0], [4.0, 3.0]]).unwrap();
        let centroid = ColumnMean.compute(&obs);
        assert_eq!(centroid.len(), 2);
        assert_abs_diff_eq!(centroid[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(centroid[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn column_mean_keeps_precision_at_scale() {
        let rows: Vec<[f64; 2]> = (0..100_000).map(|_| [1e-10, 1e10]).collect();
        let centroid = ColumnMean.compute(&Observations::from_rows(&rows).unwrap());
        assert_relative_eq!(centroid[0], 1e-10, max_relative = 1e-12);
        assert_relative_eq!(centroid[1], 1e10, max_relative = 1e-12);
    }

    #[test]
    fn column_mean_of_empty_matrix_is_nan() {
        let obs = Observations::from_flat(Vec::<f64>::new(), 3).unwrap();
        let centroid = ColumnMean.compute(&obs);
        assert_eq!(centroid.len(), 3);
        assert!(centroid.iter().all(|m| m.is_nan()));
    }
}
