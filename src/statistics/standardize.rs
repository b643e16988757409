use num_traits::{Float, FromPrimitive};

use crate::sample::{Groups, Observations};
use super::{ColumnMean, Statistic};

/// Transform data column by column into a normalised copy.
pub trait Standardize<D> {
    /// Standardized copy of `data`.
    fn standardize(&self, data: &D) -> D;
}

/// Per-column variance of an observation matrix.
#[derive(Debug, Clone, Copy)]
pub struct ColumnVariance {
    /// Delta degrees of freedom subtracted from the sample count.
    pub ddof: usize,
}

impl ColumnVariance {
    /// Creates a new `ColumnVariance` estimator with the given degrees of freedom adjustment.
    ///
    /// - `ddof = 0`: population variance (biased)
    /// - `ddof = 1`: sample variance (unbiased, Bessel's correction), the default
    pub fn new(ddof: usize) -> Self {
        ColumnVariance { ddof }
    }
}

impl Default for ColumnVariance {
    fn default() -> Self {
        ColumnVariance { ddof: 1 }
    }
}

impl<F> Statistic<Observations<F>, Vec<F>> for ColumnVariance
where
    F: Float + FromPrimitive,
{
    fn compute(&self, data: &Observations<F>) -> Vec<F> {
        let n = data.len();
        // Variance undefined without degrees of freedom left
        if n <= self.ddof {
            return vec![F::nan(); data.dim()];
        }
        let dof = F::from_usize(n - self.ddof).unwrap_or_else(F::nan);

        ColumnMean
            .compute(data)
            .into_iter()
            .enumerate()
            .map(|(j, mean)| {
                // Kahan summation for squared deviations
                let mut sq_sum = F::zero();
                let mut c2 = F::zero();
                for x in data.column(j) {
                    let dev = x - mean;
                    let y = dev * dev - c2;
                    let t = sq_sum + y;
                    c2 = (t - sq_sum) - y;
                    sq_sum = t;
                }
                sq_sum / dof
            })
            .collect()
    }
}

impl<F> Standardize<Observations<F>> for ColumnMean
where
    F: Float + FromPrimitive,
{
    /// Subtract the column mean from every column.
    fn standardize(&self, data: &Observations<F>) -> Observations<F> {
        let means = self.compute(data);
        rescale(data, |j, x| x - means[j])
    }
}

impl<F> Standardize<Observations<F>> for ColumnVariance
where
    F: Float + FromPrimitive,
{
    /// Divide every column by its standard deviation. Constant columns are left unscaled.
    fn standardize(&self, data: &Observations<F>) -> Observations<F> {
        let scales = unit_scales(self.compute(data));
        rescale(data, |j, x| x / scales[j])
    }
}

/// Standard deviations to divide by; constant or undefined columns keep scale one.
fn unit_scales<F: Float>(variances: Vec<F>) -> Vec<F> {
    variances
        .into_iter()
        .map(|var| {
            let sd = var.sqrt();
            if sd.is_finite() && sd > F::zero() { sd } else { F::one() }
        })
        .collect()
}

/// Diagonal whitening of a single matrix: zero mean and unit variance in
/// every column.
///
/// This removes the matrix's own mean, so applying it group by group would
/// put every group at the origin. Labelled groups are whitened together with
/// [`Groups::whiten`].
pub fn whiten<F: Float + FromPrimitive>(data: &Observations<F>) -> Observations<F> {
    ColumnVariance::default().standardize(&ColumnMean.standardize(data))
}

impl<K, F> Groups<K, F>
where
    K: Ord + Clone,
    F: Float + FromPrimitive,
{
    /// Diagonal whitening with one transform for all groups.
    ///
    /// Column means and standard deviations are taken over the union of every
    /// group, then the same shift and scale is applied to each group, so the
    /// distances between groups are kept in units of the pooled spread. This
    /// is the pre-whitening the cluster projection overlay assumes, up to
    /// correlations between dimensions.
    ///
    /// Groups of differing dimensionality have no common transform and are
    /// returned unchanged; [`analyze`](crate::analyze) reports the mismatch.
    #[must_use]
    pub fn whiten(&self) -> Self {
        let dim = self.iter().next().map_or(0, |(_, obs)| obs.dim());
        if self.iter().any(|(_, obs)| obs.dim() != dim) {
            return self.clone();
        }
        let values = self.iter().flat_map(|(_, obs)| obs.as_slice().iter().copied()).collect();
        let Ok(pooled) = Observations::from_flat(values, dim) else {
            return self.clone();
        };

        let means = ColumnMean.compute(&pooled);
        let scales = unit_scales(ColumnVariance::default().compute(&pooled));
        self.iter()
            .map(|(key, obs)| (key.clone(), rescale(obs, |j, x| (x - means[j]) / scales[j])))
            .collect()
    }
}

fn rescale<F: Float>(data: &Observations<F>, f: impl Fn(usize, F) -> F) -> Observations<F> {
    let dim = data.dim();
    let values = data
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, &x)| f(i % dim.max(1), x))
        .collect();
    Observations::from_flat(values, dim).unwrap_or_else(|_| data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::projection::analyze;
    use crate::sample::synth::gaussian_cluster;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn clusters() -> Groups<usize, f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        [[0.0, 0.0], [5.0, 0.0], [0.0, 5.0]]
            .iter()
            .enumerate()
            .map(|(k, centre)| (k, gaussian_cluster(&mut rng, 300, centre, 1.0)))
            .collect()
    }

    fn sample() -> Observations<f64> {
        Observations::from_rows(&[[1.0, 10.0], [2.0, 10.0], [3.0, 10.0], [4.0, 10.0]]).unwrap()
    }

    #[test]
    fn column_variance_matches_hand_computation() {
        let var = ColumnVariance::default().compute(&sample());
        assert_abs_diff_eq!(var[0], 5.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(var[1], 0.0, epsilon = 1e-12);

        let pop = ColumnVariance::new(0).compute(&sample());
        assert_abs_diff_eq!(pop[0], 1.25, epsilon = 1e-12);
    }

    #[test]
    fn variance_needs_degrees_of_freedom() {
        let single = Observations::from_rows(&[[1.0_f64, 2.0]]).unwrap();
        assert!(ColumnVariance::default().compute(&single).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn centring_removes_the_mean() {
        let centred = ColumnMean.standardize(&sample());
        let means = ColumnMean.compute(&centred);
        assert_abs_diff_eq!(means[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(means[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn whitening_gives_unit_variance_and_keeps_constant_columns() {
        let white = whiten(&sample());
        let var = ColumnVariance::default().compute(&white);
        assert_abs_diff_eq!(var[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(var[1], 0.0, epsilon = 1e-12);
        assert!(white.as_slice().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn pooled_whitening_keeps_groups_apart() {
        let white = clusters().whiten();
        for pair in analyze(&white).unwrap() {
            assert!(pair.distance() > 1.5, "pair {}-{} collapsed to {}", pair.first, pair.second, pair.distance());
        }
    }

    #[test]
    fn pooled_whitening_standardizes_the_union() {
        let white = clusters().whiten();
        let values: Vec<f64> = white.iter().flat_map(|(_, obs)| obs.as_slice().to_vec()).collect();
        let union = Observations::from_flat(values, 2).unwrap();
        let means = ColumnMean.compute(&union);
        let var = ColumnVariance::default().compute(&union);
        for j in 0..2 {
            assert_abs_diff_eq!(means[j], 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(var[j], 1.0, epsilon = 1e-9);
        }
        // the first group keeps its place left of the second
        let first = ColumnMean.compute(white.get(&0).unwrap());
        let second = ColumnMean.compute(white.get(&1).unwrap());
        assert!(second[0] - first[0] > 1.5);
    }

    #[test]
    fn pooled_whitening_leaves_mismatched_groups_alone() {
        let groups: Groups<u8, f64> = [
            (0, Observations::from_rows(&[[1.0, 2.0]]).unwrap()),
            (1, Observations::from_rows(&[[1.0, 2.0, 3.0]]).unwrap()),
        ]
        .into_iter()
        .collect();
        assert_eq!(groups.whiten(), groups);
    }
}
