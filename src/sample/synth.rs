//! Synthetic clusters for demos, benches and tests.

use rand::Rng;
use rand::distributions::Distribution;
use statrs::distribution::Normal;

use super::Observations;

/// Draw `n` observations from an isotropic Gaussian around `centre`.
///
/// A non-positive or non-finite `sigma` collapses every observation onto the centre.
pub fn gaussian_cluster<R: Rng>(
    rng: &mut R,
    n: usize,
    centre: &[f64],
    sigma: f64,
) -> Observations<f64> {
    let dim = centre.len();
    let noise = Normal::new(0.0, sigma).ok().filter(|_| sigma > 0.0);

    let mut data = Vec::with_capacity(n * dim);
    for _ in 0..n {
        data.extend(centre.iter().map(|&c| match &noise {
            Some(normal) => c + normal.sample(rng),
            None => c,
        }));
    }

    Observations::from_flat(data, dim).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{ColumnMean, ColumnVariance, Statistic};
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn cluster_is_centred_on_request() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let obs = gaussian_cluster(&mut rng, 5_000, &[5.0, -5.0], 1.0);
        assert_eq!((obs.len(), obs.dim()), (5_000, 2));
        let mean = ColumnMean.compute(&obs);
        assert_abs_diff_eq!(mean[0], 5.0, epsilon = 0.1);
        assert_abs_diff_eq!(mean[1], -5.0, epsilon = 0.1);
    }

    #[test]
    fn cluster_spread_follows_sigma() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let obs = gaussian_cluster(&mut rng, 5_000, &[0.0, 3.0], 2.0);
        for variance in ColumnVariance::default().compute(&obs) {
            assert_abs_diff_eq!(variance, 4.0, epsilon = 0.3);
        }
    }

    #[test]
    fn zero_sigma_repeats_the_centre() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let obs = gaussian_cluster(&mut rng, 3, &[1.0, 2.0], 0.0);
        assert_eq!(obs.as_slice(), &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
    }
}
