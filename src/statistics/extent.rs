use num_traits::Float;

use super::Statistic;

/// Smallest and largest finite value, `None` when there is none.
///
/// NaN and infinities are skipped, like `nanmin`/`nanmax` with infinities
/// treated as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extent;

impl<D, F> Statistic<D, Option<(F, F)>> for Extent
where
    D: AsRef<[F]>,
    F: Float,
{
    fn compute(&self, data: &D) -> Option<(F, F)> {
        data.as_ref()
            .iter()
            .copied()
            .filter(|x| x.is_finite())
            .fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
    }
}

impl Extent {
    /// Merge two extents.
    pub fn union<F: Float>(a: Option<(F, F)>, b: Option<(F, F)>) -> Option<(F, F)> {
        match (a, b) {
            (Some((l1, h1)), Some((l2, h2))) => Some((l1.min(l2), h1.max(h2))),
            (one, None) | (None, one) => one,
        }
    }

    /// Widen `(lo, hi)` away from zero by `factor` (e.g. `1.1` for 10 %).
    ///
    /// `lo` moves down by `|lo|·(factor − 1)` and `hi` up by `|hi|·(factor − 1)`,
    /// which is `lo·factor, hi·factor` for ranges straddling zero. Empty ranges
    /// are padded by ±0.5.
    pub fn expand<F: Float>((lo, hi): (F, F), factor: F) -> (F, F) {
        let grow = factor - F::one();
        let (lo, hi) = (lo - lo.abs() * grow, hi + hi.abs() * grow);
        if hi > lo {
            (lo, hi)
        } else {
            let half = F::from(0.5).unwrap_or_else(F::one);
            (lo - half, hi + half)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn skips_nan_and_infinity() {
        let (lo, hi) = Extent.compute(&[f64::NAN, 2.0, -1.0, f64::INFINITY, 5.0]).unwrap();
        assert_abs_diff_eq!(lo, -1.0);
        assert_abs_diff_eq!(hi, 5.0);
        assert!(Extent.compute(&[f64::NAN]).is_none());
        assert!(Extent.compute(&Vec::<f32>::new()).is_none());
    }

    #[test]
    fn expand_scales_straddling_ranges() {
        let (lo, hi) = Extent::expand((-2.0_f64, 4.0), 1.1);
        assert_abs_diff_eq!(lo, -2.2, epsilon = 1e-12);
        assert_abs_diff_eq!(hi, 4.4, epsilon = 1e-12);
    }

    #[test]
    fn expand_never_shrinks_positive_ranges() {
        let (lo, hi) = Extent::expand((1.0_f64, 2.0), 1.05);
        assert!(lo < 1.0 && hi > 2.0);
    }

    #[test]
    fn expand_pads_empty_ranges() {
        let (lo, hi) = Extent::expand((0.0_f64, 0.0), 1.1);
        assert_abs_diff_eq!(lo, -0.5);
        assert_abs_diff_eq!(hi, 0.5);
    }

    #[test]
    fn union_merges() {
        assert_eq!(Extent::union(Some((0.0, 1.0)), Some((-1.0, 0.5))), Some((-1.0, 1.0)));
        assert_eq!(Extent::union(None, Some((2.0, 3.0))), Some((2.0, 3.0)));
        assert_eq!(Extent::union::<f64>(None, None), None);
    }
}
