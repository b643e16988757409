use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

use super::{Extent, Statistic};

/// Equal-width histogram over the range of the data.
///
/// Bin edges run from the smallest to the largest finite value; the last bin
/// is closed on the right so the maximum is counted. A degenerate range
/// `[v, v]` is widened to `[v - 0.5, v + 0.5]`. Non-finite values are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Histogram {
    /// Number of equal-width bins.
    pub bins: usize,
    /// Normalise heights so the histogram integrates to one.
    pub density: bool,
}

impl Histogram {
    /// Density-normalised histogram with `bins` bins.
    pub fn density(bins: usize) -> Self {
        Self { bins, density: true }
    }

    /// Raw counts in `bins` bins.
    pub fn counts(bins: usize) -> Self {
        Self { bins, density: false }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::density(50)
    }
}

/// Binned data: `edges.len() == heights.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bins<F> {
    /// Ascending bin edges.
    pub edges: Vec<F>,
    /// Count or density per bin.
    pub heights: Vec<F>,
}

impl<F: Float> Bins<F> {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Check if there are no bins.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Common bin width.
    pub fn width(&self) -> F {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(&a), Some(&b)) => b - a,
            _ => F::zero(),
        }
    }

    /// `(left, right, height)` triples, one per bin.
    pub fn iter(&self) -> impl Iterator<Item = (F, F, F)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.heights)
            .map(|(w, &h)| (w[0], w[1], h))
    }
}

impl<D, F> Statistic<D, Bins<F>> for Histogram
where
    D: AsRef<[F]>,
    F: Float + FromPrimitive,
{
    fn compute(&self, data: &D) -> Bins<F> {
        let bins = self.bins.max(1);
        let nb = F::from_usize(bins).unwrap_or_else(F::one);
        let half = F::from_f64(0.5).unwrap_or_else(F::zero);

        let (lo, hi) = match Extent.compute(data) {
            Some((lo, hi)) if hi > lo => (lo, hi),
            Some((v, _)) => (v - half, v + half),
            None => (F::zero(), F::one()),
        };
        let width = (hi - lo) / nb;

        let mut counts = vec![0_usize; bins];
        let mut total = 0_usize;
        for &x in data.as_ref().iter().filter(|x| x.is_finite()) {
            let idx = ((x - lo) / width).floor().to_usize().unwrap_or(0).min(bins - 1);
            counts[idx] += 1;
            total += 1;
        }

        let edges = (0..=bins)
            .map(|i| lo + width * F::from_usize(i).unwrap_or_else(F::zero))
            .collect();

        let norm = if self.density && total > 0 {
            F::from_usize(total).unwrap_or_else(F::one) * width
        } else {
            F::one()
        };
        let heights = counts
            .into_iter()
            .map(|c| F::from_usize(c).unwrap_or_else(F::zero) / norm)
            .collect();

        Bins { edges, heights }
    }
}
