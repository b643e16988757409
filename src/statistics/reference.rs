use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};

/// Unit-variance normal density sampled on a fixed grid, used as a visual
/// calibration overlay for whitened data.
///
/// The curve is evaluated once on `[-HALF_WIDTH, HALF_WIDTH]`. Placing it at
/// another mean only translates the sample grid; the density values are
/// never re-evaluated, so the overlay is meaningful only if the projected
/// data has unit variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCurve {
    xs: Vec<f64>,
    density: Vec<f64>,
}

impl ReferenceCurve {
    /// Number of samples on the grid.
    pub const POINTS: usize = 51;
    /// Half width of the sampled interval, in standard deviations.
    pub const HALF_WIDTH: f64 = 4.0;

    /// The standard normal density at 51 evenly spaced points of `[-4, 4]`.
    pub fn standard() -> Self {
        let normal = Normal::standard();
        let xs: Vec<f64> = linspace(-Self::HALF_WIDTH, Self::HALF_WIDTH, Self::POINTS).collect();
        let density = xs.iter().map(|&x| normal.pdf(x)).collect();
        Self { xs, density }
    }

    /// Sample positions on the unshifted grid.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Density values; identical for every placement.
    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// The curve translated to `[mean - 4, mean + 4]`.
    pub fn centred_at(&self, mean: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        linspace(mean - Self::HALF_WIDTH, mean + Self::HALF_WIDTH, Self::POINTS)
            .zip(self.density.iter().copied())
    }
}

impl Default for ReferenceCurve {
    fn default() -> Self {
        Self::standard()
    }
}

/// `n` evenly spaced values from `start` to `stop`, both included.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (stop - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| if i + 1 == n && n > 1 { stop } else { start + step * i as f64 })
}
