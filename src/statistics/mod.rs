//! Statistics computed over samples and observation matrices.

/// A summary computed from data of type `D`.
pub trait Statistic<D, T> {
    /// Evaluate the statistic on `data`.
    fn compute(&self, data: &D) -> T;
}

mod extent;
mod histogram;
mod mean;
mod reference;
mod standardize;

pub use extent::Extent;
pub use histogram::{Bins, Histogram};
pub use mean::{ColumnMean, Mean};
pub use reference::ReferenceCurve;
pub use standardize::{ColumnVariance, Standardize, whiten};

// ===== 2-tuple =====
impl<D, T1, T2, S1, S2> Statistic<D, (T1, T2)> for (S1, S2)
where
    S1: Statistic<D, T1>,
    S2: Statistic<D, T2>,
{
    #[inline]
    fn compute(&self, data: &D) -> (T1, T2) {
        let out1 = self.0.compute(data);
        let out2 = self.1.compute(data);
        (out1, out2)
    }
}
