//! Linear algebra used by the statistics and the projection analyzer.

mod metric;
mod vector;

pub use metric::{Euclidean, Metric};
pub use vector::{Vector, dot, sub};
