//! Pairwise projection of labelled groups onto the axis joining their means.
//!
//! For every unordered pair of groups `(A, B)`, with `A` before `B` in sorted
//! label order, the separation axis is `(mean_A − mean_B) / ‖mean_A − mean_B‖`
//! and both groups are reduced to one dimension by projecting onto it. On
//! groups whitened together ([`Groups::whiten`](crate::Groups::whiten)) the
//! distance `‖mean_A − mean_B‖` is in pooled standard deviations.
//!
//! Pairs are produced in triangular grid order: the outer loop runs over the
//! "row" group, the inner loop over every group after it. Pair `(row, col)`
//! maps to cell `row·(G−1) + col + 1` of a `(G−1)×(G−1)` grid.

mod error;

use std::fmt::Display;

use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

use crate::math::{Euclidean, Metric, dot, sub};
use crate::sample::{Groups, Observations};
use crate::statistics::{ColumnMean, Statistic};

pub use error::ProjectionError;

/// Projection of one pair of groups onto their separation axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairResult<K, F> {
    /// Label of the group that comes first in sorted order.
    pub first: K,
    /// Label of the group that comes second.
    pub second: K,
    /// Position of `first` among the sorted groups.
    pub row: usize,
    /// Inner-loop index: position of `second` minus position of `first`, minus one.
    pub col: usize,
    /// Unit vector along `mean_first − mean_second`.
    pub separation: Vec<F>,
    /// Observations of `first` projected onto `separation`.
    pub projected_first: Vec<F>,
    /// Observations of `second` projected onto `separation`.
    pub projected_second: Vec<F>,
    /// `mean_first · separation`
    pub first_mean: F,
    /// `mean_second · separation`
    pub second_mean: F,
}

impl<K, F: Float> PairResult<K, F> {
    /// 1-based cell of this pair in a `(G−1)×(G−1)` subplot grid.
    pub fn grid_cell(&self, groups: usize) -> usize {
        grid_cell(self.row, self.col, groups)
    }

    /// Distance between the projected means, i.e. between the group means.
    pub fn distance(&self) -> F {
        (self.first_mean - self.second_mean).abs()
    }
}

/// Number of unordered pairs among `groups` groups.
pub fn pair_count(groups: usize) -> usize {
    groups * groups.saturating_sub(1) / 2
}

/// 1-based cell `row·(G−1) + col + 1` of pair `(row, col)` among `groups` groups.
pub fn grid_cell(row: usize, col: usize, groups: usize) -> usize {
    row * groups.saturating_sub(1) + col + 1
}

/// Project every pair of groups onto the axis joining their means.
///
/// Input is validated in full before anything is computed: at least two
/// groups, no empty group, one shared dimensionality. A pair whose means
/// coincide has no separation axis and fails the whole call.
pub fn analyze<K, F>(groups: &Groups<K, F>) -> Result<Vec<PairResult<K, F>>, ProjectionError>
where
    K: Ord + Clone + Display,
    F: Float + FromPrimitive,
{
    let prepared = prepare(groups)?;
    pair_indices(prepared.len())
        .map(|(a, b)| project_pair(&prepared, a, b))
        .collect()
}

/// Parallel variant of [`analyze`]; results come back in the same order.
#[cfg(feature = "rayon")]
pub fn analyze_par<K, F>(groups: &Groups<K, F>) -> Result<Vec<PairResult<K, F>>, ProjectionError>
where
    K: Ord + Clone + Display + Send + Sync,
    F: Float + FromPrimitive + Send + Sync,
{
    use rayon::prelude::*;

    let prepared = prepare(groups)?;
    let pairs: Vec<(usize, usize)> = pair_indices(prepared.len()).collect();
    pairs
        .into_par_iter()
        .map(|(a, b)| project_pair(&prepared, a, b))
        .collect()
}

struct Prepared<'a, K, F> {
    key: &'a K,
    observations: &'a Observations<F>,
    mean: Vec<F>,
}

fn prepare<K, F>(groups: &Groups<K, F>) -> Result<Vec<Prepared<'_, K, F>>, ProjectionError>
where
    K: Ord + Display,
    F: Float + FromPrimitive,
{
    if groups.len() < 2 {
        return Err(ProjectionError::InsufficientGroups { found: groups.len() });
    }
    if let Some((key, _)) = groups.iter().find(|(_, obs)| obs.is_empty()) {
        return Err(ProjectionError::EmptyGroup { group: key.to_string() });
    }

    let mut iter = groups.iter();
    let expected = iter.next().map_or(0, |(_, obs)| obs.dim());
    if let Some((key, obs)) = iter.find(|(_, obs)| obs.dim() != expected) {
        return Err(ProjectionError::ShapeMismatch {
            group: key.to_string(),
            expected,
            found: obs.dim(),
        });
    }

    let prepared: Vec<_> = groups
        .iter()
        .map(|(key, observations)| Prepared { key, observations, mean: ColumnMean.compute(observations) })
        .collect();

    // Degenerate axes are reported before any projection is computed
    for (a, b) in pair_indices(prepared.len()) {
        if Euclidean.normalize(&sub(&prepared[a].mean, &prepared[b].mean)).is_none() {
            return Err(ProjectionError::DegenerateSeparation {
                first: prepared[a].key.to_string(),
                second: prepared[b].key.to_string(),
            });
        }
    }

    Ok(prepared)
}

fn pair_indices(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |a| (a + 1..n).map(move |b| (a, b)))
}

fn project_pair<K, F>(prepared: &[Prepared<'_, K, F>], a: usize, b: usize) -> Result<PairResult<K, F>, ProjectionError>
where
    K: Clone + Display,
    F: Float,
{
    let (first, second) = (&prepared[a], &prepared[b]);
    let separation = Euclidean
        .normalize(&sub(&first.mean, &second.mean))
        .ok_or_else(|| ProjectionError::DegenerateSeparation {
            first: first.key.to_string(),
            second: second.key.to_string(),
        })?;

    let project = |obs: &Observations<F>| -> Vec<F> { obs.rows().map(|r| dot(r, &separation)).collect() };

    Ok(PairResult {
        first: first.key.clone(),
        second: second.key.clone(),
        row: a,
        col: b - a - 1,
        projected_first: project(first.observations),
        projected_second: project(second.observations),
        first_mean: dot(&first.mean, &separation),
        second_mean: dot(&second.mean, &separation),
        separation,
    })
}
