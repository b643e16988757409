mod read;
pub mod synth;

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::error::Error as StdError;
use std::fmt;

use num_traits::Float;
use serde::{Deserialize, Serialize};

pub use read::SampleError;

/// Reasons an array could not be shaped into observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// A row does not have the length of the first row.
    Ragged {
        /// 0-based index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A flat buffer cannot be split into rows of the requested width.
    NotDivisible {
        /// Buffer length.
        len: usize,
        /// Requested row width.
        dim: usize,
    },
    /// Declared dimensions do not multiply up to the buffer length.
    Mismatch {
        /// Product of the declared dimensions.
        expected: usize,
        /// Buffer length.
        found: usize,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::Ragged { row, expected, found } => {
                write!(f, "row {row} has {found} columns, expected {expected}")
            }
            ShapeError::NotDivisible { len, dim } => {
                write!(f, "{len} values cannot be split into rows of width {dim}")
            }
            ShapeError::Mismatch { expected, found } => {
                write!(f, "declared shape holds {expected} values, buffer has {found}")
            }
        }
    }
}

impl StdError for ShapeError {}

/// Dense `n × D` matrix of observations, one observation per row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observations<F> {
    data: Vec<F>,
    dim: usize,
}

impl<F: Copy> Observations<F> {
    /// Create observations from a row-major buffer of rows of width `dim`.
    pub fn from_flat(data: Vec<F>, dim: usize) -> Result<Self, ShapeError> {
        if (dim == 0 && !data.is_empty()) || (dim != 0 && data.len() % dim != 0) {
            return Err(ShapeError::NotDivisible { len: data.len(), dim });
        }
        Ok(Self { data, dim })
    }

    /// Create observations from individual rows; every row must have the same length.
    pub fn from_rows<R: AsRef<[F]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let dim = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(dim * rows.len());
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != dim {
                return Err(ShapeError::Ragged { row, expected: dim, found: r.len() });
            }
            data.extend_from_slice(r);
        }
        Ok(Self { data, dim })
    }

    /// Channel-concatenate `(n, samples, channels)` waveforms into `n × (samples·channels)`.
    ///
    /// `data` is indexed as `data[(i * samples + s) * channels + c]`. Row `i`
    /// of the result holds channel 0's samples, then channel 1's, and so on.
    pub fn from_multichannel(
        data: &[F],
        n: usize,
        samples: usize,
        channels: usize,
    ) -> Result<Self, ShapeError> {
        let expected = n * samples * channels;
        if data.len() != expected {
            return Err(ShapeError::Mismatch { expected, found: data.len() });
        }
        let width = samples * channels;
        let mut out = Vec::with_capacity(expected);
        for i in 0..n {
            for c in 0..channels {
                out.extend((0..samples).map(|s| data[(i * samples + s) * channels + c]));
            }
        }
        Ok(Self { data: out, dim: width })
    }

    /// Number of observations (rows).
    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    /// Check if there are no observations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality `D` of every observation.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Observation `i`, if present.
    pub fn row(&self, i: usize) -> Option<&[F]> {
        let start = i.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim).filter(|_| self.dim > 0)
    }

    /// Iterate observations in order.
    pub fn rows(&self) -> impl Iterator<Item = &[F]> + '_ {
        self.data.chunks_exact(self.dim.max(1)).filter(move |_| self.dim > 0)
    }

    /// Iterate the values of column `j`; empty when `j` is out of range.
    pub fn column(&self, j: usize) -> impl Iterator<Item = F> + '_ {
        let valid = j < self.dim;
        self.rows().filter(move |_| valid).map(move |r| r[j])
    }

    /// New observations restricted to the given columns, in the given order.
    pub fn select_columns(&self, columns: &[usize]) -> Option<Self> {
        if columns.iter().any(|&c| c >= self.dim) {
            return None;
        }
        let data = self
            .rows()
            .flat_map(|r| columns.iter().map(move |&c| r[c]))
            .collect();
        Some(Self { data, dim: columns.len() })
    }

    /// Row-major backing buffer.
    pub fn as_slice(&self) -> &[F] {
        &self.data
    }
}

impl<F: Float> Observations<F> {
    /// Apply `f` to every value.
    #[must_use]
    pub fn map(&self, f: impl Fn(F) -> F) -> Self {
        Self { data: self.data.iter().map(|&x| f(x)).collect(), dim: self.dim }
    }
}

impl<F> AsRef<[F]> for Observations<F> {
    fn as_ref(&self) -> &[F] {
        &self.data
    }
}

/// Labelled groups of observations, always iterated in sorted label order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Groups<K: Ord, F> {
    inner: BTreeMap<K, Observations<F>>,
}

impl<K: Ord, F> Default for Groups<K, F> {
    fn default() -> Self {
        Self { inner: BTreeMap::new() }
    }
}

impl<K: Ord, F> Groups<K, F> {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a group, returning the previous observations.
    pub fn insert(&mut self, key: K, observations: Observations<F>) -> Option<Observations<F>> {
        self.inner.insert(key, observations)
    }

    /// Observations of group `key`.
    pub fn get(&self, key: &K) -> Option<&Observations<F>> {
        self.inner.get(key)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Groups in sorted label order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, Observations<F>> {
        self.inner.iter()
    }

    /// Sorted labels.
    pub fn keys(&self) -> btree_map::Keys<'_, K, Observations<F>> {
        self.inner.keys()
    }
}

impl<F> Groups<usize, F> {
    /// Wrap a single observation matrix as the one-entry mapping `{0: observations}`.
    pub fn single_group(observations: Observations<F>) -> Self {
        Self { inner: BTreeMap::from([(0, observations)]) }
    }
}

impl<K: Ord, F> From<BTreeMap<K, Observations<F>>> for Groups<K, F> {
    fn from(inner: BTreeMap<K, Observations<F>>) -> Self {
        Self { inner }
    }
}

impl<K: Ord, F> FromIterator<(K, Observations<F>)> for Groups<K, F> {
    fn from_iter<I: IntoIterator<Item = (K, Observations<F>)>>(iter: I) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}

impl<'a, K: Ord, F> IntoIterator for &'a Groups<K, F> {
    type Item = (&'a K, &'a Observations<F>);
    type IntoIter = btree_map::Iter<'a, K, Observations<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// Dense three-way tensor of shape `(a, b, c)`, last axis contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube<F> {
    data: Vec<F>,
    shape: (usize, usize, usize),
}

impl<F: Float> Cube<F> {
    /// Wrap a buffer indexed as `data[(i * b + j) * c + k]`.
    pub fn new(data: Vec<F>, shape: (usize, usize, usize)) -> Result<Self, ShapeError> {
        let expected = shape.0 * shape.1 * shape.2;
        if data.len() != expected {
            return Err(ShapeError::Mismatch { expected, found: data.len() });
        }
        Ok(Self { data, shape })
    }

    /// Shape `(a, b, c)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    /// The contiguous lane `[i, j, :]`.
    pub fn lane(&self, i: usize, j: usize) -> Option<&[F]> {
        let (a, b, c) = self.shape;
        if i >= a || j >= b {
            return None;
        }
        let start = (i * b + j) * c;
        self.data.get(start..start + c)
    }

    /// Apply an element-wise transform, e.g. a log or absolute value.
    #[must_use]
    pub fn map(&self, f: impl Fn(F) -> F) -> Self {
        Self { data: self.data.iter().map(|&x| f(x)).collect(), shape: self.shape }
    }

    /// Every value, in storage order.
    pub fn as_slice(&self) -> &[F] {
        &self.data
    }
}
