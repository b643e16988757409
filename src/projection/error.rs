use std::error::Error as StdError;
use std::fmt;

/// Reasons the pairwise projection cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// Fewer than two groups were supplied.
    InsufficientGroups {
        /// Number of groups supplied.
        found: usize,
    },
    /// A group has no observations.
    EmptyGroup {
        /// Label of the empty group.
        group: String,
    },
    /// A group's dimensionality differs from that of the first group.
    ShapeMismatch {
        /// Label of the offending group.
        group: String,
        /// Dimensionality of the first group.
        expected: usize,
        /// Dimensionality of the offending group.
        found: usize,
    },
    /// Two groups share the same mean, so no separation axis exists.
    DegenerateSeparation {
        /// Label of the first group of the pair.
        first: String,
        /// Label of the second group of the pair.
        second: String,
    },
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::InsufficientGroups { found } => {
                write!(f, "at least two groups are needed for a pairwise projection, got {found}")
            }
            ProjectionError::EmptyGroup { group } => write!(f, "group '{group}' has no observations"),
            ProjectionError::ShapeMismatch { group, expected, found } => write!(
                f,
                "group '{group}' has dimensionality {found}, expected {expected}"
            ),
            ProjectionError::DegenerateSeparation { first, second } => write!(
                f,
                "groups '{first}' and '{second}' have identical means, the separation axis is undefined"
            ),
        }
    }
}

impl StdError for ProjectionError {}
