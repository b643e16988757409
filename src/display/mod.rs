use std::fmt::{self, Display, Formatter};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::*;
use num_traits::{Float, ToPrimitive};

use crate::projection::PairResult;

/// Tabular summary of a pairwise projection.
///
/// Distances are in units of the data; on whitened data they read as
/// standard deviations, which is what the interpretation column assumes.
pub struct Separability<'a, K, F> {
    pairs: &'a [PairResult<K, F>],
}

impl<'a, K, F> Separability<'a, K, F> {
    /// Summarise the pairs returned by [`crate::analyze`].
    pub fn new(pairs: &'a [PairResult<K, F>]) -> Self {
        Self { pairs }
    }
}

fn interpretation(distance: f64) -> &'static str {
    if distance >= 6.0 {
        "🟢 Well separated"
    } else if distance >= 4.0 {
        "🟡 Touching tails"
    } else if distance >= 2.0 {
        "🟠 Overlapping"
    } else {
        "🔴 Not separable"
    }
}

impl<K, F> Separability<'_, K, F>
where
    K: Display,
    F: Float + ToPrimitive,
{
    /// Render the title and one row per pair as text tables.
    pub fn display(&self) -> String {
        // the grid has one row and one column fewer than there are groups
        let groups = self.pairs.iter().map(|p| p.row + p.col + 2).max().unwrap_or(0);

        let mut title_table = Table::new();
        title_table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .add_row(vec![Cell::new("Pairwise Cluster Separability")
                .set_alignment(CellAlignment::Center)]);

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Pair").set_alignment(CellAlignment::Center),
                Cell::new("Cell").set_alignment(CellAlignment::Center),
                Cell::new("n").set_alignment(CellAlignment::Center),
                Cell::new("Distance").set_alignment(CellAlignment::Center),
                Cell::new("Interpretation").set_alignment(CellAlignment::Center),
            ]);

        for pair in self.pairs {
            let distance = pair.distance().to_f64().unwrap_or(f64::NAN);
            let counts = format!("{} / {}", pair.projected_first.len(), pair.projected_second.len());
            table.add_row(vec![
                Cell::new(format!("{} ↔ {}", pair.first, pair.second)).set_alignment(CellAlignment::Left),
                Cell::new(pair.grid_cell(groups)).set_alignment(CellAlignment::Right),
                Cell::new(counts).set_alignment(CellAlignment::Right),
                Cell::new(format!("{distance:.2}")).set_alignment(CellAlignment::Right),
                Cell::new(interpretation(distance)).set_alignment(CellAlignment::Left),
            ]);
        }

        format!("{}\n{}", title_table, table)
    }
}

impl<K, F> Display for Separability<'_, K, F>
where
    K: Display,
    F: Float + ToPrimitive,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
