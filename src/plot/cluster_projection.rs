use std::fmt::Display;

use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::figure::{CanvasTarget, Element};
use super::output::{Output, Rendered};
use super::palette::{Colour, Palette};
use super::{PlotError, coord};
use crate::projection::analyze;
use crate::sample::Groups;
use crate::statistics::{Bins, Histogram, ReferenceCurve, Statistic};

/// Options of [`cluster_projection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionOptions {
    /// Histogram bins per projected group.
    pub bins: usize,
    /// Upper bound of the density axis.
    pub y_bound: f64,
    /// Colours cycled over the groups.
    pub palette: Palette,
    /// Figure title.
    pub title: Option<String>,
    /// Saving and showing of the finished figure.
    pub output: Output,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            bins: 50,
            y_bound: 0.5,
            palette: Palette::default(),
            title: None,
            output: Output::default(),
        }
    }
}

/// Pairwise cluster projections on a `(G−1)×(G−1)` grid.
///
/// Each populated cell shows the density histograms of two groups projected
/// onto the axis joining their means, with a unit normal curve at each
/// projected mean. The groups should be whitened together for the curves to
/// be a fair reference, see [`Groups::whiten`].
pub fn cluster_projection<K, F>(
    groups: &Groups<K, F>,
    options: &ProjectionOptions,
    target: CanvasTarget<'_>,
) -> Result<Rendered, PlotError>
where
    K: Ord + Clone + Display,
    F: Float + FromPrimitive,
{
    let pairs = analyze(groups)?;
    let n = groups.len();
    let grid = n - 1;
    let histogram = Histogram::density(options.bins);
    let reference = ReferenceCurve::standard();

    let mut surface = target.canvas()?;
    let figure = surface.figure();
    figure.title.clone_from(&options.title);

    for pair in &pairs {
        let region = figure.add_subplot(grid, grid, pair.grid_cell(n))?;
        let panel = figure.region_mut(region)?;
        panel.y_range = Some((0.0, options.y_bound));
        panel.hide_y_ticks = true;

        let sides = [
            (&pair.projected_first, pair.first_mean, pair.row),
            (&pair.projected_second, pair.second_mean, pair.row + pair.col + 1),
        ];
        for (projected, _, index) in sides {
            panel.push(bars(histogram.compute(projected), options.palette.get(index)));
        }
        for (_, mean, _) in sides {
            panel.push(Element::line(reference.centred_at(coord(mean)).collect(), Colour::BLACK));
        }
    }

    debug!(groups = n, pairs = pairs.len(), "cluster projection");
    options.output.finish(surface)
}

fn bars<F: Float>(bins: Bins<F>, colour: Colour) -> Element {
    let (mut edges, mut heights) = (Vec::with_capacity(bins.len() + 1), Vec::with_capacity(bins.len()));
    for (i, (left, right, height)) in bins.iter().enumerate() {
        if i == 0 {
            edges.push(coord(left));
        }
        edges.push(coord(right));
        heights.push(coord(height));
    }
    Element::Bars { edges, heights, colour }
}
