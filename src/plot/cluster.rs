use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::figure::{CanvasTarget, Element, Marker};
use super::output::{Output, Rendered};
use super::palette::{Colour, Palette};
use super::{PlotError, xy};
use crate::sample::Groups;
use crate::statistics::{ColumnMean, Statistic};

/// How group means are marked in a scatter plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum MeanMarker {
    /// Means are not drawn.
    Hidden,
    /// A cross at each mean.
    #[default]
    Cross,
    /// A cross plus a circle of this radius, read as one standard deviation
    /// on whitened data.
    CrossAndCircle(f64),
}

/// Options of [`cluster`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// The two columns shown on the x and y axes.
    pub dims: (usize, usize),
    /// How group means are marked.
    pub mean: MeanMarker,
    /// Colours cycled over the groups.
    pub palette: Palette,
    /// Panel title.
    pub title: Option<String>,
    /// Label under the x axis.
    pub x_label: Option<String>,
    /// Label beside the y axis.
    pub y_label: Option<String>,
    /// Saving and showing of the finished figure.
    pub output: Output,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            dims: (0, 1),
            mean: MeanMarker::default(),
            palette: Palette::default(),
            title: None,
            x_label: None,
            y_label: None,
            output: Output::default(),
        }
    }
}

/// Scatter plot of two dimensions of every group, one colour per group.
///
/// Groups are coloured in sorted key order, so `palette.get(i)` is the colour
/// of the `i`-th key.
pub fn cluster<K: Ord, F: Float + FromPrimitive>(
    groups: &Groups<K, F>,
    options: &ClusterOptions,
    target: CanvasTarget<'_>,
) -> Result<Rendered, PlotError> {
    if groups.is_empty() {
        return Err(PlotError::Input("no groups to plot".into()));
    }
    let (dx, dy) = options.dims;
    let selected = groups
        .iter()
        .enumerate()
        .map(|(i, (_, obs))| {
            obs.select_columns(&[dx, dy]).ok_or_else(|| {
                PlotError::Input(format!(
                    "group {i} has {} dimensions, cannot show dimensions {dx} and {dy}",
                    obs.dim()
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (mut surface, region) = target.region()?;
    let panel = surface.figure().region_mut(region)?;
    panel.title.clone_from(&options.title);
    panel.x_label.clone_from(&options.x_label);
    panel.y_label.clone_from(&options.y_label);

    for (i, obs) in selected.iter().enumerate() {
        panel.push(Element::Markers {
            points: obs.rows().map(xy).collect(),
            colour: options.palette.get(i),
            marker: Marker::Point,
            size: 2,
            width: 1,
        });
    }

    if options.mean != MeanMarker::Hidden {
        for (i, obs) in selected.iter().enumerate().filter(|(_, obs)| !obs.is_empty()) {
            let centre = xy(&ColumnMean.compute(obs));
            panel.push(Element::Markers {
                points: vec![centre],
                colour: Colour::BLACK,
                marker: Marker::Cross,
                size: 8,
                width: 2,
            });
            if let MeanMarker::CrossAndCircle(radius) = options.mean {
                panel.push(Element::Circle { centre, radius, colour: options.palette.get(i) });
            }
        }
    }

    debug!(groups = selected.len(), "cluster scatter");
    options.output.finish(surface)
}
