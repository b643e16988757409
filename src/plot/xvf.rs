use num_traits::Float;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::figure::{CanvasTarget, Element};
use super::output::{Output, Rendered};
use super::palette::Colour;
use super::{PlotError, coord};
use crate::sample::{Cube, Observations};
use crate::statistics::{Extent, Statistic};

/// Templates, their matched filters and the filter outputs.
///
/// Templates and filters are channel-concatenated, one per row.
/// `tensor.lane(i, j)` is the output of filter `j` applied to template `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct XvfTensor<F> {
    /// One template per row.
    pub templates: Observations<F>,
    /// One filter per row.
    pub filters: Observations<F>,
    /// Templates × filters × output samples.
    pub tensor: Cube<F>,
}

impl<F: Float> XvfTensor<F> {
    /// Apply `f` to every element of the filter outputs, e.g. to compress
    /// their dynamic range before plotting.
    pub fn map_tensor(mut self, f: impl Fn(F) -> F) -> Self {
        self.tensor = self.tensor.map(f);
        self
    }
}

/// Options of [`xvf_tensor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XvfOptions {
    /// Colour of every trace.
    pub colour: Colour,
    /// Figure title.
    pub title: Option<String>,
    /// Saving and showing of the finished figure.
    pub output: Output,
}

impl Default for XvfOptions {
    fn default() -> Self {
        Self {
            colour: Colour::new(0.0, 0.0, 1.0),
            title: Some("Xi vs F Tensor".into()),
            output: Output::default(),
        }
    }
}

/// Grid of filter outputs: filters down the first column, templates along
/// the first row and the output of filter `j` for template `i` at row `j + 1`,
/// column `i + 1`.
pub fn xvf_tensor<F: Float>(data: &XvfTensor<F>, options: &XvfOptions, target: CanvasTarget<'_>) -> Result<Rendered, PlotError> {
    let XvfTensor { templates, filters, tensor } = data;
    if (templates.len(), templates.dim()) != (filters.len(), filters.dim()) {
        return Err(PlotError::Input(format!(
            "inconsistent shapes for templates ({}x{}) and filters ({}x{})",
            templates.len(),
            templates.dim(),
            filters.len(),
            filters.dim()
        )));
    }
    let items = templates.len();
    if items == 0 {
        return Err(PlotError::Input("no templates to plot".into()));
    }
    let (a, b, lags) = tensor.shape();
    if (a, b) != (items, items) {
        return Err(PlotError::Input(format!(
            "tensor has shape {a}x{b}x{lags}, expected {items}x{items}xL for {items} templates"
        )));
    }

    let range = |values: &[F]| Extent.compute(&values).map(|(lo, hi)| Extent::expand((coord(lo), coord(hi)), 1.1));
    let filter_range = range(filters.as_slice());
    let template_range = range(templates.as_slice());
    let tensor_range = range(tensor.as_slice());
    let template_span = Some((0.0, templates.dim() as f64));
    let lag_span = Some((0.0, lags as f64));

    let mut surface = target.canvas()?;
    let figure = surface.figure();
    figure.title.clone_from(&options.title);

    let n1 = items + 1;
    let trace = |values: &[F]| Element::line(values.iter().enumerate().map(|(k, &v)| (k as f64, coord(v))).collect(), options.colour);
    for j in 0..items {
        let region = figure.add_subplot(n1, n1, n1 * (j + 1) + 1)?;
        let panel = figure.region_mut(region)?;
        panel.push(trace(filters.row(j).unwrap_or_default()));
        (panel.x_range, panel.y_range) = (template_span, filter_range);

        let region = figure.add_subplot(n1, n1, j + 2)?;
        let panel = figure.region_mut(region)?;
        panel.push(trace(templates.row(j).unwrap_or_default()));
        (panel.x_range, panel.y_range) = (template_span, template_range);

        for i in 0..items {
            let region = figure.add_subplot(n1, n1, n1 * (j + 1) + i + 2)?;
            let panel = figure.region_mut(region)?;
            panel.push(trace(tensor.lane(i, j).unwrap_or_default()));
            (panel.x_range, panel.y_range) = (lag_span, tensor_range);
        }
    }

    debug!(templates = items, lags, "xi vs f tensor");
    options.output.finish(surface)
}
