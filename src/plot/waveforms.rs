use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::figure::{CanvasTarget, Element, Surface};
use super::output::{Output, Rendered};
use super::palette::{Colour, Palette};
use super::{PlotError, coord};
use crate::sample::Groups;
use crate::statistics::{ColumnMean, Extent, Statistic};

/// Options of [`waveforms`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformOptions {
    /// Samples per second; the time axis is in samples when `None`.
    pub sample_rate: Option<f64>,
    /// Samples per channel of channel-concatenated waveforms. Channel
    /// borders are marked when set.
    pub template_length: Option<usize>,
    /// Draw the mean waveform of each group.
    pub show_mean: bool,
    /// Draw every single waveform, in gray when means are shown.
    pub show_single: bool,
    /// Fit the y range tightly around the data.
    pub fit_y_range: bool,
    /// One panel per group instead of overlaying every group in one panel.
    pub separate: bool,
    /// Colours cycled over the groups.
    pub palette: Palette,
    /// Figure title.
    pub title: Option<String>,
    /// Saving and showing of the finished figure.
    pub output: Output,
}

impl Default for WaveformOptions {
    fn default() -> Self {
        Self {
            sample_rate: None,
            template_length: None,
            show_mean: false,
            show_single: true,
            fit_y_range: false,
            separate: true,
            palette: Palette::default(),
            title: None,
            output: Output::default(),
        }
    }
}

/// Waveforms per group, one row per waveform.
///
/// Multichannel waveforms are expected in channel-concatenated form, see
/// [`Observations::from_multichannel`](crate::sample::Observations::from_multichannel).
pub fn waveforms<K: Ord, F: Float + FromPrimitive>(
    groups: &Groups<K, F>,
    options: &WaveformOptions,
    target: CanvasTarget<'_>,
) -> Result<Rendered, PlotError> {
    if groups.is_empty() {
        return Err(PlotError::Input("no waveforms to plot".into()));
    }
    if let Some((i, _)) = groups.iter().enumerate().find(|(_, (_, obs))| obs.is_empty()) {
        return Err(PlotError::Input(format!("group {i} has no waveforms")));
    }
    let rate = match options.sample_rate {
        Some(rate) if rate.is_finite() && rate > 0.0 => rate,
        Some(rate) => return Err(PlotError::Input(format!("sample rate must be positive, got {rate}"))),
        None => 1.0,
    };
    if options.template_length == Some(0) {
        return Err(PlotError::Input("template length must be positive".into()));
    }

    let n = groups.len();
    let (mut surface, regions) = layout(target, n, options.separate)?;
    let figure = surface.figure();
    if options.title.is_some() {
        figure.title.clone_from(&options.title);
    }

    let time = |i: usize| i as f64 / rate;
    let mut y_extent = None;
    let mut samples = 0_usize;

    for (u, (_, obs)) in groups.iter().enumerate() {
        let region = regions.get(u).or(regions.first()).copied().unwrap_or_default();
        let panel = figure.region_mut(region)?;
        let colour = options.palette.get(u);
        samples = samples.max(obs.dim());

        if options.show_single {
            let single = if options.show_mean { Colour::GRAY } else { colour };
            for row in obs.rows() {
                y_extent = Extent::union(y_extent, Extent.compute(&row));
                let points = row.iter().enumerate().map(|(i, &v)| (time(i), coord(v))).collect();
                panel.push(Element::line(points, single));
            }
        }
        if options.show_mean {
            let mean = ColumnMean.compute(obs);
            y_extent = Extent::union(y_extent, Extent.compute(&mean));
            let points = mean.iter().enumerate().map(|(i, &v)| (time(i), coord(v))).collect();
            panel.push(Element::Line { points, colour, width: 2, dashed: false });
        }
    }

    let borders: Vec<f64> = match options.template_length {
        Some(tf) => (1..samples / tf).map(|i| time(tf * i)).collect(),
        None => Vec::new(),
    };
    let x_range = (0.0, time(samples.saturating_sub(1)));
    let y_range = y_extent.map(|(lo, hi)| {
        let factor = if options.fit_y_range { 1.01 } else { 1.05 };
        Extent::expand((coord(lo), coord(hi)), factor)
    });

    let last = regions.len() - 1;
    for (k, &region) in regions.iter().enumerate() {
        let panel = figure.region_mut(region)?;
        for &x in &borders {
            panel.push(Element::VLine { x, colour: Colour::YELLOW, dashed: true });
        }
        panel.x_range = Some(x_range);
        if options.fit_y_range || options.separate {
            panel.y_range = y_range;
        }
        if k == last {
            let unit = if options.sample_rate.is_some() { "seconds" } else { "samples" };
            panel.x_label = Some(format!("time in {unit}"));
            panel.y_label = Some("amplitude".into());
        } else {
            panel.hide_x_ticks = true;
        }
    }

    debug!(groups = n, separate = options.separate, "waveforms");
    options.output.finish(surface)
}

/// One region per group for separate panels, one shared region otherwise.
fn layout<'a>(target: CanvasTarget<'a>, n: usize, separate: bool) -> Result<(Surface<'a>, Vec<usize>), PlotError> {
    if separate {
        let mut surface = target.canvas()?;
        let regions = (1..=n)
            .map(|u| surface.figure().add_subplot(n, 1, u))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((surface, regions))
    } else {
        let (surface, region) = target.region()?;
        Ok((surface, vec![region]))
    }
}
