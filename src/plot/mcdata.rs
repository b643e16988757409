use std::collections::BTreeMap;
use std::fmt::{self, Display};

use num_traits::Float;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::figure::{CanvasTarget, Element, Panel, Rect};
use super::output::{Output, Rendered};
use super::palette::{Colour, Palette};
use super::{PlotError, coord};
use crate::sample::Observations;
use crate::statistics::{Extent, Statistic};

/// Owner of a set of events or epochs. Unit keys are drawn in the unit's
/// palette colour, anything else in gray.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EpochKey {
    /// A sorted unit, by palette index.
    Unit(usize),
    /// A named source such as a stimulus.
    Other(String),
}

impl EpochKey {
    fn colour(&self, palette: &Palette) -> Colour {
        match self {
            EpochKey::Unit(u) => palette.get(*u),
            EpochKey::Other(_) => Colour::GRAY,
        }
    }
}

impl Display for EpochKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpochKey::Unit(u) => write!(f, "{u}"),
            EpochKey::Other(name) => f.write_str(name),
        }
    }
}

/// Events of one unit, in samples.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitEvents<F> {
    /// Marked by vertical lines across every panel.
    Times(Vec<f64>),
    /// The unit's multichannel waveform (samples × channels) drawn centred
    /// on every event time.
    Waveforms {
        /// Samples × channels.
        waveform: Observations<F>,
        /// Event times the waveform is centred on.
        times: Vec<f64>,
    },
}

/// Multichannel recording with optional annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct McData<F> {
    data: Observations<F>,
    other: Option<Observations<F>>,
    events: BTreeMap<EpochKey, UnitEvents<F>>,
    epochs: BTreeMap<EpochKey, Vec<(f64, f64)>>,
}

impl<F> McData<F> {
    /// `data` holds one row per sample and one column per channel.
    pub fn new(data: Observations<F>) -> Self {
        Self {
            data,
            other: None,
            events: BTreeMap::new(),
            epochs: BTreeMap::new(),
        }
    }

    /// Extra traces, one per column, drawn in a separate panel below the channels.
    pub fn with_other(mut self, other: Observations<F>) -> Self {
        self.other = Some(other);
        self
    }

    /// Events per owner, drawn over the channels.
    pub fn with_events(mut self, events: BTreeMap<EpochKey, UnitEvents<F>>) -> Self {
        self.events = events;
        self
    }

    /// `[start, stop]` sample intervals per owner.
    pub fn with_epochs(mut self, epochs: BTreeMap<EpochKey, Vec<(f64, f64)>>) -> Self {
        self.epochs = epochs;
        self
    }
}

/// Options of [`mcdata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McDataOptions {
    /// Sample index of the first row.
    pub x_offset: f64,
    /// Vertical spacing between panels, in percent of the figure height.
    pub divider: f64,
    /// Draw a dashed line at zero in every channel.
    pub zero_line: bool,
    /// Colours cycled over the units.
    pub palette: Palette,
    /// Figure title.
    pub title: Option<String>,
    /// Saving and showing of the finished figure.
    pub output: Output,
}

impl Default for McDataOptions {
    fn default() -> Self {
        Self {
            x_offset: 0.0,
            divider: 2.0,
            zero_line: true,
            palette: Palette::default(),
            title: None,
            output: Output::default(),
        }
    }
}

/// Stacked per-channel traces of a multichannel recording.
pub fn mcdata<F: Float>(data: &McData<F>, options: &McDataOptions, target: CanvasTarget<'_>) -> Result<Rendered, PlotError> {
    let (ns, nc) = (data.data.len(), data.data.dim());
    if ns == 0 || nc == 0 {
        return Err(PlotError::Input("no multichannel data to plot".into()));
    }
    if let Some(other) = &data.other {
        if other.len() != ns {
            return Err(PlotError::Input(format!("other data has {} samples, expected {ns}", other.len())));
        }
    }
    for (key, events) in &data.events {
        if let UnitEvents::Waveforms { waveform, .. } = events {
            if waveform.dim() != nc {
                return Err(PlotError::Input(format!(
                    "waveform for unit {key} has {} channels, the data has {nc}",
                    waveform.dim()
                )));
            }
        }
    }
    let rects = stacked(nc, data.other.is_some(), options.divider)?;

    let mut surface = target.canvas()?;
    let figure = surface.figure();
    figure.title.clone_from(&options.title);

    let x_offset = options.x_offset;
    let x = |i: usize| x_offset + i as f64;
    let x_range = (x(0), x(ns - 1));
    let y_range = Extent.compute(&data.data).map(|(lo, hi)| Extent::expand((coord(lo), coord(hi)), 1.05));

    let mut panels: Vec<Panel> = rects.iter().map(|&rect| Panel::new(rect)).collect();
    let (channels, other_panel) = panels.split_at_mut(nc);

    for (c, panel) in channels.iter_mut().enumerate() {
        panel.y_label = Some(format!("CH {c}"));
        panel.hide_x_ticks = c + 1 != nc;
        panel.y_range = y_range;
        panel.push(Element::line(data.data.column(c).enumerate().map(|(i, v)| (x(i), coord(v))).collect(), Colour::BLACK));
    }
    if let (Some(panel), Some(other)) = (other_panel.first_mut(), &data.other) {
        panel.y_label = Some("OTHER".into());
        panel.y_range = Extent.compute(other).map(|(lo, hi)| Extent::expand((coord(lo), coord(hi)), 1.1));
        for c in 0..other.dim() {
            let points = other.column(c).enumerate().map(|(i, v)| (x(i), coord(v))).collect();
            panel.push(Element::line(points, options.palette.get(c)));
        }
    }

    for (key, events) in &data.events {
        let colour = key.colour(&options.palette);
        match events {
            UnitEvents::Times(times) => {
                for panel in panels.iter_mut() {
                    panel.elements.extend(times.iter().map(|&at| Element::VLine { x: at, colour, dashed: false }));
                }
            }
            UnitEvents::Waveforms { waveform, times } => {
                let cut = (waveform.len() / 2) as f64;
                for (c, panel) in panels.iter_mut().take(nc).enumerate() {
                    for &event in times {
                        let points = waveform
                            .column(c)
                            .enumerate()
                            .map(|(k, v)| (k as f64 - cut + event, coord(v)))
                            .collect();
                        panel.push(Element::line(points, colour));
                    }
                }
                if let Some(panel) = panels.get_mut(nc) {
                    panel.elements.extend(times.iter().map(|&at| Element::VLine { x: at, colour, dashed: false }));
                }
            }
        }
    }

    for (key, spans) in &data.epochs {
        let colour = key.colour(&options.palette);
        for panel in panels.iter_mut() {
            panel
                .elements
                .extend(spans.iter().map(|&(x0, x1)| Element::VSpan { x0, x1, colour, alpha: 0.2 }));
        }
    }

    for panel in panels.iter_mut() {
        if options.zero_line {
            panel.push(Element::HLine { y: 0.0, colour: Colour::BLACK, dashed: true });
        }
        panel.x_range = Some(x_range);
    }

    debug!(samples = ns, channels = nc, other = data.other.is_some(), "multichannel data");
    for panel in panels {
        figure.add_panel(panel);
    }
    options.output.finish(surface)
}

/// Panel rectangles for `nc` channels stacked top to bottom, plus one for the
/// other data.
fn stacked(nc: usize, other: bool, divider: f64) -> Result<Vec<Rect>, PlotError> {
    let spacer = divider * 0.01;
    let count = nc + usize::from(other);
    let height = (0.8 - (count - 1) as f64 * spacer) / count as f64;
    if height.is_nan() || height <= 0.0 {
        return Err(PlotError::Input(format!("{count} panels do not fit with a divider of {divider}%")));
    }
    Ok((0..count)
        .map(|c| Rect {
            left: 0.1,
            top: 0.1 + c as f64 * (height + spacer),
            width: 0.8,
            height,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn recording() -> Observations<f64> {
        Observations::from_rows(&[[0.0, 1.0], [2.0, -1.0], [4.0, 0.5], [-2.0, 0.0]]).unwrap()
    }

    fn count<P: Fn(&Element) -> bool>(panel: &Panel, p: P) -> usize {
        panel.elements.iter().filter(|e| p(*e)).count()
    }

    #[test]
    fn one_panel_per_channel() {
        let options = McDataOptions { x_offset: 100.0, ..Default::default() };
        let figure = mcdata(&McData::new(recording()), &options, CanvasTarget::New).unwrap().figure.unwrap();
        assert_eq!(figure.panels.len(), 2);

        let top = &figure.panels[0];
        assert_eq!(top.y_label.as_deref(), Some("CH 0"));
        assert!(top.hide_x_ticks);
        assert!(!figure.panels[1].hide_x_ticks);
        assert!(figure.panels[0].rect.top < figure.panels[1].rect.top);

        match &top.elements[0] {
            Element::Line { points, colour, .. } => {
                assert_eq!(*colour, Colour::BLACK);
                assert_eq!(points.as_slice(), &[(100.0, 0.0), (101.0, 2.0), (102.0, 4.0), (103.0, -2.0)]);
            }
            other => panic!("unexpected element {other:?}"),
        }
        let (x0, x1) = top.x_range.unwrap();
        assert_abs_diff_eq!(x0, 100.0);
        assert_abs_diff_eq!(x1, 103.0);
        let (y0, y1) = top.y_range.unwrap();
        assert_abs_diff_eq!(y0, -2.1, epsilon = 1e-12);
        assert_abs_diff_eq!(y1, 4.2, epsilon = 1e-12);
        assert_eq!(count(top, |e| matches!(e, Element::HLine { dashed: true, .. })), 1);
    }

    #[test]
    fn events_and_epochs_are_drawn_on_every_panel() {
        let waveform = Observations::from_rows(&[[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]).unwrap();
        let data = McData::new(recording())
            .with_other(Observations::from_rows(&[[1.0], [2.0], [3.0], [4.0]]).unwrap())
            .with_events(BTreeMap::from([
                (EpochKey::Unit(0), UnitEvents::Times(vec![1.0, 2.0])),
                (EpochKey::Unit(2), UnitEvents::Waveforms { waveform, times: vec![2.0] }),
            ]))
            .with_epochs(BTreeMap::from([(EpochKey::Other("noise".into()), vec![(0.0, 1.0)])]));
        let figure = mcdata(&data, &McDataOptions::default(), CanvasTarget::New).unwrap().figure.unwrap();
        assert_eq!(figure.panels.len(), 3);
        let other = &figure.panels[2];
        assert_eq!(other.y_label.as_deref(), Some("OTHER"));

        let channel = &figure.panels[0];
        assert_eq!(count(channel, |e| matches!(e, Element::VLine { .. })), 2);
        assert_eq!(count(other, |e| matches!(e, Element::VLine { .. })), 3);
        let overlay = channel.elements.iter().find_map(|e| match e {
            Element::Line { points, colour, .. } if *colour == Palette::default().get(2) => Some(points),
            _ => None,
        });
        assert_eq!(overlay.unwrap().as_slice(), &[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);

        for panel in &figure.panels {
            assert!(panel.elements.iter().any(|e| matches!(
                e,
                Element::VSpan { colour, .. } if *colour == Colour::GRAY
            )));
        }
    }

    #[test]
    fn invalid_input_is_rejected() {
        let empty = McData::new(Observations::<f64>::from_flat(Vec::new(), 2).unwrap());
        assert!(matches!(mcdata(&empty, &McDataOptions::default(), CanvasTarget::New), Err(PlotError::Input(_))));

        let wrong_channels = McData::new(recording()).with_events(BTreeMap::from([(
            EpochKey::Unit(1),
            UnitEvents::Waveforms { waveform: Observations::from_rows(&[[1.0]]).unwrap(), times: vec![0.0] },
        )]));
        assert!(matches!(
            mcdata(&wrong_channels, &McDataOptions::default(), CanvasTarget::New),
            Err(PlotError::Input(_))
        ));

        let crowded = McDataOptions { divider: 90.0, ..Default::default() };
        assert!(mcdata(&McData::new(recording()), &crowded, CanvasTarget::New).is_err());
    }

    #[test]
    fn layout_matches_the_divider() {
        let rects = stacked(3, true, 2.0).unwrap();
        assert_eq!(rects.len(), 4);
        let height = (0.8 - 3.0 * 0.02) / 4.0;
        assert_abs_diff_eq!(rects[0].height, height, epsilon = 1e-12);
        assert_abs_diff_eq!(rects[3].top + rects[3].height, 0.9, epsilon = 1e-12);
    }
}
