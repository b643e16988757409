use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PlotError;
use super::figure::{CanvasTarget, Element, Marker};
use super::output::{Output, Rendered};
use super::palette::{Colour, Palette};

/// Classification of a sorted spike against ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpikeLabel {
    /// Matched a ground-truth spike.
    TruePositive = 1,
    /// Matched a ground-truth spike that overlaps another unit's.
    TruePositiveOverlap = 2,
    /// No ground-truth spike nearby.
    FalsePositive = 3,
    /// Matched a ground-truth spike of another unit.
    FalsePositiveAssigned = 4,
    /// Matched an overlapping ground-truth spike of another unit.
    FalsePositiveAssignedOverlap = 5,
    /// Ground-truth spike that was not found.
    FalseNegative = 6,
    /// Missed ground-truth spike that overlaps another unit's.
    FalseNegativeOverlap = 7,
}

impl SpikeLabel {
    /// Label for an evaluation code in `1..=7`.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => SpikeLabel::TruePositive,
            2 => SpikeLabel::TruePositiveOverlap,
            3 => SpikeLabel::FalsePositive,
            4 => SpikeLabel::FalsePositiveAssigned,
            5 => SpikeLabel::FalsePositiveAssignedOverlap,
            6 => SpikeLabel::FalseNegative,
            7 => SpikeLabel::FalseNegativeOverlap,
            _ => return None,
        })
    }

    /// Short name drawn next to annotated spikes.
    pub fn abbreviation(self) -> &'static str {
        match self {
            SpikeLabel::TruePositive => "TP",
            SpikeLabel::TruePositiveOverlap => "TPO",
            SpikeLabel::FalsePositive => "FP",
            SpikeLabel::FalsePositiveAssigned => "FPA",
            SpikeLabel::FalsePositiveAssignedOverlap => "FPAO",
            SpikeLabel::FalseNegative => "FN",
            SpikeLabel::FalseNegativeOverlap => "FNO",
        }
    }

    /// Errors are annotated in the raster, true positives are not.
    pub fn is_annotated(self) -> bool {
        self as u8 >= 3
    }
}

impl Display for SpikeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// One or two sets of spike trains with optional alignment and labels.
///
/// Spike times are in samples. Alignments map a pair of units to pairs of
/// spike indices, `(index into the first unit, index into the second unit)`.
/// Without a second set the pairs are `(a, b)` with `a < b` from the first
/// set; with one, `a` comes from the first set and `b` from the second.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeTrains<K: Ord> {
    first: BTreeMap<K, Vec<f64>>,
    second: Option<BTreeMap<K, Vec<f64>>>,
    alignment: BTreeMap<(K, K), Vec<(usize, usize)>>,
    first_labels: BTreeMap<K, Vec<u8>>,
    second_labels: BTreeMap<K, Vec<u8>>,
}

impl<K: Ord> SpikeTrains<K> {
    /// A single set of spike trains per unit.
    pub fn new(first: BTreeMap<K, Vec<f64>>) -> Self {
        Self {
            first,
            second: None,
            alignment: BTreeMap::new(),
            first_labels: BTreeMap::new(),
            second_labels: BTreeMap::new(),
        }
    }

    /// Compare against a second set, drawn below the first.
    pub fn with_second(mut self, second: BTreeMap<K, Vec<f64>>) -> Self {
        self.second = Some(second);
        self
    }

    /// Pairs of spikes to connect, per pair of units.
    pub fn with_alignment(mut self, alignment: BTreeMap<(K, K), Vec<(usize, usize)>>) -> Self {
        self.alignment = alignment;
        self
    }

    /// Evaluation codes per spike, see [`SpikeLabel`]. Labels of the second
    /// set are ignored unless a second set is present.
    pub fn with_labels(mut self, first: BTreeMap<K, Vec<u8>>, second: BTreeMap<K, Vec<u8>>) -> Self {
        self.first_labels = first;
        self.second_labels = second;
        self
    }
}

/// Options of [`spike_trains`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeTrainOptions {
    /// Line width of the spike ticks.
    pub marker_width: u32,
    /// Samples per second; the time axis is in samples when `None`.
    pub sample_rate: Option<f64>,
    /// Colours cycled over the units.
    pub palette: Palette,
    /// Panel title.
    pub title: Option<String>,
    /// Saving and showing of the finished figure.
    pub output: Output,
}

impl Default for SpikeTrainOptions {
    fn default() -> Self {
        Self {
            marker_width: 3,
            sample_rate: None,
            palette: Palette::default(),
            title: None,
            output: Output::default(),
        }
    }
}

/// A unit's raster row.
struct Row<'a> {
    y: f64,
    times: &'a [f64],
}

/// Raster plot of spike trains, units stacked from the top.
///
/// With a second set, its units are drawn below a separator line and
/// alignments connect spikes across the two sets.
pub fn spike_trains<K: Ord + Display>(
    trains: &SpikeTrains<K>,
    options: &SpikeTrainOptions,
    target: CanvasTarget<'_>,
) -> Result<Rendered, PlotError> {
    if trains.first.is_empty() {
        return Err(PlotError::Input("provide at least one spike train in the first set".into()));
    }
    let rate = match options.sample_rate {
        Some(rate) if rate.is_finite() && rate > 0.0 => rate,
        Some(rate) => return Err(PlotError::Input(format!("sample rate must be positive, got {rate}"))),
        None => 1.0,
    };

    let second = trains.second.as_ref();
    let n1 = trains.first.len();
    let n2 = second.map_or(0, BTreeMap::len);
    let total = (n1 + n2) as f64;
    let offset = if second.is_some() { 1.0 } else { 0.0 };

    let first_rows: Vec<(&K, Row<'_>)> = trains
        .first
        .iter()
        .enumerate()
        .map(|(idx, (unit, times))| (unit, Row { y: total - 1.0 - idx as f64, times }))
        .collect();
    let second_rows: Vec<(&K, Row<'_>)> = second
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(j, (unit, times))| (unit, Row { y: total - 1.0 - (n1 + j) as f64 - offset, times }))
        .collect();

    // validate everything before the canvas is touched
    let segments = alignment_segments(trains, &first_rows, &second_rows, rate)?;
    let mut annotations = labels(&trains.first_labels, &first_rows, rate)?;
    if second.is_some() {
        annotations.extend(labels(&trains.second_labels, &second_rows, rate)?);
    }

    let (mut surface, region) = target.region()?;
    let figure = surface.figure();
    if options.title.is_some() {
        figure.title.clone_from(&options.title);
    }
    let panel = figure.region_mut(region)?;

    let mut ticks = Vec::with_capacity(n1 + n2 + 1);
    for (idx, (unit, row)) in first_rows.iter().chain(&second_rows).enumerate() {
        panel.push(Element::Markers {
            points: row.times.iter().map(|&t| (t / rate, row.y)).collect(),
            colour: options.palette.get(idx),
            marker: Marker::VerticalBar,
            size: 6,
            width: options.marker_width,
        });
        ticks.push((row.y, format!("Unit {unit}")));
    }
    if second.is_some() {
        let separator = total - 1.0 - n1 as f64;
        panel.push(Element::HLine { y: separator, colour: Colour::new(0.0, 0.0, 1.0), dashed: false });
        ticks.push((separator, String::new()));
    }
    for points in segments {
        panel.push(Element::Line { points, colour: Colour::BLACK, width: 1, dashed: true });
    }
    for (at, label) in annotations {
        panel.push(Element::Text { at, text: label.to_string() });
    }

    panel.y_ticks = ticks;
    panel.y_range = Some((-0.5 - offset, total - 0.5));
    let unit = if options.sample_rate.is_some() { "seconds" } else { "samples" };
    panel.x_label = Some(format!("time in {unit}"));

    debug!(units = n1 + n2, "spike trains");
    options.output.finish(surface)
}

fn spike_time(row: &Row<'_>, index: usize, unit: &impl Display) -> Result<f64, PlotError> {
    row.times.get(index).copied().ok_or_else(|| {
        PlotError::Input(format!(
            "alignment refers to spike {index} of unit {unit}, which has {} spikes",
            row.times.len()
        ))
    })
}

/// Line segments joining aligned spikes. Unit pairs without an alignment
/// entry are skipped.
fn alignment_segments<K: Ord + Display>(
    trains: &SpikeTrains<K>,
    first_rows: &[(&K, Row<'_>)],
    second_rows: &[(&K, Row<'_>)],
    rate: f64,
) -> Result<Vec<Vec<(f64, f64)>>, PlotError> {
    let mut segments = Vec::new();
    if trains.alignment.is_empty() {
        return Ok(segments);
    }

    let pairs: Vec<(&(&K, Row<'_>), &(&K, Row<'_>))> = if trains.second.is_some() {
        first_rows.iter().flat_map(|a| second_rows.iter().map(move |b| (a, b))).collect()
    } else {
        first_rows
            .iter()
            .enumerate()
            .flat_map(|(i, a)| first_rows.iter().skip(i + 1).map(move |b| (a, b)))
            .collect()
    };

    for ((unit_a, row_a), (unit_b, row_b)) in pairs {
        let Some(aligned) = trains
            .alignment
            .iter()
            .find(|((ka, kb), _)| ka == *unit_a && kb == *unit_b)
            .map(|(_, v)| v)
        else {
            continue;
        };
        for &(i, j) in aligned {
            let start = spike_time(row_a, i, unit_a)? / rate;
            let end = spike_time(row_b, j, unit_b)? / rate;
            segments.push(vec![(start, row_a.y), (end, row_b.y)]);
        }
    }
    Ok(segments)
}

/// Annotation positions for every labelled spike that is not a true positive.
fn labels<K: Ord + Display>(
    codes: &BTreeMap<K, Vec<u8>>,
    rows: &[(&K, Row<'_>)],
    rate: f64,
) -> Result<Vec<((f64, f64), SpikeLabel)>, PlotError> {
    let mut out = Vec::new();
    for (unit, row) in rows {
        let Some(unit_codes) = codes.get(*unit) else {
            continue;
        };
        for (&code, &time) in unit_codes.iter().zip(row.times) {
            let label = SpikeLabel::from_code(code)
                .ok_or_else(|| PlotError::Input(format!("unknown spike label code {code} for unit {unit}")))?;
            if label.is_annotated() {
                out.push(((time / rate, row.y), label));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::Panel;
    use approx::assert_abs_diff_eq;

    fn first() -> BTreeMap<u32, Vec<f64>> {
        BTreeMap::from([(1, vec![10.0, 50.0, 90.0]), (2, vec![12.0, 70.0])])
    }

    fn second() -> BTreeMap<u32, Vec<f64>> {
        BTreeMap::from([(5, vec![11.0, 51.0])])
    }

    fn rasters(panel: &Panel) -> Vec<(&Vec<(f64, f64)>, Colour)> {
        panel
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Markers { points, colour, marker: Marker::VerticalBar, .. } => Some((points, *colour)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn label_codes() {
        assert_eq!(SpikeLabel::from_code(1), Some(SpikeLabel::TruePositive));
        assert_eq!(SpikeLabel::from_code(5).map(SpikeLabel::abbreviation), Some("FPAO"));
        assert_eq!(SpikeLabel::from_code(0), None);
        assert_eq!(SpikeLabel::from_code(8), None);
        assert!(!SpikeLabel::TruePositiveOverlap.is_annotated());
        assert!(SpikeLabel::FalsePositive.is_annotated());
        assert_eq!(SpikeLabel::FalseNegativeOverlap.to_string(), "FNO");
    }

    #[test]
    fn single_set_rows_run_from_the_top() {
        let figure = spike_trains(&SpikeTrains::new(first()), &SpikeTrainOptions::default(), CanvasTarget::New)
            .unwrap()
            .figure
            .unwrap();
        let panel = &figure.panels[0];
        let rows = rasters(panel);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.as_slice(), &[(10.0, 1.0), (50.0, 1.0), (90.0, 1.0)]);
        assert_eq!(rows[1].0.as_slice(), &[(12.0, 0.0), (70.0, 0.0)]);
        assert_eq!(rows[1].1, Palette::default().get(1));

        let (lo, hi) = panel.y_range.unwrap();
        assert_abs_diff_eq!(lo, -0.5);
        assert_abs_diff_eq!(hi, 1.5);
        assert_eq!(panel.y_ticks, vec![(1.0, "Unit 1".to_string()), (0.0, "Unit 2".to_string())]);
        assert_eq!(panel.x_label.as_deref(), Some("time in samples"));
    }

    #[test]
    fn second_set_sits_below_a_separator() {
        let trains = SpikeTrains::new(first())
            .with_second(second())
            .with_alignment(BTreeMap::from([((1, 5), vec![(0, 0), (1, 1)]), ((2, 5), vec![(0, 0)])]));
        let options = SpikeTrainOptions { sample_rate: Some(10.0), ..Default::default() };
        let figure = spike_trains(&trains, &options, CanvasTarget::New).unwrap().figure.unwrap();
        let panel = &figure.panels[0];

        let rows = rasters(panel);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].0[0], (1.0, 2.0));
        assert_eq!(rows[2].0[0], (1.1, -1.0));
        assert!(panel.elements.iter().any(|e| matches!(e, Element::HLine { y, .. } if (*y - 0.0).abs() < 1e-12)));

        let aligned: Vec<&Vec<(f64, f64)>> = panel
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Line { points, dashed: true, .. } => Some(points),
                _ => None,
            })
            .collect();
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned[0].as_slice(), &[(1.0, 2.0), (1.1, -1.0)]);

        let (lo, hi) = panel.y_range.unwrap();
        assert_abs_diff_eq!(lo, -1.5);
        assert_abs_diff_eq!(hi, 2.5);
        assert_eq!(panel.y_ticks.len(), 4);
        assert_eq!(panel.x_label.as_deref(), Some("time in seconds"));
    }

    #[test]
    fn alignment_within_one_set() {
        let trains = SpikeTrains::new(first()).with_alignment(BTreeMap::from([((1, 2), vec![(0, 0)])]));
        let figure = spike_trains(&trains, &SpikeTrainOptions::default(), CanvasTarget::New)
            .unwrap()
            .figure
            .unwrap();
        let lines = figure.panels[0]
            .elements
            .iter()
            .filter(|e| matches!(e, Element::Line { .. }))
            .count();
        assert_eq!(lines, 1);
    }

    #[test]
    fn only_errors_are_annotated() {
        let trains = SpikeTrains::new(first()).with_labels(
            BTreeMap::from([(1, vec![1, 3, 2]), (2, vec![6, 1])]),
            BTreeMap::from([(5, vec![4, 4])]),
        );
        let figure = spike_trains(&trains, &SpikeTrainOptions::default(), CanvasTarget::New)
            .unwrap()
            .figure
            .unwrap();
        let texts: Vec<(&(f64, f64), &str)> = figure.panels[0]
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { at, text } => Some((at, text.as_str())),
                _ => None,
            })
            .collect();
        // second-set labels are ignored without a second set
        assert_eq!(texts, vec![(&(50.0, 1.0), "FP"), (&(12.0, 0.0), "FN")]);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let empty: SpikeTrains<u32> = SpikeTrains::new(BTreeMap::new());
        assert!(matches!(
            spike_trains(&empty, &SpikeTrainOptions::default(), CanvasTarget::New),
            Err(PlotError::Input(_))
        ));

        let bad_alignment = SpikeTrains::new(first()).with_alignment(BTreeMap::from([((1, 2), vec![(0, 9)])]));
        assert!(matches!(
            spike_trains(&bad_alignment, &SpikeTrainOptions::default(), CanvasTarget::New),
            Err(PlotError::Input(_))
        ));

        let bad_label = SpikeTrains::new(first()).with_labels(BTreeMap::from([(2, vec![9])]), BTreeMap::new());
        assert!(matches!(
            spike_trains(&bad_label, &SpikeTrainOptions::default(), CanvasTarget::New),
            Err(PlotError::Input(_))
        ));
    }
}
