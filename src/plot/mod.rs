//! Rendering of spike-sorting data.
//!
//! Every routine follows the same shape: validate the data, build panels on
//! a [`Figure`] resolved from a [`CanvasTarget`], then optionally save and
//! show it as requested by [`Output`].

mod cluster;
mod cluster_projection;
mod figure;
mod font;
mod mcdata;
mod output;
mod palette;
mod render;
mod spike_trains;
mod waveforms;
mod xvf;

use std::error::Error as StdError;
use std::fmt;

use crate::projection::ProjectionError;

pub use cluster::{ClusterOptions, MeanMarker, cluster};
pub use cluster_projection::{ProjectionOptions, cluster_projection};
pub use figure::{CanvasTarget, Element, Figure, Marker, Panel, Rect};
pub use font::FONT_ENV;
pub use mcdata::{EpochKey, McData, McDataOptions, UnitEvents, mcdata};
pub use output::{ImageFormat, Output, Rendered, SaveError, SaveErrorKind, SaveOptions, SaveReport, save, show};
pub use palette::{Colour, Palette};
pub use render::render;
pub use spike_trains::{SpikeLabel, SpikeTrainOptions, SpikeTrains, spike_trains};
pub use waveforms::{WaveformOptions, waveforms};
pub use xvf::{XvfOptions, XvfTensor, xvf_tensor};

/// Failure of a plot routine.
#[derive(Debug)]
pub enum PlotError {
    /// The pairwise projection feeding the plot failed.
    Projection(ProjectionError),
    /// The data handed to a plot routine is malformed.
    Input(String),
    /// The canvas or region handle cannot host this plot.
    RenderTarget(String),
    /// The drawing backend failed.
    Render(String),
    /// Reading or writing an output file failed.
    Io(std::io::Error),
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotError::Projection(e) => write!(f, "projection failed: {e}"),
            PlotError::Input(msg) => write!(f, "invalid plot data: {msg}"),
            PlotError::RenderTarget(msg) => write!(f, "invalid render target: {msg}"),
            PlotError::Render(msg) => write!(f, "rendering failed: {msg}"),
            PlotError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl StdError for PlotError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PlotError::Projection(e) => Some(e),
            PlotError::Io(e) => Some(e),
            PlotError::Input(_) | PlotError::RenderTarget(_) | PlotError::Render(_) => None,
        }
    }
}

impl From<ProjectionError> for PlotError {
    fn from(e: ProjectionError) -> Self {
        PlotError::Projection(e)
    }
}

impl From<std::io::Error> for PlotError {
    fn from(e: std::io::Error) -> Self {
        PlotError::Io(e)
    }
}

/// Lossy conversion of plot data to the `f64` coordinates of the backend.
pub(crate) fn coord<F: num_traits::ToPrimitive>(x: F) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// The first two values of a row as a point.
pub(crate) fn xy<F: num_traits::ToPrimitive + Copy>(row: &[F]) -> (f64, f64) {
    match row {
        [x, y, ..] => (coord(*x), coord(*y)),
        _ => (f64::NAN, f64::NAN),
    }
}
