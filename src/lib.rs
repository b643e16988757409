//! Plots for spike sorting.
//!
//! The core is a pairwise projection analyzer: every pair of labelled
//! groups is projected onto the axis joining their means, which turns the
//! separability of two clusters into a one-dimensional picture. Around it
//! sit the plots of the original toolbox (cluster scatter, waveforms,
//! spike-train rasters, multichannel recordings and filter tensors),
//! rendered through `plotters`.
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//! use spikeplot::plot::{CanvasTarget, ProjectionOptions, cluster_projection};
//! use spikeplot::{Groups, Separability, analyze, synth::gaussian_cluster};
//!
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
//! let groups: Groups<usize, f64> = [[0.0, 0.0], [5.0, 0.0], [0.0, 5.0]]
//!     .iter()
//!     .enumerate()
//!     .map(|(k, centre)| (k, gaussian_cluster(&mut rng, 300, centre, 1.0)))
//!     .collect();
//! // one transform for all groups keeps them apart
//! let groups = groups.whiten();
//!
//! let pairs = analyze(&groups)?;
//! println!("{}", Separability::new(&pairs));
//!
//! let figure = cluster_projection(&groups, &ProjectionOptions::default(), CanvasTarget::New)?.figure;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod display;
mod math;
mod projection;
mod sample;
mod statistics;

pub mod plot;

pub use display::Separability;
pub use math::*;
pub use projection::*;
pub use sample::*;
pub use statistics::*;
pub use rand;
