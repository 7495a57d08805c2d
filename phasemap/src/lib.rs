//! Phasemap - per-pixel wavelet analysis of time-lapse image stacks.
//!
//! Every pixel's time series goes through the same chain:
//! - Optional spatial Gaussian smoothing, downscaling and masking of the movie
//! - Optional sinc detrending
//! - Morlet continuous wavelet transform over a log-spaced period grid
//! - Ridge extraction (dominant period per timepoint)
//! - Optional sliding-window amplitude normalization
//!
//! The result is four volumes of the (rescaled) movie's shape: phase, period,
//! power and amplitude. Masked and failed samples hold [`SENTINEL`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use phasemap::{process, Config, Movie};
//!
//! let movie = Movie::new(frames, height, width, samples)?;
//! let config = Config {
//!     t_cutoff: Some(60.0),
//!     window_size: Some(40.0),
//!     ..Config::new(0.5, 2.0, 30.0, 200)
//! };
//! let analysis = process(&movie, &config)?;
//!
//! println!("{}", analysis.diagnostics);
//! let (phase, period, power, amplitude) = analysis.volumes.into_parts();
//! ```

pub mod config;
pub mod detrend;
pub mod diagnostics;
pub mod error;
pub mod movie;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod progress;
pub mod scheduler;
pub mod wavelet;

// ============================================================================
// Entry points
// ============================================================================

pub use pipeline::{process, process_with_progress, Analysis};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{Config, GapFill, Masking, DEFAULT_WORKERS};
pub use diagnostics::{Diagnostics, Warning};
pub use error::{Error, PixelError};
pub use progress::{Progress, ProgressCallback, ProgressStage};

// ============================================================================
// Data
// ============================================================================

pub use movie::Movie;
pub use output::{is_sentinel, OutputVolumes, SENTINEL};

// ============================================================================
// Individual stages
// ============================================================================

pub use detrend::Detrender;
pub use normalize::{normalize_amplitude, sliding_window_envelope};
pub use preprocess::{preprocess, Mask, PixelValidity, Preprocessed};
pub use wavelet::{PeriodGrid, RidgeResult, Spectrum, WaveletAnalyzer};
