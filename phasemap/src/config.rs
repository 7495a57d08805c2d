//! Run configuration.
//!
//! A single `Config` carries every parameter of the pipeline. Optional stages are
//! disabled by leaving their field at `None`; a zero sigma or percentage disables
//! smoothing or rescaling as well.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Warning;
use crate::error::Error;

/// Default size of the worker pool.
pub const DEFAULT_WORKERS: usize = 8;

/// How invalid pixels are determined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Masking {
    /// Every pixel is valid.
    #[default]
    None,
    /// Threshold a single reference frame; the result holds for every timepoint.
    Fixed { frame: usize, threshold: f32 },
    /// Threshold every frame independently.
    Dynamic { threshold: f32 },
}

/// Value fed into the transform at dynamically masked samples of a partially valid pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapFill {
    /// Repeat the last valid sample; leading gaps take the first valid sample.
    #[default]
    HoldLast,
    /// Mean of the pixel's valid samples.
    ValidMean,
}

/// Pipeline configuration.
///
/// # Examples
///
/// ```ignore
/// use phasemap::{Config, Masking};
///
/// let config = Config {
///     gauss_sigma: Some(2.0),
///     t_cutoff: Some(60.0),
///     masking: Masking::Fixed { frame: 0, threshold: 12.0 },
///     ..Config::new(0.5, 2.0, 30.0, 100)
/// };
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sampling interval.
    pub dt: f64,
    /// Smallest analysed period.
    pub t_min: f64,
    /// Largest analysed period.
    pub t_max: f64,
    /// Number of periods in the grid.
    pub n_periods: usize,
    /// Spatial Gaussian smoothing sigma in pixels.
    #[serde(default)]
    pub gauss_sigma: Option<f32>,
    /// Spatial downscaling in percent of the original size.
    #[serde(default)]
    pub rescale_percent: Option<u32>,
    #[serde(default)]
    pub masking: Masking,
    #[serde(default)]
    pub gap_fill: GapFill,
    /// Sinc detrending cut-off period.
    #[serde(default)]
    pub t_cutoff: Option<f64>,
    /// Amplitude normalization window, in time units.
    #[serde(default)]
    pub window_size: Option<f64>,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Config {
    /// Configuration with every optional stage disabled.
    pub fn new(dt: f64, t_min: f64, t_max: f64, n_periods: usize) -> Self {
        Self {
            dt,
            t_min,
            t_max,
            n_periods,
            gauss_sigma: None,
            rescale_percent: None,
            masking: Masking::None,
            gap_fill: GapFill::HoldLast,
            t_cutoff: None,
            window_size: None,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Smoothing sigma if smoothing is enabled.
    pub fn smoothing_sigma(&self) -> Option<f32> {
        self.gauss_sigma.filter(|&sigma| sigma > 0.0)
    }

    /// Rescale percentage if rescaling is enabled.
    pub fn rescale(&self) -> Option<u32> {
        self.rescale_percent.filter(|&percent| percent > 0)
    }

    /// Check every parameter, reporting the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(Error::invalid("dt", format!("must be positive, got {}", self.dt)));
        }
        if !(self.t_min.is_finite() && self.t_min > 0.0) {
            return Err(Error::invalid(
                "t_min",
                format!("must be positive, got {}", self.t_min),
            ));
        }
        if !(self.t_max.is_finite() && self.t_max > 0.0) {
            return Err(Error::invalid(
                "t_max",
                format!("must be positive, got {}", self.t_max),
            ));
        }
        if self.t_min >= self.t_max {
            return Err(Error::invalid(
                "t_min",
                format!(
                    "must be smaller than t_max, got {} >= {}",
                    self.t_min, self.t_max
                ),
            ));
        }
        if self.n_periods == 0 {
            return Err(Error::invalid("n_periods", "must be at least 1"));
        }
        if let Some(sigma) = self.gauss_sigma {
            if !(sigma.is_finite() && sigma >= 0.0) {
                return Err(Error::invalid(
                    "gauss_sigma",
                    format!("must be non-negative, got {sigma}"),
                ));
            }
        }
        if let Some(percent) = self.rescale_percent {
            if percent > 99 {
                return Err(Error::invalid(
                    "rescale_percent",
                    format!("must be within 0-99, got {percent}"),
                ));
            }
        }
        match self.masking {
            Masking::None => {}
            Masking::Fixed { threshold, .. } | Masking::Dynamic { threshold } => {
                if !threshold.is_finite() {
                    return Err(Error::invalid("mask_thresh", "must be finite"));
                }
            }
        }
        if let Some(t_cutoff) = self.t_cutoff {
            if !(t_cutoff.is_finite() && t_cutoff > 0.0) {
                return Err(Error::invalid(
                    "t_cutoff",
                    format!("must be positive, got {t_cutoff}"),
                ));
            }
        }
        if let Some(window_size) = self.window_size {
            if !(window_size.is_finite() && window_size > 0.0) {
                return Err(Error::invalid(
                    "window_size",
                    format!("must be positive, got {window_size}"),
                ));
            }
        }
        if self.workers == 0 {
            return Err(Error::invalid("workers", "must be at least 1"));
        }
        Ok(())
    }

    /// Parameter combinations that are legal but likely unintended.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();

        let nyquist = 2.0 * self.dt;
        if self.t_min < nyquist {
            warnings.push(Warning::BelowNyquist {
                t_min: self.t_min,
                nyquist,
            });
        }

        if let Some(t_cutoff) = self.t_cutoff {
            if t_cutoff < 2.0 * self.t_max {
                warnings.push(Warning::CutoffBelowPeriodRange {
                    t_cutoff,
                    t_max: self.t_max,
                });
            }
        }

        warnings
    }
}
