//! Continuous wavelet transform and ridge extraction for single pixel series.
//!
//! A [`WaveletAnalyzer`] owns the period grid and the Morlet filter bank for one
//! series length and sampling interval. It is immutable after construction and
//! shared by all workers; each worker brings its own [`Workspace`].

#[cfg(test)]
mod tests;

pub mod filter_bank;
pub mod grid;
pub mod ridge;

use std::f64::consts::PI;

use rustfft::num_complex::Complex;

use crate::error::PixelError;

pub use filter_bank::{scale_from_period, FilterBank, Scratch, OMEGA0};
pub use grid::PeriodGrid;
pub use ridge::{argmax_first, wrap_phase, RidgeResult};

/// Relative standard deviation below which a series counts as constant.
pub const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Per-worker buffers for [`WaveletAnalyzer::analyze_with`].
pub struct Workspace {
    scratch: Scratch,
    coefficients: Vec<Complex<f64>>,
    centered: Vec<f64>,
}

/// Full time-frequency decomposition of one series.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub periods: Vec<f64>,
    pub n_samples: usize,
    /// Complex coefficients, period-major.
    pub coefficients: Vec<Complex<f64>>,
    /// `|W|^2 / variance`, period-major.
    pub power: Vec<f64>,
}

impl Spectrum {
    #[inline]
    pub fn power_at(&self, period_index: usize, t: usize) -> f64 {
        self.power[period_index * self.n_samples + t]
    }
}

/// Mean, population variance and largest magnitude of a series.
#[derive(Debug, Clone, Copy)]
struct SeriesStats {
    mean: f64,
    variance: f64,
    max_abs: f64,
}

impl SeriesStats {
    fn of(signal: &[f64]) -> Self {
        let n = signal.len() as f64;
        let mean = signal.iter().sum::<f64>() / n;
        let variance = signal.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
        let max_abs = signal.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        Self {
            mean,
            variance,
            max_abs,
        }
    }

    fn is_degenerate(&self) -> bool {
        self.max_abs == 0.0 || self.variance.sqrt() <= DEGENERATE_TOLERANCE * self.max_abs
    }
}

/// Whether `signal` has no variation worth transforming.
pub fn is_constant(signal: &[f64]) -> bool {
    signal.is_empty() || SeriesStats::of(signal).is_degenerate()
}

pub struct WaveletAnalyzer {
    bank: FilterBank,
}

impl WaveletAnalyzer {
    pub fn new(grid: PeriodGrid, dt: f64, n_samples: usize) -> Self {
        Self {
            bank: FilterBank::new(grid, dt, n_samples),
        }
    }

    #[inline]
    pub fn periods(&self) -> &[f64] {
        self.bank.grid().periods()
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.bank.n_samples()
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.bank.dt()
    }

    pub fn filter_bank(&self) -> &FilterBank {
        &self.bank
    }

    pub fn workspace(&self) -> Workspace {
        Workspace {
            scratch: self.bank.scratch(),
            coefficients: Vec::with_capacity(self.periods().len() * self.n_samples()),
            centered: Vec::with_capacity(self.n_samples()),
        }
    }

    /// Ridge of `signal`. Allocates a fresh workspace; prefer
    /// [`WaveletAnalyzer::analyze_with`] in loops.
    pub fn analyze(&self, signal: &[f64]) -> Result<RidgeResult, PixelError> {
        let mut workspace = self.workspace();
        self.analyze_with(signal, &mut workspace)
    }

    pub fn analyze_with(
        &self,
        signal: &[f64],
        workspace: &mut Workspace,
    ) -> Result<RidgeResult, PixelError> {
        let n = self.n_samples();
        let Some(stats) = self.prepare(signal, workspace)? else {
            return Ok(RidgeResult::degenerate(n));
        };

        let periods = self.periods();
        let scales = self.bank.scales();
        let coefficients = &workspace.coefficients;
        let dt = self.dt();

        let mut result = RidgeResult::with_len(n);
        for t in 0..n {
            let column = (0..periods.len()).map(|j| coefficients[j * n + t].norm_sqr());
            match argmax_first(column) {
                Some((j, modulus)) if modulus > 0.0 => {
                    let w = coefficients[j * n + t];
                    result.phase.push(wrap_phase(w.re, w.im));
                    result.period.push(periods[j]);
                    result.power.push(modulus / stats.variance);
                    result.amplitude.push(amplitude_factor(scales[j], dt) * modulus.sqrt());
                }
                _ => {
                    result.phase.push(f64::NAN);
                    result.period.push(f64::NAN);
                    result.power.push(0.0);
                    result.amplitude.push(0.0);
                }
            }
        }

        Ok(result)
    }

    /// Complete power surface of `signal`, for inspection and plotting.
    ///
    /// A constant series yields an all-zero surface.
    pub fn spectrum(&self, signal: &[f64]) -> Result<Spectrum, PixelError> {
        let mut workspace = self.workspace();
        let n = self.n_samples();
        let n_periods = self.periods().len();

        let (coefficients, power) = match self.prepare(signal, &mut workspace)? {
            Some(stats) => {
                let power = workspace
                    .coefficients
                    .iter()
                    .map(|w| w.norm_sqr() / stats.variance)
                    .collect();
                (workspace.coefficients, power)
            }
            None => (
                vec![Complex::new(0.0, 0.0); n_periods * n],
                vec![0.0; n_periods * n],
            ),
        };

        Ok(Spectrum {
            periods: self.periods().to_vec(),
            n_samples: n,
            coefficients,
            power,
        })
    }

    /// Validate and transform `signal` into `workspace.coefficients`.
    ///
    /// Returns `None` for a degenerate series.
    fn prepare(
        &self,
        signal: &[f64],
        workspace: &mut Workspace,
    ) -> Result<Option<SeriesStats>, PixelError> {
        assert_eq!(signal.len(), self.n_samples(), "Series length mismatch");

        if let Some(sample) = signal.iter().position(|x| !x.is_finite()) {
            return Err(PixelError::NonFiniteInput { sample });
        }

        let stats = SeriesStats::of(signal);
        if stats.is_degenerate() {
            return Ok(None);
        }

        workspace.centered.clear();
        workspace
            .centered
            .extend(signal.iter().map(|x| x - stats.mean));
        self.bank.transform(
            &workspace.centered,
            &mut workspace.scratch,
            &mut workspace.coefficients,
        );

        let n = self.n_samples();
        if let Some(idx) = workspace
            .coefficients
            .iter()
            .position(|w| !(w.re.is_finite() && w.im.is_finite()))
        {
            return Err(PixelError::NonFiniteCoefficients {
                period_index: idx / n,
            });
        }

        Ok(Some(stats))
    }
}

/// Converts `|W|` at `scale` into the amplitude of the underlying sinusoid.
#[inline]
fn amplitude_factor(scale: f64, dt: f64) -> f64 {
    2.0f64.sqrt() * PI.powf(-0.25) * (dt / scale).sqrt()
}
