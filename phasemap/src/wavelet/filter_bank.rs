//! Morlet filter bank evaluated with FFT convolution.
//!
//! Each period of the grid gets a complex Morlet kernel
//! `h[m] = sqrt(dt/s) * pi^(-1/4) * exp(i*w0*u) * exp(-u^2/2)`, `u = m*dt/s`,
//! precomputed as a spectrum of the padded FFT length. Kernels are energy
//! normalized the same way at every scale. Padding is long enough that the
//! circular convolution never wraps into the `N` output samples.

use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::grid::PeriodGrid;

/// Morlet center frequency (non-dimensional).
pub const OMEGA0: f64 = 2.0 * PI;

/// Kernel half-support in units of scale.
pub const SUPPORT: f64 = 4.0;

/// Morlet scale whose power response to a pure sinusoid peaks at `period`.
#[inline]
pub fn scale_from_period(period: f64) -> f64 {
    period * (OMEGA0 + (2.0 + OMEGA0 * OMEGA0).sqrt()) / (4.0 * PI)
}

/// Read-only filter bank shared by every worker.
pub struct FilterBank {
    grid: PeriodGrid,
    dt: f64,
    n_samples: usize,
    fft_len: usize,
    scales: Vec<f64>,
    /// One spectrum of length `fft_len` per period.
    spectra: Vec<Vec<Complex<f64>>>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

/// Per-worker buffers reused across pixels.
pub struct Scratch {
    signal_spectrum: Vec<Complex<f64>>,
    work: Vec<Complex<f64>>,
    fft_scratch: Vec<Complex<f64>>,
}

impl FilterBank {
    pub fn new(grid: PeriodGrid, dt: f64, n_samples: usize) -> Self {
        assert!(dt > 0.0, "Sampling interval must be positive");
        assert!(n_samples > 0, "Series must not be empty");

        let scales: Vec<f64> = grid.periods().iter().map(|&p| scale_from_period(p)).collect();
        let half_supports: Vec<usize> = scales
            .iter()
            .map(|&s| half_support(s, dt, n_samples))
            .collect();
        let max_half = half_supports.iter().copied().max().unwrap_or(0);
        let fft_len = (n_samples + max_half).next_power_of_two();

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);

        let spectra = scales
            .iter()
            .zip(&half_supports)
            .map(|(&scale, &half)| {
                let mut buffer = morlet_kernel(scale, dt, half, fft_len);
                forward.process(&mut buffer);
                buffer
            })
            .collect();

        Self {
            grid,
            dt,
            n_samples,
            fft_len,
            scales,
            spectra,
            forward,
            inverse,
        }
    }

    #[inline]
    pub fn grid(&self) -> &PeriodGrid {
        &self.grid
    }

    #[inline]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    #[inline]
    pub fn fft_len(&self) -> usize {
        self.fft_len
    }

    pub fn scratch(&self) -> Scratch {
        let scratch_len = self
            .forward
            .get_inplace_scratch_len()
            .max(self.inverse.get_inplace_scratch_len());
        Scratch {
            signal_spectrum: vec![Complex::new(0.0, 0.0); self.fft_len],
            work: vec![Complex::new(0.0, 0.0); self.fft_len],
            fft_scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    /// Convolve `signal` with every kernel.
    ///
    /// `coefficients` receives `n_periods * n_samples` values, period-major.
    pub fn transform(
        &self,
        signal: &[f64],
        scratch: &mut Scratch,
        coefficients: &mut Vec<Complex<f64>>,
    ) {
        assert_eq!(signal.len(), self.n_samples, "Series length mismatch");

        let n = self.n_samples;
        let norm = 1.0 / self.fft_len as f64;

        scratch.signal_spectrum.fill(Complex::new(0.0, 0.0));
        for (dst, &x) in scratch.signal_spectrum.iter_mut().zip(signal) {
            *dst = Complex::new(x, 0.0);
        }
        self.forward
            .process_with_scratch(&mut scratch.signal_spectrum, &mut scratch.fft_scratch);

        coefficients.clear();
        coefficients.reserve(self.spectra.len() * n);
        for spectrum in &self.spectra {
            for ((w, &x), &h) in scratch
                .work
                .iter_mut()
                .zip(&scratch.signal_spectrum)
                .zip(spectrum)
            {
                *w = x * h * norm;
            }
            self.inverse
                .process_with_scratch(&mut scratch.work, &mut scratch.fft_scratch);
            coefficients.extend_from_slice(&scratch.work[..n]);
        }
    }
}

/// Number of samples on each side of the kernel center, capped so the kernel never
/// reaches further than the series itself.
#[inline]
fn half_support(scale: f64, dt: f64, n_samples: usize) -> usize {
    let half = (SUPPORT * scale / dt).ceil() as usize;
    half.min(n_samples - 1)
}

/// Kernel laid out for circular convolution: lag `m` at index `m mod fft_len`.
fn morlet_kernel(scale: f64, dt: f64, half: usize, fft_len: usize) -> Vec<Complex<f64>> {
    let amplitude = (dt / scale).sqrt() * PI.powf(-0.25);
    let mut kernel = vec![Complex::new(0.0, 0.0); fft_len];

    for m in -(half as isize)..=(half as isize) {
        let u = m as f64 * dt / scale;
        let envelope = amplitude * (-0.5 * u * u).exp();
        let idx = m.rem_euclid(fft_len as isize) as usize;
        kernel[idx] = Complex::from_polar(envelope, OMEGA0 * u);
    }

    kernel
}
