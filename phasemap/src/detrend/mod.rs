//! Sinc low-pass detrending.
//!
//! The trend is the output of a Blackman-windowed sinc low-pass with cut-off
//! period `t_cutoff`, and the detrended series is the input minus that trend.
//!
//! Boundary policy: the series is mirror-reflected (edge sample not repeated) by
//! half the filter order on both sides before filtering. The filter order is the
//! largest even number not above `N - 1`, so one reflection always suffices.


use std::f64::consts::PI;

/// Low-pass filter taps for one series length, shared read-only across pixels.
#[derive(Debug, Clone)]
pub struct Detrender {
    t_cutoff: f64,
    taps: Vec<f64>,
}

impl Detrender {
    /// Build the filter for series of `n_samples` samples taken every `dt`.
    pub fn new(t_cutoff: f64, dt: f64, n_samples: usize) -> Self {
        assert!(t_cutoff > 0.0, "Cut-off period must be positive");
        assert!(dt > 0.0, "Sampling interval must be positive");

        let order = filter_order(n_samples);
        Self {
            t_cutoff,
            taps: sinc_taps(order, dt / t_cutoff),
        }
    }

    pub fn t_cutoff(&self) -> f64 {
        self.t_cutoff
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Slow component of `signal`.
    pub fn trend(&self, signal: &[f64]) -> Vec<f64> {
        let half = self.taps.len() / 2;
        if signal.len() < 3 || half == 0 {
            let mean = signal.iter().sum::<f64>() / signal.len().max(1) as f64;
            return vec![mean; signal.len()];
        }
        assert!(half < signal.len(), "Filter longer than the series");

        let padded = reflect_pad(signal, half);
        (0..signal.len())
            .map(|t| {
                self.taps
                    .iter()
                    .zip(&padded[t..t + self.taps.len()])
                    .map(|(h, x)| h * x)
                    .sum()
            })
            .collect()
    }

    /// `signal` with its trend removed.
    pub fn detrend(&self, signal: &[f64]) -> Vec<f64> {
        let trend = self.trend(signal);
        signal.iter().zip(&trend).map(|(x, tr)| x - tr).collect()
    }
}

/// Detrend `signal` if a cut-off is configured; otherwise return it unchanged.
pub fn detrend(signal: &[f64], detrender: Option<&Detrender>) -> Vec<f64> {
    match detrender {
        Some(detrender) => detrender.detrend(signal),
        None => signal.to_vec(),
    }
}

/// Largest even filter order that fits a series of `n_samples`.
#[inline]
pub fn filter_order(n_samples: usize) -> usize {
    let order = n_samples.saturating_sub(1);
    order - order % 2
}

/// `order + 1` Blackman-windowed sinc taps for a cut-off of `f_c` cycles per sample,
/// normalized to unit DC gain.
pub fn sinc_taps(order: usize, f_c: f64) -> Vec<f64> {
    if order == 0 {
        return vec![1.0];
    }
    let half = (order / 2) as f64;
    let mut taps: Vec<f64> = (0..=order)
        .map(|n| {
            let k = n as f64 - half;
            let phase = 2.0 * PI * n as f64 / order as f64;
            let window = 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos();
            2.0 * f_c * sinc(2.0 * f_c * k) * window
        })
        .collect();

    let sum: f64 = taps.iter().sum();
    if sum.abs() > f64::EPSILON {
        for tap in &mut taps {
            *tap /= sum;
        }
    }
    taps
}

#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Mirror `signal` by `pad` samples on both ends, edge samples not repeated.
fn reflect_pad(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    let mut padded = Vec::with_capacity(n + 2 * pad);
    padded.extend((1..=pad).rev().map(|i| signal[i]));
    padded.extend_from_slice(signal);
    padded.extend((1..=pad).map(|i| signal[n - 1 - i]));
    padded
}
