//! Ridge extraction from a wavelet power surface.
//!
//! The ridge is the per-timepoint argmax over periods. No continuity is imposed
//! between neighboring timepoints, so at scale-ambiguous points the ridge may jump.

use std::f64::consts::PI;

/// Per-pixel result: four equal-length series.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeResult {
    /// Instantaneous phase in `(-pi, pi]`.
    pub phase: Vec<f64>,
    /// Period at the ridge, in the units of `dt`.
    pub period: Vec<f64>,
    /// Wavelet power at the ridge, `|W|^2` over the series variance.
    pub power: Vec<f64>,
    /// Oscillation amplitude at the ridge, normalized if a window is configured.
    pub amplitude: Vec<f64>,
}

impl RidgeResult {
    pub fn with_len(n: usize) -> Self {
        Self {
            phase: Vec::with_capacity(n),
            period: Vec::with_capacity(n),
            power: Vec::with_capacity(n),
            amplitude: Vec::with_capacity(n),
        }
    }

    /// Result for a series without oscillation: zero power and amplitude,
    /// undefined (`NaN`) phase and period.
    pub fn degenerate(n: usize) -> Self {
        Self {
            phase: vec![f64::NAN; n],
            period: vec![f64::NAN; n],
            power: vec![0.0; n],
            amplitude: vec![0.0; n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.phase.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.phase.is_empty()
    }

    /// Whether no timepoint carries a defined ridge.
    pub fn is_degenerate(&self) -> bool {
        self.period.iter().all(|p| p.is_nan())
    }

    /// Replace every timepoint where `valid` is false with `NaN` in all four series.
    pub fn mask_samples(&mut self, valid: &[bool]) {
        assert_eq!(valid.len(), self.len(), "Mask length mismatch");
        for (t, &ok) in valid.iter().enumerate() {
            if ok {
                continue;
            }
            self.phase[t] = f64::NAN;
            self.period[t] = f64::NAN;
            self.power[t] = f64::NAN;
            self.amplitude[t] = f64::NAN;
        }
    }
}

/// Index and value of the largest element; ties resolve to the first index.
///
/// Returns `None` for an empty iterator.
pub fn argmax_first(values: impl IntoIterator<Item = f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, best_value)) if v <= best_value => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

/// Complex argument mapped to `(-pi, pi]`.
#[inline]
pub fn wrap_phase(re: f64, im: f64) -> f64 {
    let phase = im.atan2(re);
    if phase <= -PI {
        phase + 2.0 * PI
    } else {
        phase
    }
}
