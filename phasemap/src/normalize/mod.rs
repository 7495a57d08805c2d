//! Amplitude normalization by a sliding-window envelope.
//!
//! The envelope at sample `i` is the root mean square of the amplitude over a
//! centered window of `round(window_size / dt)` samples. Near either end the
//! half-width shrinks to `min(w / 2, i, N - 1 - i)`, so the window stays centered
//! and the first and last samples are their own envelope.

#[cfg(test)]
mod tests;

/// Window length in samples for a window given in time units.
#[inline]
pub fn window_samples(window_size: f64, dt: f64) -> usize {
    (window_size / dt).round().max(0.0) as usize
}

/// Centered sliding RMS of `series` with symmetric truncation at the boundaries.
pub fn sliding_window_envelope(series: &[f64], window_size: f64, dt: f64) -> Vec<f64> {
    let n = series.len();
    let half = window_samples(window_size, dt) / 2;

    // prefix[i] = sum of squares of series[..i]
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &a in series {
        acc += a * a;
        prefix.push(acc);
    }

    (0..n)
        .map(|i| {
            let h = half.min(i).min(n - 1 - i);
            let lo = i - h;
            let hi = i + h + 1;
            let mean_square = (prefix[hi] - prefix[lo]) / (hi - lo) as f64;
            mean_square.max(0.0).sqrt()
        })
        .collect()
}

/// Divide `amplitude` by its envelope. Without a window the input is returned unchanged.
///
/// Where the envelope vanishes the normalized amplitude is 0.
pub fn normalize_amplitude(amplitude: &[f64], window_size: Option<f64>, dt: f64) -> Vec<f64> {
    let Some(window_size) = window_size else {
        return amplitude.to_vec();
    };

    let envelope = sliding_window_envelope(amplitude, window_size, dt);
    amplitude
        .iter()
        .zip(&envelope)
        .map(|(&a, &env)| if env > 0.0 { a / env } else { 0.0 })
        .collect()
}
