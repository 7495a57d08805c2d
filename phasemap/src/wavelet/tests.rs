//! Tests for the wavelet transform and ridge extraction.

use std::f64::consts::PI;

use super::*;

fn cosine(n: usize, dt: f64, period: f64, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * i as f64 * dt / period).cos())
        .collect()
}

fn analyzer(dt: f64, t_min: f64, t_max: f64, n_periods: usize, n: usize) -> WaveletAnalyzer {
    WaveletAnalyzer::new(PeriodGrid::new(t_min, t_max, n_periods).unwrap(), dt, n)
}

/// Smallest angular distance between two phases.
fn phase_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(2.0 * PI);
    d.min(2.0 * PI - d)
}

// ============================================================================
// Period grid
// ============================================================================

#[test]
fn test_grid_is_geometric_with_exact_endpoints() {
    let grid = PeriodGrid::new(2.0, 32.0, 5).unwrap();
    assert_eq!(grid.len(), 5);
    assert_eq!(grid.t_min(), 2.0);
    assert_eq!(grid.t_max(), 32.0);
    let expected = [2.0, 4.0, 8.0, 16.0, 32.0];
    for (p, e) in grid.periods().iter().zip(expected) {
        assert!((p - e).abs() < 1e-12, "{p} vs {e}");
    }
}

#[test]
fn test_grid_strictly_increasing() {
    let grid = PeriodGrid::new(3.0, 40.0, 100).unwrap();
    for pair in grid.periods().windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

#[test]
fn test_grid_single_period() {
    let grid = PeriodGrid::new(2.0, 8.0, 1).unwrap();
    assert_eq!(grid.periods(), &[2.0]);
}

#[test]
fn test_grid_rejects_bad_ranges() {
    assert!(PeriodGrid::new(8.0, 8.0, 4).is_err());
    assert!(PeriodGrid::new(0.0, 8.0, 4).is_err());
    assert!(PeriodGrid::new(2.0, 8.0, 0).is_err());
}

#[test]
fn test_grid_contains() {
    let grid = PeriodGrid::new(2.0, 8.0, 3).unwrap();
    assert!(grid.contains(4.0));
    assert!(!grid.contains(5.0));
}

// ============================================================================
// Filter bank
// ============================================================================

#[test]
fn test_scale_from_period_fourier_factor() {
    // w0 = 2pi puts the scale just above the period
    let factor = scale_from_period(1.0);
    assert!(factor > 1.0 && factor < 1.02, "factor {factor}");
    assert!((scale_from_period(10.0) - 10.0 * factor).abs() < 1e-12);
}

#[test]
fn test_filter_bank_padding_avoids_wraparound() {
    let grid = PeriodGrid::new(2.0, 50.0, 10).unwrap();
    let bank = FilterBank::new(grid, 1.0, 100);
    // Largest kernel is capped at n - 1 samples on each side
    assert!(bank.fft_len() >= 100 + 99);
    assert!(bank.fft_len().is_power_of_two());
}

#[test]
fn test_filter_bank_coefficient_layout() {
    let n = 64;
    let grid = PeriodGrid::new(4.0, 16.0, 3).unwrap();
    let bank = FilterBank::new(grid, 1.0, n);
    let mut scratch = bank.scratch();
    let mut coefficients = Vec::new();
    bank.transform(&cosine(n, 1.0, 8.0, 1.0), &mut scratch, &mut coefficients);
    assert_eq!(coefficients.len(), 3 * n);
}

#[test]
fn test_impulse_response_is_kernel() {
    // The transform of a centered impulse is the kernel itself
    let n = 65;
    let grid = PeriodGrid::new(5.0, 6.0, 1).unwrap();
    let bank = FilterBank::new(grid, 1.0, n);
    let mut signal = vec![0.0; n];
    signal[32] = 1.0;

    let mut scratch = bank.scratch();
    let mut coefficients = Vec::new();
    bank.transform(&signal, &mut scratch, &mut coefficients);

    let scale = bank.scales()[0];
    let peak = coefficients[32];
    let expected = (1.0 / scale).sqrt() * PI.powf(-0.25);
    assert!((peak.re - expected).abs() < 1e-12);
    assert!(peak.im.abs() < 1e-12);
    // Symmetric envelope around the impulse
    assert!((coefficients[30].norm() - coefficients[34].norm()).abs() < 1e-12);
}

// ============================================================================
// Ridge helpers
// ============================================================================

#[test]
fn test_argmax_first_tie_breaks_to_smaller_index() {
    assert_eq!(argmax_first([1.0, 3.0, 3.0, 2.0]), Some((1, 3.0)));
    assert_eq!(argmax_first([5.0, 5.0]), Some((0, 5.0)));
    assert_eq!(argmax_first(std::iter::empty::<f64>()), None);
}

#[test]
fn test_wrap_phase_range() {
    // atan2(-0.0, -1.0) is exactly -pi, which must map to +pi
    assert_eq!(wrap_phase(-1.0, -0.0), PI);
    assert_eq!(wrap_phase(-1.0, 0.0), PI);
    assert!((wrap_phase(0.0, -1.0) + PI / 2.0).abs() < 1e-15);
    assert_eq!(wrap_phase(1.0, 0.0), 0.0);
}

#[test]
fn test_mask_samples() {
    let mut result = RidgeResult {
        phase: vec![0.1, 0.2, 0.3],
        period: vec![4.0, 4.0, 4.0],
        power: vec![1.0, 2.0, 3.0],
        amplitude: vec![0.5, 0.5, 0.5],
    };
    result.mask_samples(&[true, false, true]);
    assert_eq!(result.power[0], 1.0);
    assert!(result.phase[1].is_nan());
    assert!(result.period[1].is_nan());
    assert!(result.power[1].is_nan());
    assert!(result.amplitude[1].is_nan());
    assert_eq!(result.amplitude[2], 0.5);
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_sinusoid_ridge_period_amplitude_phase() {
    let n = 256;
    let analyzer = analyzer(1.0, 4.0, 40.0, 80, n);
    let signal = cosine(n, 1.0, 10.0, 2.0);
    let ridge = analyzer.analyze(&signal).unwrap();

    assert_eq!(ridge.len(), n);
    for t in 64..192 {
        assert!(
            (ridge.period[t] - 10.0).abs() < 0.5,
            "t={t}: period {}",
            ridge.period[t]
        );
        assert!(
            (ridge.amplitude[t] - 2.0).abs() < 0.1,
            "t={t}: amplitude {}",
            ridge.amplitude[t]
        );
        let expected_phase = 2.0 * PI * t as f64 / 10.0;
        assert!(
            phase_distance(ridge.phase[t], expected_phase) < 0.2,
            "t={t}: phase {}",
            ridge.phase[t]
        );
    }
}

#[test]
fn test_sampling_interval_sets_period_units() {
    // Period 10 time units sampled every 0.5
    let n = 256;
    let analyzer = analyzer(0.5, 4.0, 40.0, 80, n);
    let ridge = analyzer.analyze(&cosine(n, 0.5, 10.0, 1.0)).unwrap();
    for t in 64..192 {
        assert!((ridge.period[t] - 10.0).abs() < 0.5);
    }
}

#[test]
fn test_ridge_follows_frequency_change() {
    let n = 200;
    let signal: Vec<f64> = (0..n)
        .map(|t| {
            let period = if t < 100 { 8.0 } else { 16.0 };
            (2.0 * PI * t as f64 / period).sin()
        })
        .collect();
    let analyzer = analyzer(1.0, 4.0, 32.0, 60, n);
    let ridge = analyzer.analyze(&signal).unwrap();

    assert!((ridge.period[50] - 8.0).abs() < 0.5, "{}", ridge.period[50]);
    assert!((ridge.period[150] - 16.0).abs() < 1.0, "{}", ridge.period[150]);
}

#[test]
fn test_outputs_stay_in_declared_ranges() {
    let n = 128;
    let grid = PeriodGrid::new(3.0, 30.0, 25).unwrap();
    let analyzer = WaveletAnalyzer::new(grid.clone(), 1.0, n);
    let signal: Vec<f64> = (0..n)
        .map(|t| (t as f64 * 0.37).sin() + 0.5 * (t as f64 * 0.11).cos() + 0.01 * t as f64)
        .collect();
    let ridge = analyzer.analyze(&signal).unwrap();

    for t in 0..n {
        assert!(ridge.phase[t] > -PI && ridge.phase[t] <= PI);
        assert!(grid.contains(ridge.period[t]));
        assert!(ridge.power[t] >= 0.0);
        assert!(ridge.amplitude[t] >= 0.0);
    }
}

#[test]
fn test_ridge_matches_spectrum_argmax() {
    let n = 96;
    let analyzer = analyzer(1.0, 3.0, 24.0, 20, n);
    let signal: Vec<f64> = (0..n)
        .map(|t| (t as f64 * 0.5).sin() * (1.0 + t as f64 / 50.0))
        .collect();
    let ridge = analyzer.analyze(&signal).unwrap();
    let spectrum = analyzer.spectrum(&signal).unwrap();

    for t in 0..n {
        let (j, power) = argmax_first((0..20).map(|j| spectrum.power_at(j, t))).unwrap();
        assert_eq!(ridge.period[t], spectrum.periods[j]);
        assert!((ridge.power[t] - power).abs() <= 1e-12 * power.max(1.0));
    }
}

#[test]
fn test_constant_series_is_degenerate() {
    let n = 10;
    let analyzer = analyzer(1.0, 2.0, 8.0, 4, n);
    for value in [1.0, 0.1, -42.5, 0.0] {
        let ridge = analyzer.analyze(&vec![value; n]).unwrap();
        assert!(ridge.is_degenerate());
        assert!(ridge.power.iter().all(|&p| p == 0.0));
        assert!(ridge.amplitude.iter().all(|&a| a == 0.0));
        assert!(ridge.phase.iter().all(|p| p.is_nan()));
    }
    assert!(is_constant(&[3.0; 5]));
    assert!(!is_constant(&[3.0, 3.0, 3.1]));
}

#[test]
fn test_constant_series_spectrum_is_zero() {
    let analyzer = analyzer(1.0, 2.0, 8.0, 4, 16);
    let spectrum = analyzer.spectrum(&[2.0; 16]).unwrap();
    assert_eq!(spectrum.power.len(), 4 * 16);
    assert!(spectrum.power.iter().all(|&p| p == 0.0));
}

#[test]
fn test_non_finite_input_is_pixel_error() {
    let analyzer = analyzer(1.0, 2.0, 8.0, 4, 8);
    let mut signal = vec![1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0, 0.0];
    signal[5] = f64::NAN;
    assert_eq!(
        analyzer.analyze(&signal),
        Err(PixelError::NonFiniteInput { sample: 5 })
    );
    signal[5] = f64::INFINITY;
    assert!(analyzer.analyze(&signal).is_err());
}

#[test]
fn test_workspace_reuse_is_deterministic() {
    let n = 64;
    let analyzer = analyzer(1.0, 4.0, 20.0, 12, n);
    let a = cosine(n, 1.0, 7.0, 1.0);
    let b = cosine(n, 1.0, 13.0, 3.0);

    let mut workspace = analyzer.workspace();
    let first = analyzer.analyze_with(&a, &mut workspace).unwrap();
    let _ = analyzer.analyze_with(&b, &mut workspace).unwrap();
    let again = analyzer.analyze_with(&a, &mut workspace).unwrap();
    assert_eq!(first, again);
}

#[test]
fn test_single_sample_series() {
    let analyzer = analyzer(1.0, 2.0, 8.0, 4, 1);
    let ridge = analyzer.analyze(&[5.0]).unwrap();
    assert_eq!(ridge.len(), 1);
    assert!(ridge.is_degenerate());
}
