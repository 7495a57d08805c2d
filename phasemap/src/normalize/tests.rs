use super::*;

#[test]
fn test_window_samples_rounds() {
    assert_eq!(window_samples(10.0, 1.0), 10);
    assert_eq!(window_samples(10.0, 3.0), 3);
    assert_eq!(window_samples(5.0, 2.0), 3);
    assert_eq!(window_samples(0.4, 1.0), 0);
}

#[test]
fn test_disabled_is_identity() {
    let amplitude = vec![0.5, 1.5, 3.0, 0.0, 2.25];
    assert_eq!(normalize_amplitude(&amplitude, None, 1.0), amplitude);
}

#[test]
fn test_constant_amplitude_normalizes_to_one() {
    let amplitude = vec![4.0; 50];
    let normalized = normalize_amplitude(&amplitude, Some(9.0), 1.0);
    for v in normalized {
        assert!((v - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_removes_linear_amplitude_trend() {
    // Amplitude grows 10x over the series; normalized values stay near 1
    let n = 200;
    let amplitude: Vec<f64> = (0..n).map(|i| 1.0 + 9.0 * i as f64 / n as f64).collect();
    let normalized = normalize_amplitude(&amplitude, Some(21.0), 1.0);
    for v in &normalized {
        assert!((v - 1.0).abs() < 0.03, "{v}");
    }
}

#[test]
fn test_envelope_is_centered_rms() {
    let series = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
    let envelope = sliding_window_envelope(&series, 3.0, 1.0);
    // Interior: window of 3 centered on index 3
    let expected = ((9.0 + 16.0 + 25.0) / 3.0f64).sqrt();
    assert!((envelope[3] - expected).abs() < 1e-12);
}

#[test]
fn test_envelope_truncates_symmetrically_at_edges() {
    let series = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
    let envelope = sliding_window_envelope(&series, 5.0, 1.0);

    // First and last samples are their own envelope
    assert_eq!(envelope[0], 1.0);
    assert_eq!(envelope[6], 7.0);
    // Index 1 gets half-width 1, not a one-sided window
    let expected = ((1.0 + 4.0 + 9.0) / 3.0f64).sqrt();
    assert!((envelope[1] - expected).abs() < 1e-12);
    // Index 2 gets the full half-width 2
    let expected = ((1.0 + 4.0 + 9.0 + 16.0 + 25.0) / 5.0f64).sqrt();
    assert!((envelope[2] - expected).abs() < 1e-12);
}

#[test]
fn test_window_in_time_units() {
    // Window 6 time units at dt = 2 is 3 samples
    let series = [1.0, 2.0, 3.0, 4.0, 5.0];
    let a = sliding_window_envelope(&series, 6.0, 2.0);
    let b = sliding_window_envelope(&series, 3.0, 1.0);
    assert_eq!(a, b);
}

#[test]
fn test_zero_envelope_gives_zero() {
    let amplitude = vec![0.0; 10];
    let normalized = normalize_amplitude(&amplitude, Some(4.0), 1.0);
    assert!(normalized.iter().all(|&v| v == 0.0));
}

#[test]
fn test_tiny_window_is_unit_where_positive() {
    let amplitude = vec![2.0, 0.0, 5.0];
    let normalized = normalize_amplitude(&amplitude, Some(1.0), 1.0);
    assert_eq!(normalized, vec![1.0, 0.0, 1.0]);
}

#[test]
fn test_empty_series() {
    assert!(sliding_window_envelope(&[], 5.0, 1.0).is_empty());
    assert!(normalize_amplitude(&[], Some(5.0), 1.0).is_empty());
}
