//! Log-spaced period grid.

use crate::error::Error;

/// Strictly increasing periods from `t_min` to `t_max`, geometrically spaced.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodGrid {
    periods: Vec<f64>,
}

impl PeriodGrid {
    /// `n` periods with a constant ratio between neighbors.
    ///
    /// The first entry is exactly `t_min`, the last exactly `t_max`. A single-entry
    /// grid holds only `t_min`.
    pub fn new(t_min: f64, t_max: f64, n: usize) -> Result<Self, Error> {
        if !(t_min.is_finite() && t_min > 0.0) {
            return Err(Error::invalid("t_min", format!("must be positive, got {t_min}")));
        }
        if !(t_max.is_finite() && t_max > t_min) {
            return Err(Error::invalid(
                "t_max",
                format!("must be larger than t_min, got {t_max} <= {t_min}"),
            ));
        }
        if n == 0 {
            return Err(Error::invalid("n_periods", "must be at least 1"));
        }

        if n == 1 {
            return Ok(Self {
                periods: vec![t_min],
            });
        }

        let log_ratio = (t_max / t_min).ln();
        let mut periods: Vec<f64> = (0..n)
            .map(|i| t_min * (log_ratio * i as f64 / (n - 1) as f64).exp())
            .collect();
        periods[0] = t_min;
        periods[n - 1] = t_max;

        Ok(Self { periods })
    }

    #[inline]
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    #[inline]
    pub fn t_min(&self) -> f64 {
        self.periods[0]
    }

    #[inline]
    pub fn t_max(&self) -> f64 {
        self.periods[self.periods.len() - 1]
    }

    /// Whether `period` is one of the grid values (to a relative tolerance).
    pub fn contains(&self, period: f64) -> bool {
        self.periods
            .iter()
            .any(|&p| (p - period).abs() <= 1e-9 * p.abs().max(1.0))
    }
}
