//! Non-fatal warnings and the per-run summary handed back to the caller.

use std::fmt;

/// A condition worth reporting that does not stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Shortest period is below the Nyquist limit `2 * dt`.
    BelowNyquist { t_min: f64, nyquist: f64 },
    /// Detrending cut-off would remove a large part of the analysed band.
    CutoffBelowPeriodRange { t_cutoff: f64, t_max: f64 },
    /// More workers were requested than the machine can run in parallel.
    WorkersCapped { requested: usize, available: usize },
    /// Normalization window spans more than the whole series.
    WindowExceedsSeries { window_size: f64, duration: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::BelowNyquist { t_min, nyquist } => write!(
                f,
                "Smallest period {t_min} is below the Nyquist limit {nyquist}"
            ),
            Warning::CutoffBelowPeriodRange { t_cutoff, t_max } => write!(
                f,
                "Detrending cut-off {t_cutoff} is below twice the largest period {t_max}, \
                 oscillations in the analysed range will be damped"
            ),
            Warning::WorkersCapped {
                requested,
                available,
            } => write!(
                f,
                "Requested {requested} workers but only {available} available, using {available}"
            ),
            Warning::WindowExceedsSeries {
                window_size,
                duration,
            } => write!(
                f,
                "Normalization window {window_size} is longer than the series duration {duration}"
            ),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub warnings: Vec<Warning>,
    /// Pixels in the (rescaled) frame.
    pub total_pixels: usize,
    /// Pixels skipped because they are invalid at every frame.
    pub masked_pixels: usize,
    /// Pixels that went through the transform.
    pub transformed_pixels: usize,
    /// Transformed pixels with a constant series (no ridge).
    pub degenerate_pixels: usize,
    /// Transformed pixels whose computation failed and were sentinel-filled.
    pub failed_pixels: usize,
}

impl Diagnostics {
    pub(crate) fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn succeeded_pixels(&self) -> usize {
        self.transformed_pixels - self.failed_pixels
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pixels: {} transformed ({} degenerate, {} failed), {} masked",
            self.total_pixels,
            self.transformed_pixels,
            self.degenerate_pixels,
            self.failed_pixels,
            self.masked_pixels
        )?;
        for warning in &self.warnings {
            write!(f, "\nwarning: {warning}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_messages() {
        let w = Warning::BelowNyquist {
            t_min: 1.0,
            nyquist: 2.0,
        };
        assert!(w.to_string().contains("Nyquist"));

        let w = Warning::WorkersCapped {
            requested: 64,
            available: 4,
        };
        let msg = w.to_string();
        assert!(msg.contains("64"));
        assert!(msg.contains("4"));
    }

    #[test]
    fn test_summary_lists_counts_and_warnings() {
        let mut diagnostics = Diagnostics {
            total_pixels: 25,
            masked_pixels: 5,
            transformed_pixels: 20,
            degenerate_pixels: 2,
            failed_pixels: 1,
            ..Default::default()
        };
        diagnostics.warn(Warning::CutoffBelowPeriodRange {
            t_cutoff: 10.0,
            t_max: 8.0,
        });

        let text = diagnostics.to_string();
        assert!(text.starts_with("25 pixels: 20 transformed (2 degenerate, 1 failed), 5 masked"));
        assert!(text.contains("warning: Detrending cut-off 10"));
        assert_eq!(diagnostics.succeeded_pixels(), 19);
    }
}
