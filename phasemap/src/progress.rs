//! Progress reporting for long runs.

use common::SharedFn;

/// Progress information for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Completed steps of the current stage.
    pub current: usize,
    /// Total steps of the current stage.
    pub total: usize,
    pub stage: ProgressStage,
}

impl Progress {
    /// Completion of the current stage in percent.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            100.0 * self.current as f64 / self.total as f64
        }
    }
}

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    /// Smoothing, rescaling and masking. One step.
    Preprocessing,
    /// Per-pixel transforms, reported once per finished chunk of pixels.
    Transforming,
}

/// Callback type for progress reporting.
pub type ProgressCallback = SharedFn<dyn Fn(Progress) + Send + Sync>;

/// Report progress using the callback if set.
pub fn report_progress(
    callback: &ProgressCallback,
    current: usize,
    total: usize,
    stage: ProgressStage,
) {
    if let Some(f) = callback.get() {
        f(Progress {
            current,
            total,
            stage,
        });
    }
}
