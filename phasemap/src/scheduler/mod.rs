//! Fan-out of per-pixel work over a bounded worker pool.
//!
//! Masks are resolved before any work is scheduled: invalid pixels never reach a
//! worker. The remaining pixels are split into `workers * CHUNKS_PER_THREAD` chunks,
//! each processed end-to-end (gap fill, detrend, transform, normalize) with worker-local
//! buffers. Chunks fill their own [`PixelBlock`], which is merged by pixel index as
//! soon as the chunk finishes, so the output is identical for any worker count.


use std::sync::atomic::{AtomicUsize, Ordering};

use common::parallel::chunk_size;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::config::GapFill;
use crate::detrend::{detrend, Detrender};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, PixelError};
use crate::movie::Movie;
use crate::normalize::normalize_amplitude;
use crate::output::{OutputVolumes, PixelBlock};
use crate::preprocess::{Mask, PixelValidity};
use crate::progress::{report_progress, ProgressCallback, ProgressStage};
use crate::wavelet::{is_constant, RidgeResult, WaveletAnalyzer, Workspace};

/// A pixel that needs a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelTask {
    /// In-frame offset `y * width + x`.
    pub pixel: usize,
    /// Whether some samples are masked (dynamic masks only).
    pub partial: bool,
}

/// Pixels to transform, in scan order, and the number of pixels skipped as invalid.
pub fn collect_tasks(mask: &Mask) -> (Vec<PixelTask>, usize) {
    let (_, height, width) = mask.shape();
    let mut tasks = Vec::with_capacity(height * width);
    let mut masked = 0;
    for pixel in 0..height * width {
        match mask.pixel_validity(pixel) {
            PixelValidity::Valid => tasks.push(PixelTask {
                pixel,
                partial: false,
            }),
            PixelValidity::Partial => tasks.push(PixelTask {
                pixel,
                partial: true,
            }),
            PixelValidity::Invalid => masked += 1,
        }
    }
    (tasks, masked)
}

/// Number of worker threads to use for `requested`, capped to the available parallelism.
pub fn resolve_workers(requested: usize, diagnostics: &mut Diagnostics) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    if requested > available {
        diagnostics.warn(Warning::WorkersCapped {
            requested,
            available,
        });
        available
    } else {
        requested.max(1)
    }
}

/// Replace masked samples of a partially valid series as `policy` dictates.
///
/// A series with no valid sample is returned unchanged.
pub fn fill_gaps(series: &[f64], valid: &[bool], policy: GapFill) -> Vec<f64> {
    assert_eq!(series.len(), valid.len(), "Mask length mismatch");

    let Some(first_valid) = valid.iter().position(|&v| v) else {
        return series.to_vec();
    };

    match policy {
        GapFill::HoldLast => {
            let mut last = series[first_valid];
            series
                .iter()
                .zip(valid)
                .map(|(&x, &ok)| {
                    if ok {
                        last = x;
                    }
                    last
                })
                .collect()
        }
        GapFill::ValidMean => {
            let mut sum = 0.0;
            let mut count = 0usize;
            for (&x, &ok) in series.iter().zip(valid) {
                if ok {
                    sum += x;
                    count += 1;
                }
            }
            let mean = sum / count as f64;
            series
                .iter()
                .zip(valid)
                .map(|(&x, &ok)| if ok { x } else { mean })
                .collect()
        }
    }
}

/// Read-only per-pixel stages shared by every worker.
pub struct PixelPipeline<'a> {
    pub analyzer: &'a WaveletAnalyzer,
    pub detrender: Option<&'a Detrender>,
    /// Amplitude normalization window in time units.
    pub window_size: Option<f64>,
    pub gap_fill: GapFill,
}

impl PixelPipeline<'_> {
    /// Run gap fill, detrending, the transform and normalization on one series.
    ///
    /// With `valid` given, masked samples are filled before the transform and set to
    /// `NaN` in the result.
    pub fn run(
        &self,
        series: &[f64],
        valid: Option<&[bool]>,
        workspace: &mut Workspace,
    ) -> Result<RidgeResult, PixelError> {
        let signal = match valid {
            Some(valid) => fill_gaps(series, valid, self.gap_fill),
            None => series.to_vec(),
        };

        if let Some(sample) = signal.iter().position(|x| !x.is_finite()) {
            return Err(PixelError::NonFiniteInput { sample });
        }

        // Checked before detrending, which can turn a constant into rounding noise
        let mut result = if is_constant(&signal) {
            RidgeResult::degenerate(signal.len())
        } else {
            let detrended = detrend(&signal, self.detrender);
            let mut result = self.analyzer.analyze_with(&detrended, workspace)?;
            result.amplitude =
                normalize_amplitude(&result.amplitude, self.window_size, self.analyzer.dt());
            result
        };

        if let Some(valid) = valid {
            result.mask_samples(valid);
        }
        Ok(result)
    }
}

/// Counts gathered while scheduling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    pub transformed: usize,
    pub degenerate: usize,
    pub failed: usize,
}

/// Transform every task on a pool of `workers` threads and merge the results into
/// `volumes`.
///
/// Pixel-local failures leave the pixel sentinel-filled and are counted; only a
/// failure to build the pool aborts.
pub fn schedule(
    movie: &Movie,
    mask: &Mask,
    tasks: &[PixelTask],
    pipeline: &PixelPipeline<'_>,
    workers: usize,
    progress: &ProgressCallback,
    volumes: &mut OutputVolumes,
) -> Result<ScheduleStats, Error> {
    mask.check_shape(movie.shape())?;
    if volumes.shape() != movie.shape() {
        return Err(Error::ShapeMismatch {
            what: "output volumes",
            expected: movie.shape(),
            actual: volumes.shape(),
        });
    }

    if tasks.is_empty() {
        return Ok(ScheduleStats::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("phasemap-worker-{i}"))
        .build()?;

    let chunk = chunk_size(tasks.len(), workers);
    let n_chunks = tasks.len().div_ceil(chunk);
    let done = AtomicUsize::new(0);
    tracing::debug!(
        "Scheduling {} pixels in {n_chunks} chunks on {workers} workers",
        tasks.len()
    );

    // Blocks are merged as soon as their chunk finishes, so at most one block per
    // worker is alive at a time.
    let merged = Mutex::new((volumes, ScheduleStats::default()));
    pool.install(|| {
        tasks.par_chunks(chunk).for_each_init(
            || pipeline.analyzer.workspace(),
            |workspace, chunk_tasks| {
                let (block, chunk_stats) =
                    process_chunk(movie, mask, chunk_tasks, pipeline, workspace);
                {
                    let mut merged = merged.lock();
                    let (volumes, stats) = &mut *merged;
                    volumes.merge(&block);
                    stats.transformed += chunk_stats.transformed;
                    stats.degenerate += chunk_stats.degenerate;
                    stats.failed += chunk_stats.failed;
                }
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                report_progress(progress, finished, n_chunks, ProgressStage::Transforming);
            },
        );
    });

    let (_, stats) = merged.into_inner();
    Ok(stats)
}

fn process_chunk(
    movie: &Movie,
    mask: &Mask,
    tasks: &[PixelTask],
    pipeline: &PixelPipeline<'_>,
    workspace: &mut Workspace,
) -> (PixelBlock, ScheduleStats) {
    let mut block = PixelBlock::new(movie.frames(), tasks.len());
    let mut stats = ScheduleStats::default();

    for task in tasks {
        let series = movie.series(task.pixel);
        let valid = task.partial.then(|| mask.series(task.pixel));

        stats.transformed += 1;
        match pipeline.run(&series, valid.as_deref(), workspace) {
            Ok(result) => {
                if result.is_degenerate() {
                    stats.degenerate += 1;
                }
                block.push(task.pixel, &result);
            }
            Err(err) => {
                tracing::debug!("Pixel {} failed: {err}", task.pixel);
                stats.failed += 1;
                block.push_sentinel(task.pixel);
            }
        }
    }

    (block, stats)
}
