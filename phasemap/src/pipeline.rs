//! End-to-end run: preprocess, transform every valid pixel, assemble the volumes.

use crate::config::Config;
use crate::detrend::Detrender;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Error;
use crate::movie::Movie;
use crate::output::OutputVolumes;
use crate::preprocess::preprocess;
use crate::progress::{report_progress, ProgressCallback, ProgressStage};
use crate::scheduler::{collect_tasks, resolve_workers, schedule, PixelPipeline};
use crate::wavelet::{PeriodGrid, WaveletAnalyzer};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub volumes: OutputVolumes,
    pub diagnostics: Diagnostics,
    /// The period grid the ridge periods are drawn from.
    pub periods: Vec<f64>,
}

/// Run the whole pipeline on `movie`.
///
/// Configuration and resource errors abort before any output exists. Pixel-local
/// numerical failures only show up in [`Diagnostics::failed_pixels`].
pub fn process(movie: &Movie, config: &Config) -> Result<Analysis, Error> {
    process_with_progress(movie, config, &ProgressCallback::default())
}

/// Like [`process`], reporting progress through `progress`.
pub fn process_with_progress(
    movie: &Movie,
    config: &Config,
    progress: &ProgressCallback,
) -> Result<Analysis, Error> {
    config.validate()?;
    let grid = PeriodGrid::new(config.t_min, config.t_max, config.n_periods)?;

    let mut diagnostics = Diagnostics::default();
    for warning in config.warnings() {
        diagnostics.warn(warning);
    }

    let (frames, height, width) = movie.shape();
    tracing::info!(
        "Processing {frames} frames of {width}x{height}, {} periods from {} to {}",
        config.n_periods,
        config.t_min,
        config.t_max
    );

    report_progress(progress, 0, 1, ProgressStage::Preprocessing);
    let prepared = preprocess(movie, config)?;
    report_progress(progress, 1, 1, ProgressStage::Preprocessing);

    let movie = &prepared.movie;
    let (frames, height, width) = movie.shape();

    if let Some(window_size) = config.window_size {
        let duration = frames as f64 * config.dt;
        if window_size > duration {
            diagnostics.warn(Warning::WindowExceedsSeries {
                window_size,
                duration,
            });
        }
    }

    let workers = resolve_workers(config.workers, &mut diagnostics);
    let mut volumes = OutputVolumes::allocate(frames, height, width)?;

    let analyzer = WaveletAnalyzer::new(grid, config.dt, frames);
    let detrender = config
        .t_cutoff
        .map(|t_cutoff| Detrender::new(t_cutoff, config.dt, frames));
    let pipeline = PixelPipeline {
        analyzer: &analyzer,
        detrender: detrender.as_ref(),
        window_size: config.window_size,
        gap_fill: config.gap_fill,
    };

    let (tasks, masked) = collect_tasks(&prepared.mask);
    diagnostics.total_pixels = height * width;
    diagnostics.masked_pixels = masked;
    tracing::info!(
        "Transforming {} pixels ({masked} masked) on {workers} workers",
        tasks.len()
    );

    let stats = schedule(
        movie,
        &prepared.mask,
        &tasks,
        &pipeline,
        workers,
        progress,
        &mut volumes,
    )?;
    diagnostics.transformed_pixels = stats.transformed;
    diagnostics.degenerate_pixels = stats.degenerate;
    diagnostics.failed_pixels = stats.failed;

    tracing::info!(
        "Done: {} of {} pixels transformed, {} degenerate, {} failed",
        stats.transformed,
        diagnostics.total_pixels,
        stats.degenerate,
        stats.failed
    );

    Ok(Analysis {
        volumes,
        diagnostics,
        periods: analyzer.periods().to_vec(),
    })
}
