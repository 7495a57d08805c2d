//! Spatial preprocessing: smoothing, downscaling and masking.
//!
//! Smoothing always precedes downscaling. The mask is computed on the result, so it
//! matches the spatial extent of the movie handed to the transform.


pub mod gaussian;
pub mod mask;
pub mod rescale;

use crate::config::Config;
use crate::error::Error;
use crate::movie::Movie;

pub use gaussian::{gaussian_blur, gaussian_kernel_1d};
pub use mask::{Mask, PixelValidity};
pub use rescale::{rescale, scaled_extent};

/// Preprocessed movie and the mask that applies to it.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub movie: Movie,
    pub mask: Mask,
}

/// Smooth, rescale and mask `movie` as configured.
///
/// With smoothing and rescaling disabled the returned movie equals the input.
pub fn preprocess(movie: &Movie, config: &Config) -> Result<Preprocessed, Error> {
    let (frames, height, width) = movie.shape();
    if movie.samples().is_empty() {
        return Err(Error::EmptyMovie {
            frames,
            height,
            width,
        });
    }

    let smoothed = match config.smoothing_sigma() {
        Some(sigma) => {
            tracing::debug!("Smoothing {frames} frames with sigma {sigma}");
            gaussian_blur(movie, sigma)
        }
        None => movie.clone(),
    };

    let scaled = match config.rescale() {
        Some(percent) => {
            let scaled = rescale(&smoothed, percent);
            tracing::info!(
                "Rescaled frames from {}x{} to {}x{}",
                width,
                height,
                scaled.width(),
                scaled.height()
            );
            scaled
        }
        None => smoothed,
    };

    let mask = Mask::from_movie(&scaled, &config.masking)?;

    Ok(Preprocessed {
        movie: scaled,
        mask,
    })
}
