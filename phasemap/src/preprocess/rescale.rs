//! Spatial downscaling of movie frames.

use common::Buffer3;
use rayon::prelude::*;

use super::gaussian::gaussian_blur_frame;
use crate::movie::Movie;

/// Output extent of a `dim`-pixel axis scaled to `percent` percent.
///
/// Rounds half up, never below one pixel: 100 at 50% is exactly 50.
#[inline]
pub fn scaled_extent(dim: usize, percent: u32) -> usize {
    ((dim * percent as usize + 50) / 100).max(1)
}

/// Anti-aliasing sigma used before sampling at `percent` percent.
#[inline]
pub fn antialias_sigma(percent: u32) -> f32 {
    ((100.0 / percent as f32) - 1.0) / 2.0
}

/// Downscale one frame; returns the pixels and the new `(width, height)`.
pub fn rescale_frame(
    pixels: &[f32],
    width: usize,
    height: usize,
    percent: u32,
) -> (Vec<f32>, usize, usize) {
    assert!((1..100).contains(&percent), "Percent must be within 1-99");
    assert_eq!(pixels.len(), width * height, "Pixel count mismatch");

    let out_width = scaled_extent(width, percent);
    let out_height = scaled_extent(height, percent);

    let sigma = antialias_sigma(percent);
    let smoothed = gaussian_blur_frame(pixels, width, height, sigma);

    let scale_x = width as f32 / out_width as f32;
    let scale_y = height as f32 / out_height as f32;

    let mut output = Vec::with_capacity(out_width * out_height);
    for oy in 0..out_height {
        let sy = (oy as f32 + 0.5) * scale_y - 0.5;
        for ox in 0..out_width {
            let sx = (ox as f32 + 0.5) * scale_x - 0.5;
            output.push(interpolate_bilinear(&smoothed, width, height, sx, sy));
        }
    }

    (output, out_width, out_height)
}

/// Downscale every frame of `movie` to `percent` percent in both axes.
pub fn rescale(movie: &Movie, percent: u32) -> Movie {
    let (frames, height, width) = movie.shape();
    let out_width = scaled_extent(width, percent);
    let out_height = scaled_extent(height, percent);

    let scaled: Vec<Vec<f32>> = (0..frames)
        .into_par_iter()
        .map(|t| rescale_frame(movie.frame(t), width, height, percent).0)
        .collect();

    Movie::from_buffer(Buffer3::new(
        out_width,
        out_height,
        frames,
        scaled.concat(),
    ))
}

/// Sample a pixel, clamping coordinates to the frame.
#[inline]
fn sample_pixel(data: &[f32], width: usize, height: usize, x: i32, y: i32) -> f32 {
    let x = x.clamp(0, width as i32 - 1) as usize;
    let y = y.clamp(0, height as i32 - 1) as usize;
    data[y * width + x]
}

#[inline]
fn interpolate_bilinear(data: &[f32], width: usize, height: usize, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = sample_pixel(data, width, height, x0, y0);
    let p10 = sample_pixel(data, width, height, x1, y0);
    let p01 = sample_pixel(data, width, height, x0, y1);
    let p11 = sample_pixel(data, width, height, x1, y1);

    let top = p00 + fx * (p10 - p00);
    let bottom = p01 + fx * (p11 - p01);

    top + fy * (bottom - top)
}
