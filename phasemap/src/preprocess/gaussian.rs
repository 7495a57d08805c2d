//! Spatial Gaussian smoothing of movie frames.
//!
//! Separable convolution: rows first, then columns, O(n×k) per frame instead of
//! O(n×k²). Frames are independent and processed in parallel. Time is never mixed.

use common::Buffer3;
use rayon::prelude::*;

use crate::movie::Movie;

/// Kernel half-width in units of sigma.
pub const TRUNCATE: f32 = 4.0;

/// Compute 1D Gaussian kernel.
///
/// The kernel is normalized so that it sums to 1.0.
/// Kernel radius is `ceil(TRUNCATE * sigma)`.
///
/// # Panics
/// Panics if `sigma` is not positive.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    assert!(sigma > 0.0, "Sigma must be positive");

    let radius = (TRUNCATE * sigma).ceil() as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];

    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        let value = (-x * x / two_sigma_sq).exp();
        *k = value;
        sum += value;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Reflect an out-of-range index back into `0..len` without repeating the edge sample.
///
/// Works for offsets of any size, so kernels wider than the frame are fine.
#[inline]
pub(crate) fn mirror_index(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let m = i.rem_euclid(period);
    if m >= len as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Smooth a single `width × height` frame.
pub fn gaussian_blur_frame(pixels: &[f32], width: usize, height: usize, sigma: f32) -> Vec<f32> {
    assert_eq!(pixels.len(), width * height, "Pixel count mismatch");

    let kernel = gaussian_kernel_1d(sigma);
    let radius = kernel.len() / 2;

    let mut temp = vec![0.0f32; width * height];
    for (in_row, out_row) in pixels.chunks_exact(width).zip(temp.chunks_exact_mut(width)) {
        convolve_row(in_row, out_row, &kernel, radius);
    }

    let mut output = vec![0.0f32; width * height];
    convolve_cols(&temp, &mut output, width, height, &kernel, radius);
    output
}

/// Smooth every frame of `movie` with an isotropic Gaussian of `sigma` pixels.
pub fn gaussian_blur(movie: &Movie, sigma: f32) -> Movie {
    let (frames, height, width) = movie.shape();
    let frame_len = width * height;
    let mut samples = vec![0.0f32; movie.samples().len()];

    samples
        .par_chunks_mut(frame_len.max(1))
        .zip(movie.samples().par_chunks(frame_len.max(1)))
        .for_each(|(out_frame, in_frame)| {
            out_frame.copy_from_slice(&gaussian_blur_frame(in_frame, width, height, sigma));
        });

    Movie::from_buffer(Buffer3::new(width, height, frames, samples))
}

#[inline]
fn convolve_row(input: &[f32], output: &mut [f32], kernel: &[f32], radius: usize) {
    let width = input.len();

    for (x, out) in output.iter_mut().enumerate() {
        let mut sum = 0.0f32;
        for (k, &kval) in kernel.iter().enumerate() {
            let sx = mirror_index(x as isize + k as isize - radius as isize, width);
            sum += input[sx] * kval;
        }
        *out = sum;
    }
}

fn convolve_cols(
    input: &[f32],
    output: &mut [f32],
    width: usize,
    height: usize,
    kernel: &[f32],
    radius: usize,
) {
    for (y, out_row) in output.chunks_exact_mut(width).enumerate() {
        for (k, &kval) in kernel.iter().enumerate() {
            let sy = mirror_index(y as isize + k as isize - radius as isize, height);
            let in_row = &input[sy * width..(sy + 1) * width];
            for (out, &v) in out_row.iter_mut().zip(in_row) {
                *out += v * kval;
            }
        }
    }
}
