//! Time-lapse image stack.

use common::Buffer3;

use crate::error::Error;

/// A `(t, y, x)` stack of `f32` samples with uniform time sampling.
///
/// Never mutated by the pipeline; every stage produces a new movie.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    data: Buffer3<f32>,
}

impl Movie {
    /// Wrap `samples` laid out in `(t, y, x)` scan order.
    pub fn new(frames: usize, height: usize, width: usize, samples: Vec<f32>) -> Result<Self, Error> {
        let expected = frames * height * width;
        if samples.len() != expected {
            return Err(Error::ShapeMismatch {
                what: "movie samples",
                expected: (frames, height, width),
                actual: (samples.len() / (height * width).max(1), height, width),
            });
        }
        Ok(Self {
            data: Buffer3::new(width, height, frames, samples),
        })
    }

    /// Movie of identical frames filled with `value`.
    pub fn filled(frames: usize, height: usize, width: usize, value: f32) -> Self {
        Self {
            data: Buffer3::new_filled(width, height, frames, value),
        }
    }

    /// Build a movie by evaluating `f(t, y, x)` for every sample.
    pub fn from_fn(
        frames: usize,
        height: usize,
        width: usize,
        mut f: impl FnMut(usize, usize, usize) -> f32,
    ) -> Self {
        let mut samples = Vec::with_capacity(frames * height * width);
        for t in 0..frames {
            for y in 0..height {
                for x in 0..width {
                    samples.push(f(t, y, x));
                }
            }
        }
        Self {
            data: Buffer3::new(width, height, frames, samples),
        }
    }

    pub(crate) fn from_buffer(data: Buffer3<f32>) -> Self {
        Self { data }
    }

    /// Shape in `(t, y, x)` order.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.shape()
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.data.frames()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.height()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.width()
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.data.frame_len()
    }

    #[inline]
    pub fn frame(&self, t: usize) -> &[f32] {
        self.data.frame(t)
    }

    #[inline]
    pub fn get(&self, t: usize, y: usize, x: usize) -> f32 {
        *self.data.get(x, y, t)
    }

    /// Time series of the pixel at in-frame offset `pixel`, widened to `f64`.
    pub fn series(&self, pixel: usize) -> Vec<f64> {
        self.data.series(pixel).map(|&v| v as f64).collect()
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        self.data.samples()
    }

    #[inline]
    pub fn buffer(&self) -> &Buffer3<f32> {
        &self.data
    }
}
