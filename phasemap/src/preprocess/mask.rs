//! Validity masks.
//!
//! A sample is valid when its value is at or above the masking threshold.

use common::Buffer3;

use crate::config::Masking;
use crate::error::Error;
use crate::movie::Movie;

/// How a pixel's time series relates to the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelValidity {
    /// Valid at every frame.
    Valid,
    /// Never valid; skipped without a transform.
    Invalid,
    /// Valid at some frames only (dynamic masks).
    Partial,
}

#[derive(Debug, Clone, PartialEq)]
enum Validity {
    All,
    Fixed(Vec<bool>),
    Dynamic(Buffer3<bool>),
}

/// Per-pixel (fixed) or per-sample (dynamic) validity for a movie of a given shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    frames: usize,
    height: usize,
    width: usize,
    validity: Validity,
}

impl Mask {
    /// Everything valid.
    pub fn all(frames: usize, height: usize, width: usize) -> Self {
        Self {
            frames,
            height,
            width,
            validity: Validity::All,
        }
    }

    /// One validity flag per pixel, reused for every frame.
    pub fn fixed(frames: usize, height: usize, width: usize, valid: Vec<bool>) -> Result<Self, Error> {
        if valid.len() != height * width {
            return Err(Error::ShapeMismatch {
                what: "fixed mask",
                expected: (1, height, width),
                actual: (1, valid.len() / width.max(1), width),
            });
        }
        Ok(Self {
            frames,
            height,
            width,
            validity: Validity::Fixed(valid),
        })
    }

    /// One validity flag per sample.
    pub fn dynamic(valid: Buffer3<bool>) -> Self {
        let (frames, height, width) = valid.shape();
        Self {
            frames,
            height,
            width,
            validity: Validity::Dynamic(valid),
        }
    }

    /// Threshold `movie` according to `masking`.
    pub fn from_movie(movie: &Movie, masking: &Masking) -> Result<Self, Error> {
        let (frames, height, width) = movie.shape();
        match *masking {
            Masking::None => Ok(Self::all(frames, height, width)),
            Masking::Fixed { frame, threshold } => {
                if frame >= frames {
                    return Err(Error::invalid(
                        "mask_frame",
                        format!("frame {frame} is outside the movie ({frames} frames)"),
                    ));
                }
                let valid = movie.frame(frame).iter().map(|&v| v >= threshold).collect();
                Self::fixed(frames, height, width, valid)
            }
            Masking::Dynamic { threshold } => {
                let valid = movie.samples().iter().map(|&v| v >= threshold).collect();
                Ok(Self::dynamic(Buffer3::new(width, height, frames, valid)))
            }
        }
    }

    /// Shape in `(t, y, x)` order.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.frames, self.height, self.width)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.validity, Validity::Dynamic(_))
    }

    /// Whether sample `t` of the pixel at in-frame offset `pixel` is valid.
    pub fn is_valid(&self, t: usize, pixel: usize) -> bool {
        match &self.validity {
            Validity::All => true,
            Validity::Fixed(valid) => valid[pixel],
            Validity::Dynamic(valid) => valid.samples()[t * self.width * self.height + pixel],
        }
    }

    /// Validity of every sample of one pixel.
    pub fn series(&self, pixel: usize) -> Vec<bool> {
        (0..self.frames).map(|t| self.is_valid(t, pixel)).collect()
    }

    pub fn pixel_validity(&self, pixel: usize) -> PixelValidity {
        match &self.validity {
            Validity::All => PixelValidity::Valid,
            Validity::Fixed(valid) => {
                if valid[pixel] {
                    PixelValidity::Valid
                } else {
                    PixelValidity::Invalid
                }
            }
            Validity::Dynamic(valid) => {
                let valid_count = valid.series(pixel).filter(|&&v| v).count();
                if valid_count == self.frames {
                    PixelValidity::Valid
                } else if valid_count == 0 {
                    PixelValidity::Invalid
                } else {
                    PixelValidity::Partial
                }
            }
        }
    }

    /// Check that the mask fits a movie of shape `(t, y, x)`.
    pub fn check_shape(&self, shape: (usize, usize, usize)) -> Result<(), Error> {
        if self.shape() != shape {
            return Err(Error::ShapeMismatch {
                what: "mask",
                expected: shape,
                actual: self.shape(),
            });
        }
        Ok(())
    }
}
