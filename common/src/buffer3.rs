use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice;

/// Dense 3-D buffer stored frame-major: `(x, y, t)` lives at
/// `(t * height + y) * width + x`, the same order as a `(t, y, x)` array.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer3<T> {
    samples: Vec<T>,
    width: usize,
    height: usize,
    frames: usize,
}

impl<T> Buffer3<T> {
    pub fn new(width: usize, height: usize, frames: usize, samples: Vec<T>) -> Self {
        assert_eq!(
            samples.len(),
            width * height * frames,
            "samples length must equal width * height * frames"
        );
        Self {
            samples,
            width,
            height,
            frames,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Shape in `(t, y, x)` order.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.frames, self.height, self.width)
    }

    /// Number of samples in a single frame.
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, t: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && t < self.frames);
        (t * self.height + y) * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, t: usize) -> &T {
        &self.samples[self.index(x, y, t)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize, t: usize) -> &mut T {
        let idx = self.index(x, y, t);
        &mut self.samples[idx]
    }

    #[inline]
    pub fn frame(&self, t: usize) -> &[T] {
        let len = self.frame_len();
        &self.samples[t * len..(t + 1) * len]
    }

    #[inline]
    pub fn frame_mut(&mut self, t: usize) -> &mut [T] {
        let len = self.frame_len();
        &mut self.samples[t * len..(t + 1) * len]
    }

    /// Iterates the samples of one pixel through time.
    ///
    /// `pixel` is the in-frame offset `y * width + x`.
    pub fn series(&self, pixel: usize) -> impl ExactSizeIterator<Item = &T> + '_ {
        assert!(pixel < self.frame_len(), "pixel index out of range");
        self.samples.iter().skip(pixel).step_by(self.frame_len())
    }

    #[inline]
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    #[inline]
    pub fn samples_mut(&mut self) -> &mut [T] {
        &mut self.samples
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.samples
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.samples.iter()
    }
}

impl<T: Clone> Buffer3<T> {
    pub fn new_filled(width: usize, height: usize, frames: usize, value: T) -> Self {
        Self {
            samples: vec![value; width * height * frames],
            width,
            height,
            frames,
        }
    }

    /// Like [`Buffer3::new_filled`] but reports allocation failure instead of aborting.
    pub fn try_new_filled(
        width: usize,
        height: usize,
        frames: usize,
        value: T,
    ) -> Result<Self, std::collections::TryReserveError> {
        let len = width * height * frames;
        let mut samples = Vec::new();
        samples.try_reserve_exact(len)?;
        samples.resize(len, value);
        Ok(Self {
            samples,
            width,
            height,
            frames,
        })
    }

    /// Writes `values` into the time series of `pixel`.
    pub fn set_series(&mut self, pixel: usize, values: &[T]) {
        assert!(pixel < self.frame_len(), "pixel index out of range");
        assert_eq!(values.len(), self.frames, "series length must equal frames");
        let stride = self.frame_len();
        for (t, value) in values.iter().enumerate() {
            self.samples[t * stride + pixel] = value.clone();
        }
    }
}

impl<T> Index<(usize, usize, usize)> for Buffer3<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y, t): (usize, usize, usize)) -> &Self::Output {
        self.get(x, y, t)
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Buffer3<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, t): (usize, usize, usize)) -> &mut Self::Output {
        self.get_mut(x, y, t)
    }
}

impl<T> Deref for Buffer3<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.samples
    }
}

impl<T> DerefMut for Buffer3<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.samples
    }
}
