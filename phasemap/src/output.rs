//! Output volumes and their assembly from per-pixel results.
//!
//! Workers never touch the volumes directly. Each chunk of pixels fills its own
//! [`PixelBlock`], and each block is merged by pixel index when its chunk is done,
//! so the result does not depend on completion order.

use common::Buffer3;

use crate::error::Error;
use crate::wavelet::RidgeResult;

/// Value marking masked or failed samples in every output volume.
pub const SENTINEL: f32 = f32::NAN;

/// Whether `value` is the sentinel.
#[inline]
pub fn is_sentinel(value: f32) -> bool {
    value.is_nan()
}

/// Narrow a phase in `(-pi, pi]` to `f32`, keeping it inside the same interval.
///
/// Values just above `-pi` in `f64` round onto `-pi` in `f32`; those map to `pi`.
#[inline]
pub fn narrow_phase(phase: f64) -> f32 {
    let narrowed = phase as f32;
    if narrowed <= -std::f32::consts::PI {
        std::f32::consts::PI
    } else {
        narrowed
    }
}

/// Phase, period, power and amplitude volumes of identical `(t, y, x)` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputVolumes {
    phase: Buffer3<f32>,
    period: Buffer3<f32>,
    power: Buffer3<f32>,
    amplitude: Buffer3<f32>,
}

impl OutputVolumes {
    /// Four sentinel-filled volumes.
    ///
    /// Fails with [`Error::Allocation`] instead of aborting if memory runs out.
    pub fn allocate(frames: usize, height: usize, width: usize) -> Result<Self, Error> {
        let bytes = frames * height * width * std::mem::size_of::<f32>();
        let volume = || {
            Buffer3::try_new_filled(width, height, frames, SENTINEL).map_err(|_| {
                Error::Allocation {
                    what: "output volume",
                    bytes,
                }
            })
        };
        Ok(Self {
            phase: volume()?,
            period: volume()?,
            power: volume()?,
            amplitude: volume()?,
        })
    }

    /// Shape in `(t, y, x)` order.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.phase.shape()
    }

    /// Copy every pixel of `block` into place.
    pub fn merge(&mut self, block: &PixelBlock) {
        assert_eq!(block.frames, self.phase.frames(), "Block length mismatch");
        let frames = block.frames;
        for (i, &pixel) in block.pixels.iter().enumerate() {
            let range = i * frames..(i + 1) * frames;
            self.phase.set_series(pixel, &block.phase[range.clone()]);
            self.period.set_series(pixel, &block.period[range.clone()]);
            self.power.set_series(pixel, &block.power[range.clone()]);
            self.amplitude.set_series(pixel, &block.amplitude[range]);
        }
    }

    pub fn phase(&self) -> &Buffer3<f32> {
        &self.phase
    }

    pub fn period(&self) -> &Buffer3<f32> {
        &self.period
    }

    pub fn power(&self) -> &Buffer3<f32> {
        &self.power
    }

    pub fn amplitude(&self) -> &Buffer3<f32> {
        &self.amplitude
    }

    /// Volumes as `(phase, period, power, amplitude)` sample vectors in `(t, y, x)` order.
    pub fn into_parts(self) -> (Vec<f32>, Vec<f32>, Vec<f32>, Vec<f32>) {
        (
            self.phase.into_vec(),
            self.period.into_vec(),
            self.power.into_vec(),
            self.amplitude.into_vec(),
        )
    }
}

/// Chunk-local results, pixel-major, narrowed to the output sample type.
#[derive(Debug, Clone)]
pub struct PixelBlock {
    frames: usize,
    pixels: Vec<usize>,
    phase: Vec<f32>,
    period: Vec<f32>,
    power: Vec<f32>,
    amplitude: Vec<f32>,
}

impl PixelBlock {
    pub fn new(frames: usize, capacity: usize) -> Self {
        let len = frames * capacity;
        Self {
            frames,
            pixels: Vec::with_capacity(capacity),
            phase: Vec::with_capacity(len),
            period: Vec::with_capacity(len),
            power: Vec::with_capacity(len),
            amplitude: Vec::with_capacity(len),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[usize] {
        &self.pixels
    }

    pub fn push(&mut self, pixel: usize, result: &RidgeResult) {
        assert_eq!(result.len(), self.frames, "Result length mismatch");
        self.pixels.push(pixel);
        self.phase.extend(result.phase.iter().map(|&v| narrow_phase(v)));
        self.period.extend(result.period.iter().map(|&v| v as f32));
        self.power.extend(result.power.iter().map(|&v| v as f32));
        self.amplitude.extend(result.amplitude.iter().map(|&v| v as f32));
    }

    /// Record `pixel` as sentinel-filled.
    pub fn push_sentinel(&mut self, pixel: usize) {
        self.pixels.push(pixel);
        let len = self.phase.len() + self.frames;
        for series in [
            &mut self.phase,
            &mut self.period,
            &mut self.power,
            &mut self.amplitude,
        ] {
            series.resize(len, SENTINEL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(phase: f64, period: f64, power: f64, amplitude: f64, n: usize) -> RidgeResult {
        RidgeResult {
            phase: vec![phase; n],
            period: vec![period; n],
            power: vec![power; n],
            amplitude: vec![amplitude; n],
        }
    }

    #[test]
    fn test_allocate_is_sentinel_filled() {
        let volumes = OutputVolumes::allocate(3, 2, 4).unwrap();
        assert_eq!(volumes.shape(), (3, 2, 4));
        for volume in [
            volumes.phase(),
            volumes.period(),
            volumes.power(),
            volumes.amplitude(),
        ] {
            assert_eq!(volume.shape(), (3, 2, 4));
            assert!(volume.iter().all(|&v| is_sentinel(v)));
        }
    }

    #[test]
    fn test_merge_places_series_in_scan_order() {
        let mut volumes = OutputVolumes::allocate(2, 2, 3).unwrap();
        let mut block = PixelBlock::new(2, 1);
        // pixel (x=2, y=1)
        block.push(
            5,
            &RidgeResult {
                phase: vec![0.5, -0.5],
                period: vec![4.0, 8.0],
                power: vec![1.0, 2.0],
                amplitude: vec![0.25, 0.75],
            },
        );
        volumes.merge(&block);

        assert_eq!(*volumes.phase().get(2, 1, 0), 0.5);
        assert_eq!(*volumes.phase().get(2, 1, 1), -0.5);
        assert_eq!(*volumes.period().get(2, 1, 1), 8.0);
        assert_eq!(*volumes.power().get(2, 1, 0), 1.0);
        assert_eq!(*volumes.amplitude().get(2, 1, 1), 0.75);
        // Other pixels untouched
        assert!(is_sentinel(*volumes.power().get(1, 1, 0)));
        assert!(is_sentinel(*volumes.power().get(2, 0, 1)));
    }

    #[test]
    fn test_merge_order_does_not_matter() {
        let mut a = PixelBlock::new(3, 2);
        a.push(0, &result(0.1, 2.0, 1.0, 1.0, 3));
        a.push(3, &result(0.2, 4.0, 2.0, 1.0, 3));
        let mut b = PixelBlock::new(3, 2);
        b.push(1, &result(0.3, 8.0, 3.0, 1.0, 3));
        b.push_sentinel(2);

        let mut forward = OutputVolumes::allocate(3, 2, 2).unwrap();
        forward.merge(&a);
        forward.merge(&b);
        let mut backward = OutputVolumes::allocate(3, 2, 2).unwrap();
        backward.merge(&b);
        backward.merge(&a);

        let (fp, _, fw, _) = forward.into_parts();
        let (bp, _, bw, _) = backward.into_parts();
        let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&fp), bits(&bp));
        assert_eq!(bits(&fw), bits(&bw));
    }

    #[test]
    fn test_push_sentinel() {
        let mut block = PixelBlock::new(2, 1);
        block.push_sentinel(0);
        assert_eq!(block.len(), 1);
        assert_eq!(block.pixels(), &[0]);

        let mut volumes = OutputVolumes::allocate(2, 1, 1).unwrap();
        volumes.merge(&block);
        assert!(volumes.amplitude().iter().all(|&v| is_sentinel(v)));
    }

    #[test]
    fn test_degenerate_result_is_not_sentinel_in_power() {
        let mut block = PixelBlock::new(4, 1);
        block.push(0, &RidgeResult::degenerate(4));
        let mut volumes = OutputVolumes::allocate(4, 1, 1).unwrap();
        volumes.merge(&block);
        assert!(volumes.power().iter().all(|&v| v == 0.0));
        assert!(volumes.amplitude().iter().all(|&v| v == 0.0));
        assert!(volumes.phase().iter().all(|&v| is_sentinel(v)));
    }

    #[test]
    fn test_into_parts() {
        let mut block = PixelBlock::new(1, 1);
        block.push(0, &result(1.0, 2.0, 3.0, 4.0, 1));
        let mut volumes = OutputVolumes::allocate(1, 1, 2).unwrap();
        volumes.merge(&block);

        let (phase, period, power, amplitude) = volumes.into_parts();
        assert_eq!(phase[0], 1.0);
        assert_eq!(period[0], 2.0);
        assert_eq!(power[0], 3.0);
        assert_eq!(amplitude[0], 4.0);
        assert!(is_sentinel(amplitude[1]));
    }

    #[test]
    fn test_narrow_phase_stays_in_half_open_range() {
        use std::f32::consts::PI;

        let near_minus_pi = crate::wavelet::wrap_phase(-1.0, -1e-9);
        assert!(near_minus_pi > -std::f64::consts::PI);
        assert_eq!(narrow_phase(near_minus_pi), PI);
        assert_eq!(narrow_phase(std::f64::consts::PI), PI);
        assert_eq!(narrow_phase(0.5), 0.5);
        assert!(narrow_phase(-3.0) > -PI);
        assert!(is_sentinel(narrow_phase(f64::NAN)));
    }

    #[test]
    fn test_merged_phase_never_reaches_minus_pi() {
        let near_minus_pi = crate::wavelet::wrap_phase(-1.0, -1e-9);
        let mut block = PixelBlock::new(2, 1);
        block.push(0, &result(near_minus_pi, 4.0, 1.0, 1.0, 2));
        let mut volumes = OutputVolumes::allocate(2, 1, 1).unwrap();
        volumes.merge(&block);
        assert!(volumes
            .phase()
            .iter()
            .all(|&p| p > -std::f32::consts::PI && p <= std::f32::consts::PI));
    }
}
