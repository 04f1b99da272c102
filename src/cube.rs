// src/cube.rs
// Owned 3-D intensity buffer, axes (frame, spatial point, wavelength channel)

use std::ops::Range;

use crate::error::{Result, SpeError};

/// Row-major intensity cube. The channel axis is the innermost one, so the
/// spectrum recorded at one (frame, spatial) coordinate is a contiguous run.
/// Intensities are held at the 32-bit precision the SPE format stores.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cube {
    shape: [usize; 3],
    values: Vec<f32>,
}

impl Cube {
    /// Wrap `values` laid out as `(frame, spatial, channel)`.
    pub fn new(shape: [usize; 3], values: Vec<f32>) -> Result<Self> {
        let expected = shape.iter().product::<usize>();
        if values.len() != expected {
            return Err(SpeError::Dimension(format!(
                "cube of shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Cube { shape, values })
    }

    pub fn zeros(shape: [usize; 3]) -> Self {
        Cube {
            shape,
            values: vec![0.0; shape.iter().product()],
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn frame_count(&self) -> usize {
        self.shape[0]
    }

    pub fn spatial_count(&self) -> usize {
        self.shape[1]
    }

    pub fn channel_count(&self) -> usize {
        self.shape[2]
    }

    /// All intensities in row-major order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn offset(&self, frame: usize, point: usize, channel: usize) -> usize {
        (frame * self.shape[1] + point) * self.shape[2] + channel
    }

    pub fn get(&self, frame: usize, point: usize, channel: usize) -> Option<f32> {
        if frame >= self.shape[0] || point >= self.shape[1] || channel >= self.shape[2] {
            return None;
        }
        Some(self.values[self.offset(frame, point, channel)])
    }

    /// Channel run recorded at one spatial point of one frame.
    pub fn spectrum(&self, frame: usize, point: usize) -> Option<&[f32]> {
        if frame >= self.shape[0] || point >= self.shape[1] {
            return None;
        }
        let start = self.offset(frame, point, 0);
        Some(&self.values[start..start + self.shape[2]])
    }

    /// Every spatial point of one frame, spectra back to back.
    pub fn frame(&self, frame: usize) -> Option<&[f32]> {
        if frame >= self.shape[0] {
            return None;
        }
        let stride = self.shape[1] * self.shape[2];
        let start = frame * stride;
        Some(&self.values[start..start + stride])
    }

    /// Keep only `channels` along the wavelength axis. Axis order is unchanged.
    pub fn slice_channels(&self, channels: Range<usize>) -> Result<Cube> {
        if channels.start > channels.end || channels.end > self.shape[2] {
            return Err(SpeError::Dimension(format!(
                "channel range {:?} outside 0..{}",
                channels, self.shape[2]
            )));
        }

        let width = channels.end - channels.start;
        let mut values = Vec::with_capacity(self.shape[0] * self.shape[1] * width);
        for spectrum in self.spectra() {
            values.extend_from_slice(&spectrum[channels.clone()]);
        }

        Ok(Cube {
            shape: [self.shape[0], self.shape[1], width],
            values,
        })
    }

    /// Average along the wavelength axis. The result keeps a channel axis of length 1.
    pub fn mean_channels(&self) -> Cube {
        let width = self.shape[2] as f64;
        let values = self
            .spectra()
            .map(|spectrum| (spectrum.iter().map(|&v| f64::from(v)).sum::<f64>() / width) as f32)
            .collect();

        Cube {
            shape: [self.shape[0], self.shape[1], 1],
            values,
        }
    }

    fn spectra(&self) -> impl Iterator<Item = &[f32]> + '_ {
        let width = self.shape[2];
        (0..self.shape[0] * self.shape[1]).map(move |i| &self.values[i * width..(i + 1) * width])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(shape: [usize; 3]) -> Cube {
        let n = shape.iter().product::<usize>();
        Cube::new(shape, (0..n).map(|v| v as f32).collect()).unwrap()
    }

    #[test]
    fn test_shape_mismatch() {
        let result = Cube::new([2, 2, 2], vec![0.0; 7]);
        assert!(matches!(result, Err(SpeError::Dimension(_))));
    }

    #[test]
    fn test_row_major_indexing() {
        let cube = ramp([2, 3, 4]);
        assert_eq!(cube.get(0, 0, 0), Some(0.0));
        assert_eq!(cube.get(0, 1, 0), Some(4.0));
        assert_eq!(cube.get(1, 0, 0), Some(12.0));
        assert_eq!(cube.get(1, 2, 3), Some(23.0));
        assert_eq!(cube.get(2, 0, 0), None);
        assert_eq!(cube.get(0, 0, 4), None);
    }

    #[test]
    fn test_spectrum_and_frame_access() {
        let cube = ramp([2, 2, 3]);
        assert_eq!(cube.spectrum(1, 0).unwrap(), &[6.0, 7.0, 8.0]);
        assert_eq!(cube.frame(1).unwrap(), &[6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        assert!(cube.spectrum(0, 2).is_none());
        assert!(cube.frame(2).is_none());
    }

    #[test]
    fn test_slice_channels_preserves_axis_order() {
        let cube = ramp([2, 2, 4]);
        let sliced = cube.slice_channels(1..3).unwrap();

        assert_eq!(sliced.shape(), [2, 2, 2]);
        assert_eq!(sliced.values(), &[1.0, 2.0, 5.0, 6.0, 9.0, 10.0, 13.0, 14.0]);
        // source untouched
        assert_eq!(cube.shape(), [2, 2, 4]);
    }

    #[test]
    fn test_slice_channels_out_of_range() {
        let cube = ramp([1, 1, 3]);
        assert!(cube.slice_channels(1..4).is_err());
    }

    #[test]
    fn test_mean_channels() {
        let cube = Cube::new([1, 2, 3], vec![1.0, 2.0, 3.0, 10.0, 20.0, 60.0]).unwrap();
        let mean = cube.mean_channels();

        assert_eq!(mean.shape(), [1, 2, 1]);
        assert_eq!(mean.get(0, 0, 0), Some(2.0));
        assert_eq!(mean.get(0, 1, 0), Some(30.0));
    }

    #[test]
    fn test_empty_channel_axis() {
        let cube = Cube::zeros([2, 2, 0]);
        assert!(cube.is_empty());
        assert_eq!(cube.slice_channels(0..0).unwrap().shape(), [2, 2, 0]);

        let mean = cube.mean_channels();
        assert_eq!(mean.shape(), [2, 2, 1]);
        assert!(mean.values().iter().all(|v| v.is_nan()));
    }
}
