// src/frame_data.rs
// In-memory frame set: intensity cube plus wavelength calibration

use std::ops::Range;

use log::debug;

use crate::calibration::{displaced_wave_coefs, wave_lengths_from_coefs};
use crate::cube::Cube;
use crate::error::{Result, SpeError};

/// A set of frames with its wavelength calibration.
///
/// `wave_values` always holds one wavelength per channel of `cube`. A folded
/// store additionally carries `calibration_summary`, the first and last
/// wavelength of the range it was averaged over.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameData {
    cube: Cube,
    wave_coefs: Vec<f64>,
    wave_values: Vec<f64>,
    calibration_summary: Option<(f64, f64)>,
    description: String,
}

impl FrameData {
    /// Index of the wavelength axis in `shape()`.
    pub const WAVE_AXIS: usize = 2;

    /// Build a store and derive the per-channel wavelengths from `wave_coefs`.
    ///
    /// Six coefficients are needed for the store to be written back to disk.
    pub fn new(cube: Cube, wave_coefs: Vec<f64>, description: impl Into<String>) -> Result<Self> {
        if wave_coefs.is_empty() {
            return Err(SpeError::Dimension(
                "at least one wavelength coefficient is required".to_string(),
            ));
        }
        let shape = cube.shape();
        if shape.contains(&0) {
            return Err(SpeError::Dimension(format!(
                "cube of shape {:?} has an empty axis",
                shape
            )));
        }

        let wave_values = wave_lengths_from_coefs(&wave_coefs, shape[Self::WAVE_AXIS]);
        Ok(FrameData {
            cube,
            wave_coefs,
            wave_values,
            calibration_summary: None,
            description: description.into(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn wave_coefs(&self) -> &[f64] {
        &self.wave_coefs
    }

    /// Wavelength of each channel, derived from the coefficients.
    pub fn wave_values(&self) -> &[f64] {
        &self.wave_values
    }

    /// Endpoints of the original wavelength range, set only on folded stores.
    pub fn calibration_summary(&self) -> Option<(f64, f64)> {
        self.calibration_summary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `(frame_count, spatial_count, channel_count)`
    pub fn shape(&self) -> [usize; 3] {
        self.cube.shape()
    }

    /// First and last wavelength covered by this store.
    pub fn wave_range(&self) -> (f64, f64) {
        self.calibration_summary.unwrap_or_else(|| {
            (
                self.wave_values[0],
                self.wave_values[self.wave_values.len() - 1],
            )
        })
    }

    /// Whether `wave` lies within `wave_range()`. Assumes an ascending calibration.
    pub fn contains_wave(&self, wave: f64) -> bool {
        let (first, last) = self.wave_range();
        first <= wave && wave <= last
    }

    /// All spectra of one frame, back to back.
    pub fn frame(&self, frame: usize) -> Option<&[f32]> {
        self.cube.frame(frame)
    }

    /// Spectrum recorded at one spatial point of one frame.
    pub fn spectrum(&self, frame: usize, point: usize) -> Option<&[f32]> {
        self.cube.spectrum(frame, point)
    }

    /// Channel range that covers `[min_wave, max_wave]`.
    ///
    /// The lower bound is one channel before the first wavelength `>= min_wave`,
    /// the (exclusive) upper bound one channel past the first wavelength
    /// `>= max_wave`. Both are clamped to the channel axis. A request that
    /// misses the calibration entirely is a [`SpeError::Range`].
    pub fn channel_bounds(&self, min_wave: f64, max_wave: f64) -> Result<Range<usize>> {
        let (first, last) = (
            self.wave_values[0],
            self.wave_values[self.wave_values.len() - 1],
        );

        // also rejects NaN
        if !(min_wave <= max_wave) || max_wave < first || min_wave > last {
            return Err(SpeError::Range {
                min: min_wave,
                max: max_wave,
                first,
                last,
            });
        }

        let channels = self.wave_values.len();

        let mut cursor = 0;
        while cursor < channels && self.wave_values[cursor] < min_wave {
            cursor += 1;
        }
        let lower = cursor.saturating_sub(1);

        while cursor < channels && self.wave_values[cursor] < max_wave {
            cursor += 1;
        }
        let upper = (cursor + 1).min(channels);

        Ok(lower..upper)
    }

    /// New store restricted to the channels covering `[min_wave, max_wave]`,
    /// with the calibration shifted to the new first channel. When `fold` is
    /// set the result is averaged along the wavelength axis.
    pub fn wave_slice(&self, min_wave: f64, max_wave: f64, fold: bool) -> Result<FrameData> {
        let channels = self.channel_bounds(min_wave, max_wave)?;
        debug!(
            "wave_slice [{}, {}] -> channels {}..{} of {}",
            min_wave,
            max_wave,
            channels.start,
            channels.end,
            self.wave_values.len()
        );

        let coefs = displaced_wave_coefs(&self.wave_coefs, channels.start as f64);
        let cube = self.cube.slice_channels(channels)?;
        let sliced = FrameData::new(cube, coefs, self.description.clone())?;

        if fold {
            sliced.wave_fold()
        } else {
            Ok(sliced)
        }
    }

    /// New store averaged along the wavelength axis.
    ///
    /// The cube keeps a channel axis of length 1. The calibration becomes the
    /// constant `wave_coefs[0]` and the averaged range is kept in
    /// `calibration_summary`.
    pub fn wave_fold(&self) -> Result<FrameData> {
        let mut coefs = vec![0.0; self.wave_coefs.len()];
        coefs[0] = self.wave_coefs[0];

        let mut folded = FrameData::new(self.cube.mean_channels(), coefs, self.description.clone())?;
        folded.calibration_summary = Some(self.wave_range());
        Ok(folded)
    }
}
