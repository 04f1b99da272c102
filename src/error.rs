// src/error.rs
// Error taxonomy shared by the frame store and the SPE codec

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Truncated file: expected at least {expected} bytes, got {actual}")]
    TruncatedFile { expected: usize, actual: usize },

    #[error("Unsupported calibration: expected 6 wavelength coefficients, got {0}")]
    UnsupportedCalibration(usize),

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Dimension error: {0}")]
    Dimension(String),

    #[error("Wavelength range [{min}, {max}] lies outside calibration [{first}, {last}]")]
    Range {
        min: f64,
        max: f64,
        first: f64,
        last: f64,
    },
}

impl SpeError {
    /// True when nothing was written and the caller may retry with another destination.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SpeError::DestinationExists(_))
    }
}

pub type Result<T> = std::result::Result<T, SpeError>;
