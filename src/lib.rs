// src/lib.rs
// SPE Frames Library - Public API

//! # SPE Frames
//!
//! A Rust library for reading and writing SPE hyperspectral frame files.
//!
//! ## Features
//!
//! - Decode and encode the fixed-offset SPE layout
//! - Wavelength calibration from the stored degree-5 polynomial
//! - Slice a wavelength range with exact recalibration of the new origin
//! - Fold the wavelength axis into a broadband average
//! - Proper error handling
//!
//! ## Example
//!
//! ```no_run
//! use spe_frames::spe;
//!
//! let fd = spe::load("capture.spe").expect("Failed to load file");
//!
//! let [frames, points, channels] = fd.shape();
//! println!("{} frames, {} points, {} channels", frames, points, channels);
//!
//! // Keep 540..560 nm and average it
//! let band = fd.wave_slice(540.0, 560.0, true).expect("Range outside calibration");
//! spe::save(&band, "band.spe").expect("Failed to write file");
//! ```

pub mod calibration;
mod cube;
mod error;
mod frame_data;
pub mod spe;

pub use calibration::{displaced_wave_coefs, evaluate, wave_lengths_from_coefs, PascalTriangle};
pub use cube::Cube;
pub use error::{Result, SpeError};
pub use frame_data::FrameData;
pub use spe::{decode, encode, load, save, SpeHeader};
