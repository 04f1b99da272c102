// src/spe.rs
// SPE file codec: fixed-offset header fields followed by a dense f32 cube
//
// All multi-byte fields use the host byte order, as the files are produced
// by acquisition software on the same machine that reads them.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use log::{debug, info, warn};

use crate::calibration::WAVE_COEF_COUNT;
use crate::cube::Cube;
use crate::error::{Result, SpeError};
use crate::frame_data::FrameData;

/// Wavelength axis length, u16.
pub const CHANNEL_COUNT_OFFSET: usize = 42;
/// Spatial axis length, u16.
pub const SPATIAL_COUNT_OFFSET: usize = 656;
/// Number of frames, i32.
pub const FRAME_COUNT_OFFSET: usize = 1446;
/// Six consecutive f64 calibration coefficients.
pub const WAVE_COEFS_OFFSET: usize = 3263;
/// Start of the intensity data; also the header size.
pub const DATA_OFFSET: usize = 4100;

const SAMPLE_SIZE: usize = 4;

/// Dimensions declared by an SPE header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeHeader {
    pub frame_count: usize,
    pub spatial_count: usize,
    pub channel_count: usize,
}

impl SpeHeader {
    /// Read and validate the header dimensions. `bytes` must be at least
    /// `DATA_OFFSET` long.
    fn parse_header(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < DATA_OFFSET {
            return Err(SpeError::TruncatedFile {
                expected: DATA_OFFSET,
                actual: bytes.len(),
            });
        }

        let channel_count = read_u16(bytes, CHANNEL_COUNT_OFFSET)?;
        let spatial_count = read_u16(bytes, SPATIAL_COUNT_OFFSET)?;
        let frame_count = read_i32(bytes, FRAME_COUNT_OFFSET)?;

        if channel_count == 0 {
            return Err(SpeError::MalformedHeader("channel count is zero".to_string()));
        }
        if spatial_count == 0 {
            return Err(SpeError::MalformedHeader("spatial count is zero".to_string()));
        }
        if frame_count <= 0 {
            return Err(SpeError::MalformedHeader(format!(
                "frame count must be positive, got {}",
                frame_count
            )));
        }

        Ok(SpeHeader {
            frame_count: frame_count as usize,
            spatial_count: spatial_count as usize,
            channel_count: channel_count as usize,
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.frame_count, self.spatial_count, self.channel_count]
    }

    /// Total file size implied by the dimensions.
    pub fn file_size(&self) -> Result<usize> {
        self.shape()
            .iter()
            .try_fold(SAMPLE_SIZE, |acc, &dim| acc.checked_mul(dim))
            .and_then(|payload| payload.checked_add(DATA_OFFSET))
            .ok_or_else(|| {
                SpeError::MalformedHeader(format!("payload size overflows for {:?}", self.shape()))
            })
    }
}

fn field<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    bytes
        .get(offset..offset + N)
        .and_then(|b| b.try_into().ok())
        .ok_or(SpeError::TruncatedFile {
            expected: offset + N,
            actual: bytes.len(),
        })
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    field(bytes, offset).map(u16::from_ne_bytes)
}

fn read_i32(bytes: &[u8], offset: usize) -> Result<i32> {
    field(bytes, offset).map(i32::from_ne_bytes)
}

fn read_f64(bytes: &[u8], offset: usize) -> Result<f64> {
    field(bytes, offset).map(f64::from_ne_bytes)
}

fn read_f32(bytes: &[u8], offset: usize) -> Result<f32> {
    field(bytes, offset).map(f32::from_ne_bytes)
}

/// Decode a complete SPE buffer. Bytes between header fields are ignored.
pub fn decode(bytes: &[u8], description: impl Into<String>) -> Result<FrameData> {
    let header = SpeHeader::parse_header(bytes)?;
    let expected = header.file_size()?;
    if bytes.len() < expected {
        return Err(SpeError::TruncatedFile {
            expected,
            actual: bytes.len(),
        });
    }
    debug!(
        "SPE header: {} frames, {} points, {} channels",
        header.frame_count, header.spatial_count, header.channel_count
    );

    let wave_coefs = (0..WAVE_COEF_COUNT)
        .map(|c| read_f64(bytes, WAVE_COEFS_OFFSET + c * 8))
        .collect::<Result<Vec<f64>>>()?;

    let values = bytes[DATA_OFFSET..expected]
        .chunks_exact(SAMPLE_SIZE)
        .map(|sample| read_f32(sample, 0))
        .collect::<Result<Vec<f32>>>()?;

    let cube = Cube::new(header.shape(), values)?;
    FrameData::new(cube, wave_coefs, description)
}

/// Encode a store into a zero-filled buffer sized from the cube's actual shape.
pub fn encode(fd: &FrameData) -> Result<Vec<u8>> {
    if fd.wave_coefs().len() != WAVE_COEF_COUNT {
        return Err(SpeError::UnsupportedCalibration(fd.wave_coefs().len()));
    }

    let [frame_count, spatial_count, channel_count] = fd.shape();
    let channels = u16::try_from(channel_count).map_err(|_| {
        SpeError::MalformedHeader(format!("channel count {} does not fit u16", channel_count))
    })?;
    let points = u16::try_from(spatial_count).map_err(|_| {
        SpeError::MalformedHeader(format!("spatial count {} does not fit u16", spatial_count))
    })?;
    let frames = i32::try_from(frame_count).map_err(|_| {
        SpeError::MalformedHeader(format!("frame count {} does not fit i32", frame_count))
    })?;

    let header = SpeHeader {
        frame_count,
        spatial_count,
        channel_count,
    };
    let mut buf = vec![0u8; header.file_size()?];

    buf[CHANNEL_COUNT_OFFSET..CHANNEL_COUNT_OFFSET + 2].copy_from_slice(&channels.to_ne_bytes());
    buf[SPATIAL_COUNT_OFFSET..SPATIAL_COUNT_OFFSET + 2].copy_from_slice(&points.to_ne_bytes());
    buf[FRAME_COUNT_OFFSET..FRAME_COUNT_OFFSET + 4].copy_from_slice(&frames.to_ne_bytes());

    for (c, coef) in fd.wave_coefs().iter().enumerate() {
        let place = WAVE_COEFS_OFFSET + c * 8;
        buf[place..place + 8].copy_from_slice(&coef.to_ne_bytes());
    }

    for (slot, &value) in buf[DATA_OFFSET..]
        .chunks_exact_mut(SAMPLE_SIZE)
        .zip(fd.cube().values())
    {
        slot.copy_from_slice(&value.to_ne_bytes());
    }

    Ok(buf)
}

/// Load an SPE file. The description is the file name without its extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<FrameData> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let description = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let fd = decode(&bytes, description)?;
    info!("Loaded {} ({:?})", path.display(), fd.shape());
    Ok(fd)
}

/// Write `fd` to a new file at `path`.
///
/// An existing file is never overwritten: the call returns
/// [`SpeError::DestinationExists`] before any I/O happens. The write is a
/// single pass with no temp-file replacement.
pub fn save<P: AsRef<Path>>(fd: &FrameData, path: P) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        warn!("Refusing to overwrite {}", path.display());
        return Err(SpeError::DestinationExists(path.to_path_buf()));
    }

    let buf = encode(fd)?;
    let mut file = File::create(path)?;
    file.write_all(&buf)?;
    file.flush()?;

    info!("Saved {} ({} bytes)", path.display(), buf.len());
    Ok(())
}
