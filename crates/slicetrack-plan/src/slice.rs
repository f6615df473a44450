//! Slices of source audio and their extracted PCM.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when slice bounds are unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SliceError {
    /// Start or end is NaN or infinite.
    #[error("Slice bounds must be finite (start={start}, end={end})")]
    NonFinite { start: f64, end: f64 },

    /// End does not come after start.
    #[error("Slice end must be greater than start (start={start}, end={end})")]
    EmptySpan { start: f64, end: f64 },

    /// Start is before the beginning of the audio.
    #[error("Slice start must not be negative (start={0})")]
    NegativeStart(f64),
}

/// A contiguous time span of the source audio, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Slice {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds (exclusive).
    pub end: f64,
}

impl Slice {
    /// Create a slice, checking that `end > start >= 0`.
    pub fn new(start: f64, end: f64) -> Result<Self, SliceError> {
        let slice = Self { start, end };
        slice.validate()?;
        Ok(slice)
    }

    /// Check the bounds of a slice built directly or deserialized.
    pub fn validate(&self) -> Result<(), SliceError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SliceError::NonFinite {
                start: self.start,
                end: self.end,
            });
        }
        if self.start < 0.0 {
            return Err(SliceError::NegativeStart(self.start));
        }
        if self.end <= self.start {
            return Err(SliceError::EmptySpan {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Length of the slice in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Signed 16-bit mono PCM for one slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    /// PCM samples.
    pub pcm: Vec<i16>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl SampleBuffer {
    /// Create a new buffer.
    pub fn new(pcm: Vec<i16>, sample_rate: u32) -> Self {
        Self { pcm, sample_rate }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    /// Playback length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.pcm.len() as f64 / self.sample_rate as f64
    }

    /// Little-endian byte encoding of the PCM.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.pcm.len() * 2);
        for &sample in &self.pcm {
            output.extend_from_slice(&sample.to_le_bytes());
        }
        output
    }
}
