//! The seam between the planner and the audio loader.

use thiserror::Error;

use crate::slice::{SampleBuffer, Slice};

/// Source of PCM for each slice.
///
/// Implementations decode and resample however they like, but must return
/// mono 16-bit PCM at the requested `sample_rate`.
pub trait SampleProvider {
    /// Error raised when a slice cannot be extracted.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extract the samples for `slice`, which sits at `index` in the slice list.
    fn extract(
        &mut self,
        index: usize,
        slice: &Slice,
        sample_rate: u32,
    ) -> Result<SampleBuffer, Self::Error>;
}

/// Error from [`PreloadedSamples`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreloadedError {
    /// No buffer was supplied for this slice index.
    #[error("No preloaded buffer for slice {0}")]
    Missing(usize),

    /// The stored buffer has a different sample rate than requested.
    #[error("Preloaded buffer for slice {index} is {actual} Hz, expected {expected} Hz")]
    RateMismatch {
        index: usize,
        actual: u32,
        expected: u32,
    },
}

/// A provider backed by buffers that are already in memory.
///
/// Buffer `i` answers for slice `i`; the slice bounds themselves are not
/// consulted.
#[derive(Debug, Clone, Default)]
pub struct PreloadedSamples {
    buffers: Vec<SampleBuffer>,
}

impl PreloadedSamples {
    /// Wrap index-aligned buffers.
    pub fn new(buffers: Vec<SampleBuffer>) -> Self {
        Self { buffers }
    }

    /// Number of stored buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether no buffers are stored.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl SampleProvider for PreloadedSamples {
    type Error = PreloadedError;

    fn extract(
        &mut self,
        index: usize,
        _slice: &Slice,
        sample_rate: u32,
    ) -> Result<SampleBuffer, Self::Error> {
        let buffer = self
            .buffers
            .get(index)
            .ok_or(PreloadedError::Missing(index))?;
        if buffer.sample_rate != sample_rate {
            return Err(PreloadedError::RateMismatch {
                index,
                actual: buffer.sample_rate,
                expected: sample_rate,
            });
        }
        Ok(buffer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preloaded_returns_indexed_buffer() {
        let mut provider = PreloadedSamples::new(vec![
            SampleBuffer::new(vec![1, 2], 22050),
            SampleBuffer::new(vec![3], 22050),
        ]);
        let slice = Slice::new(0.0, 1.0).unwrap();
        assert_eq!(provider.extract(1, &slice, 22050).unwrap().pcm, vec![3]);
    }

    #[test]
    fn test_preloaded_missing_index() {
        let mut provider = PreloadedSamples::default();
        let slice = Slice::new(0.0, 1.0).unwrap();
        assert_eq!(
            provider.extract(0, &slice, 22050),
            Err(PreloadedError::Missing(0))
        );
    }

    #[test]
    fn test_preloaded_rate_mismatch() {
        let mut provider = PreloadedSamples::new(vec![SampleBuffer::new(vec![0], 44100)]);
        let slice = Slice::new(0.0, 1.0).unwrap();
        assert!(matches!(
            provider.extract(0, &slice, 22050),
            Err(PreloadedError::RateMismatch { .. })
        ));
    }
}
