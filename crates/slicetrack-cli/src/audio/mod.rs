//! Audio input for the CLI: WAV and MP3 decoding and slice detection.

pub mod compressed;
pub mod onset;
pub mod wav;

pub use onset::{detect_onsets, detect_slices, slices_from_onsets, DEFAULT_HOP_LENGTH};
pub use wav::{resample_linear, write_wav, AudioError, WavSource};
