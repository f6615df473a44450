//! SliceTrack Plan - Slice Data Model and Timeline Planning
//!
//! This crate owns the format-independent half of the SliceTrack pipeline:
//! the slice and sample types produced by the audio collaborators, and the
//! deterministic planner that assigns every slice a pitch and a position on a
//! pattern/row timeline.
//!
//! # Pipeline
//!
//! ```text
//! slices + SampleProvider --plan()--> RemixPlan --(backend)--> PatternGrid --> bytes
//! ```
//!
//! The planner is purely index-driven. Given the same slices and the same
//! [`PlannerConfig`], the resulting [`RemixPlan`] is identical on every run.
//!
//! # Example
//!
//! ```
//! use slicetrack_plan::{plan, PlannerConfig, PreloadedSamples, SampleBuffer, Slice};
//!
//! let slices = vec![Slice::new(0.0, 0.5).unwrap(), Slice::new(0.5, 1.0).unwrap()];
//! let mut samples = PreloadedSamples::new(vec![
//!     SampleBuffer::new(vec![0; 100], 22050),
//!     SampleBuffer::new(vec![0; 100], 22050),
//! ]);
//!
//! let remix = plan(&slices, &mut samples, None, &PlannerConfig::default()).unwrap();
//! assert_eq!(remix.notes.len(), 2);
//! assert_eq!(remix.notes[1].pitch, 50);
//! ```
//!
//! # Module Structure
//!
//! - [`slice`]: `Slice` and `SampleBuffer`
//! - [`config`]: `PlannerConfig` layout and scale settings
//! - [`provider`]: the `SampleProvider` seam to the audio loader
//! - [`planner`]: `NoteEvent`, `RemixPlan` and `plan()`
//! - [`error`]: error types and the shared `BackendError` trait

pub mod config;
pub mod error;
pub mod planner;
pub mod provider;
pub mod slice;

pub use config::PlannerConfig;
pub use error::{BackendError, PlanError};
pub use planner::{pattern_for_index, pitch_for_index, plan, row_for_index, NoteEvent, RemixPlan};
pub use provider::{PreloadedError, PreloadedSamples, SampleProvider};
pub use slice::{SampleBuffer, Slice, SliceError};

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
