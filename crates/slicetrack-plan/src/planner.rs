//! Timeline planner: slices to pitched note events.
//!
//! Each slice `i` becomes exactly one [`NoteEvent`]:
//!
//! - `pitch = base_pitch + scale[i % len] + 12 * (i / len)`
//! - `pattern_index = i % pattern_count`
//! - `row = (i * row_spacing) % rows_per_pattern`
//!
//! The channel is not stored here. The grid builder derives it as
//! `slice_index % channel_count`, so slices `channel_count` apart share a
//! channel and may collide.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::provider::SampleProvider;
use crate::slice::{SampleBuffer, Slice};

/// One slice placed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    /// Index into the slice list and `RemixPlan::sample_buffers`.
    pub slice_index: usize,
    /// Unclamped 1-based note number.
    pub pitch: i32,
    /// Pattern the note is placed in.
    pub pattern_index: usize,
    /// Row within the pattern.
    pub row: usize,
}

/// Format-independent assignment of every slice to a pitch and position.
#[derive(Debug, Clone, PartialEq)]
pub struct RemixPlan {
    /// One buffer per slice, index-aligned with the slice list.
    pub sample_buffers: Vec<SampleBuffer>,
    /// One note per slice, in slice order.
    pub notes: Vec<NoteEvent>,
    /// Channels per pattern.
    pub channel_count: usize,
    /// Number of patterns.
    pub pattern_count: usize,
    /// Rows per pattern.
    pub rows_per_pattern: usize,
    /// Tempo hint supplied by the caller. Advisory only.
    pub bpm_hint: Option<f64>,
}

impl RemixPlan {
    /// An empty plan with the given layout.
    pub fn empty(config: &PlannerConfig) -> Self {
        Self {
            sample_buffers: Vec::new(),
            notes: Vec::new(),
            channel_count: config.channel_count,
            pattern_count: config.pattern_count,
            rows_per_pattern: config.rows_per_pattern,
            bpm_hint: None,
        }
    }

    /// Number of slices in the plan.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the plan has no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Channel a note lands on.
    pub fn channel_for(&self, note: &NoteEvent) -> usize {
        note.slice_index % self.channel_count.max(1)
    }

    /// Check the structural invariants, reporting the first violation.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.channel_count == 0 || self.pattern_count == 0 || self.rows_per_pattern == 0 {
            return Err(PlanError::InvalidConfig(format!(
                "layout must be non-empty (channels={}, patterns={}, rows={})",
                self.channel_count, self.pattern_count, self.rows_per_pattern
            )));
        }
        if self.notes.len() != self.sample_buffers.len() {
            return Err(PlanError::InvalidPlan {
                note_index: self.notes.len().min(self.sample_buffers.len()),
                reason: format!(
                    "{} notes but {} sample buffers",
                    self.notes.len(),
                    self.sample_buffers.len()
                ),
            });
        }
        for (note_index, note) in self.notes.iter().enumerate() {
            let reason = if note.slice_index >= self.sample_buffers.len() {
                format!("slice index {} has no sample buffer", note.slice_index)
            } else if note.pattern_index >= self.pattern_count {
                format!(
                    "pattern {} outside 0..{}",
                    note.pattern_index, self.pattern_count
                )
            } else if note.row >= self.rows_per_pattern {
                format!("row {} outside 0..{}", note.row, self.rows_per_pattern)
            } else {
                continue;
            };
            return Err(PlanError::InvalidPlan { note_index, reason });
        }
        Ok(())
    }
}

/// Pitch for the slice at `index`. Not clamped.
pub fn pitch_for_index(index: usize, config: &PlannerConfig) -> i32 {
    let len = config.scale_intervals.len().max(1);
    let step = config.scale_intervals.get(index % len).copied().unwrap_or(0);
    let octave = i32::try_from(index / len).unwrap_or(i32::MAX);
    config
        .base_pitch
        .saturating_add(step)
        .saturating_add(octave.saturating_mul(12))
}

/// Pattern for the slice at `index`.
pub fn pattern_for_index(index: usize, config: &PlannerConfig) -> usize {
    index % config.pattern_count.max(1)
}

/// Row for the slice at `index`.
pub fn row_for_index(index: usize, config: &PlannerConfig) -> usize {
    index.wrapping_mul(config.row_spacing) % config.rows_per_pattern.max(1)
}

/// Returned when a provider ignores the requested sample rate.
#[derive(Debug, Error)]
#[error("provider returned {actual} Hz audio, expected {expected} Hz")]
struct RateMismatch {
    actual: u32,
    expected: u32,
}

/// Build a remix plan from an ordered slice list.
///
/// Samples are extracted for every slice first; the first extraction
/// failure aborts the plan. An empty slice list gives an empty plan.
///
/// # Arguments
/// * `slices` - Slices ordered by start time
/// * `provider` - Source of PCM for each slice
/// * `bpm_hint` - Optional tempo hint, stored but not used for layout
/// * `config` - Scale and layout settings
pub fn plan<P: SampleProvider>(
    slices: &[Slice],
    provider: &mut P,
    bpm_hint: Option<f64>,
    config: &PlannerConfig,
) -> Result<RemixPlan, PlanError> {
    config.validate()?;

    let mut sample_buffers = Vec::with_capacity(slices.len());
    for (index, slice) in slices.iter().enumerate() {
        let buffer = provider
            .extract(index, slice, config.sample_rate)
            .map_err(|e| PlanError::extraction(index, e))?;
        if buffer.sample_rate != config.sample_rate {
            return Err(PlanError::extraction(
                index,
                RateMismatch {
                    actual: buffer.sample_rate,
                    expected: config.sample_rate,
                },
            ));
        }
        sample_buffers.push(buffer);
    }

    let notes: Vec<NoteEvent> = (0..sample_buffers.len())
        .map(|index| NoteEvent {
            slice_index: index,
            pitch: pitch_for_index(index, config),
            pattern_index: pattern_for_index(index, config),
            row: row_for_index(index, config),
        })
        .collect();

    debug!(
        slices = slices.len(),
        patterns = config.pattern_count,
        channels = config.channel_count,
        ?bpm_hint,
        "planned remix"
    );

    Ok(RemixPlan {
        sample_buffers,
        notes,
        channel_count: config.channel_count,
        pattern_count: config.pattern_count,
        rows_per_pattern: config.rows_per_pattern,
        bpm_hint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PreloadedSamples;
    use pretty_assertions::assert_eq;

    fn silent_slices(count: usize) -> (Vec<Slice>, PreloadedSamples) {
        let slices = (0..count)
            .map(|i| Slice::new(i as f64 * 0.5, (i + 1) as f64 * 0.5).unwrap())
            .collect();
        let buffers = (0..count)
            .map(|i| SampleBuffer::new(vec![i as i16; 4], 22050))
            .collect();
        (slices, PreloadedSamples::new(buffers))
    }

    #[test]
    fn test_first_octave_pitches() {
        let config = PlannerConfig::default();
        let pitches: Vec<i32> = (0..7).map(|i| pitch_for_index(i, &config)).collect();
        assert_eq!(pitches, vec![48, 50, 52, 53, 55, 57, 59]);
        assert_eq!(pitch_for_index(7, &config), 60);
        assert_eq!(pitch_for_index(9, &config), 64);
    }

    #[test]
    fn test_rows_wrap() {
        let config = PlannerConfig::default();
        let rows: Vec<usize> = (0..8).map(|i| row_for_index(i, &config)).collect();
        assert_eq!(rows, vec![0, 8, 16, 24, 32, 40, 48, 56]);
        assert_eq!(row_for_index(8, &config), 0);
        assert_eq!(row_for_index(9, &config), 8);
    }

    #[test]
    fn test_pattern_cycle() {
        let config = PlannerConfig::default();
        let patterns: Vec<usize> = (0..9).map(|i| pattern_for_index(i, &config)).collect();
        assert_eq!(patterns, vec![0, 1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_alternate_scale() {
        let config = PlannerConfig {
            base_pitch: 36,
            scale_intervals: vec![0, 3, 7],
            ..Default::default()
        };
        let pitches: Vec<i32> = (0..5).map(|i| pitch_for_index(i, &config)).collect();
        assert_eq!(pitches, vec![36, 39, 43, 48, 51]);
    }

    #[test]
    fn test_plan_matches_helpers() {
        let config = PlannerConfig::default();
        let (slices, mut provider) = silent_slices(10);
        let remix = plan(&slices, &mut provider, Some(120.0), &config).unwrap();

        assert_eq!(remix.bpm_hint, Some(120.0));
        for (i, note) in remix.notes.iter().enumerate() {
            assert_eq!(
                *note,
                NoteEvent {
                    slice_index: i,
                    pitch: pitch_for_index(i, &config),
                    pattern_index: pattern_for_index(i, &config),
                    row: row_for_index(i, &config),
                }
            );
        }
        assert!(remix.validate().is_ok());
    }

    #[test]
    fn test_bpm_hint_does_not_change_layout() {
        let config = PlannerConfig::default();
        let (slices, mut provider) = silent_slices(5);
        let a = plan(&slices, &mut provider, None, &config).unwrap();
        let b = plan(&slices, &mut provider, Some(90.0), &config).unwrap();
        assert_eq!(a.notes, b.notes);
    }

    #[test]
    fn test_empty_plan() {
        let mut provider = PreloadedSamples::default();
        let remix = plan(&[], &mut provider, None, &PlannerConfig::default()).unwrap();
        assert!(remix.is_empty());
        assert!(remix.sample_buffers.is_empty());
        assert_eq!(remix.pattern_count, 4);
        assert!(remix.validate().is_ok());
    }

    #[test]
    fn test_extraction_failure_aborts() {
        let slices = vec![
            Slice::new(0.0, 0.5).unwrap(),
            Slice::new(0.5, 1.0).unwrap(),
            Slice::new(1.0, 1.5).unwrap(),
        ];
        let mut provider = PreloadedSamples::new(vec![
            SampleBuffer::new(vec![0], 22050),
            SampleBuffer::new(vec![0], 22050),
        ]);
        match plan(&slices, &mut provider, None, &PlannerConfig::default()) {
            Err(PlanError::SliceExtractionFailed { slice_index, .. }) => {
                assert_eq!(slice_index, 2)
            }
            other => panic!("expected SliceExtractionFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_rejected_before_extraction() {
        let (slices, mut provider) = silent_slices(2);
        let config = PlannerConfig {
            scale_intervals: vec![],
            ..Default::default()
        };
        assert!(matches!(
            plan(&slices, &mut provider, None, &config),
            Err(PlanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_reports_bad_row() {
        let config = PlannerConfig::default();
        let (slices, mut provider) = silent_slices(3);
        let mut remix = plan(&slices, &mut provider, None, &config).unwrap();
        remix.notes[1].row = 64;
        match remix.validate() {
            Err(PlanError::InvalidPlan { note_index, reason }) => {
                assert_eq!(note_index, 1);
                assert!(reason.contains("row 64"));
            }
            other => panic!("expected InvalidPlan, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_reports_length_mismatch() {
        let config = PlannerConfig::default();
        let (slices, mut provider) = silent_slices(3);
        let mut remix = plan(&slices, &mut provider, None, &config).unwrap();
        remix.sample_buffers.pop();
        assert!(matches!(
            remix.validate(),
            Err(PlanError::InvalidPlan { .. })
        ));
    }

    #[test]
    fn test_channel_derivation() {
        let config = PlannerConfig::default();
        let (slices, mut provider) = silent_slices(6);
        let remix = plan(&slices, &mut provider, None, &config).unwrap();
        let channels: Vec<usize> = remix.notes.iter().map(|n| remix.channel_for(n)).collect();
        assert_eq!(channels, vec![0, 1, 2, 3, 0, 1]);
    }
}
