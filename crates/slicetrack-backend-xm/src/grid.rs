//! Pattern grid: the plan laid out as pattern x row x channel cells.

use slicetrack_plan::{BackendError, RemixPlan};
use thiserror::Error;
use tracing::debug;

use crate::clamp::{clamp_note, clamp_volume, VOLUME_MAX};

/// Error raised while placing notes into the grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A note points outside the grid.
    #[error("Note for slice {slice_index} targets pattern {pattern} row {row}, outside the grid")]
    CoordinateOutOfRange {
        slice_index: usize,
        pattern: usize,
        row: usize,
    },

    /// A note references a slice with no sample buffer.
    #[error("Note {note_index} references slice {slice_index}, which has no sample buffer")]
    DanglingSliceIndex {
        note_index: usize,
        slice_index: usize,
    },
}

impl BackendError for GridError {
    fn code(&self) -> &'static str {
        match self {
            GridError::CoordinateOutOfRange { .. } => "GRID_001",
            GridError::DanglingSliceIndex { .. } => "GRID_002",
        }
    }

    fn category(&self) -> &'static str {
        "grid"
    }
}

/// A note cell as committed to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Note number, 1..=96.
    pub note: u8,
    /// 1-based instrument number (slice index + 1). Masked to a byte on encode.
    pub instrument: u32,
    /// Volume column, 0..=64.
    pub volume: u8,
    /// Effect type.
    pub effect: u8,
    /// Effect parameter.
    pub effect_param: u8,
}

impl Cell {
    /// Commit a note through the clamping policy.
    pub fn commit(pitch: i32, slice_index: usize, volume: i32) -> Self {
        Self {
            note: clamp_note(pitch),
            instrument: u32::try_from(slice_index)
                .unwrap_or(u32::MAX)
                .saturating_add(1),
            volume: clamp_volume(volume),
            effect: 0,
            effect_param: 0,
        }
    }
}

/// One pattern: `rows x channels` optional cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    rows: usize,
    channels: usize,
    cells: Vec<Option<Cell>>,
}

impl Pattern {
    /// Create a pattern with every cell absent.
    pub fn empty(rows: usize, channels: usize) -> Self {
        Self {
            rows,
            channels,
            cells: vec![None; rows * channels],
        }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels
    }

    /// Cell at a position, or `None` when absent or out of range.
    pub fn cell(&self, row: usize, channel: usize) -> Option<&Cell> {
        if row >= self.rows || channel >= self.channels {
            return None;
        }
        self.cells[row * self.channels + channel].as_ref()
    }

    /// Iterate one row's cells in channel order.
    pub fn row(&self, row: usize) -> &[Option<Cell>] {
        let start = row * self.channels;
        &self.cells[start..start + self.channels]
    }

    /// Iterate all cells row-major, channel innermost.
    pub fn cells(&self) -> &[Option<Cell>] {
        &self.cells
    }

    /// Number of present cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Place a cell, returning the one it replaced.
    fn put(&mut self, row: usize, channel: usize, cell: Cell) -> Option<Cell> {
        self.cells[row * self.channels + channel].replace(cell)
    }
}

/// All patterns of a song. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternGrid {
    patterns: Vec<Pattern>,
    rows_per_pattern: usize,
    channel_count: usize,
}

impl PatternGrid {
    /// Number of patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Rows per pattern.
    pub fn rows_per_pattern(&self) -> usize {
        self.rows_per_pattern
    }

    /// Channels per pattern.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// All patterns in declaration order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// A single pattern.
    pub fn pattern(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Cell at a coordinate.
    pub fn cell(&self, pattern: usize, row: usize, channel: usize) -> Option<&Cell> {
        self.patterns.get(pattern)?.cell(row, channel)
    }

    /// Total number of present cells.
    pub fn occupied_cells(&self) -> usize {
        self.patterns.iter().map(Pattern::occupied).sum()
    }
}

/// Lay a plan's notes out on a grid.
///
/// Notes are committed in plan order. When two notes share a
/// `(pattern, row, channel)` coordinate the later one wins.
pub fn build_grid(plan: &RemixPlan) -> Result<PatternGrid, GridError> {
    let channel_count = plan.channel_count.max(1);
    let mut patterns = vec![Pattern::empty(plan.rows_per_pattern, channel_count); plan.pattern_count];

    for (note_index, note) in plan.notes.iter().enumerate() {
        if note.slice_index >= plan.sample_buffers.len() {
            return Err(GridError::DanglingSliceIndex {
                note_index,
                slice_index: note.slice_index,
            });
        }
        if note.pattern_index >= plan.pattern_count || note.row >= plan.rows_per_pattern {
            return Err(GridError::CoordinateOutOfRange {
                slice_index: note.slice_index,
                pattern: note.pattern_index,
                row: note.row,
            });
        }

        let channel = note.slice_index % channel_count;
        let cell = Cell::commit(note.pitch, note.slice_index, VOLUME_MAX as i32);
        if let Some(previous) = patterns[note.pattern_index].put(note.row, channel, cell) {
            debug!(
                pattern = note.pattern_index,
                row = note.row,
                channel,
                replaced_instrument = previous.instrument,
                instrument = cell.instrument,
                "cell overwritten"
            );
        }
    }

    Ok(PatternGrid {
        patterns,
        rows_per_pattern: plan.rows_per_pattern,
        channel_count,
    })
}
