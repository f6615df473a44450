//! Error type for module encoding.

use slicetrack_plan::BackendError;
use thiserror::Error;

use crate::grid::GridError;

/// Error type for XM encoding and export.
///
/// Cell values never cause an error; they are clamped or masked. Only I/O
/// failures and counts the header fields cannot hold are reported.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Writing to the sink failed. Anything already written is invalid.
    #[error("Failed to write module: {0}")]
    SinkWriteFailed(#[from] std::io::Error),

    /// The plan could not be laid out on a grid.
    #[error("Pattern grid error: {0}")]
    Grid(#[from] GridError),

    /// A count does not fit its header field.
    #[error("Too many {what}: {count} (max {max})")]
    TooLarge {
        /// What was counted.
        what: &'static str,
        /// The count.
        count: usize,
        /// Largest value the format can hold.
        max: usize,
    },
}

impl EncodeError {
    pub(crate) fn check(what: &'static str, count: usize, max: usize) -> Result<(), Self> {
        if count > max {
            return Err(EncodeError::TooLarge { what, count, max });
        }
        Ok(())
    }
}

impl BackendError for EncodeError {
    fn code(&self) -> &'static str {
        match self {
            EncodeError::SinkWriteFailed(_) => "XM_001",
            EncodeError::Grid(err) => err.code(),
            EncodeError::TooLarge { .. } => "XM_003",
        }
    }

    fn category(&self) -> &'static str {
        "xm"
    }
}
