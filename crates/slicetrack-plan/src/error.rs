//! Error types for slice planning.

use thiserror::Error;

/// Common trait for pipeline errors.
///
/// Every stage of the pipeline reports its failures through a type
/// implementing this trait, so callers get:
/// - Stable error codes for reporting
/// - Human-readable messages for users
/// - A category naming the stage that failed
///
/// # Example
///
/// ```ignore
/// use slicetrack_plan::BackendError;
///
/// fn report<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "PLAN_001" or "XM_002". Codes are stable.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category (the pipeline stage), e.g. "plan", "xm".
    fn category(&self) -> &'static str;
}

/// Error type for the timeline planner.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The sample provider could not extract PCM for a slice.
    ///
    /// The whole plan is aborted; no partial plan is returned.
    #[error("Failed to extract samples for slice {slice_index}: {source}")]
    SliceExtractionFailed {
        /// Index of the slice that failed.
        slice_index: usize,
        /// Underlying provider error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The planner configuration cannot produce a layout.
    #[error("Invalid planner configuration: {0}")]
    InvalidConfig(String),

    /// A plan violates one of its structural invariants.
    #[error("Invalid plan at note {note_index}: {reason}")]
    InvalidPlan {
        /// Index into `RemixPlan::notes` of the offending note.
        note_index: usize,
        /// What is wrong with it.
        reason: String,
    },
}

impl PlanError {
    /// Wrap a provider error for the given slice.
    pub fn extraction<E>(slice_index: usize, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PlanError::SliceExtractionFailed {
            slice_index,
            source: Box::new(err),
        }
    }
}

impl BackendError for PlanError {
    fn code(&self) -> &'static str {
        match self {
            PlanError::SliceExtractionFailed { .. } => "PLAN_001",
            PlanError::InvalidConfig(_) => "PLAN_002",
            PlanError::InvalidPlan { .. } => "PLAN_003",
        }
    }

    fn category(&self) -> &'static str {
        "plan"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_extraction_error_names_slice() {
        let err = PlanError::extraction(3, io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.code(), "PLAN_001");
        assert_eq!(err.category(), "plan");
        assert!(err.to_string().contains("slice 3"));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_extraction_error_keeps_source() {
        use std::error::Error as _;

        let err = PlanError::extraction(0, io::Error::other("boom"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_codes_are_distinct() {
        let a = PlanError::InvalidConfig("x".into());
        let b = PlanError::InvalidPlan {
            note_index: 0,
            reason: "y".into(),
        };
        assert_ne!(a.code(), b.code());
    }
}
