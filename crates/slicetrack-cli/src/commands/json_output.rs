//! JSON output types for machine-readable CLI output.
//!
//! Every command that accepts `--json` prints one [`CommandOutput`] object
//! to stdout: `success`, a list of `errors`, and the command's own fields
//! flattened alongside them.

use serde::Serialize;
use slicetrack_backend_xm::xm::ReadError;
use slicetrack_backend_xm::{EncodeError, GridError};
use slicetrack_plan::{BackendError, PlanError};

use crate::audio::AudioError;

/// Error codes for CLI operations.
///
/// Library errors keep their own codes (`PLAN_*`, `GRID_*`, `XM_*`,
/// `XMREAD_*`); these cover the rest.
pub mod error_codes {
    /// Anything not covered below
    pub const GENERAL: &str = "CLI_000";
    /// Audio file could not be decoded
    pub const AUDIO: &str = "CLI_001";
    /// Slice index out of range
    pub const SLICE_INDEX: &str = "CLI_002";
    /// JSON serialization error
    pub const JSON_SERIALIZE: &str = "CLI_003";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "PLAN_002")
    pub code: String,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Builds an error from an `anyhow` chain, coded by [`error_code`].
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        Self::new(error_code(err), format!("{:#}", err))
    }
}

/// Stable code for an error chain.
///
/// The chain is walked from the outermost error inwards and the first
/// typed error decides the code, so a `PlanError` wrapping an
/// `AudioError` reports `PLAN_001`.
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<PlanError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<EncodeError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<GridError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<ReadError>() {
            return e.code();
        }
        if cause.downcast_ref::<AudioError>().is_some() {
            return error_codes::AUDIO;
        }
        if cause.downcast_ref::<SliceIndexError>().is_some() {
            return error_codes::SLICE_INDEX;
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return error_codes::JSON_SERIALIZE;
        }
    }
    error_codes::GENERAL
}

/// Raised by `preview` for a slice index past the end of the slice list.
#[derive(Debug, thiserror::Error)]
#[error("Slice index {index} is out of range ({count} slices)")]
pub struct SliceIndexError {
    pub index: usize,
    pub count: usize,
}

/// Top-level JSON document for one command run.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput<T: Serialize> {
    /// Whether the command completed.
    pub success: bool,
    /// Errors, empty on success.
    pub errors: Vec<JsonError>,
    /// Command-specific fields.
    #[serde(flatten)]
    pub result: Option<T>,
}

impl<T: Serialize> CommandOutput<T> {
    /// Successful run.
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    /// Failed run.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// Print a command's JSON document and map it to an exit code.
pub fn emit<T: Serialize>(result: anyhow::Result<T>) -> anyhow::Result<std::process::ExitCode> {
    let (output, code) = match result {
        Ok(value) => (CommandOutput::success(value), std::process::ExitCode::SUCCESS),
        Err(err) => (
            CommandOutput::failure(vec![JsonError::from_anyhow(&err)]),
            std::process::ExitCode::from(1),
        ),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}
