//! Entry points: plan to bytes, plan to sink, plan to file.

use std::io::{BufWriter, Write};
use std::path::Path;

use slicetrack_plan::RemixPlan;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::EncodeError;
use crate::grid::{build_grid, PatternGrid};
use crate::xm::{ModuleSettings, XmModule};

/// Result of writing a module to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Bytes written.
    pub size: usize,
    /// BLAKE3 hash of the written bytes.
    pub hash: String,
    /// Patterns in the module.
    pub num_patterns: u16,
    /// Instruments in the module.
    pub num_instruments: u16,
    /// Present cells across all patterns.
    pub occupied_cells: usize,
}

/// Encode a plan and its grid to a byte vector.
pub fn encode(
    plan: &RemixPlan,
    grid: &PatternGrid,
    settings: &ModuleSettings,
) -> Result<Vec<u8>, EncodeError> {
    let module = XmModule::from_plan(plan, grid, settings)?;
    Ok(module.to_bytes()?)
}

/// Encode a plan and its grid straight into a writer.
pub fn encode_to<W: Write>(
    writer: &mut W,
    plan: &RemixPlan,
    grid: &PatternGrid,
    settings: &ModuleSettings,
) -> Result<(), EncodeError> {
    let module = XmModule::from_plan(plan, grid, settings)?;
    module.write(writer)?;
    Ok(())
}

/// Build the grid for a plan and encode it.
pub fn encode_plan(plan: &RemixPlan, settings: &ModuleSettings) -> Result<Vec<u8>, EncodeError> {
    let grid = build_grid(plan)?;
    encode(plan, &grid, settings)
}

/// Build, encode and write a plan to `path`, replacing any existing file.
///
/// The module is written to a temporary file in the same directory and
/// renamed over `path` only after every byte has been flushed. On failure
/// the temporary file is removed and `path` is left untouched.
pub fn export_to_path(
    path: &Path,
    plan: &RemixPlan,
    settings: &ModuleSettings,
) -> Result<ExportReport, EncodeError> {
    let grid = build_grid(plan)?;
    let module = XmModule::from_plan(plan, &grid, settings)?;
    let bytes = module.to_bytes()?;
    debug!(
        bytes = bytes.len(),
        patterns = module.patterns.len(),
        instruments = module.instruments.len(),
        "encoded module"
    );

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| EncodeError::SinkWriteFailed(e.error))?;

    let report = ExportReport {
        size: bytes.len(),
        hash: blake3::hash(&bytes).to_hex().to_string(),
        num_patterns: module.header.num_patterns,
        num_instruments: module.header.num_instruments,
        occupied_cells: grid.occupied_cells(),
    };
    info!(path = %path.display(), size = report.size, "exported module");
    Ok(report)
}
