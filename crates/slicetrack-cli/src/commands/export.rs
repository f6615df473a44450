//! Export command implementation
//!
//! Runs the whole pipeline: slice, plan, lay out the grid and write the XM
//! module.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use slicetrack_backend_xm::xm::{CellPacking, ModuleSettings};
use slicetrack_backend_xm::export_to_path;
use std::path::Path;
use std::process::ExitCode;

use super::json_output;
use super::plan::{build_plan, Planned};
use crate::input::PipelineOptions;

/// Module header settings taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOptions {
    /// Song name; the output file stem when absent.
    pub song_name: Option<String>,
    pub tempo: u16,
    pub speed: u16,
    /// Use compact cell packing.
    pub compact_cells: bool,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        let settings = ModuleSettings::default();
        Self {
            song_name: None,
            tempo: settings.tempo,
            speed: settings.speed,
            compact_cells: false,
        }
    }
}

impl ModuleOptions {
    /// Resolve into encoder settings for a module written to `out`.
    pub fn settings_for(&self, out: &Path) -> ModuleSettings {
        let song_name = self.song_name.clone().unwrap_or_else(|| {
            out.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        ModuleSettings {
            song_name,
            tempo: self.tempo,
            speed: self.speed,
            cell_packing: if self.compact_cells {
                CellPacking::Compact
            } else {
                CellPacking::Full
            },
        }
    }
}

/// What `export` wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportResult {
    pub input: String,
    pub output: String,
    pub song_name: String,
    pub slices: usize,
    pub num_patterns: u16,
    pub num_instruments: u16,
    pub occupied_cells: usize,
    /// Bytes written
    pub size: usize,
    /// BLAKE3 hash of the module
    pub hash: String,
}

/// Run the export command
///
/// # Arguments
/// * `input` - Path to the WAV file
/// * `out` - Path of the XM module to write
/// * `options` - Slice file, planner config and rates
/// * `module` - Header settings
/// * `bpm` - Tempo hint carried on the plan
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    input: &str,
    out: &str,
    options: &PipelineOptions,
    module: &ModuleOptions,
    bpm: Option<f64>,
    json: bool,
) -> Result<ExitCode> {
    if json {
        return json_output::emit(export(
            Path::new(input),
            Path::new(out),
            options,
            module,
            bpm,
        ));
    }

    println!("{} {}", "Exporting:".cyan().bold(), input);
    let result = export(Path::new(input), Path::new(out), options, module, bpm)?;

    println!("  {} {}", "Slices:".dimmed(), result.slices);
    println!(
        "  {} {} patterns, {} instruments, {} cells",
        "Module:".dimmed(),
        result.num_patterns,
        result.num_instruments,
        result.occupied_cells
    );
    if result.occupied_cells < result.slices {
        println!(
            "  {} {} slices were overwritten by later slices on the same row",
            "WARN".yellow().bold(),
            result.slices - result.occupied_cells
        );
    }
    println!(
        "\n{} {} ({} bytes)",
        "Wrote".green().bold(),
        result.output,
        result.size
    );
    println!("{} {}", "BLAKE3:".dimmed(), result.hash);

    Ok(ExitCode::SUCCESS)
}

/// Build and write the module.
pub fn export(
    input: &Path,
    out: &Path,
    options: &PipelineOptions,
    module: &ModuleOptions,
    bpm: Option<f64>,
) -> Result<ExportResult> {
    let Planned { slices, remix, .. } = build_plan(input, options, bpm)?;
    let settings = module.settings_for(out);
    let report = export_to_path(out, &remix, &settings)
        .with_context(|| format!("Failed to write module: {}", out.display()))?;

    Ok(ExportResult {
        input: input.display().to_string(),
        output: out.display().to_string(),
        song_name: settings.song_name,
        slices: slices.len(),
        num_patterns: report.num_patterns,
        num_instruments: report.num_instruments,
        occupied_cells: report.occupied_cells,
        size: report.size,
        hash: report.hash,
    })
}
