//! Analyze command implementation
//!
//! Detects slice boundaries in a WAV file and optionally writes them to a
//! slice file for later `plan`/`export --slices` runs.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use slicetrack_plan::Slice;
use std::path::Path;
use std::process::ExitCode;

use super::json_output;
use crate::input::{self, PipelineOptions};

/// What `analyze` found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResult {
    /// Input WAV path
    pub input: String,
    /// Rate the audio was analyzed at
    pub sample_rate: u32,
    /// Length of the audio in seconds
    pub duration_seconds: f64,
    /// Detected slices
    pub slices: Vec<Slice>,
    /// Slice file written, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_file: Option<String>,
}

/// Run the analyze command
///
/// # Arguments
/// * `input` - Path to the WAV file
/// * `out` - Optional slice file to write
/// * `options` - Sample rate and hop length
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    input: &str,
    out: Option<&str>,
    options: &PipelineOptions,
    json: bool,
) -> Result<ExitCode> {
    if json {
        return json_output::emit(analyze(Path::new(input), out.map(Path::new), options));
    }

    println!("{} {}", "Analyzing:".cyan().bold(), input);
    let result = analyze(Path::new(input), out.map(Path::new), options)?;

    println!(
        "{} {:.3}s at {} Hz",
        "Duration:".dimmed(),
        result.duration_seconds,
        result.sample_rate
    );
    for (i, slice) in result.slices.iter().enumerate() {
        println!("Slice {}: {:.3}s - {:.3}s", i, slice.start, slice.end);
    }
    if result.slices.is_empty() {
        println!("{}", "No slices detected".yellow());
    }
    if let Some(path) = &result.slice_file {
        println!(
            "\n{} {} slices to {}",
            "Wrote".green().bold(),
            result.slices.len(),
            path
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Detect slices and write them to `out` when given.
pub fn analyze(input: &Path, out: Option<&Path>, options: &PipelineOptions) -> Result<AnalyzeResult> {
    // A slice file in the options would bypass detection.
    let options = PipelineOptions {
        slices: None,
        ..options.clone()
    };
    let loaded = input::load_input(input, &options)?;

    if let Some(path) = out {
        input::write_slices(path, &loaded.slices)?;
    }

    Ok(AnalyzeResult {
        input: input.display().to_string(),
        sample_rate: loaded.config.sample_rate,
        duration_seconds: loaded.source.duration_seconds(),
        slices: loaded.slices,
        slice_file: out.map(|p| p.display().to_string()),
    })
}
