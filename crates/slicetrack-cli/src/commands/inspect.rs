//! Inspect command implementation
//!
//! Reads an XM module back and prints what its headers declare.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use slicetrack_backend_xm::xm::{read_summary, XmSummary};
use std::fs;
use std::process::ExitCode;

use super::json_output;

/// What `inspect` found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectResult {
    pub input: String,
    pub size: usize,
    /// BLAKE3 hash of the file
    pub hash: String,
    pub module: XmSummary,
}

/// Run the inspect command
///
/// # Arguments
/// * `input` - Path to the XM file
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(input: &str, json: bool) -> Result<ExitCode> {
    if json {
        return json_output::emit(inspect(input));
    }

    let result = inspect(input)?;
    let module = &result.module;

    println!("{} {}", "Module:".cyan().bold(), result.input);
    println!("  {} {} bytes", "Size:".dimmed(), result.size);
    println!("  {} {}", "BLAKE3:".dimmed(), result.hash);
    println!("  {} {}", "Song name:".dimmed(), module.song_name);
    println!("  {} {}", "Tracker:".dimmed(), module.tracker_name);
    println!(
        "  {} {} channels, {} patterns, {} instruments",
        "Layout:".dimmed(),
        module.num_channels,
        module.num_patterns,
        module.num_instruments
    );
    println!(
        "  {} tempo {}, speed {}",
        "Timing:".dimmed(),
        module.tempo,
        module.speed
    );

    println!("\n{}", "Patterns:".cyan().bold());
    for (i, pattern) in module.patterns.iter().enumerate() {
        println!(
            "  {:>3}: {} rows, {} packed bytes",
            i, pattern.num_rows, pattern.packed_size
        );
    }

    if !module.instruments.is_empty() {
        println!("\n{}", "Instruments:".cyan().bold());
        for (i, inst) in module.instruments.iter().enumerate() {
            println!(
                "  {:>3}: {} ({}) {} frames",
                i + 1,
                inst.name,
                inst.sample_name,
                inst.sample_length
            );
        }
    }

    if module.trailing_bytes > 0 {
        println!(
            "\n{} {} trailing bytes after the last instrument",
            "WARN".yellow().bold(),
            module.trailing_bytes
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Read and parse a module file.
pub fn inspect(input: &str) -> Result<InspectResult> {
    let bytes = fs::read(input).with_context(|| format!("Failed to read module: {}", input))?;
    let module =
        read_summary(&bytes).with_context(|| format!("Failed to parse module: {}", input))?;

    Ok(InspectResult {
        input: input.to_string(),
        size: bytes.len(),
        hash: blake3::hash(&bytes).to_hex().to_string(),
        module,
    })
}
