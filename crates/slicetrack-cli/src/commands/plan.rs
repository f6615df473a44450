//! Plan command implementation
//!
//! Runs slicing and the timeline planner, and prints where every slice
//! lands without writing a module.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use slicetrack_plan::{NoteEvent, RemixPlan, Slice};
use std::path::Path;
use std::process::ExitCode;

use super::json_output;
use crate::input::{self, PipelineOptions};

/// JSON view of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummary {
    pub input: String,
    pub sample_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm_hint: Option<f64>,
    pub channel_count: usize,
    pub pattern_count: usize,
    pub rows_per_pattern: usize,
    pub slices: Vec<Slice>,
    pub notes: Vec<NoteEvent>,
    /// Sample frames per slice
    pub sample_lengths: Vec<usize>,
}

/// Run the plan command
///
/// # Arguments
/// * `input` - Path to the WAV file
/// * `options` - Slice file, planner config and rates
/// * `bpm` - Tempo hint carried on the plan
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(input: &str, options: &PipelineOptions, bpm: Option<f64>, json: bool) -> Result<ExitCode> {
    if json {
        return json_output::emit(
            build_plan(Path::new(input), options, bpm).map(|planned| summarize(input, planned)),
        );
    }

    println!("{} {}", "Planning:".cyan().bold(), input);
    let Planned { slices, remix, .. } = build_plan(Path::new(input), options, bpm)?;

    for (i, note) in remix.notes.iter().enumerate() {
        println!(
            "Note {}: slice {} -> pitch {} pat{} row{}",
            i, note.slice_index, note.pitch, note.pattern_index, note.row
        );
    }
    println!(
        "\n{} {} slices over {} patterns x {} rows x {} channels",
        "Planned".green().bold(),
        slices.len(),
        remix.pattern_count,
        remix.rows_per_pattern,
        remix.channel_count
    );

    Ok(ExitCode::SUCCESS)
}

/// Slices and the plan built from them.
#[derive(Debug)]
pub struct Planned {
    pub slices: Vec<Slice>,
    pub remix: RemixPlan,
    pub sample_rate: u32,
}

/// Load the input, settle on slices and plan them.
pub fn build_plan(input: &Path, options: &PipelineOptions, bpm: Option<f64>) -> Result<Planned> {
    let mut loaded = input::load_input(input, options)?;
    let remix = slicetrack_plan::plan(&loaded.slices, &mut loaded.source, bpm, &loaded.config)
        .with_context(|| format!("Failed to plan {}", input.display()))?;
    Ok(Planned {
        slices: loaded.slices,
        remix,
        sample_rate: loaded.config.sample_rate,
    })
}

fn summarize(input: &str, planned: Planned) -> PlanSummary {
    let Planned {
        slices,
        remix,
        sample_rate,
    } = planned;
    PlanSummary {
        input: input.to_string(),
        sample_rate,
        bpm_hint: remix.bpm_hint,
        channel_count: remix.channel_count,
        pattern_count: remix.pattern_count,
        rows_per_pattern: remix.rows_per_pattern,
        slices,
        sample_lengths: remix.sample_buffers.iter().map(|b| b.len()).collect(),
        notes: remix.notes,
    }
}
