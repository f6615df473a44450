//! Preview command implementation
//!
//! Renders one slice to a WAV file and opens it with the system's default
//! player. Without `--out` the file is a single fixed path in the system
//! temp dir that each preview replaces.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use slicetrack_plan::SampleBuffer;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::json_output::{self, SliceIndexError};
use crate::audio::write_wav;
use crate::input::{self, PipelineOptions};

/// What `preview` rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewResult {
    pub slice_index: usize,
    pub start: f64,
    pub end: f64,
    pub sample_rate: u32,
    /// Sample frames written
    pub frames: usize,
    pub output: String,
}

/// File name used in the system temp dir when no `--out` is given.
///
/// Every preview replaces it, so at most one preview file is left behind.
pub const PREVIEW_FILE_NAME: &str = "slicetrack-preview.wav";

/// Run the preview command
///
/// The player is launched in both output modes unless `no_open` is set.
///
/// # Arguments
/// * `input` - Path to the audio file
/// * `slice_index` - Slice to render
/// * `out` - WAV path to write; [`default_preview_path`] when absent
/// * `options` - Slice file, planner config and rates
/// * `no_open` - Skip launching the system player
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    input: &str,
    slice_index: usize,
    out: Option<&str>,
    options: &PipelineOptions,
    no_open: bool,
    json: bool,
) -> Result<ExitCode> {
    let result = preview_and_play(
        Path::new(input),
        slice_index,
        out.map(Path::new),
        options,
        no_open,
        |path| open::that(path),
    );
    if json {
        return json_output::emit(result);
    }

    let result = result?;
    println!(
        "{} slice {}: {:.3}s - {:.3}s ({} frames at {} Hz)",
        "Preview:".cyan().bold(),
        result.slice_index,
        result.start,
        result.end,
        result.frames,
        result.sample_rate
    );
    println!("{} {}", "Wrote".green().bold(), result.output);

    Ok(ExitCode::SUCCESS)
}

/// Render the slice, then hand the file to `player` unless `no_open`.
pub fn preview_and_play<F>(
    input: &Path,
    slice_index: usize,
    out: Option<&Path>,
    options: &PipelineOptions,
    no_open: bool,
    player: F,
) -> Result<PreviewResult>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let result = preview(input, slice_index, out, options)?;
    if !no_open {
        player(Path::new(&result.output))
            .with_context(|| format!("Failed to open {}", result.output))?;
    }
    Ok(result)
}

/// Extract slice `slice_index` and write it as a 16-bit mono WAV.
pub fn preview(
    input: &Path,
    slice_index: usize,
    out: Option<&Path>,
    options: &PipelineOptions,
) -> Result<PreviewResult> {
    let mut loaded = input::load_input(input, options)?;
    let slice = *loaded
        .slices
        .get(slice_index)
        .ok_or(SliceIndexError {
            index: slice_index,
            count: loaded.slices.len(),
        })?;

    let rate = loaded.config.sample_rate;
    let buffer = loaded
        .source
        .load_samples(slice.start, slice.duration(), rate)?;

    let path = match out {
        Some(path) => {
            write_wav(path, &buffer)?;
            path.to_path_buf()
        }
        None => {
            let path = default_preview_path();
            replace_preview(&path, &buffer)?;
            path
        }
    };

    Ok(PreviewResult {
        slice_index,
        start: slice.start,
        end: slice.end,
        sample_rate: rate,
        frames: buffer.len(),
        output: path.display().to_string(),
    })
}

/// Where previews go when no output path is given.
pub fn default_preview_path() -> PathBuf {
    std::env::temp_dir().join(PREVIEW_FILE_NAME)
}

/// Write next to `path` and rename over it, so a player still reading the
/// previous preview never sees a half-written file.
fn replace_preview(path: &Path, buffer: &SampleBuffer) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let temp = tempfile::Builder::new()
        .prefix("slicetrack-preview-")
        .suffix(".wav")
        .tempfile_in(dir)
        .context("Failed to create temp file for preview")?;
    write_wav(temp.path(), buffer)?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
