//! Loading the inputs of a run: audio, slice lists and planner config.
//!
//! Slice files are JSON arrays of `{ "start": f64, "end": f64 }` objects,
//! as written by `slicetrack analyze --out`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use slicetrack_plan::{PlannerConfig, Slice};
use tracing::debug;

use crate::audio::{detect_slices, WavSource, DEFAULT_HOP_LENGTH};

/// Where slices and planner settings come from.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Slice file to use instead of onset detection.
    pub slices: Option<PathBuf>,
    /// Planner config JSON file.
    pub config: Option<PathBuf>,
    /// Overrides the config's sample rate.
    pub sample_rate: Option<u32>,
    /// Hop length for onset detection.
    pub hop_length: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            slices: None,
            config: None,
            sample_rate: None,
            hop_length: DEFAULT_HOP_LENGTH,
        }
    }
}

/// Decoded audio plus the slices and config to plan it with.
#[derive(Debug)]
pub struct LoadedInput {
    pub source: WavSource,
    pub slices: Vec<Slice>,
    pub config: PlannerConfig,
}

/// Read a slice file and validate every entry.
pub fn read_slices(path: &Path) -> Result<Vec<Slice>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read slice file: {}", path.display()))?;
    let slices: Vec<Slice> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse slice file: {}", path.display()))?;
    for (i, slice) in slices.iter().enumerate() {
        slice
            .validate()
            .with_context(|| format!("Invalid slice {} in {}", i, path.display()))?;
    }
    Ok(slices)
}

/// Write slices as pretty-printed JSON.
pub fn write_slices(path: &Path, slices: &[Slice]) -> Result<()> {
    let json = serde_json::to_string_pretty(slices)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write slice file: {}", path.display()))
}

/// Load the planner config, applying the sample rate override.
pub fn load_config(options: &PipelineOptions) -> Result<PlannerConfig> {
    let mut config = match &options.config {
        Some(path) => PlannerConfig::from_path(path)
            .with_context(|| format!("Failed to load planner config: {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(rate) = options.sample_rate {
        config.sample_rate = rate;
    }
    config.validate()?;
    Ok(config)
}

/// Open the WAV file and settle on a slice list.
///
/// Slices come from `options.slices` when set, otherwise from onset
/// detection on the audio resampled to the planner's rate.
pub fn load_input(input: &Path, options: &PipelineOptions) -> Result<LoadedInput> {
    let config = load_config(options)?;
    let mut source = WavSource::open(input)?;

    let slices = match &options.slices {
        Some(path) => read_slices(path)?,
        None => {
            let samples = source.at_rate(config.sample_rate);
            detect_slices(samples, config.sample_rate, options.hop_length)
        }
    };
    debug!(
        input = %input.display(),
        slices = slices.len(),
        sample_rate = config.sample_rate,
        "loaded input"
    );

    Ok(LoadedInput {
        source,
        slices,
        config,
    })
}
