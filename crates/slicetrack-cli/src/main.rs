//! SliceTrack CLI - Slice a WAV file and remix it into an XM tracker module
//!
//! This binary provides commands for detecting slices, previewing them,
//! planning their placement and exporting the result as an XM file.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// Use modules from the library crate
use slicetrack_cli::audio::DEFAULT_HOP_LENGTH;
use slicetrack_cli::commands;
use slicetrack_cli::commands::export::ModuleOptions;
use slicetrack_cli::input::PipelineOptions;

/// SliceTrack - Onset slicing to XM modules
#[derive(Parser)]
#[command(name = "slicetrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log pipeline stages to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that plans slices.
#[derive(Args, Debug, Clone, PartialEq)]
struct PipelineArgs {
    /// Slice file (JSON) to use instead of onset detection
    #[arg(long)]
    slices: Option<String>,

    /// Planner config file (JSON)
    #[arg(long)]
    config: Option<String>,

    /// Sample rate for slice extraction (default: planner config, 22050)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Hop length in samples for onset detection
    #[arg(long, default_value_t = DEFAULT_HOP_LENGTH)]
    hop_length: usize,
}

impl PipelineArgs {
    fn options(&self) -> PipelineOptions {
        PipelineOptions {
            slices: self.slices.as_ref().map(PathBuf::from),
            config: self.config.as_ref().map(PathBuf::from),
            sample_rate: self.sample_rate,
            hop_length: self.hop_length,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect slices in a WAV file
    Analyze {
        /// Path to the input WAV file
        #[arg(short, long)]
        input: String,

        /// Write the slices to this JSON file
        #[arg(short, long)]
        out: Option<String>,

        /// Sample rate to analyze at (default: 22050)
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Hop length in samples for onset detection
        #[arg(long, default_value_t = DEFAULT_HOP_LENGTH)]
        hop_length: usize,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show where each slice lands in the pattern grid
    Plan {
        /// Path to the input WAV file
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Tempo hint in BPM, carried on the plan
        #[arg(long)]
        bpm: Option<f64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Slice, plan and write an XM module
    Export {
        /// Path to the input WAV file
        #[arg(short, long)]
        input: String,

        /// Path of the XM file to write (overwritten if it exists)
        #[arg(short, long)]
        out: String,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Song name (default: output file stem)
        #[arg(long)]
        song_name: Option<String>,

        /// Tempo header field
        #[arg(long, default_value_t = 125)]
        tempo: u16,

        /// Speed header field (ticks per row)
        #[arg(long, default_value_t = 6)]
        speed: u16,

        /// Pack pattern cells with only their non-zero fields
        #[arg(long)]
        compact_cells: bool,

        /// Tempo hint in BPM, carried on the plan
        #[arg(long)]
        bpm: Option<f64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Render one slice to WAV and play it
    Preview {
        /// Path to the input WAV file
        #[arg(short, long)]
        input: String,

        /// Index of the slice to render
        #[arg(long)]
        slice: usize,

        /// WAV file to write (default: slicetrack-preview.wav in the system temp dir, replaced by each preview)
        #[arg(short, long)]
        out: Option<String>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Write the WAV without opening a player
        #[arg(long)]
        no_open: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Read an XM module back and print its layout
    Inspect {
        /// Path to the XM file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            input,
            out,
            sample_rate,
            hop_length,
            json,
        } => {
            let options = PipelineOptions {
                sample_rate,
                hop_length,
                ..Default::default()
            };
            commands::analyze::run(&input, out.as_deref(), &options, json)
        }
        Commands::Plan {
            input,
            pipeline,
            bpm,
            json,
        } => commands::plan::run(&input, &pipeline.options(), bpm, json),
        Commands::Export {
            input,
            out,
            pipeline,
            song_name,
            tempo,
            speed,
            compact_cells,
            bpm,
            json,
        } => {
            let module = ModuleOptions {
                song_name,
                tempo,
                speed,
                compact_cells,
            };
            commands::export::run(&input, &out, &pipeline.options(), &module, bpm, json)
        }
        Commands::Preview {
            input,
            slice,
            out,
            pipeline,
            no_open,
            json,
        } => commands::preview::run(
            &input,
            slice,
            out.as_deref(),
            &pipeline.options(),
            no_open,
            json,
        ),
        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
