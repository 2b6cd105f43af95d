use clap::{Args, Parser, Subcommand};
use shield_core::ElementType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shield",
    version,
    about = "Ingest and condition headset EEG recordings",
    long_about = "Load headset EEG recordings of unknown binary layout, band-pass and notch filter them \
                  with zero phase, and repair amplitude artifacts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Condition a recording and write the cleaned signal
    Run(RunArgs),
    /// Show the files, metadata and inferred layout of a recording
    Inspect(InspectArgs),
    /// List recording directories under a dataset root
    List(ListArgs),
    /// Write a synthetic recording
    Synth(SynthArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Recording directory
    pub recording: PathBuf,

    /// Output file (default: <recording>/eeg_cleaned.json)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Pipeline configuration (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lower band edge in Hz
    #[arg(long)]
    pub low: Option<f64>,

    /// Upper band edge in Hz
    #[arg(long)]
    pub high: Option<f64>,

    /// Butterworth order
    #[arg(long)]
    pub order: Option<usize>,

    /// Notch frequency in Hz
    #[arg(long, conflicts_with = "no_notch")]
    pub notch: Option<f64>,

    /// Skip the notch stage
    #[arg(long)]
    pub no_notch: bool,

    /// Notch quality factor
    #[arg(long)]
    pub quality: Option<f64>,

    /// Artifact z-score threshold
    #[arg(long)]
    pub z_threshold: Option<f64>,

    /// Sample rate in Hz, overriding the metadata
    #[arg(long)]
    pub sample_rate: Option<f64>,

    /// Element type (float32, int16, int32), overriding the metadata
    #[arg(long)]
    pub dtype: Option<ElementType>,

    /// Channel count, overriding the metadata
    #[arg(long)]
    pub channels: Option<usize>,

    /// Omit the cleaned samples from the output
    #[arg(long)]
    pub summary_only: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Recording directory
    pub recording: PathBuf,
}

#[derive(Args)]
pub struct ListArgs {
    /// Dataset root holding a `recording` folder
    pub root: PathBuf,
}

#[derive(Args)]
pub struct SynthArgs {
    /// Dataset root to write into
    pub root: PathBuf,

    /// Number of channels
    #[arg(long, default_value_t = 8)]
    pub channels: usize,

    /// Recording length in seconds
    #[arg(long, default_value_t = 10.0)]
    pub seconds: f64,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 250.0)]
    pub sample_rate: f64,

    /// Mains frequency to inject
    #[arg(long, default_value_t = 50.0)]
    pub line_hz: f64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
