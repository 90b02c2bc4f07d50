use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use eeg_band_analyzer::config::{DEFAULT_CHANNEL, DEFAULT_FILTER_ORDER, DEFAULT_SAMPLING_RATE};

#[derive(Parser)]
#[command(
    name = "eeg-analyzer",
    version,
    about = "Compare EEG band power between eyes-closed and eyes-open recordings",
    long_about = "Loads one CSV per subject from an eyes-closed and an eyes-open folder,\n\
                  isolates the Delta, Theta, Alpha, Beta and Gamma bands with a zero-phase\n\
                  Butterworth bandpass and reports the average power per band."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Average band power per condition across all subjects
    Compare(CompareArgs),
    /// Band power of a single recording, or of a closed/open pair
    BandPower(BandPowerArgs),
    /// List the channel columns of a recording
    Channels(ChannelsArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Folder with one CSV per subject, eyes closed
    #[arg(long, env = "EEG_CLOSED_DIR")]
    pub closed_dir: Option<PathBuf>,

    /// Folder with one CSV per subject, eyes open
    #[arg(long, env = "EEG_OPEN_DIR")]
    pub open_dir: Option<PathBuf>,

    /// Channel column to analyse
    #[arg(long, env = "EEG_CHANNEL")]
    pub channel: Option<String>,

    /// Sampling rate in Hz
    #[arg(long)]
    pub sampling_rate: Option<f64>,

    /// Butterworth filter order
    #[arg(long)]
    pub order: Option<usize>,

    /// Leave out subjects that fail for a band instead of aborting
    #[arg(long)]
    pub skip_failed: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BandPowerArgs {
    /// CSV recording
    pub file: PathBuf,

    /// Channel column to analyse
    #[arg(long, env = "EEG_CHANNEL", default_value = DEFAULT_CHANNEL)]
    pub channel: String,

    /// Only these bands (repeatable); all five by default
    #[arg(long = "band")]
    pub bands: Vec<String>,

    /// Eyes-open recording of the same subject; FILE is then the eyes-closed one
    #[arg(long, value_name = "OPEN_FILE")]
    pub compare: Option<PathBuf>,

    /// Sampling rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLING_RATE)]
    pub sampling_rate: f64,

    /// Butterworth filter order
    #[arg(long, default_value_t = DEFAULT_FILTER_ORDER)]
    pub order: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ChannelsArgs {
    /// CSV recording
    pub file: PathBuf,

    /// Print JSON instead of one name per line
    #[arg(long)]
    pub json: bool,
}
