//! Band power comparison of eyes-closed and eyes-open EEG recordings.
//!
//! ```no_run
//! use eeg_band_analyzer::{AnalysisConfig, AnalysisSession};
//!
//! let session = AnalysisSession::initialize(AnalysisConfig::default())?;
//! println!("closed alpha: {}", session.closed_avg_band()["Alpha"]);
//! println!("open alpha:   {}", session.open_avg_band()["Alpha"]);
//! # Ok::<(), eeg_band_analyzer::AnalysisError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod dsp;
pub mod error;
pub mod state;

pub use analysis::{analyze, band_powers, BandAggregator, SignalPowers};
pub use config::{AnalysisConfig, FailurePolicy};
pub use data::loader::{list_channels, load_channel, load_channel_from_reader, load_condition};
pub use data::model::{
    Band, BandPower, BandPowerTable, Condition, Signal, Subject, SubjectCollection,
};
pub use dsp::{bandpass, compute_power, BandpassFilter};
pub use error::{AnalysisError, Result};
pub use state::{AnalysisSession, BandComparison};
