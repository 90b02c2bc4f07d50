use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::Band;
use crate::error::{AnalysisError, Result};

pub const DEFAULT_SAMPLING_RATE: f64 = 160.0;
pub const DEFAULT_FILTER_ORDER: usize = 4;
pub const DEFAULT_CHANNEL: &str = "O1..";

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What the aggregator does when one (subject, band) computation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole aggregation with the first error.
    #[default]
    FailFast,
    /// Leave the subject out of that band and record it in the table.
    SkipSubject,
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Everything the analysis needs from the outside world.
///
/// Every field has a default, so a JSON config file only needs the options
/// it changes:
///
/// ```json
/// { "closed_dir": "/data/eeg/closed", "open_dir": "/data/eeg/open", "channel": "Oz.." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub closed_dir: PathBuf,
    pub open_dir: PathBuf,
    /// Column loaded from every subject file.
    pub channel: String,
    /// Hz.
    pub sampling_rate: f64,
    pub filter_order: usize,
    pub bands: Vec<Band>,
    pub failure_policy: FailurePolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            closed_dir: PathBuf::from("data/closed"),
            open_dir: PathBuf::from("data/open"),
            channel: DEFAULT_CHANNEL.to_string(),
            sampling_rate: DEFAULT_SAMPLING_RATE,
            filter_order: DEFAULT_FILTER_ORDER,
            bands: Band::canonical(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file. Missing options keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| AnalysisError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "sampling_rate must be a positive number, got {}",
                self.sampling_rate
            )));
        }
        if self.filter_order == 0 {
            return Err(AnalysisError::InvalidParameter(
                "filter_order must be at least 1".to_string(),
            ));
        }
        if self.channel.trim().is_empty() {
            return Err(AnalysisError::InvalidParameter("channel must not be empty".to_string()));
        }
        if self.bands.is_empty() {
            return Err(AnalysisError::InvalidParameter("no bands configured".to_string()));
        }

        let mut seen = BTreeSet::new();
        for band in &self.bands {
            if band.name.trim().is_empty() {
                return Err(AnalysisError::InvalidParameter("band with empty name".to_string()));
            }
            if !seen.insert(band.name.as_str()) {
                return Err(AnalysisError::InvalidParameter(format!(
                    "band '{}' defined twice",
                    band.name
                )));
            }
            band.validate(self.sampling_rate)?;
        }
        Ok(())
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.name == name)
    }
}
