use std::fmt;
use std::ops::{Deref, Index};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Signal – one channel of one recording
// ---------------------------------------------------------------------------

/// A single-channel time series sampled at the session's sampling rate.
///
/// Always holds at least one sample and every sample is finite. Immutable
/// once built; filtering produces a new buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
}

impl Signal {
    pub fn new(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptySignal);
        }
        if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFiniteSample { index });
        }
        Ok(Signal { samples })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Duration in seconds at the given sampling rate.
    pub fn duration(&self, sampling_rate: f64) -> f64 {
        self.samples.len() as f64 / sampling_rate
    }
}

impl Deref for Signal {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.samples
    }
}

impl AsRef<[f64]> for Signal {
    fn as_ref(&self) -> &[f64] {
        &self.samples
    }
}

// ---------------------------------------------------------------------------
// Band – named frequency interval
// ---------------------------------------------------------------------------

/// A named frequency interval `(low, high)` in Hz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub name: String,
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn new(name: impl Into<String>, low: f64, high: f64) -> Self {
        Band {
            name: name.into(),
            low,
            high,
        }
    }

    /// Delta, Theta, Alpha, Beta and Gamma, in ascending frequency order.
    pub fn canonical() -> Vec<Band> {
        vec![
            Band::new("Delta", 0.5, 4.0),
            Band::new("Theta", 4.0, 8.0),
            Band::new("Alpha", 8.0, 13.0),
            Band::new("Beta", 13.0, 30.0),
            Band::new("Gamma", 30.0, 45.0),
        ]
    }

    /// Check `0 < low < high < sampling_rate / 2`.
    pub fn validate(&self, sampling_rate: f64) -> Result<()> {
        crate::dsp::check_cutoffs(self.low, self.high, sampling_rate)
            .map_err(|e| e.for_band(&self.name))
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-{} Hz)", self.name, self.low, self.high)
    }
}

// ---------------------------------------------------------------------------
// Condition / Subject / SubjectCollection
// ---------------------------------------------------------------------------

/// Experimental state the recording was taken under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Closed,
    Open,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Closed => write!(f, "eyes-closed"),
            Condition::Open => write!(f, "eyes-open"),
        }
    }
}

/// One subject's recording for one condition.
#[derive(Debug, Clone)]
pub struct Subject {
    /// File stem, e.g. `S001`.
    pub id: String,
    /// Where the signal was read from, if it came from disk.
    pub path: Option<PathBuf>,
    pub signal: Signal,
}

impl Subject {
    pub fn new(id: impl Into<String>, signal: Signal) -> Self {
        Subject {
            id: id.into(),
            path: None,
            signal,
        }
    }

    /// File path if known, otherwise the id. Used in error context.
    pub fn label(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => self.id.clone(),
        }
    }
}

/// All subjects recorded under one condition, in load order.
#[derive(Debug, Clone)]
pub struct SubjectCollection {
    pub condition: Condition,
    subjects: Vec<Subject>,
}

impl SubjectCollection {
    pub fn new(condition: Condition, subjects: Vec<Subject>) -> Self {
        SubjectCollection {
            condition,
            subjects,
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

// ---------------------------------------------------------------------------
// BandPowerTable – per-condition result
// ---------------------------------------------------------------------------

/// Average power of one band across a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPower {
    pub band: String,
    pub low: f64,
    pub high: f64,
    /// Arithmetic mean of the per-subject powers.
    pub power: f64,
    /// Number of subjects that went into `power`.
    pub subjects: usize,
    /// Subjects left out under the skip policy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// Band name → average power for one condition, in band definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPowerTable {
    pub condition: Condition,
    entries: Vec<BandPower>,
}

impl BandPowerTable {
    pub(crate) fn new(condition: Condition, entries: Vec<BandPower>) -> Self {
        BandPowerTable { condition, entries }
    }

    /// Average power for the named band.
    pub fn get(&self, band: &str) -> Option<f64> {
        self.entry(band).map(|e| e.power)
    }

    pub fn entry(&self, band: &str) -> Option<&BandPower> {
        self.entries.iter().find(|e| e.band == band)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BandPower> {
        self.entries.iter()
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.band.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any band was averaged over fewer subjects than were loaded.
    pub fn is_partial(&self) -> bool {
        self.entries.iter().any(|e| !e.skipped.is_empty())
    }
}

impl Index<&str> for BandPowerTable {
    type Output = f64;

    fn index(&self, band: &str) -> &f64 {
        match self.entry(band) {
            Some(e) => &e.power,
            None => panic!("no band named '{band}' in {} table", self.condition),
        }
    }
}
