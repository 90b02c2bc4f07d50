use serde::Serialize;

use crate::analysis::{BandAggregator, SignalPowers};
use crate::config::AnalysisConfig;
use crate::data::loader::load_condition;
use crate::data::model::{BandPowerTable, Condition, SubjectCollection};
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Analysis session
// ---------------------------------------------------------------------------

/// Result of one closed-vs-open analysis run.
///
/// Built once by [`AnalysisSession::initialize`]; the two tables are only
/// handed out by shared reference afterwards.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    config: AnalysisConfig,
    closed_avg_band: BandPowerTable,
    open_avg_band: BandPowerTable,
    closed_subjects: usize,
    open_subjects: usize,
}

/// One row of the closed/open comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandComparison {
    pub band: String,
    pub low: f64,
    pub high: f64,
    pub closed: f64,
    pub open: f64,
    /// `closed / open`; `None` when open power is zero.
    pub ratio: Option<f64>,
}

impl BandComparison {
    fn new(band: &str, (low, high): (f64, f64), closed: f64, open: f64) -> Self {
        BandComparison {
            band: band.to_string(),
            low,
            high,
            closed,
            open,
            ratio: (open != 0.0).then(|| closed / open),
        }
    }

    /// Pair the band powers of one closed and one open recording by band name.
    pub fn between(closed: &SignalPowers, open: &SignalPowers) -> Vec<BandComparison> {
        closed
            .bands
            .iter()
            .filter_map(|c| {
                let o = open.bands.iter().find(|o| o.band == c.band)?;
                Some(Self::new(&c.band, (c.low, c.high), c.power, o.power))
            })
            .collect()
    }
}

impl AnalysisSession {
    /// Validate `config`, load both condition folders and compute the tables.
    pub fn initialize(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let closed = load_condition(&config.closed_dir, Condition::Closed, &config.channel)?;
        let open = load_condition(&config.open_dir, Condition::Open, &config.channel)?;
        Self::from_collections(config, &closed, &open)
    }

    /// Same as [`Self::initialize`] for collections already in memory.
    pub fn from_collections(
        config: AnalysisConfig,
        closed: &SubjectCollection,
        open: &SubjectCollection,
    ) -> Result<Self> {
        config.validate()?;
        for (coll, expected) in [(closed, Condition::Closed), (open, Condition::Open)] {
            if coll.condition != expected {
                return Err(AnalysisError::InvalidParameter(format!(
                    "expected a {expected} collection, got {}",
                    coll.condition
                )));
            }
        }

        let aggregator = BandAggregator::from_config(&config);
        let closed_avg_band = aggregator.analyze(closed)?;
        let open_avg_band = aggregator.analyze(open)?;

        Ok(Self {
            config,
            closed_avg_band,
            open_avg_band,
            closed_subjects: closed.len(),
            open_subjects: open.len(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn closed_avg_band(&self) -> &BandPowerTable {
        &self.closed_avg_band
    }

    pub fn open_avg_band(&self) -> &BandPowerTable {
        &self.open_avg_band
    }

    pub fn table(&self, condition: Condition) -> &BandPowerTable {
        match condition {
            Condition::Closed => &self.closed_avg_band,
            Condition::Open => &self.open_avg_band,
        }
    }

    /// Subjects loaded per condition, before any were skipped.
    pub fn subject_counts(&self) -> (usize, usize) {
        (self.closed_subjects, self.open_subjects)
    }

    /// Closed and open averages side by side, in band order.
    pub fn comparison(&self) -> Vec<BandComparison> {
        self.closed_avg_band
            .iter()
            .filter_map(|closed| {
                let open = self.open_avg_band.get(&closed.band)?;
                let edges = (closed.low, closed.high);
                Some(BandComparison::new(&closed.band, edges, closed.power, open))
            })
            .collect()
    }
}
