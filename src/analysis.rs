use rayon::prelude::*;
use serde::Serialize;

use crate::config::{AnalysisConfig, FailurePolicy};
use crate::data::model::{Band, BandPower, BandPowerTable, SubjectCollection};
use crate::dsp::{compute_power, BandpassFilter};
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// BandAggregator – filter + power over every (subject, band) pair
// ---------------------------------------------------------------------------

/// Computes per-band average power across a [`SubjectCollection`].
#[derive(Debug, Clone)]
pub struct BandAggregator {
    bands: Vec<Band>,
    sampling_rate: f64,
    order: usize,
    policy: FailurePolicy,
}

impl BandAggregator {
    pub fn new(bands: Vec<Band>, sampling_rate: f64, order: usize) -> Self {
        Self {
            bands,
            sampling_rate,
            order,
            policy: FailurePolicy::FailFast,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        let bands = config.bands.clone();
        Self::new(bands, config.sampling_rate, config.filter_order)
            .with_policy(config.failure_policy)
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Average band power over every subject in `collection`.
    ///
    /// The table is built completely before it is returned; on error nothing
    /// is returned. Subjects are processed in parallel, but the mean is
    /// computed from sorted values so the result does not depend on subject
    /// or completion order.
    pub fn analyze(&self, collection: &SubjectCollection) -> Result<BandPowerTable> {
        if collection.is_empty() {
            return Err(AnalysisError::NoSubjects {
                condition: collection.condition.to_string(),
            });
        }

        let mut entries = Vec::with_capacity(self.bands.len());
        for band in &self.bands {
            let entry = self.analyze_band(collection, band)?;
            log::debug!(
                "{} {}: {:.4} over {} subjects",
                collection.condition,
                band.name,
                entry.power,
                entry.subjects
            );
            entries.push(entry);
        }

        log::info!(
            "Computed {} band averages for {} {} subjects",
            entries.len(),
            collection.len(),
            collection.condition
        );
        Ok(BandPowerTable::new(collection.condition, entries))
    }

    fn analyze_band(&self, collection: &SubjectCollection, band: &Band) -> Result<BandPower> {
        let filter = BandpassFilter::for_band(band, self.sampling_rate, self.order)?;

        let results: Vec<Result<f64>> = collection
            .subjects()
            .par_iter()
            .map(|subject| compute_power(&filter.filtfilt(&subject.signal)?))
            .collect();

        let mut powers = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        let mut first_error = None;
        for (subject, result) in collection.subjects().iter().zip(results) {
            match result {
                Ok(power) => powers.push(power),
                Err(e) => {
                    let e = e.for_subject(&subject.label(), &band.name);
                    match self.policy {
                        FailurePolicy::FailFast => return Err(e),
                        FailurePolicy::SkipSubject => {
                            log::warn!("Skipping {e}");
                            skipped.push(subject.id.clone());
                            first_error.get_or_insert(e);
                        }
                    }
                }
            }
        }

        if powers.is_empty() {
            return Err(first_error.unwrap_or_else(|| AnalysisError::NoSubjects {
                condition: collection.condition.to_string(),
            }));
        }

        powers.sort_by(f64::total_cmp);
        let power = powers.iter().sum::<f64>() / powers.len() as f64;

        Ok(BandPower {
            band: band.name.clone(),
            low: band.low,
            high: band.high,
            power,
            subjects: powers.len(),
            skipped,
        })
    }
}

/// Fail-fast band averages of `collection`.
pub fn analyze(
    collection: &SubjectCollection,
    bands: &[Band],
    sampling_rate: f64,
    order: usize,
) -> Result<BandPowerTable> {
    BandAggregator::new(bands.to_vec(), sampling_rate, order).analyze(collection)
}

// ---------------------------------------------------------------------------
// Single-signal view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SignalBandPower {
    pub band: String,
    pub low: f64,
    pub high: f64,
    pub power: f64,
}

/// Band powers of one signal, plus its unfiltered power.
#[derive(Debug, Clone, Serialize)]
pub struct SignalPowers {
    pub broadband: f64,
    pub bands: Vec<SignalBandPower>,
}

pub fn band_powers(
    signal: &[f64],
    bands: &[Band],
    sampling_rate: f64,
    order: usize,
) -> Result<SignalPowers> {
    let broadband = compute_power(signal)?;
    let bands = bands
        .iter()
        .map(|band| -> Result<SignalBandPower> {
            let filter = BandpassFilter::for_band(band, sampling_rate, order)?;
            let filtered = filter.filtfilt(signal)?;
            Ok(SignalBandPower {
                band: band.name.clone(),
                low: band.low,
                high: band.high,
                power: compute_power(&filtered)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SignalPowers { broadband, bands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Condition, Signal, Subject};
    use std::f64::consts::PI;

    const FS: f64 = 160.0;

    fn subject(id: &str, freq: f64, amplitude: f64, n: usize) -> Subject {
        let samples = (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / FS).sin())
            .collect();
        Subject::new(id, Signal::new(samples).unwrap())
    }

    fn collection(subjects: Vec<Subject>) -> SubjectCollection {
        SubjectCollection::new(Condition::Closed, subjects)
    }

    #[test]
    fn empty_collection_is_error() {
        let err = analyze(&collection(vec![]), &Band::canonical(), FS, 4).unwrap_err();
        assert!(matches!(err, AnalysisError::NoSubjects { .. }));
    }

    #[test]
    fn mean_over_subjects() {
        let coll = collection(vec![
            subject("S001", 10.0, 1.0, 3200),
            subject("S002", 10.0, 2.0, 3200),
        ]);
        let table = analyze(&coll, &Band::canonical(), FS, 4).unwrap();
        assert_eq!(
            table.band_names(),
            vec!["Delta", "Theta", "Alpha", "Beta", "Gamma"]
        );
        // Sine power is A^2 / 2: (0.5 + 2.0) / 2.
        let alpha = table["Alpha"];
        assert!((alpha - 1.25).abs() < 0.02 * 1.25, "alpha {alpha}");
        assert_eq!(table.entry("Alpha").unwrap().subjects, 2);
    }

    #[test]
    fn subject_order_does_not_matter() {
        let subjects = vec![
            subject("S001", 6.0, 1.0, 1600),
            subject("S002", 10.0, 2.5, 2000),
            subject("S003", 20.0, 0.7, 1800),
            subject("S004", 35.0, 1.3, 2400),
        ];
        let mut reversed = subjects.clone();
        reversed.reverse();
        let mut rotated = subjects.clone();
        rotated.rotate_left(1);

        let bands = Band::canonical();
        let a = analyze(&collection(subjects), &bands, FS, 4).unwrap();
        for perm in [reversed, rotated] {
            let b = analyze(&collection(perm), &bands, FS, 4).unwrap();
            for band in &bands {
                assert_eq!(a.get(&band.name), b.get(&band.name), "{}", band.name);
            }
        }
    }

    #[test]
    fn fail_fast_names_subject_and_band() {
        let coll = collection(vec![
            subject("S001", 10.0, 1.0, 3200),
            subject("S002", 10.0, 1.0, 20),
        ]);
        let err = analyze(&coll, &Band::canonical(), FS, 4).unwrap_err();
        match &err {
            AnalysisError::Subject { subject, band, .. } => {
                assert_eq!(subject, "S002");
                assert_eq!(band, "Delta");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            err.root(),
            AnalysisError::SignalTooShort { len: 20, .. }
        ));
    }

    #[test]
    fn skip_policy_records_reduced_count() {
        let coll = collection(vec![
            subject("S001", 10.0, 1.0, 3200),
            subject("S002", 10.0, 1.0, 20),
            subject("S003", 10.0, 1.0, 3200),
        ]);
        let table = BandAggregator::new(Band::canonical(), FS, 4)
            .with_policy(FailurePolicy::SkipSubject)
            .analyze(&coll)
            .unwrap();
        assert!(table.is_partial());
        for entry in table.iter() {
            assert_eq!(entry.subjects, 2);
            assert_eq!(entry.skipped, vec!["S002".to_string()]);
        }
    }

    #[test]
    fn skip_policy_with_nothing_left_fails() {
        let coll = collection(vec![subject("S001", 10.0, 1.0, 20)]);
        let err = BandAggregator::new(Band::canonical(), FS, 4)
            .with_policy(FailurePolicy::SkipSubject)
            .analyze(&coll)
            .unwrap_err();
        assert!(matches!(err.root(), AnalysisError::SignalTooShort { .. }));
    }

    #[test]
    fn invalid_band_stops_analysis() {
        let coll = collection(vec![subject("S001", 10.0, 1.0, 3200)]);
        let bands = vec![Band::new("Broken", 30.0, 80.0)];
        let err = analyze(&coll, &bands, FS, 4).unwrap_err();
        assert!(err.to_string().starts_with("band Broken: "), "{err}");
        assert!(matches!(err.root(), AnalysisError::InvalidBand { .. }));

        let err = band_powers(&coll.subjects()[0].signal, &bands, FS, 4).unwrap_err();
        assert!(err.to_string().starts_with("band Broken: "), "{err}");
    }

    #[test]
    fn single_signal_band_powers() {
        let s = subject("S001", 10.0, 2.0, 3200);
        let powers = band_powers(&s.signal, &Band::canonical(), FS, 4).unwrap();
        assert!((powers.broadband - 2.0).abs() < 1e-6);
        let alpha = powers.bands.iter().find(|b| b.band == "Alpha").unwrap();
        assert!((alpha.power - 2.0).abs() < 0.04);
        let gamma = powers.bands.iter().find(|b| b.band == "Gamma").unwrap();
        assert!(gamma.power < 0.02);
    }
}
