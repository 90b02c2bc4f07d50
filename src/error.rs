use std::path::PathBuf;

use thiserror::Error;

/// Every failure the analysis core can report.
///
/// Errors are raised where they are detected and propagated unchanged; the
/// core never retries and never substitutes a numeric placeholder.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{file}: {message}")]
    DataFormat {
        file: String,
        message: String,
    },

    #[error("invalid band {low}-{high} Hz (nyquist {nyquist} Hz): {reason}")]
    InvalidBand {
        low: f64,
        high: f64,
        nyquist: f64,
        reason: &'static str,
    },

    #[error("signal too short to filter: {len} samples, need at least {required}")]
    SignalTooShort {
        len: usize,
        required: usize,
    },

    #[error("cannot compute power of an empty signal")]
    EmptySignal,

    #[error("non-finite sample at index {index}")]
    NonFiniteSample { index: usize },

    #[error("no subjects in the {condition} collection")]
    NoSubjects { condition: String },

    #[error("signal power overflows f64 (peak |sample| {peak:e})")]
    PowerOverflow { peak: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("subject '{subject}', band {band}: {source}")]
    Subject {
        subject: String,
        band: String,
        #[source]
        source: Box<AnalysisError>,
    },

    #[error("band {band}: {source}")]
    Band {
        band: String,
        #[source]
        source: Box<AnalysisError>,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AnalysisError {
    pub(crate) fn data_format(file: impl Into<String>, message: impl Into<String>) -> Self {
        AnalysisError::DataFormat {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Attach the subject and band a per-subject computation failed on.
    pub fn for_subject(self, subject: &str, band: &str) -> Self {
        AnalysisError::Subject {
            subject: subject.to_string(),
            band: band.to_string(),
            source: Box::new(self),
        }
    }

    /// Attach the band whose filter could not be designed.
    pub fn for_band(self, band: &str) -> Self {
        AnalysisError::Band {
            band: band.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any subject or band context wrappers.
    pub fn root(&self) -> &AnalysisError {
        match self {
            AnalysisError::Subject { source, .. } | AnalysisError::Band { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_context_names_file_and_band() {
        let err = AnalysisError::SignalTooShort {
            len: 10,
            required: 28,
        }
        .for_subject("S001", "Alpha");
        let msg = err.to_string();
        assert!(msg.contains("S001"));
        assert!(msg.contains("Alpha"));
        assert!(matches!(
            err.root(),
            AnalysisError::SignalTooShort { len: 10, .. }
        ));
    }

    #[test]
    fn band_context_names_band() {
        let err = AnalysisError::InvalidBand {
            low: 40.0,
            high: 90.0,
            nyquist: 80.0,
            reason: "high cutoff must be below the Nyquist frequency",
        }
        .for_band("High gamma");
        assert!(err.to_string().starts_with("band High gamma: "));
        assert!(matches!(err.root(), AnalysisError::InvalidBand { .. }));
    }
}
