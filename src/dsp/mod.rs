/// Signal processing: band design, zero-phase filtering, power.
///
/// ```text
///   Band (low, high)                Signal
///        │                            │
///        ▼                            │
///   ┌─────────────┐                   │
///   │ butterworth  │  zpk → 2nd-order sections
///   └─────────────┘                   │
///        │                            ▼
///        └──────────────►  ┌─────────────┐
///                          │ zero_phase   │  forward + backward pass
///                          └─────────────┘
///                                 │
///                                 ▼
///                          ┌─────────────┐
///                          │   power      │  mean of squares
///                          └─────────────┘
/// ```

pub mod butterworth;
pub mod power;
pub mod zero_phase;

pub use butterworth::BandpassFilter;
pub use power::compute_power;
pub use zero_phase::bandpass;

use crate::error::{AnalysisError, Result};

/// Validate band edges against the Nyquist frequency.
///
/// Normalised cutoffs `low / nyquist` and `high / nyquist` must lie in the
/// open interval `(0, 1)` with `low < high`.
pub fn check_cutoffs(low: f64, high: f64, sampling_rate: f64) -> Result<()> {
    if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "sampling rate must be a positive number, got {sampling_rate}"
        )));
    }
    let nyquist = sampling_rate / 2.0;
    let invalid = |reason| AnalysisError::InvalidBand {
        low,
        high,
        nyquist,
        reason,
    };

    if !(low.is_finite() && high.is_finite()) {
        return Err(invalid("cutoffs must be finite"));
    }
    if low <= 0.0 {
        return Err(invalid("low cutoff must be above 0 Hz"));
    }
    if low >= high {
        return Err(invalid("low cutoff must be below high cutoff"));
    }
    if high >= nyquist {
        return Err(invalid("high cutoff must be below the Nyquist frequency"));
    }
    Ok(())
}
