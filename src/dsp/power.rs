use crate::error::{AnalysisError, Result};

/// Mean of the squared samples.
///
/// An energy proxy in squared signal units, not normalised by bandwidth.
/// Always `>= 0`; an empty input is an error rather than a zero.
///
/// Samples are scaled by the peak magnitude before squaring, so only a
/// power that is itself beyond `f64` range fails, with `PowerOverflow`.
pub fn compute_power(signal: &[f64]) -> Result<f64> {
    if signal.is_empty() {
        return Err(AnalysisError::EmptySignal);
    }
    if let Some(index) = signal.iter().position(|v| !v.is_finite()) {
        return Err(AnalysisError::NonFiniteSample { index });
    }

    let peak = signal.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if peak == 0.0 {
        return Ok(0.0);
    }
    let sum_sq: f64 = signal
        .iter()
        .map(|v| {
            let r = v / peak;
            r * r
        })
        .sum();
    let power = sum_sq / signal.len() as f64 * peak * peak;
    if !power.is_finite() {
        return Err(AnalysisError::PowerOverflow { peak });
    }
    Ok(power)
}
