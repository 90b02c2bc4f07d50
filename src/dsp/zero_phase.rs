//! Forward-backward (zero-phase) application of a [`BandpassFilter`].

use crate::error::{AnalysisError, Result};

use super::butterworth::{BandpassFilter, Biquad};

impl BandpassFilter {
    /// Samples of odd-reflection padding added on each side before filtering.
    pub fn padlen(&self) -> usize {
        3 * (2 * self.order() + 1)
    }

    /// Shortest signal this filter can process with [`Self::filtfilt`].
    pub fn min_signal_len(&self) -> usize {
        self.padlen() + 1
    }

    /// Filter forward then backward so the phase responses cancel.
    ///
    /// The result has the same length as `signal`, is not shifted in time,
    /// and sees the magnitude response squared.
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let padlen = self.padlen();
        if signal.len() < self.min_signal_len() {
            return Err(AnalysisError::SignalTooShort {
                len: signal.len(),
                required: self.min_signal_len(),
            });
        }

        let zi = initial_state(self.sections());
        let ext = odd_extend(signal, padlen);

        let mut y = run_sections(self.sections(), &zi, &ext);
        y.reverse();
        let mut y = run_sections(self.sections(), &zi, &y);
        y.reverse();

        y.truncate(padlen + signal.len());
        y.drain(..padlen);
        Ok(y)
    }
}

/// Zero-phase bandpass of `signal` between `low` and `high` Hz.
///
/// Designs an order-`order` Butterworth bandpass and applies it forward and
/// backward. Returns a new buffer of the same length.
pub fn bandpass(
    signal: &[f64],
    low: f64,
    high: f64,
    sampling_rate: f64,
    order: usize,
) -> Result<Vec<f64>> {
    BandpassFilter::design(low, high, sampling_rate, order)?.filtfilt(signal)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Per-section states for a unit step that has settled through the cascade.
fn initial_state(sections: &[Biquad]) -> Vec<[f64; 2]> {
    let mut scale = 1.0;
    sections
        .iter()
        .map(|s| {
            let [z1, z2] = s.step_state();
            let zi = [z1 * scale, z2 * scale];
            scale *= s.dc_gain();
            zi
        })
        .collect()
}

/// Run the cascade over `x`, starting from `zi` scaled by `x[0]`.
fn run_sections(sections: &[Biquad], zi: &[[f64; 2]], x: &[f64]) -> Vec<f64> {
    let x0 = x.first().copied().unwrap_or(0.0);
    let mut out = x.to_vec();
    for (s, z) in sections.iter().zip(zi) {
        let [b0, b1, b2] = s.b;
        let [_, a1, a2] = s.a;
        let (mut z1, mut z2) = (z[0] * x0, z[1] * x0);
        for v in out.iter_mut() {
            let input = *v;
            let y = b0 * input + z1;
            z1 = b1 * input - a1 * y + z2;
            z2 = b2 * input - a2 * y;
            *v = y;
        }
    }
    out
}

/// Extend both ends by point reflection about the end samples.
fn odd_extend(x: &[f64], padlen: usize) -> Vec<f64> {
    let n = x.len();
    let (first, last) = (x[0], x[n - 1]);
    let mut ext = Vec::with_capacity(n + 2 * padlen);
    ext.extend((1..=padlen).rev().map(|i| 2.0 * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=padlen).map(|i| 2.0 * last - x[n - 1 - i]));
    ext
}
