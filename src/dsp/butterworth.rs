//! Butterworth bandpass design as cascaded second-order sections.
//!
//! The design follows the classic analog route: normalised lowpass
//! prototype poles, prewarped band edges, lowpass-to-bandpass transform,
//! then the bilinear transform. Poles are grouped into conjugate pairs so
//! every section has real coefficients.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::data::model::Band;
use crate::error::{AnalysisError, Result};

use super::check_cutoffs;

/// Bilinear transform constant for a sampling rate normalised to 2.
const FS2: f64 = 4.0;

/// Imaginary parts below this are treated as real poles.
const IMAG_TOL: f64 = 1e-12;

/// One second-order section. Transfer function:
/// `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    /// `a[0]` is always 1.
    pub a: [f64; 3],
}

impl Biquad {
    /// Section with zeros at z = 1 and z = -1 and the given pole polynomial.
    fn bandpass_section(a1: f64, a2: f64) -> Self {
        Biquad {
            b: [1.0, 0.0, -1.0],
            a: [1.0, a1, a2],
        }
    }

    fn from_conjugate_pair(p: Complex64) -> Self {
        Self::bandpass_section(-2.0 * p.re, p.norm_sqr())
    }

    fn from_real_pair(r1: f64, r2: f64) -> Self {
        Self::bandpass_section(-(r1 + r2), r1 * r2)
    }

    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }

    /// Transposed direct-form II state after a unit step has settled.
    pub(crate) fn step_state(&self) -> [f64; 2] {
        let y = self.dc_gain();
        let z2 = self.b[2] - self.a[2] * y;
        let z1 = self.b[1] - self.a[1] * y + z2;
        [z1, z2]
    }

    fn response(&self, z_inv: Complex64) -> Complex64 {
        let z_inv2 = z_inv * z_inv;
        let num = self.b[0] + z_inv * self.b[1] + z_inv2 * self.b[2];
        let den = self.a[0] + z_inv * self.a[1] + z_inv2 * self.a[2];
        num / den
    }
}

/// A designed Butterworth bandpass filter, reusable across signals.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    sampling_rate: f64,
    order: usize,
    sections: Vec<Biquad>,
}

impl BandpassFilter {
    /// Design an order-`order` bandpass with edges `low..high` Hz.
    ///
    /// Fails with `InvalidBand` unless `0 < low < high < sampling_rate / 2`.
    pub fn design(low: f64, high: f64, sampling_rate: f64, order: usize) -> Result<Self> {
        if order == 0 {
            return Err(AnalysisError::InvalidParameter(
                "filter order must be at least 1".to_string(),
            ));
        }
        check_cutoffs(low, high, sampling_rate)?;

        let nyquist = sampling_rate / 2.0;
        let warp = |w: f64| FS2 * (PI * w / 2.0).tan();
        let lo = warp(low / nyquist);
        let hi = warp(high / nyquist);
        let bw = hi - lo;
        let wo2 = lo * hi;

        // Analog bandpass poles: each prototype pole splits in two.
        let n = order as f64;
        let mut analog = Vec::with_capacity(2 * order);
        for k in 0..order {
            let m = 2.0 * k as f64 - (n - 1.0);
            let proto = -Complex64::from_polar(1.0, PI * m / (2.0 * n));
            let p_lp = proto * (bw / 2.0);
            let root = (p_lp * p_lp - wo2).sqrt();
            analog.push(p_lp + root);
            analog.push(p_lp - root);
        }

        // Bilinear transform. The `order` analog zeros at s = 0 map to z = 1,
        // the `order` zeros at infinity map to z = -1.
        let mut denom = Complex64::new(1.0, 0.0);
        let mut digital = Vec::with_capacity(analog.len());
        for &p in &analog {
            denom *= FS2 - p;
            digital.push((FS2 + p) / (FS2 - p));
        }
        let gain = (Complex64::new((bw * FS2).powi(order as i32), 0.0) / denom).re;

        let mut sections = Vec::with_capacity(order);
        let mut real_poles = Vec::new();
        for p in digital {
            if p.im > IMAG_TOL {
                sections.push(Biquad::from_conjugate_pair(p));
            } else if p.im.abs() <= IMAG_TOL {
                real_poles.push(p.re);
            }
        }
        real_poles.sort_by(f64::total_cmp);
        for pair in real_poles.chunks(2) {
            if let [r1, r2] = pair {
                sections.push(Biquad::from_real_pair(*r1, *r2));
            }
        }
        if sections.len() != order {
            return Err(AnalysisError::InvalidParameter(format!(
                "could not factor order-{order} design for {low}-{high} Hz into sections"
            )));
        }

        for coef in sections[0].b.iter_mut() {
            *coef *= gain;
        }

        log::trace!("designed {low}-{high} Hz order {order}: {sections:?}");
        Ok(BandpassFilter {
            sampling_rate,
            order,
            sections,
        })
    }

    /// [`Self::design`] for a named band; errors carry the band name.
    pub fn for_band(band: &Band, sampling_rate: f64, order: usize) -> Result<Self> {
        Self::design(band.low, band.high, sampling_rate, order).map_err(|e| e.for_band(&band.name))
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Single-pass gain `|H|` at `freq` Hz.
    pub fn magnitude_at(&self, freq: f64) -> f64 {
        let omega = 2.0 * PI * freq / self.sampling_rate;
        let z_inv = Complex64::from_polar(1.0, -omega);
        self.sections
            .iter()
            .map(|s| s.response(z_inv))
            .fold(Complex64::new(1.0, 0.0), |acc, h| acc * h)
            .norm()
    }
}
