//! Zero-phase IIR filters for biosignal conditioning
//!
//! Filters are designed as cascades of second-order sections and always run
//! forward-backward, so the net phase shift is zero and event timing in the
//! conditioned signal matches the recording.

use crate::processor::{for_each_channel, SignalProcessor};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use shield_core::{SampleMatrix, ShieldError, ShieldResult};
use std::f64::consts::PI;
use tracing::trace;

/// Poles with an imaginary part below this are treated as real
const REAL_POLE_TOLERANCE: f64 = 1e-12;

/// Second-order section with `a0` normalised to 1.
///
/// Transfer function:
/// `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Complex response at normalised angular frequency `omega` (rad/sample)
    pub fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = self.b0 + z1 * self.b1 + z2 * self.b2;
        let den = 1.0 + z1 * self.a1 + z2 * self.a2;
        num / den
    }

    fn dc_gain(&self) -> f64 {
        let den = 1.0 + self.a1 + self.a2;
        if den.abs() < f64::EPSILON {
            return 0.0;
        }
        (self.b0 + self.b1 + self.b2) / den
    }

    /// Transposed direct form II state reached after a long run of constant
    /// input `level`.
    fn steady_state(&self, level: f64) -> [f64; 2] {
        let out = level * self.dc_gain();
        let z1 = self.b2 * level - self.a2 * out;
        let z0 = self.b1 * level - self.a1 * out + z1;
        [z0, z1]
    }

    #[inline]
    fn step(&self, x: f64, state: &mut [f64; 2]) -> f64 {
        let y = self.b0 * x + state[0];
        state[0] = self.b1 * x - self.a1 * y + state[1];
        state[1] = self.b2 * x - self.a2 * y;
        y
    }
}

/// Cascade of second-order sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    pub fn new(sections: Vec<Biquad>) -> ShieldResult<Self> {
        if sections.is_empty() {
            return Err(ShieldError::filter_config("filter has no sections"));
        }
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Number of edge samples reflected on each side by [`Self::filtfilt`]
    /// for a long enough signal
    pub fn pad_len(&self) -> usize {
        3 * (2 * self.sections.len() + 1)
    }

    /// Complex response at `hz` for sample rate `fs`
    pub fn frequency_response(&self, hz: f64, fs: f64) -> Complex64 {
        let omega = 2.0 * PI * hz / fs;
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(omega))
    }

    /// Magnitude response at `hz` for sample rate `fs`
    pub fn magnitude_at(&self, hz: f64, fs: f64) -> f64 {
        self.frequency_response(hz, fs).norm()
    }

    /// Per-section state for a unit step settled at steady state
    fn unit_initial_state(&self) -> Vec<[f64; 2]> {
        let mut level = 1.0;
        self.sections
            .iter()
            .map(|section| {
                let state = section.steady_state(level);
                level *= section.dc_gain();
                state
            })
            .collect()
    }

    /// Causal filtering in place, starting from `unit_state * scale`
    fn run(&self, data: &mut [f64], unit_state: &[[f64; 2]], scale: f64) {
        let mut states: Vec<[f64; 2]> = unit_state
            .iter()
            .map(|s| [s[0] * scale, s[1] * scale])
            .collect();

        for sample in data.iter_mut() {
            let mut x = *sample;
            for (section, state) in self.sections.iter().zip(states.iter_mut()) {
                x = section.step(x, state);
            }
            *sample = x;
        }
    }

    /// Forward-backward filtering with zero net phase.
    ///
    /// The signal is extended at both ends by odd reflection about its end
    /// points, `pad_len()` samples on each side (fewer if the signal is
    /// shorter), and each pass starts from the steady state for its first
    /// sample. Output length equals input length.
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        let n = input.len();
        if n == 0 {
            return Vec::new();
        }

        let pad = self.pad_len().min(n - 1);
        let first = input[0];
        let last = input[n - 1];

        let mut ext = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - input[i]));
        ext.extend_from_slice(input);
        ext.extend((1..=pad).map(|i| 2.0 * last - input[n - 1 - i]));

        let zi = self.unit_initial_state();

        let start = ext[0];
        self.run(&mut ext, &zi, start);
        ext.reverse();

        let start = ext[0];
        self.run(&mut ext, &zi, start);
        ext.reverse();

        trace!(samples = n, pad, sections = self.sections.len(), "filtfilt");

        ext.drain(pad..pad + n).collect()
    }
}

fn validate_sample_rate(fs: f64) -> ShieldResult<f64> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(ShieldError::filter_config(format!(
            "sample rate must be positive, got {fs}"
        )));
    }
    Ok(fs / 2.0)
}

/// Digital Butterworth band-pass of the given order.
///
/// The band edges are pre-warped, the analog low-pass prototype is shifted
/// to the band and mapped with the bilinear transform. The result has
/// `order` sections (filter order `2 * order`) and unit gain at the
/// geometric centre of the band.
pub fn butterworth_bandpass(low_hz: f64, high_hz: f64, fs: f64, order: usize) -> ShieldResult<SosFilter> {
    let nyquist = validate_sample_rate(fs)?;
    if order == 0 {
        return Err(ShieldError::filter_config("filter order must be at least 1"));
    }
    if !(low_hz.is_finite() && high_hz.is_finite()) || low_hz <= 0.0 || high_hz >= nyquist {
        return Err(ShieldError::filter_config(format!(
            "band {low_hz}..{high_hz} Hz must lie inside (0, {nyquist}) Hz"
        )));
    }
    if low_hz >= high_hz {
        return Err(ShieldError::filter_config(format!(
            "low cutoff {low_hz} Hz must be below high cutoff {high_hz} Hz"
        )));
    }

    let warped_low = (PI * low_hz / fs).tan();
    let warped_high = (PI * high_hz / fs).tan();
    let center = (warped_low * warped_high).sqrt();
    let bandwidth = warped_high - warped_low;

    let mut complex_poles = Vec::with_capacity(order);
    let mut real_poles = Vec::new();

    for k in 0..order {
        let theta = PI * (2 * k + 1 + order) as f64 / (2 * order) as f64;
        let half = Complex64::from_polar(1.0, theta) * (bandwidth / 2.0);
        let root = (half * half - center * center).sqrt();

        for s in [half + root, half - root] {
            let z = (1.0 + s) / (1.0 - s);
            if z.im > REAL_POLE_TOLERANCE {
                complex_poles.push(z);
            } else if z.im.abs() <= REAL_POLE_TOLERANCE {
                real_poles.push(z.re);
            }
        }
    }

    // each section carries one zero at z = 1 and one at z = -1
    let section = |a1: f64, a2: f64| Biquad {
        b0: 1.0,
        b1: 0.0,
        b2: -1.0,
        a1,
        a2,
    };

    let mut sections: Vec<Biquad> = complex_poles
        .iter()
        .map(|p| section(-2.0 * p.re, p.norm_sqr()))
        .collect();

    real_poles.sort_by(f64::total_cmp);
    sections.extend(
        real_poles
            .chunks_exact(2)
            .map(|pair| section(-(pair[0] + pair[1]), pair[0] * pair[1])),
    );

    let mut filter = SosFilter::new(sections)?;

    let center_omega = 2.0 * center.atan();
    let gain = filter
        .sections
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(center_omega))
        .norm();
    if gain > 0.0 && gain.is_finite() {
        let first = &mut filter.sections[0];
        first.b0 /= gain;
        first.b1 /= gain;
        first.b2 /= gain;
    }

    Ok(filter)
}

/// Second-order IIR notch at `center_hz`; the -3 dB width is
/// `center_hz / quality`.
pub fn iir_notch(center_hz: f64, quality: f64, fs: f64) -> ShieldResult<SosFilter> {
    let nyquist = validate_sample_rate(fs)?;
    if !center_hz.is_finite() || center_hz <= 0.0 || center_hz >= nyquist {
        return Err(ShieldError::filter_config(format!(
            "notch frequency {center_hz} Hz must lie inside (0, {nyquist}) Hz"
        )));
    }
    if !quality.is_finite() || quality <= 0.0 {
        return Err(ShieldError::filter_config(format!(
            "quality factor must be positive, got {quality}"
        )));
    }

    let omega = PI * center_hz / nyquist;
    let width = omega / quality;
    let gain = 1.0 / (1.0 + (width / 2.0).tan());
    let cos = omega.cos();

    SosFilter::new(vec![Biquad {
        b0: gain,
        b1: -2.0 * gain * cos,
        b2: gain,
        a1: -2.0 * gain * cos,
        a2: 2.0 * gain - 1.0,
    }])
}

/// Zero-phase band-pass applied to every channel independently
pub fn band_limit(
    matrix: &SampleMatrix<f64>,
    fs: f64,
    low_hz: f64,
    high_hz: f64,
    order: usize,
) -> ShieldResult<SampleMatrix<f64>> {
    BandPassFilter::new(low_hz, high_hz, order, fs)?.process(matrix)
}

/// Zero-phase notch applied to every channel independently
pub fn reject_narrow_band(
    matrix: &SampleMatrix<f64>,
    fs: f64,
    center_hz: f64,
    quality: f64,
) -> ShieldResult<SampleMatrix<f64>> {
    NotchFilter::new(center_hz, quality, fs)?.process(matrix)
}

/// Butterworth band-pass stage
#[derive(Debug, Clone)]
pub struct BandPassFilter {
    low_hz: f64,
    high_hz: f64,
    filter: SosFilter,
}

impl BandPassFilter {
    pub fn new(low_hz: f64, high_hz: f64, order: usize, fs: f64) -> ShieldResult<Self> {
        Ok(Self {
            low_hz,
            high_hz,
            filter: butterworth_bandpass(low_hz, high_hz, fs, order)?,
        })
    }

    pub fn band(&self) -> (f64, f64) {
        (self.low_hz, self.high_hz)
    }

    pub fn sos(&self) -> &SosFilter {
        &self.filter
    }
}

impl SignalProcessor for BandPassFilter {
    fn process(&self, input: &SampleMatrix<f64>) -> ShieldResult<SampleMatrix<f64>> {
        for_each_channel(input, |channel| self.filter.filtfilt(channel))
    }

    fn name(&self) -> &str {
        "bandpass"
    }
}

/// Mains-interference notch stage
#[derive(Debug, Clone)]
pub struct NotchFilter {
    center_hz: f64,
    filter: SosFilter,
}

impl NotchFilter {
    pub fn new(center_hz: f64, quality: f64, fs: f64) -> ShieldResult<Self> {
        Ok(Self {
            center_hz,
            filter: iir_notch(center_hz, quality, fs)?,
        })
    }

    pub fn center_hz(&self) -> f64 {
        self.center_hz
    }

    pub fn sos(&self) -> &SosFilter {
        &self.filter
    }
}

impl SignalProcessor for NotchFilter {
    fn process(&self, input: &SampleMatrix<f64>) -> ShieldResult<SampleMatrix<f64>> {
        for_each_channel(input, |channel| self.filter.filtfilt(channel))
    }

    fn name(&self) -> &str {
        "notch"
    }
}
