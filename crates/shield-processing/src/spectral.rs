//! Periodogram helpers for judging conditioning results

use rustfft::{num_complex::Complex, FftPlanner};

/// One-sided power spectrum of a real signal.
///
/// Bin `k` sits at `k * bin_hz`. Powers are scaled so they sum to the mean
/// square of the signal, which makes a sine of amplitude `A` on an exact
/// bin read `A^2 / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    bin_hz: f64,
    power: Vec<f64>,
}

impl PowerSpectrum {
    /// Periodogram of `data` at its natural length, no windowing or padding
    pub fn compute(data: &[f64], fs: f64) -> Self {
        let n = data.len();
        if n == 0 {
            return Self {
                bin_hz: 0.0,
                power: Vec::new(),
            };
        }

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);

        let mut buffer: Vec<Complex<f64>> = data.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut buffer);

        let scale = 1.0 / (n as f64 * n as f64);
        let power = buffer[..=n / 2]
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let mirrored = k != 0 && 2 * k != n;
                let p = c.norm_sqr() * scale;
                if mirrored {
                    2.0 * p
                } else {
                    p
                }
            })
            .collect();

        Self {
            bin_hz: fs / n as f64,
            power,
        }
    }

    pub fn bin_hz(&self) -> f64 {
        self.bin_hz
    }

    pub fn bins(&self) -> &[f64] {
        &self.power
    }

    /// Power of the bin nearest to `hz`
    pub fn at(&self, hz: f64) -> f64 {
        if self.power.is_empty() || self.bin_hz <= 0.0 {
            return 0.0;
        }
        let index = (hz / self.bin_hz).round().max(0.0) as usize;
        self.power[index.min(self.power.len() - 1)]
    }

    /// Total power of the bins between `low_hz` and `high_hz` inclusive
    pub fn band(&self, low_hz: f64, high_hz: f64) -> f64 {
        self.power
            .iter()
            .enumerate()
            .filter(|(k, _)| {
                let f = *k as f64 * self.bin_hz;
                f >= low_hz && f <= high_hz
            })
            .map(|(_, p)| p)
            .sum()
    }
}

/// Power of `channel` at the bin nearest to `hz`
pub fn power_at(channel: &[f64], fs: f64, hz: f64) -> f64 {
    PowerSpectrum::compute(channel, fs).at(hz)
}

/// Power of `channel` between `low_hz` and `high_hz`
pub fn band_power(channel: &[f64], fs: f64, low_hz: f64, high_hz: f64) -> f64 {
    PowerSpectrum::compute(channel, fs).band(low_hz, high_hz)
}

/// Ratio of `after` to `before` in decibels; infinite attenuation reads
/// as `f64::NEG_INFINITY`
pub fn attenuation_db(before: f64, after: f64) -> f64 {
    if before <= 0.0 {
        return 0.0;
    }
    10.0 * (after / before).log10()
}
