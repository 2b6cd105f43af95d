//! SampleMatrix: Core container for multi-channel recordings

use crate::element::{Element, ElementType};
use crate::error::{ShieldError, ShieldResult};
use serde::{Deserialize, Serialize};

/// Time-by-channel sample matrix.
///
/// Samples are stored row-major: each consecutive run of `channel_count`
/// values is one time sample across all channels. Channel identity is fixed
/// for the lifetime of the matrix and rows are never reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix<T> {
    data: Vec<T>,
    channel_count: usize,
}

impl<T: Copy> SampleMatrix<T> {
    /// Build a matrix from a flat row-major buffer
    pub fn from_flat(data: Vec<T>, channel_count: usize) -> ShieldResult<Self> {
        if channel_count == 0 {
            return Err(ShieldError::Unsupported {
                parameter: "channel count",
                value: "0".to_string(),
            });
        }
        if data.len() % channel_count != 0 {
            return Err(ShieldError::ShapeMismatch {
                reason: format!(
                    "{} elements do not fill whole rows of {} channels",
                    data.len(),
                    channel_count
                ),
            });
        }

        Ok(SampleMatrix { data, channel_count })
    }

    /// Treat a one-dimensional sequence as a single channel
    pub fn single_channel(data: Vec<T>) -> Self {
        SampleMatrix {
            data,
            channel_count: 1,
        }
    }

    /// Build a matrix from per-channel columns of equal length
    pub fn from_channels(channels: Vec<Vec<T>>) -> ShieldResult<Self> {
        let channel_count = channels.len();
        if channel_count == 0 {
            return Err(ShieldError::Unsupported {
                parameter: "channel count",
                value: "0".to_string(),
            });
        }

        let rows = channels[0].len();
        if let Some(bad) = channels.iter().position(|c| c.len() != rows) {
            return Err(ShieldError::ShapeMismatch {
                reason: format!(
                    "channel {} has {} samples, channel 0 has {}",
                    bad,
                    channels[bad].len(),
                    rows
                ),
            });
        }

        let mut data = Vec::with_capacity(rows * channel_count);
        for row in 0..rows {
            for channel in &channels {
                data.push(channel[row]);
            }
        }

        Ok(SampleMatrix { data, channel_count })
    }

    /// Number of time samples
    pub fn rows(&self) -> usize {
        self.data.len() / self.channel_count
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// `(rows, channels)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.channel_count)
    }

    /// Total number of elements across all channels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major view of every element
    pub fn as_flat(&self) -> &[T] {
        &self.data
    }

    pub fn into_flat(self) -> Vec<T> {
        self.data
    }

    /// Single element lookup
    pub fn get(&self, row: usize, channel: usize) -> Option<T> {
        if channel >= self.channel_count {
            return None;
        }
        self.data.get(row * self.channel_count + channel).copied()
    }

    /// One time sample across all channels
    pub fn row(&self, row: usize) -> Option<&[T]> {
        let start = row * self.channel_count;
        self.data.get(start..start + self.channel_count)
    }

    /// Iterate time samples in chronological order
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.channel_count)
    }

    /// Copy out one channel as a contiguous vector
    pub fn channel(&self, channel_index: usize) -> ShieldResult<Vec<T>> {
        if channel_index >= self.channel_count {
            return Err(ShieldError::ShapeMismatch {
                reason: format!(
                    "Channel index {} out of bounds (0-{})",
                    channel_index,
                    self.channel_count - 1
                ),
            });
        }

        Ok(self
            .data
            .iter()
            .skip(channel_index)
            .step_by(self.channel_count)
            .copied()
            .collect())
    }

    /// Get all channel data as separate vectors
    pub fn all_channels(&self) -> Vec<Vec<T>> {
        let rows = self.rows();
        let mut channels: Vec<Vec<T>> = (0..self.channel_count)
            .map(|_| Vec::with_capacity(rows))
            .collect();

        for row in self.iter_rows() {
            for (channel, &value) in channels.iter_mut().zip(row) {
                channel.push(value);
            }
        }

        channels
    }

    /// Overwrite one channel in place
    pub fn set_channel(&mut self, channel_index: usize, values: &[T]) -> ShieldResult<()> {
        if channel_index >= self.channel_count || values.len() != self.rows() {
            return Err(ShieldError::ShapeMismatch {
                reason: format!(
                    "cannot write {} samples into channel {} of a {}x{} matrix",
                    values.len(),
                    channel_index,
                    self.rows(),
                    self.channel_count
                ),
            });
        }

        let stride = self.channel_count;
        for (slot, &value) in self
            .data
            .iter_mut()
            .skip(channel_index)
            .step_by(stride)
            .zip(values)
        {
            *slot = value;
        }

        Ok(())
    }

    /// Element-wise conversion preserving shape
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> SampleMatrix<U> {
        SampleMatrix {
            data: self.data.iter().map(|&v| f(v)).collect(),
            channel_count: self.channel_count,
        }
    }
}

impl<T: Element> SampleMatrix<T> {
    /// Widen to `f64` for conditioning
    pub fn to_f64(&self) -> SampleMatrix<f64> {
        self.map(Element::to_f64)
    }
}

impl<T: Copy> From<Vec<T>> for SampleMatrix<T> {
    fn from(data: Vec<T>) -> Self {
        SampleMatrix::single_channel(data)
    }
}

/// A decoded sample matrix tagged with its element type
#[derive(Debug, Clone, PartialEq)]
pub enum RawSamples {
    Float32(SampleMatrix<f32>),
    Int16(SampleMatrix<i16>),
    Int32(SampleMatrix<i32>),
}

impl RawSamples {
    pub fn element_type(&self) -> ElementType {
        match self {
            RawSamples::Float32(_) => ElementType::Float32,
            RawSamples::Int16(_) => ElementType::Int16,
            RawSamples::Int32(_) => ElementType::Int32,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            RawSamples::Float32(m) => m.rows(),
            RawSamples::Int16(m) => m.rows(),
            RawSamples::Int32(m) => m.rows(),
        }
    }

    pub fn channel_count(&self) -> usize {
        match self {
            RawSamples::Float32(m) => m.channel_count(),
            RawSamples::Int16(m) => m.channel_count(),
            RawSamples::Int32(m) => m.channel_count(),
        }
    }

    /// Widen to `f64` for the conditioning pipeline
    pub fn to_f64(&self) -> SampleMatrix<f64> {
        match self {
            RawSamples::Float32(m) => m.to_f64(),
            RawSamples::Int16(m) => m.to_f64(),
            RawSamples::Int32(m) => m.to_f64(),
        }
    }
}

/// Basic statistics for a signal channel.
///
/// Non-finite values are ignored. With no finite value at all, `mean` and
/// `std_dev` are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub finite_count: usize,
}

impl ChannelStats {
    pub fn calculate(data: &[f64]) -> Self {
        let finite = || data.iter().copied().filter(|v| v.is_finite());
        let finite_count = finite().count();

        if finite_count == 0 {
            return Self {
                mean: f64::NAN,
                std_dev: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                finite_count,
            };
        }

        let n = finite_count as f64;
        let mean = finite().sum::<f64>() / n;
        let variance = finite().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let min = finite().fold(f64::INFINITY, f64::min);
        let max = finite().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            finite_count,
        }
    }
}
