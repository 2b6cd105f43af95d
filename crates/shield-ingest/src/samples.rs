//! Sample file loading
//!
//! A sample file is a flat run of fixed-width elements in native byte
//! order, no header. Declared layout parts are used as given; missing parts
//! are inferred from the file length.

use crate::layout::infer_layout_for_len;
use serde::{Deserialize, Serialize};
use shield_core::element::decode_elements;
use shield_core::{Element, ElementType, RawSamples, SampleMatrix, ShieldError, ShieldResult};
use std::path::Path;
use tracing::debug;

/// Channel counts tried, in order, when the element count does not fill
/// whole rows of the resolved channel count
pub const RECOVERY_CHANNEL_COUNTS: [usize; 5] = [4, 8, 16, 32, 64];

/// Where the resolved layout came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutSource {
    /// Both parts supplied by the caller
    Explicit,
    /// Both parts inferred from the file length
    Inferred,
    /// One part supplied, the other inferred
    Mixed,
}

/// Resolved shape of a loaded sample file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleInfo {
    pub element_type: ElementType,
    pub channel_count: usize,
    /// Number of time samples (rows)
    pub sample_count: usize,
    /// Elements dropped because they did not complete a row
    pub truncated_elements: usize,
    /// Bytes dropped because they did not complete an element
    pub trailing_bytes: usize,
    pub layout_source: LayoutSource,
}

/// Load a sample file into a time-by-channel matrix.
///
/// # Errors
///
/// * [`ShieldError::NotFound`] when `path` does not exist
/// * [`ShieldError::EmptyInput`] when no complete element can be decoded
/// * [`ShieldError::Unsupported`] for an explicit channel count of zero
///
/// A length that does not fill whole rows is never an error: the first
/// channel count in [`RECOVERY_CHANNEL_COUNTS`] that divides the element
/// count is adopted, and failing that the trailing partial row is dropped
/// and reported in [`SampleInfo::truncated_elements`].
pub fn load_samples<P: AsRef<Path>>(
    path: P,
    element_type: Option<ElementType>,
    channel_count: Option<usize>,
) -> ShieldResult<(RawSamples, SampleInfo)> {
    let path = path.as_ref();

    if channel_count == Some(0) {
        return Err(ShieldError::Unsupported {
            parameter: "channel count",
            value: "0".to_string(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ShieldError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ShieldError::Io(e),
    })?;

    let (element_type, channel_count, layout_source) = match (element_type, channel_count) {
        (Some(element_type), Some(channel_count)) => {
            (element_type, channel_count, LayoutSource::Explicit)
        }
        (declared_type, declared_channels) => {
            let inferred = infer_layout_for_len(bytes.len() as u64);
            let source = if declared_type.is_none() && declared_channels.is_none() {
                LayoutSource::Inferred
            } else {
                LayoutSource::Mixed
            };
            (
                declared_type.unwrap_or(inferred.element_type),
                declared_channels.unwrap_or(inferred.channel_count),
                source,
            )
        }
    };

    let trailing_bytes = bytes.len() % element_type.byte_width();
    let (samples, truncated_elements) = match element_type {
        ElementType::Float32 => {
            let (m, t) = reshape::<f32>(path, &bytes, channel_count)?;
            (RawSamples::Float32(m), t)
        }
        ElementType::Int16 => {
            let (m, t) = reshape::<i16>(path, &bytes, channel_count)?;
            (RawSamples::Int16(m), t)
        }
        ElementType::Int32 => {
            let (m, t) = reshape::<i32>(path, &bytes, channel_count)?;
            (RawSamples::Int32(m), t)
        }
    };

    let info = SampleInfo {
        element_type,
        channel_count: samples.channel_count(),
        sample_count: samples.rows(),
        truncated_elements,
        trailing_bytes,
        layout_source,
    };

    debug!(
        path = %path.display(),
        element_type = %info.element_type,
        channel_count = info.channel_count,
        sample_count = info.sample_count,
        truncated_elements,
        "loaded sample file"
    );

    Ok((samples, info))
}

/// Decode and reshape, returning the matrix and the number of dropped
/// elements.
fn reshape<T: Element>(
    path: &Path,
    bytes: &[u8],
    channel_count: usize,
) -> ShieldResult<(SampleMatrix<T>, usize)> {
    let mut flat: Vec<T> = decode_elements(bytes);
    if flat.is_empty() {
        return Err(ShieldError::EmptyInput {
            path: path.to_path_buf(),
            element_type: T::TYPE,
        });
    }

    let mut channels = channel_count;
    let mut truncated = 0;

    if flat.len() % channels != 0 {
        match RECOVERY_CHANNEL_COUNTS
            .iter()
            .copied()
            .find(|candidate| flat.len() % candidate == 0)
        {
            Some(recovered) => {
                debug!(requested = channels, recovered, "channel count recovered");
                channels = recovered;
            }
            None => {
                let keep = flat.len() / channels * channels;
                truncated = flat.len() - keep;
                flat.truncate(keep);
            }
        }
    }

    Ok((SampleMatrix::from_flat(flat, channels)?, truncated))
}
