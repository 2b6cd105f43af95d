//! Binary layout inference for headerless sample files
//!
//! The search is a tagged-priority list, not a goodness-of-fit score: the
//! first (element type, channel count) pair whose row width divides the file
//! length wins. Floating-point exports are tried first because they are the
//! most common.

use serde::Serialize;
use shield_core::{ElementType, MetadataRecord, MetadataValue, ShieldError, ShieldResult};
use std::path::Path;
use tracing::debug;

/// Element types tried by [`infer_layout`], in priority order
pub const ELEMENT_TYPE_PRIORITY: [ElementType; 3] =
    [ElementType::Float32, ElementType::Int16, ElementType::Int32];

/// Channel counts tried for each element type, in priority order
pub const CHANNEL_COUNT_PRIORITY: [usize; 5] = [8, 16, 32, 64, 4];

/// Returned when no candidate divides the file length
pub const DEFAULT_LAYOUT: Layout = Layout {
    element_type: ElementType::Float32,
    channel_count: 8,
};

/// Metadata keys that may declare the element type
pub const ELEMENT_TYPE_KEYS: [&str; 3] = ["dtype", "data_type", "sample_format"];

/// Metadata keys that may declare the channel count
pub const CHANNEL_COUNT_KEYS: [&str; 4] = ["n_channels", "channel_count", "channels", "nchannels"];

/// Resolved element type and channel count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub element_type: ElementType,
    pub channel_count: usize,
}

impl Layout {
    /// Bytes occupied by one time sample across all channels
    pub fn row_bytes(&self) -> usize {
        self.element_type.byte_width() * self.channel_count
    }
}

/// Infer a layout from a file length alone.
///
/// Always returns a pair with a non-zero channel count; falls back to
/// [`DEFAULT_LAYOUT`] when nothing divides.
pub fn infer_layout_for_len(byte_len: u64) -> Layout {
    for element_type in ELEMENT_TYPE_PRIORITY {
        for channel_count in CHANNEL_COUNT_PRIORITY {
            let layout = Layout {
                element_type,
                channel_count,
            };
            if byte_len % layout.row_bytes() as u64 == 0 {
                return layout;
            }
        }
    }

    DEFAULT_LAYOUT
}

/// Infer the layout of a sample file from its size on disk
pub fn infer_layout<P: AsRef<Path>>(path: P) -> ShieldResult<Layout> {
    let path = path.as_ref();
    let byte_len = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ShieldError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let layout = infer_layout_for_len(byte_len);
    debug!(
        path = %path.display(),
        byte_len,
        element_type = %layout.element_type,
        channel_count = layout.channel_count,
        "inferred sample layout"
    );
    Ok(layout)
}

/// Layout parts declared by metadata and judged trustworthy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutHint {
    pub element_type: Option<ElementType>,
    pub channel_count: Option<usize>,
}

impl LayoutHint {
    pub fn is_empty(&self) -> bool {
        self.element_type.is_none() && self.channel_count.is_none()
    }
}

/// Extract the declared layout from a metadata record.
///
/// An element type counts only when it names a recognised type; a channel
/// count only when it is a positive integer.
pub fn declared_layout(record: &MetadataRecord) -> LayoutHint {
    let element_type = ELEMENT_TYPE_KEYS
        .iter()
        .filter_map(|key| record.get_str(key))
        .find_map(|name| name.parse::<ElementType>().ok());

    let channel_count = CHANNEL_COUNT_KEYS
        .iter()
        .filter_map(|key| record.get(key).and_then(MetadataValue::as_usize))
        .find(|&count| count > 0);

    LayoutHint {
        element_type,
        channel_count,
    }
}
