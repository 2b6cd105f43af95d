//! Element types recognised in headerless sample files

use crate::error::{ShieldError, ShieldResult};
use bytemuck::Pod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric element type of a flat binary sample file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// 32-bit IEEE float
    Float32,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
}

impl ElementType {
    /// Size of one element in bytes
    pub const fn byte_width(self) -> usize {
        match self {
            ElementType::Float32 => 4,
            ElementType::Int16 => 2,
            ElementType::Int32 => 4,
        }
    }

    /// Canonical lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Float32 => "float32",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = ShieldError;

    /// Accepts canonical names plus the short and numpy-style spellings
    /// found in exported metadata (`f4`, `<i2`, `short`, ...).
    fn from_str(s: &str) -> ShieldResult<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized
            .trim_start_matches("np.")
            .trim_start_matches("numpy.")
            .trim_start_matches(['<', '=', '|']);

        match normalized {
            "float32" | "f32" | "f4" | "float" | "single" => Ok(ElementType::Float32),
            "int16" | "i16" | "i2" | "short" => Ok(ElementType::Int16),
            "int32" | "i32" | "i4" | "int" => Ok(ElementType::Int32),
            _ => Err(ShieldError::Unsupported {
                parameter: "element type",
                value: s.to_string(),
            }),
        }
    }
}

/// Rust scalar backing one [`ElementType`]
pub trait Element: Pod + Copy + fmt::Debug + Send + Sync + 'static {
    /// Element type tag for this scalar
    const TYPE: ElementType;

    /// Lossless widening used by the conditioning stages
    fn to_f64(self) -> f64;
}

impl Element for f32 {
    const TYPE: ElementType = ElementType::Float32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for i16 {
    const TYPE: ElementType = ElementType::Int16;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for i32 {
    const TYPE: ElementType = ElementType::Int32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Decode a byte buffer as a flat sequence of `T` in native byte order.
///
/// Trailing bytes that do not form a whole element are ignored.
pub fn decode_elements<T: Element>(bytes: &[u8]) -> Vec<T> {
    let width = std::mem::size_of::<T>();
    let whole = bytes.len() - bytes.len() % width;
    if whole == 0 {
        return Vec::new();
    }
    bytemuck::pod_collect_to_vec(&bytes[..whole])
}

/// Encode a flat element sequence to native-order bytes
pub fn encode_elements<T: Element>(values: &[T]) -> &[u8] {
    bytemuck::cast_slice(values)
}
