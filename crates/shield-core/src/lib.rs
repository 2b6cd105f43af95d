//! Shield-Core: Foundation types for recording ingestion and conditioning
//!
//! Element types, the time-by-channel sample matrix, the schema-less
//! metadata record and the shared error type.

pub mod element;
pub mod error;
pub mod matrix;
pub mod metadata;

pub use element::{Element, ElementType};
pub use error::{ShieldError, ShieldResult};
pub use matrix::{ChannelStats, RawSamples, SampleMatrix};
pub use metadata::{MetadataRecord, MetadataSource, MetadataValue};
