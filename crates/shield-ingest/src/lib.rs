//! Shield-Ingest: Recording ingestion with cascading fallbacks
//!
//! Reads metadata files of unknown format, infers the binary layout of
//! headerless sample files and decodes them into sample matrices. Every
//! heuristic is an ordered candidate list evaluated first-match-wins, so a
//! given file always resolves to the same layout.

pub mod events;
pub mod layout;
pub mod metadata;
pub mod recording;
pub mod samples;

pub use events::{load_event_stream, EventInfo, EventStream};
pub use layout::{declared_layout, infer_layout, infer_layout_for_len, Layout, LayoutHint};
pub use metadata::{parse_metadata, parse_metadata_bytes, sample_rate_hz, DEFAULT_SAMPLE_RATE_HZ};
pub use recording::{find_recordings, inspect_recording, select_sample_file, RecordingFile};
pub use samples::{load_samples, LayoutSource, SampleInfo};
