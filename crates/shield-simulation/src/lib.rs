//! Shield-Simulation: Synthetic recordings for tests and demos
//!
//! Seeded multi-channel EEG-like signals with rhythms, mains interference,
//! Gaussian noise and injected spikes, plus writers that lay them out as a
//! recording directory.

pub mod synthetic;
pub mod writer;

pub use synthetic::{Artifact, LineNoise, SyntheticConfig, SyntheticRecording, Tone};
pub use writer::{write_metadata, write_raw, write_recording};
