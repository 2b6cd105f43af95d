//! Shield-Processing: Signal conditioning for biosignal recordings
//!
//! Zero-phase Butterworth band-pass and notch filtering, z-score artifact
//! detection with interpolation repair, and the pipeline that chains them.

pub mod artifacts;
pub mod config;
pub mod filters;
pub mod pipeline;
pub mod processor;
pub mod spectral;

pub use artifacts::{detect_and_repair_artifacts, detect_artifacts, good_fraction, ArtifactRepair};
pub use config::ShieldingConfig;
pub use filters::{
    band_limit, butterworth_bandpass, iir_notch, reject_narrow_band, BandPassFilter, Biquad,
    NotchFilter, SosFilter,
};
pub use pipeline::{apply_shielding_pipeline, PipelineBuilder, ShieldingPipeline, ShieldingResult};
pub use processor::{SignalProcessor, StageKind, StageReport};
pub use spectral::{band_power, power_at, PowerSpectrum};
