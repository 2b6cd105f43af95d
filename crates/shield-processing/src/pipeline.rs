//! Shielding pipeline: band-pass, optional notch, artifact repair

use crate::artifacts::ArtifactRepair;
use crate::config::ShieldingConfig;
use crate::filters::{BandPassFilter, NotchFilter};
use crate::processor::{SignalProcessor, StageReport, StageTimer};
use serde::Serialize;
use shield_core::{SampleMatrix, ShieldResult};
use std::time::Instant;
use tracing::debug;

/// Processing pipeline that chains filters and ends with artifact repair
pub struct ShieldingPipeline {
    sample_rate: f64,
    filters: Vec<Box<dyn SignalProcessor>>,
    repair: ArtifactRepair,
}

/// Pipeline builder for custom filter chains
pub struct PipelineBuilder {
    sample_rate: f64,
    filters: Vec<Box<dyn SignalProcessor>>,
    z_threshold: f64,
}

/// Output of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct ShieldingResult {
    #[serde(skip)]
    pub cleaned: SampleMatrix<f64>,
    /// One entry per row, `true` where the row was clean
    pub mask: Vec<bool>,
    pub stages: Vec<StageReport>,
    pub total_us: u64,
}

impl ShieldingPipeline {
    /// Build the standard chain for `config` at sample rate `fs`
    pub fn from_config(config: &ShieldingConfig, fs: f64) -> ShieldResult<Self> {
        config.validate(fs)?;

        let mut builder = PipelineBuilder::new(fs);
        builder.add_bandpass(config.band_low_hz, config.band_high_hz, config.filter_order)?;
        if let Some(notch_hz) = config.notch_hz {
            builder.add_notch(notch_hz, config.notch_quality)?;
        }
        builder.set_z_threshold(config.z_threshold);

        Ok(builder.build())
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Names of all stages in execution order
    pub fn stage_names(&self) -> Vec<String> {
        self.filters
            .iter()
            .map(|f| f.name().to_string())
            .chain(std::iter::once(self.repair.name().to_string()))
            .collect()
    }

    /// Run every filter in order, then artifact repair
    pub fn process(&self, input: &SampleMatrix<f64>) -> ShieldResult<ShieldingResult> {
        let start_time = Instant::now();
        let mut current = input.clone();
        let mut stages = Vec::with_capacity(self.filters.len() + 1);

        for filter in &self.filters {
            let timer = StageTimer::start(filter.name(), filter.kind());
            current = filter.process(&current)?;
            let report = timer.finish();
            debug!(stage = %report.name, elapsed_us = report.elapsed_us, "stage finished");
            stages.push(report);
        }

        let (cleaned, mask, report) = self.repair.apply(&current)?;
        debug!(stage = %report.name, elapsed_us = report.elapsed_us, "stage finished");
        stages.push(report);

        Ok(ShieldingResult {
            cleaned,
            mask,
            stages,
            total_us: start_time.elapsed().as_micros() as u64,
        })
    }
}

impl PipelineBuilder {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            filters: Vec::new(),
            z_threshold: ShieldingConfig::default().z_threshold,
        }
    }

    pub fn add_bandpass(&mut self, low_hz: f64, high_hz: f64, order: usize) -> ShieldResult<&mut Self> {
        let filter = BandPassFilter::new(low_hz, high_hz, order, self.sample_rate)?;
        self.filters.push(Box::new(filter));
        Ok(self)
    }

    pub fn add_notch(&mut self, center_hz: f64, quality: f64) -> ShieldResult<&mut Self> {
        let filter = NotchFilter::new(center_hz, quality, self.sample_rate)?;
        self.filters.push(Box::new(filter));
        Ok(self)
    }

    pub fn add_processor(&mut self, processor: Box<dyn SignalProcessor>) -> &mut Self {
        self.filters.push(processor);
        self
    }

    pub fn set_z_threshold(&mut self, z_threshold: f64) -> &mut Self {
        self.z_threshold = z_threshold;
        self
    }

    pub fn build(self) -> ShieldingPipeline {
        ShieldingPipeline {
            sample_rate: self.sample_rate,
            filters: self.filters,
            repair: ArtifactRepair::new(self.z_threshold),
        }
    }
}

/// Band-pass, then notch at `notch_hz` when given, then artifact repair,
/// with the default order, quality factor and z threshold.
///
/// Returns the cleaned matrix and the validity mask.
pub fn apply_shielding_pipeline(
    matrix: &SampleMatrix<f64>,
    fs: f64,
    band: (f64, f64),
    notch_hz: Option<f64>,
) -> ShieldResult<(SampleMatrix<f64>, Vec<bool>)> {
    let config = ShieldingConfig {
        band_low_hz: band.0,
        band_high_hz: band.1,
        notch_hz,
        ..Default::default()
    };
    let result = ShieldingPipeline::from_config(&config, fs)?.process(matrix)?;
    Ok((result.cleaned, result.mask))
}
