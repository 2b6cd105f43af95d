use super::NoSampleFile;
use crate::cli::RunArgs;
use anyhow::Context;
use serde::Serialize;
use shield_core::MetadataRecord;
use shield_ingest::recording::METADATA_FILE;
use shield_ingest::{declared_layout, load_samples, parse_metadata, sample_rate_hz, select_sample_file, SampleInfo};
use shield_processing::spectral::attenuation_db;
use shield_processing::{good_fraction, power_at, ShieldingConfig, ShieldingPipeline, StageReport};
use tracing::info;

/// Default output file name inside the recording directory
pub const CLEANED_FILE: &str = "eeg_cleaned.json";

#[derive(Serialize)]
struct CleanedOutput<'a> {
    source: String,
    sample_rate_hz: f64,
    metadata: &'a MetadataRecord,
    info: &'a SampleInfo,
    config: &'a ShieldingConfig,
    good_fraction: f64,
    line_noise_attenuation_db: Option<f64>,
    stages: &'a [StageReport],
    mask: &'a [bool],
    #[serde(skip_serializing_if = "Option::is_none")]
    cleaned: Option<Vec<&'a [f64]>>,
}

fn resolve_config(args: &RunArgs) -> anyhow::Result<ShieldingConfig> {
    let mut config = match &args.config {
        Some(path) => ShieldingConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ShieldingConfig::default(),
    };

    if let Some(low) = args.low {
        config.band_low_hz = low;
    }
    if let Some(high) = args.high {
        config.band_high_hz = high;
    }
    if let Some(order) = args.order {
        config.filter_order = order;
    }
    if args.no_notch {
        config.notch_hz = None;
    } else if let Some(notch) = args.notch {
        config.notch_hz = Some(notch);
    }
    if let Some(quality) = args.quality {
        config.notch_quality = quality;
    }
    if let Some(z) = args.z_threshold {
        config.z_threshold = z;
    }

    Ok(config)
}

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let dir = &args.recording;
    let sample_path = select_sample_file(dir).ok_or_else(|| NoSampleFile(dir.clone()))?;

    let metadata = parse_metadata(dir.join(METADATA_FILE));
    let fs = args.sample_rate.unwrap_or_else(|| sample_rate_hz(&metadata));
    let hint = declared_layout(&metadata);

    let (samples, sample_info) = load_samples(
        &sample_path,
        args.dtype.or(hint.element_type),
        args.channels.or(hint.channel_count),
    )
    .with_context(|| format!("failed to load {}", sample_path.display()))?;

    info!(
        file = %sample_path.display(),
        rows = sample_info.sample_count,
        channels = sample_info.channel_count,
        element_type = %sample_info.element_type,
        layout = ?sample_info.layout_source,
        sample_rate = fs,
        "loaded samples"
    );
    if sample_info.truncated_elements > 0 {
        info!(dropped = sample_info.truncated_elements, "trailing partial row dropped");
    }

    let config = resolve_config(&args)?;
    let pipeline = ShieldingPipeline::from_config(&config, fs)
        .with_context(|| format!("cannot condition at {fs} Hz"))?;

    let matrix = samples.to_f64();
    let result = pipeline.process(&matrix)?;

    let good = good_fraction(&result.mask);
    let attenuation = config.notch_hz.map(|hz| {
        let before: f64 = matrix
            .all_channels()
            .iter()
            .map(|c| power_at(c, fs, hz))
            .sum();
        let after: f64 = result
            .cleaned
            .all_channels()
            .iter()
            .map(|c| power_at(c, fs, hz))
            .sum();
        attenuation_db(before, after)
    });

    info!(
        good_fraction = good,
        elapsed_us = result.total_us,
        "conditioning finished"
    );
    if let (Some(hz), Some(db)) = (config.notch_hz, attenuation) {
        info!(line_hz = hz, attenuation_db = db, "line noise");
    }

    let output = CleanedOutput {
        source: sample_path.display().to_string(),
        sample_rate_hz: fs,
        metadata: &metadata,
        info: &sample_info,
        config: &config,
        good_fraction: good,
        line_noise_attenuation_db: attenuation,
        stages: &result.stages,
        mask: &result.mask,
        cleaned: (!args.summary_only).then(|| result.cleaned.iter_rows().collect()),
    };

    let out_path = args.out.clone().unwrap_or_else(|| dir.join(CLEANED_FILE));
    let json = serde_json::to_string(&output).context("failed to serialize output")?;
    std::fs::write(&out_path, json).with_context(|| format!("failed to write {}", out_path.display()))?;

    println!(
        "{}: {} x {} {} at {} Hz, {:.1}% clean -> {}",
        sample_path.display(),
        sample_info.sample_count,
        sample_info.channel_count,
        sample_info.element_type,
        fs,
        good * 100.0,
        out_path.display()
    );
    Ok(())
}
