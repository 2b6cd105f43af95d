use crate::cli::SynthArgs;
use anyhow::Context;
use shield_simulation::{write_recording, LineNoise, SyntheticConfig};

pub fn execute(args: SynthArgs) -> anyhow::Result<()> {
    let sample_count = (args.seconds * args.sample_rate).round() as usize;
    let defaults = SyntheticConfig::default();

    // keep the default spike only when it fits the requested shape
    let artifacts = defaults
        .artifacts
        .iter()
        .copied()
        .filter(|a| a.row < sample_count && a.channel.map_or(true, |c| c < args.channels))
        .collect();

    let config = SyntheticConfig {
        sample_rate: args.sample_rate,
        channel_count: args.channels,
        sample_count,
        line_noise: defaults.line_noise.map(|l| LineNoise {
            frequency_hz: args.line_hz,
            ..l
        }),
        artifacts,
        seed: args.seed,
        ..defaults
    };

    let dir = write_recording(&args.root, &config)
        .with_context(|| format!("failed to write recording under {}", args.root.display()))?;
    println!("{}", dir.display());
    Ok(())
}
