use crate::cli::InspectArgs;
use anyhow::Context;
use shield_ingest::recording::{EVENT_FILES, METADATA_FILE};
use shield_ingest::{
    declared_layout, inspect_recording, load_event_stream, load_samples, parse_metadata, sample_rate_hz,
    select_sample_file, EventInfo,
};

pub fn execute(args: InspectArgs) -> anyhow::Result<()> {
    let dir = &args.recording;
    let files = inspect_recording(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    println!("{}", dir.display());
    for file in &files {
        println!("  {:<22} {:>12} bytes", file.name, file.size);
    }

    let metadata = parse_metadata(dir.join(METADATA_FILE));
    let keys: Vec<&str> = metadata.keys().collect();
    println!("metadata: {:?} [{}]", metadata.source(), keys.join(", "));
    println!("sample rate: {} Hz", sample_rate_hz(&metadata));

    if let Some(sample_path) = select_sample_file(dir) {
        let hint = declared_layout(&metadata);
        match load_samples(&sample_path, hint.element_type, hint.channel_count) {
            Ok((_, info)) => println!(
                "samples: {} x {} {} ({:?}, {} elements dropped)",
                info.sample_count,
                info.channel_count,
                info.element_type,
                info.layout_source,
                info.truncated_elements
            ),
            Err(e) => println!("samples: {}", e),
        }
    } else {
        println!("samples: none");
    }

    for name in EVENT_FILES {
        let (_, info) = load_event_stream(dir.join(name));
        match info {
            EventInfo::Missing => {}
            EventInfo::Decoded {
                element_type,
                event_count,
            } => println!("{name}: {event_count} {element_type} events"),
            EventInfo::Uninterpretable { raw_bytes } => {
                println!("{name}: {raw_bytes} bytes, not decodable")
            }
        }
    }

    Ok(())
}
