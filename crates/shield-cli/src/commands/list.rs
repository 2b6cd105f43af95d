use crate::cli::ListArgs;
use shield_ingest::find_recordings;

pub fn execute(args: ListArgs) -> anyhow::Result<()> {
    let recordings = find_recordings(&args.root)?;
    if recordings.is_empty() {
        eprintln!("no recordings under {}", args.root.display());
    }
    for dir in recordings {
        println!("{}", dir.display());
    }
    Ok(())
}
