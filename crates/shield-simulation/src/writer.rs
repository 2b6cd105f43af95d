//! Writers for recording directories
//!
//! Output mirrors what a headset session leaves on disk: headerless
//! native-order sample and event files next to a small metadata file.

use crate::synthetic::{SyntheticConfig, SyntheticRecording};
use serde_json::json;
use shield_core::element::encode_elements;
use shield_core::{Element, SampleMatrix, ShieldResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write a matrix as raw native-order elements, row-major. Returns the
/// number of bytes written.
pub fn write_raw<T: Element, P: AsRef<Path>>(path: P, matrix: &SampleMatrix<T>) -> ShieldResult<u64> {
    let bytes = encode_elements(matrix.as_flat());
    fs::write(path.as_ref(), bytes)?;
    Ok(bytes.len() as u64)
}

/// Write `eeg.inf` style JSON metadata
pub fn write_metadata<T: Element, P: AsRef<Path>>(
    path: P,
    sample_rate: f64,
    matrix: &SampleMatrix<T>,
) -> ShieldResult<()> {
    let doc = json!({
        "samplerate": sample_rate,
        "n_channels": matrix.channel_count(),
        "dtype": T::TYPE.name(),
    });
    fs::write(path.as_ref(), format!("{doc:#}"))?;
    Ok(())
}

/// Generate a recording from `config` and write it under
/// `root/recording/<n>`, where `n` is the first unused index. Returns the
/// recording directory.
pub fn write_recording<P: AsRef<Path>>(root: P, config: &SyntheticConfig) -> ShieldResult<PathBuf> {
    let base = root.as_ref().join("recording");
    fs::create_dir_all(&base)?;

    let mut index = 0u32;
    let dir = loop {
        let candidate = base.join(index.to_string());
        if !candidate.exists() {
            break candidate;
        }
        index += 1;
    };
    fs::create_dir_all(&dir)?;

    let mut sim = SyntheticRecording::new(config.clone())?;
    let matrix = sim.generate()?;

    let sample_bytes = write_raw(dir.join("eeg.raw"), &matrix)?;
    write_metadata(dir.join("eeg.inf"), config.sample_rate, &matrix)?;

    let markers = SampleMatrix::single_channel(sim.event_markers(1.0));
    write_raw(dir.join("event.raw"), &markers)?;

    debug!(
        path = %dir.display(),
        rows = matrix.rows(),
        channels = matrix.channel_count(),
        bytes = sample_bytes,
        "wrote synthetic recording"
    );
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_core::element::decode_elements;
    use tempfile::tempdir;

    #[test]
    fn test_write_raw_native_order() {
        let dir = tempdir().unwrap();
        let matrix = SampleMatrix::from_flat(vec![1i16, -2, 3, -4], 2).unwrap();
        let path = dir.path().join("eeg.raw");

        assert_eq!(write_raw(&path, &matrix).unwrap(), 8);
        let decoded: Vec<i16> = decode_elements(&fs::read(&path).unwrap());
        assert_eq!(decoded, matrix.as_flat());
    }

    #[test]
    fn test_write_recording_layout() {
        let root = tempdir().unwrap();
        let config = SyntheticConfig {
            channel_count: 4,
            sample_count: 500,
            artifacts: Vec::new(),
            ..Default::default()
        };

        let first = write_recording(root.path(), &config).unwrap();
        let second = write_recording(root.path(), &config).unwrap();
        assert_eq!(first, root.path().join("recording").join("0"));
        assert_eq!(second, root.path().join("recording").join("1"));

        assert_eq!(fs::metadata(first.join("eeg.raw")).unwrap().len(), 500 * 4 * 4);
        assert_eq!(fs::metadata(first.join("event.raw")).unwrap().len(), 500 * 4);

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(first.join("eeg.inf")).unwrap()).unwrap();
        assert_eq!(meta["samplerate"], 250.0);
        assert_eq!(meta["n_channels"], 4);
        assert_eq!(meta["dtype"], "float32");
    }
}
