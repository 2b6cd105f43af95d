//! Recording directory discovery

use serde::Serialize;
use shield_core::ShieldResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sub-directory of a dataset root that holds one folder per recording
pub const RECORDINGS_DIR: &str = "recording";
pub const METADATA_FILE: &str = "eeg.inf";
pub const RAW_SAMPLE_FILE: &str = "eeg.raw";
pub const PREPROCESSED_SAMPLE_FILE: &str = "eeg_preprocessed.raw";
pub const EVENT_FILE: &str = "event.raw";
pub const STIMULUS_FILE: &str = "stim.raw";
pub const TARGET_INFO_FILE: &str = "target_info.raw";

/// Sample files in order of preference
pub const SAMPLE_FILE_PRIORITY: [&str; 2] = [PREPROCESSED_SAMPLE_FILE, RAW_SAMPLE_FILE];

/// Every file name a recording directory is known to carry
pub const KNOWN_FILES: [&str; 6] = [
    METADATA_FILE,
    RAW_SAMPLE_FILE,
    PREPROCESSED_SAMPLE_FILE,
    EVENT_FILE,
    STIMULUS_FILE,
    TARGET_INFO_FILE,
];

/// Auxiliary marker files decoded with [`crate::load_event_stream`]
pub const EVENT_FILES: [&str; 3] = [EVENT_FILE, STIMULUS_FILE, TARGET_INFO_FILE];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingFile {
    pub name: &'static str,
    pub path: PathBuf,
    pub size: u64,
}

/// Sorted recording directories under `root/recording`. A missing
/// `recording` folder yields an empty list.
pub fn find_recordings<P: AsRef<Path>>(root: P) -> ShieldResult<Vec<PathBuf>> {
    let base = root.as_ref().join(RECORDINGS_DIR);
    if !base.is_dir() {
        debug!(path = %base.display(), "no recording folder");
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(&base)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// First sample file of [`SAMPLE_FILE_PRIORITY`] present in `dir`
pub fn select_sample_file<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    SAMPLE_FILE_PRIORITY
        .iter()
        .map(|name| dir.as_ref().join(name))
        .find(|path| path.is_file())
}

/// Known files present in `dir`, in [`KNOWN_FILES`] order
pub fn inspect_recording<P: AsRef<Path>>(dir: P) -> ShieldResult<Vec<RecordingFile>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for name in KNOWN_FILES {
        let path = dir.join(name);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(RecordingFile {
                name,
                path,
                size: meta.len(),
            }),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_recordings_sorted() {
        let root = tempdir().unwrap();
        assert!(find_recordings(root.path()).unwrap().is_empty());

        for name in ["b", "a", "c"] {
            fs::create_dir_all(root.path().join(RECORDINGS_DIR).join(name)).unwrap();
        }
        fs::write(root.path().join(RECORDINGS_DIR).join("notes.txt"), b"x").unwrap();

        let found = find_recordings(root.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_preprocessed_preferred() {
        let dir = tempdir().unwrap();
        assert_eq!(select_sample_file(dir.path()), None);

        fs::write(dir.path().join(RAW_SAMPLE_FILE), [0u8; 4]).unwrap();
        assert_eq!(
            select_sample_file(dir.path()),
            Some(dir.path().join(RAW_SAMPLE_FILE))
        );

        fs::write(dir.path().join(PREPROCESSED_SAMPLE_FILE), [0u8; 4]).unwrap();
        assert_eq!(
            select_sample_file(dir.path()),
            Some(dir.path().join(PREPROCESSED_SAMPLE_FILE))
        );
    }

    #[test]
    fn test_inspect_lists_known_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(EVENT_FILE), [0u8; 12]).unwrap();
        fs::write(dir.path().join(METADATA_FILE), b"samplerate=250").unwrap();
        fs::write(dir.path().join("unrelated.bin"), [0u8; 3]).unwrap();

        let files = inspect_recording(dir.path()).unwrap();
        let summary: Vec<_> = files.iter().map(|f| (f.name, f.size)).collect();
        assert_eq!(summary, [(METADATA_FILE, 14), (EVENT_FILE, 12)]);
    }
}
