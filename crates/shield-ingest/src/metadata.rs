//! Metadata file parsing
//!
//! Attempts, in order: UTF-8 JSON object, lenient `key=value` lines, hex
//! dump. Parsing never fails; a missing file yields an empty record.

use shield_core::{MetadataRecord, MetadataSource, MetadataValue};
use std::path::Path;
use tracing::debug;

/// Key holding the hex dump of an unparsable metadata file
pub const HEX_FALLBACK_KEY: &str = "raw_bytes_hex";

/// Number of hex characters kept by the fallback
pub const HEX_FALLBACK_LEN: usize = 1024;

/// Keys probed for the sampling rate, in priority order
pub const SAMPLE_RATE_KEYS: [&str; 2] = ["samplerate", "sample_rate"];

/// Characters that end a `key=value` line
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Sampling rate assumed when metadata does not provide one
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 250.0;

/// Parse a metadata file.
///
/// Returns an empty record when the path does not exist, and an empty
/// record tagged [`MetadataSource::Unreadable`] when it cannot be read.
pub fn parse_metadata<P: AsRef<Path>>(path: P) -> MetadataRecord {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "metadata file absent");
        return MetadataRecord::new(MetadataSource::Missing);
    }

    match std::fs::read(path) {
        Ok(raw) => parse_metadata_bytes(&raw),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "metadata file unreadable");
            MetadataRecord::new(MetadataSource::Unreadable)
        }
    }
}

/// Parse raw metadata bytes with the JSON → key=value → hex cascade
pub fn parse_metadata_bytes(raw: &[u8]) -> MetadataRecord {
    if let Some(record) = parse_json(raw) {
        debug!(keys = record.len(), "metadata parsed as JSON");
        return record;
    }

    if let Some(record) = parse_key_values(raw) {
        debug!(keys = record.len(), "metadata parsed as key=value text");
        return record;
    }

    debug!(bytes = raw.len(), "metadata unparsable, keeping hex dump");
    let dump = hex::encode(&raw[..raw.len().min(HEX_FALLBACK_LEN / 2)]);

    let mut record = MetadataRecord::new(MetadataSource::HexFallback);
    record.insert(HEX_FALLBACK_KEY, MetadataValue::HexDump(dump));
    record
}

fn parse_json(raw: &[u8]) -> Option<MetadataRecord> {
    let text = std::str::from_utf8(raw).ok()?;
    let serde_json::Value::Object(map) = serde_json::from_str::<serde_json::Value>(text).ok()? else {
        return None;
    };

    let mut record = MetadataRecord::new(MetadataSource::Json);
    for (key, value) in map {
        record.insert(key, MetadataValue::from(value));
    }
    Some(record)
}

fn parse_key_values(raw: &[u8]) -> Option<MetadataRecord> {
    // Invalid sequences are dropped rather than replaced
    let text = String::from_utf8_lossy(raw).replace('\u{FFFD}', "");

    let mut record = MetadataRecord::new(MetadataSource::KeyValue);
    for line in text.split(LINE_BREAKS) {
        if let Some((key, value)) = line.trim().split_once('=') {
            record.insert(key.trim(), MetadataValue::Text(value.trim().to_string()));
        }
    }

    (!record.is_empty()).then_some(record)
}

/// Sampling rate declared by a record, or [`DEFAULT_SAMPLE_RATE_HZ`].
///
/// Values that are not positive finite numbers are skipped.
pub fn sample_rate_hz(record: &MetadataRecord) -> f64 {
    SAMPLE_RATE_KEYS
        .iter()
        .filter_map(|key| record.get_f64(key))
        .find(|rate| rate.is_finite() && *rate > 0.0)
        .unwrap_or(DEFAULT_SAMPLE_RATE_HZ)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_is_empty() {
        let record = parse_metadata("/definitely/not/here/eeg.inf");
        assert!(record.is_empty());
        assert_eq!(record.source(), MetadataSource::Missing);
    }

    #[test]
    fn test_json_object() {
        let record = parse_metadata_bytes(br#"{"samplerate": 500, "device": "nm", "extra": [1, 2]}"#);
        assert_eq!(record.source(), MetadataSource::Json);
        assert_eq!(record.get_f64("samplerate"), Some(500.0));
        assert_eq!(record.get_str("device"), Some("nm"));
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["samplerate", "device", "extra"]);
    }

    #[test]
    fn test_json_array_falls_through() {
        // Valid JSON but not a mapping, and no '=' anywhere
        let record = parse_metadata_bytes(b"[1, 2, 3]");
        assert_eq!(record.source(), MetadataSource::HexFallback);
    }

    #[test]
    fn test_key_value_lines() {
        let record = parse_metadata_bytes(b"  sample_rate = 250 \r\n\nname=a=b\nnoise line\n");
        assert_eq!(record.source(), MetadataSource::KeyValue);
        assert_eq!(record.get_str("sample_rate"), Some("250"));
        assert_eq!(record.get_str("name"), Some("a=b"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_key_value_unicode_line_breaks() {
        let record = parse_metadata_bytes("samplerate=500\x0cchannels=8\u{2028}dtype=int16".as_bytes());
        assert_eq!(record.source(), MetadataSource::KeyValue);
        assert_eq!(record.len(), 3);
        assert_eq!(sample_rate_hz(&record), 500.0);
        assert_eq!(record.get_usize_any(&["channels"]), Some(8));
        assert_eq!(record.get_str("dtype"), Some("int16"));
    }

    #[test]
    fn test_key_value_with_invalid_utf8() {
        let record = parse_metadata_bytes(b"gain=\xff12\nchannels=8");
        assert_eq!(record.source(), MetadataSource::KeyValue);
        assert_eq!(record.get_str("gain"), Some("12"));
        assert_eq!(record.get_usize_any(&["channels"]), Some(8));
    }

    #[test]
    fn test_hex_fallback_is_truncated() {
        let raw: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).filter(|b| *b != b'=').collect();
        let record = parse_metadata_bytes(&raw);
        assert_eq!(record.source(), MetadataSource::HexFallback);

        let dump = record.get_str(HEX_FALLBACK_KEY).unwrap();
        assert_eq!(dump.len(), HEX_FALLBACK_LEN);
        assert!(dump.starts_with("00010203"));
    }

    #[test]
    fn test_empty_file_never_fails() {
        let file = NamedTempFile::new().unwrap();
        let record = parse_metadata(file.path());
        assert_eq!(record.source(), MetadataSource::HexFallback);
        assert_eq!(record.get_str(HEX_FALLBACK_KEY), Some(""));
    }

    #[test]
    fn test_file_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\"sample_rate\": \"512\"}}").unwrap();
        file.flush().unwrap();

        let record = parse_metadata(file.path());
        assert_eq!(sample_rate_hz(&record), 512.0);
    }

    #[test]
    fn test_sample_rate_aliases_and_default() {
        let record = parse_metadata_bytes(b"samplerate=1000\nsample_rate=250");
        assert_eq!(sample_rate_hz(&record), 1000.0);

        let record = parse_metadata_bytes(b"samplerate=fast\nsample_rate=128");
        assert_eq!(sample_rate_hz(&record), 128.0);

        let record = parse_metadata_bytes(b"samplerate=-5");
        assert_eq!(sample_rate_hz(&record), DEFAULT_SAMPLE_RATE_HZ);

        assert_eq!(sample_rate_hz(&MetadataRecord::default()), DEFAULT_SAMPLE_RATE_HZ);
    }
}
