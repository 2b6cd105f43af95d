//! Event and marker streams
//!
//! Event files share the sample file's binary convention but have no channel
//! structure and no declared type, so decoding is a first-fit search.

use serde::{Deserialize, Serialize};
use shield_core::element::decode_elements;
use shield_core::ElementType;
use std::path::Path;
use tracing::debug;

/// Element types tried when decoding an event file, in order
pub const EVENT_ELEMENT_PRIORITY: [ElementType; 3] =
    [ElementType::Float32, ElementType::Int32, ElementType::Int16];

/// Decoded event values
#[derive(Debug, Clone, PartialEq)]
pub enum EventStream {
    Float32(Vec<f32>),
    Int32(Vec<i32>),
    Int16(Vec<i16>),
    Empty,
}

impl EventStream {
    pub fn len(&self) -> usize {
        match self {
            EventStream::Float32(v) => v.len(),
            EventStream::Int32(v) => v.len(),
            EventStream::Int16(v) => v.len(),
            EventStream::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            EventStream::Float32(_) => Some(ElementType::Float32),
            EventStream::Int32(_) => Some(ElementType::Int32),
            EventStream::Int16(_) => Some(ElementType::Int16),
            EventStream::Empty => None,
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            EventStream::Float32(v) => v.iter().map(|&x| x as f64).collect(),
            EventStream::Int32(v) => v.iter().map(|&x| x as f64).collect(),
            EventStream::Int16(v) => v.iter().map(|&x| x as f64).collect(),
            EventStream::Empty => Vec::new(),
        }
    }
}

/// What was learned about an event file.
///
/// `Missing` and `Uninterpretable` both come with an empty stream; they
/// differ in whether the file was there at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventInfo {
    Missing,
    Decoded {
        element_type: ElementType,
        event_count: usize,
    },
    Uninterpretable {
        raw_bytes: u64,
    },
}

/// Load an event file, trying each type of [`EVENT_ELEMENT_PRIORITY`] and
/// keeping the first non-empty decoding. Never fails.
pub fn load_event_stream<P: AsRef<Path>>(path: P) -> (EventStream, EventInfo) {
    let path = path.as_ref();

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "event file absent");
            return (EventStream::Empty, EventInfo::Missing);
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "event file unreadable");
            let raw_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            return (EventStream::Empty, EventInfo::Uninterpretable { raw_bytes });
        }
    };

    for element_type in EVENT_ELEMENT_PRIORITY {
        let stream = decode_as(element_type, &bytes);
        if !stream.is_empty() {
            let info = EventInfo::Decoded {
                element_type,
                event_count: stream.len(),
            };
            debug!(path = %path.display(), %element_type, events = stream.len(), "decoded event stream");
            return (stream, info);
        }
    }

    (
        EventStream::Empty,
        EventInfo::Uninterpretable {
            raw_bytes: bytes.len() as u64,
        },
    )
}

fn decode_as(element_type: ElementType, bytes: &[u8]) -> EventStream {
    match element_type {
        ElementType::Float32 => EventStream::Float32(decode_elements(bytes)),
        ElementType::Int32 => EventStream::Int32(decode_elements(bytes)),
        ElementType::Int16 => EventStream::Int16(decode_elements(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_core::element::encode_elements;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_bytes(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_float_events_decode_first() {
        let markers = [1.0f32, 0.0, 2.0, 0.0, 3.0];
        let file = write_bytes(encode_elements(&markers));

        let (stream, info) = load_event_stream(file.path());
        assert_eq!(stream, EventStream::Float32(markers.to_vec()));
        assert_eq!(
            info,
            EventInfo::Decoded {
                element_type: ElementType::Float32,
                event_count: 5
            }
        );
    }

    #[test]
    fn test_short_file_falls_back_to_int16() {
        let file = write_bytes(encode_elements(&[7i16]));

        let (stream, info) = load_event_stream(file.path());
        assert_eq!(stream, EventStream::Int16(vec![7]));
        assert!(matches!(
            info,
            EventInfo::Decoded {
                element_type: ElementType::Int16,
                event_count: 1
            }
        ));
    }

    #[test]
    fn test_missing_and_uninterpretable_differ() {
        let (stream, info) = load_event_stream("/no/such/event.raw");
        assert!(stream.is_empty());
        assert_eq!(info, EventInfo::Missing);

        let file = write_bytes(&[0xab]);
        let (stream, info) = load_event_stream(file.path());
        assert!(stream.is_empty());
        assert_eq!(info, EventInfo::Uninterpretable { raw_bytes: 1 });

        let file = write_bytes(&[]);
        let (_, info) = load_event_stream(file.path());
        assert_eq!(info, EventInfo::Uninterpretable { raw_bytes: 0 });
    }

    #[test]
    fn test_unreadable_path_is_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let (stream, info) = load_event_stream(dir.path());
        assert!(stream.is_empty());
        assert!(matches!(info, EventInfo::Uninterpretable { .. }));
    }

    #[test]
    fn test_info_serializes_with_status_tag() {
        let json = serde_json::to_string(&EventInfo::Uninterpretable { raw_bytes: 3 }).unwrap();
        assert_eq!(json, r#"{"status":"uninterpretable","raw_bytes":3}"#);
    }
}
