//! Schema-less recording metadata
//!
//! A metadata file may be JSON, `key=value` text or something unreadable.
//! The record keeps whatever could be recovered in file order and offers
//! typed lookups with aliases, so consumers never have to know which
//! format the file used.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// One metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// JSON number
    Number(f64),
    /// JSON string or the right-hand side of a `key=value` line
    Text(String),
    /// Any other JSON value (bool, null, array, object)
    Structured(Value),
    /// Truncated hex dump of an unparsable file
    HexDump(String),
}

impl MetadataValue {
    /// Numeric view; text is trimmed and parsed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(v) => Some(*v),
            MetadataValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Textual view of `Text` and `HexDump` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) | MetadataValue::HexDump(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative integer view; fractional numbers are rejected
    pub fn as_usize(&self) -> Option<usize> {
        let v = self.as_f64()?;
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= usize::MAX as f64 {
            Some(v as usize)
        } else {
            None
        }
    }
}

impl From<Value> for MetadataValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(v) => MetadataValue::Number(v),
                None => MetadataValue::Structured(Value::Number(n)),
            },
            Value::String(s) => MetadataValue::Text(s),
            other => MetadataValue::Structured(other),
        }
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataValue::Number(v) => serializer.serialize_f64(*v),
            MetadataValue::Text(s) | MetadataValue::HexDump(s) => serializer.serialize_str(s),
            MetadataValue::Structured(v) => v.serialize(serializer),
        }
    }
}

/// Which parse path produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataSource {
    /// No metadata file at the given path
    #[default]
    Missing,
    /// File exists but could not be read
    Unreadable,
    /// UTF-8 JSON object
    Json,
    /// Newline separated `key=value` pairs
    KeyValue,
    /// Nothing parsed; record holds a hex dump
    HexFallback,
}

/// Ordered, immutable-after-construction metadata mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    entries: Vec<(String, MetadataValue)>,
    source: MetadataSource,
}

impl MetadataRecord {
    /// Empty record for a given source
    pub fn new(source: MetadataSource) -> Self {
        MetadataRecord {
            entries: Vec::new(),
            source,
        }
    }

    /// Insert a value. An existing key keeps its position and takes the
    /// new value.
    pub fn insert(&mut self, key: impl Into<String>, value: MetadataValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn source(&self) -> MetadataSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// First present key among `aliases`, in alias order
    pub fn get_any(&self, aliases: &[&str]) -> Option<&MetadataValue> {
        aliases.iter().find_map(|key| self.get(key))
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(MetadataValue::as_f64)
    }

    /// First alias whose value is numeric
    pub fn get_f64_any(&self, aliases: &[&str]) -> Option<f64> {
        aliases.iter().find_map(|key| self.get_f64(key))
    }

    /// First alias whose value is a non-negative integer
    pub fn get_usize_any(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|key| self.get(key).and_then(MetadataValue::as_usize))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, MetadataValue)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (String, MetadataValue)>>(iter: I) -> Self {
        let mut record = MetadataRecord::default();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut record = MetadataRecord::new(MetadataSource::KeyValue);
        record.insert("a", MetadataValue::Text("1".into()));
        record.insert("b", MetadataValue::Text("2".into()));
        record.insert("a", MetadataValue::Text("3".into()));

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.get_str("a"), Some("3"));
        assert_eq!(record.source(), MetadataSource::KeyValue);
    }

    #[test]
    fn test_alias_lookup() {
        let mut record = MetadataRecord::default();
        record.insert("sample_rate", MetadataValue::Text(" 500 ".into()));
        record.insert("channels", MetadataValue::Number(16.0));

        assert_eq!(record.get_f64_any(&["samplerate", "sample_rate"]), Some(500.0));
        assert_eq!(record.get_usize_any(&["n_channels", "channels"]), Some(16));
        assert_eq!(record.get_f64_any(&["missing"]), None);
    }

    #[test]
    fn test_integer_view_rejects_fractions() {
        assert_eq!(MetadataValue::Number(8.5).as_usize(), None);
        assert_eq!(MetadataValue::Number(-1.0).as_usize(), None);
        assert_eq!(MetadataValue::Text("32".into()).as_usize(), Some(32));
        assert_eq!(MetadataValue::Structured(Value::Bool(true)).as_usize(), None);
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(MetadataValue::from(serde_json::json!(250)), MetadataValue::Number(250.0));
        assert_eq!(
            MetadataValue::from(serde_json::json!("EEG")),
            MetadataValue::Text("EEG".into())
        );
        assert!(matches!(
            MetadataValue::from(serde_json::json!([1, 2])),
            MetadataValue::Structured(_)
        ));
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let record: MetadataRecord = vec![
            ("z".to_string(), MetadataValue::Number(1.0)),
            ("a".to_string(), MetadataValue::Text("x".into())),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"z":1.0,"a":"x"}"#);
    }
}
