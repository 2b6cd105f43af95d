//! Configuration for the shielding pipeline

use serde::{Deserialize, Serialize};
use shield_core::{ShieldError, ShieldResult};
use std::path::Path;

/// Conditioning parameters.
///
/// Fields missing from a JSON document take their defaults; `"notch_hz":
/// null` turns the notch stage off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldingConfig {
    /// Lower band-pass edge (Hz)
    pub band_low_hz: f64,
    /// Upper band-pass edge (Hz)
    pub band_high_hz: f64,
    /// Butterworth prototype order
    pub filter_order: usize,
    /// Mains frequency to reject, if any
    pub notch_hz: Option<f64>,
    /// Notch quality factor
    pub notch_quality: f64,
    /// Absolute z-score above which a sample row is an artifact
    pub z_threshold: f64,
}

impl Default for ShieldingConfig {
    fn default() -> Self {
        Self {
            band_low_hz: 1.0,
            band_high_hz: 40.0,
            filter_order: 4,
            notch_hz: Some(50.0),
            notch_quality: 30.0,
            z_threshold: 6.0,
        }
    }
}

impl ShieldingConfig {
    /// Band edges as a pair
    pub fn band(&self) -> (f64, f64) {
        (self.band_low_hz, self.band_high_hz)
    }

    /// Check that the configuration can be realised at sample rate `fs`
    pub fn validate(&self, fs: f64) -> ShieldResult<()> {
        if self.z_threshold.is_nan() || self.z_threshold < 0.0 {
            return Err(ShieldError::InvalidConfig {
                reason: format!("z threshold must be non-negative, got {}", self.z_threshold),
            });
        }
        crate::filters::butterworth_bandpass(self.band_low_hz, self.band_high_hz, fs, self.filter_order)?;
        if let Some(notch_hz) = self.notch_hz {
            crate::filters::iir_notch(notch_hz, self.notch_quality, fs)?;
        }
        Ok(())
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> ShieldResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ShieldError::InvalidConfig {
            reason: format!("JSON serialization failed: {}", e),
        })
    }

    /// Load configuration from JSON
    pub fn from_json(json: &str) -> ShieldResult<Self> {
        serde_json::from_str(json).map_err(|e| ShieldError::InvalidConfig {
            reason: format!("JSON deserialization failed: {}", e),
        })
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ShieldResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ShieldError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ShieldError::Io(e),
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ShieldingConfig::default();
        assert_eq!(config.band(), (1.0, 40.0));
        assert_eq!(config.filter_order, 4);
        assert_eq!(config.notch_hz, Some(50.0));
        assert_eq!(config.notch_quality, 30.0);
        assert_eq!(config.z_threshold, 6.0);
        assert!(config.validate(250.0).is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = ShieldingConfig::from_json(r#"{"band_high_hz": 30.0, "notch_hz": null}"#).unwrap();
        assert_eq!(config.band(), (1.0, 30.0));
        assert_eq!(config.notch_hz, None);
        assert_eq!(config.z_threshold, 6.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = ShieldingConfig {
            notch_hz: Some(60.0),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(ShieldingConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_validation() {
        // 50 Hz notch is above nyquist at 80 Hz sampling; so is the 40 Hz edge
        let config = ShieldingConfig::default();
        assert!(matches!(
            config.validate(80.0),
            Err(ShieldError::InvalidFilterConfig { .. })
        ));

        let config = ShieldingConfig {
            band_high_hz: 30.0,
            ..Default::default()
        };
        assert!(config.validate(80.0).is_err());

        let config = ShieldingConfig {
            band_high_hz: 30.0,
            notch_hz: None,
            ..Default::default()
        };
        assert!(config.validate(80.0).is_ok());

        let config = ShieldingConfig {
            z_threshold: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(250.0),
            Err(ShieldError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"filter_order": 2}}"#).unwrap();
        let config = ShieldingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.filter_order, 2);

        assert!(ShieldingConfig::from_file("/no/such/config.json")
            .unwrap_err()
            .is_not_found());
        assert!(ShieldingConfig::from_json("not json").is_err());
    }
}
