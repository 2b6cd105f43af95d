//! Core signal processor trait and stage timing

use serde::{Deserialize, Serialize};
use shield_core::{SampleMatrix, ShieldError, ShieldResult};
use std::time::Instant;

/// A conditioning step that maps a time-by-channel matrix to a matrix of
/// the same shape.
pub trait SignalProcessor: Send + Sync {
    /// Process the whole matrix at once
    fn process(&self, input: &SampleMatrix<f64>) -> ShieldResult<SampleMatrix<f64>>;

    /// Stage identifier used in reports and logs
    fn name(&self) -> &str;

    /// Stage kind for pipeline organisation
    fn kind(&self) -> StageKind {
        StageKind::Filter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Linear zero-phase filtering
    Filter,
    /// Statistical detection and repair
    ArtifactRepair,
}

/// Outcome of one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub name: String,
    pub kind: StageKind,
    pub elapsed_us: u64,
}

/// Helper for timing a stage
pub struct StageTimer {
    name: String,
    kind: StageKind,
    start_time: Instant,
}

impl StageTimer {
    pub fn start(name: &str, kind: StageKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            start_time: Instant::now(),
        }
    }

    /// Finish timing and return the report
    pub fn finish(self) -> StageReport {
        StageReport {
            name: self.name,
            kind: self.kind,
            elapsed_us: self.start_time.elapsed().as_micros() as u64,
        }
    }
}

/// Apply `f` to every channel and reassemble the matrix.
///
/// `f` must return a channel of the same length it was given.
pub fn for_each_channel<F>(input: &SampleMatrix<f64>, f: F) -> ShieldResult<SampleMatrix<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let mut output = input.clone();
    for channel_index in 0..input.channel_count() {
        let channel = input.channel(channel_index)?;
        let processed = f(&channel);
        if processed.len() != channel.len() {
            return Err(ShieldError::ShapeMismatch {
                reason: format!(
                    "channel {channel_index}: {} samples in, {} out",
                    channel.len(),
                    processed.len()
                ),
            });
        }
        output.set_channel(channel_index, &processed)?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stage_timer() {
        let timer = StageTimer::start("bandpass", StageKind::Filter);
        std::thread::sleep(Duration::from_millis(1));
        let report = timer.finish();

        assert_eq!(report.name, "bandpass");
        assert_eq!(report.kind, StageKind::Filter);
        assert!(report.elapsed_us > 0);
    }

    #[test]
    fn test_for_each_channel() {
        let matrix = SampleMatrix::from_channels(vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]]).unwrap();
        let doubled = for_each_channel(&matrix, |c| c.iter().map(|x| x * 2.0).collect()).unwrap();
        assert_eq!(doubled.as_flat(), &[2.0, 20.0, 4.0, 40.0, 6.0, 60.0]);

        let err = for_each_channel(&matrix, |c| c[..1].to_vec()).unwrap_err();
        assert!(matches!(err, ShieldError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_report_serializes() {
        let report = StageReport {
            name: "notch".to_string(),
            kind: StageKind::Filter,
            elapsed_us: 12,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"name":"notch","kind":"filter","elapsed_us":12}"#);
    }
}
