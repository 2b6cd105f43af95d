//! Amplitude artifact detection and repair
//!
//! A time sample is an artifact when any channel strays more than a z-score
//! threshold from its channel mean. Flagged rows are rebuilt per channel by
//! linear interpolation between the surrounding clean rows.

use crate::processor::{StageKind, StageReport, StageTimer};
use shield_core::{ChannelStats, SampleMatrix, ShieldResult};
use tracing::debug;

/// Z-score of `value` against `stats`. A zero standard deviation counts
/// as one, so flat channels never divide by zero.
fn z_score(value: f64, stats: &ChannelStats) -> f64 {
    let scale = if stats.std_dev == 0.0 { 1.0 } else { stats.std_dev };
    (value - stats.mean) / scale
}

/// Flag rows where any channel's absolute z-score exceeds `z_threshold`.
/// Returns `true` for bad rows.
pub fn detect_artifacts(matrix: &SampleMatrix<f64>, z_threshold: f64) -> Vec<bool> {
    let stats: Vec<ChannelStats> = matrix
        .all_channels()
        .iter()
        .map(|channel| ChannelStats::calculate(channel))
        .collect();

    matrix
        .iter_rows()
        .map(|row| {
            row.iter()
                .zip(&stats)
                .any(|(&value, s)| z_score(value, s).abs() > z_threshold)
        })
        .collect()
}

/// Detect artifact rows and repair them.
///
/// Returns the repaired matrix and a validity mask with one entry per row,
/// `true` for rows that were clean. Clean rows are never modified. With at
/// least two clean rows, each channel's flagged values are linearly
/// interpolated from the clean rows, holding the nearest clean value past
/// either end. With fewer, flagged values take the median of the clean
/// values; a channel with no finite clean value is left as it was.
pub fn detect_and_repair_artifacts(
    matrix: &SampleMatrix<f64>,
    z_threshold: f64,
) -> ShieldResult<(SampleMatrix<f64>, Vec<bool>)> {
    let bad = detect_artifacts(matrix, z_threshold);
    let mask: Vec<bool> = bad.iter().map(|&b| !b).collect();

    let bad_count = bad.iter().filter(|&&b| b).count();
    if bad_count == 0 {
        return Ok((matrix.clone(), mask));
    }

    let good_rows: Vec<usize> = (0..mask.len()).filter(|&row| mask[row]).collect();
    debug!(
        rows = mask.len(),
        bad_rows = bad_count,
        z_threshold,
        "repairing artifact rows"
    );

    let mut repaired = matrix.clone();
    for (channel_index, channel) in matrix.all_channels().into_iter().enumerate() {
        let fixed = if good_rows.len() < 2 {
            fill_with_median(&channel, &good_rows, &bad)
        } else {
            interpolate_bad(&channel, &good_rows, &bad)
        };
        repaired.set_channel(channel_index, &fixed)?;
    }

    Ok((repaired, mask))
}

fn interpolate_bad(channel: &[f64], good_rows: &[usize], bad: &[bool]) -> Vec<f64> {
    let mut out = channel.to_vec();
    let first = good_rows[0];
    let last = good_rows[good_rows.len() - 1];

    for row in (0..bad.len()).filter(|&row| bad[row]) {
        out[row] = if row < first {
            channel[first]
        } else if row > last {
            channel[last]
        } else {
            // good_rows is sorted and never contains `row`
            let right = good_rows.partition_point(|&g| g < row);
            let (x0, x1) = (good_rows[right - 1], good_rows[right]);
            let t = (row - x0) as f64 / (x1 - x0) as f64;
            channel[x0] + t * (channel[x1] - channel[x0])
        };
    }
    out
}

fn fill_with_median(channel: &[f64], good_rows: &[usize], bad: &[bool]) -> Vec<f64> {
    let mut anchors: Vec<f64> = good_rows
        .iter()
        .map(|&row| channel[row])
        .filter(|v| !v.is_nan())
        .collect();
    if anchors.is_empty() {
        return channel.to_vec();
    }

    anchors.sort_by(f64::total_cmp);
    let mid = anchors.len() / 2;
    let median = if anchors.len() % 2 == 0 {
        (anchors[mid - 1] + anchors[mid]) / 2.0
    } else {
        anchors[mid]
    };

    channel
        .iter()
        .zip(bad)
        .map(|(&value, &is_bad)| if is_bad { median } else { value })
        .collect()
}

/// Fraction of rows marked clean; 1.0 for an empty mask
pub fn good_fraction(mask: &[bool]) -> f64 {
    if mask.is_empty() {
        return 1.0;
    }
    mask.iter().filter(|&&good| good).count() as f64 / mask.len() as f64
}

/// Artifact repair as a pipeline stage
#[derive(Debug, Clone, Copy)]
pub struct ArtifactRepair {
    z_threshold: f64,
}

impl ArtifactRepair {
    pub fn new(z_threshold: f64) -> Self {
        Self { z_threshold }
    }

    pub fn z_threshold(&self) -> f64 {
        self.z_threshold
    }

    pub fn name(&self) -> &str {
        "artifact_repair"
    }

    /// Repair `input`, returning the cleaned matrix, the validity mask and
    /// the stage report
    pub fn apply(
        &self,
        input: &SampleMatrix<f64>,
    ) -> ShieldResult<(SampleMatrix<f64>, Vec<bool>, StageReport)> {
        let timer = StageTimer::start(self.name(), StageKind::ArtifactRepair);
        let (cleaned, mask) = detect_and_repair_artifacts(input, self.z_threshold)?;
        Ok((cleaned, mask, timer.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn column(values: &[f64]) -> SampleMatrix<f64> {
        SampleMatrix::single_channel(values.to_vec())
    }

    #[test]
    fn test_single_spike_interpolated() {
        let input = column(&[0.0, 1.0, 2.0, 3.0, 100.0, 5.0, 6.0, 7.0, 8.0]);
        let (cleaned, mask) = detect_and_repair_artifacts(&input, 2.0).unwrap();

        let expected_mask: Vec<bool> = (0..9).map(|i| i != 4).collect();
        assert_eq!(mask, expected_mask);
        assert_eq!(cleaned.as_flat(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_leading_artifact_held_flat() {
        let input = column(&[100.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let (cleaned, mask) = detect_and_repair_artifacts(&input, 2.0).unwrap();

        assert!(!mask[0]);
        assert_eq!(cleaned.get(0, 0), Some(1.0));
        assert_eq!(&cleaned.as_flat()[1..], &input.as_flat()[1..]);
    }

    #[test]
    fn test_median_fill_with_single_anchor() {
        let input = column(&[-1.0, 0.0, 1.0]);
        let (cleaned, mask) = detect_and_repair_artifacts(&input, 1.0).unwrap();

        assert_eq!(mask, vec![false, true, false]);
        assert_eq!(cleaned.as_flat(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_no_anchor_leaves_channel() {
        let input = column(&[-1.0, 1.0]);
        let (cleaned, mask) = detect_and_repair_artifacts(&input, 0.5).unwrap();

        assert_eq!(mask, vec![false, false]);
        assert_eq!(cleaned, input);
    }

    #[test]
    fn test_flat_channel_never_flagged() {
        let input = column(&[0.0; 32]);
        for threshold in [0.0, 1.0, 6.0] {
            let (cleaned, mask) = detect_and_repair_artifacts(&input, threshold).unwrap();
            assert!(mask.iter().all(|&good| good));
            assert_eq!(cleaned, input);
        }
    }

    #[test]
    fn test_one_channel_condemns_the_row() {
        let spiky = vec![0.0, 1.0, 2.0, 3.0, 100.0, 5.0, 6.0, 7.0, 8.0];
        let squares: Vec<f64> = (0..9).map(|i| (i * i) as f64).collect();
        let input = SampleMatrix::from_channels(vec![spiky, squares.clone()]).unwrap();

        let (cleaned, mask) = detect_and_repair_artifacts(&input, 2.0).unwrap();
        assert!(!mask[4]);
        assert_eq!(mask.iter().filter(|&&good| !good).count(), 1);

        let repaired = cleaned.channel(1).unwrap();
        assert_eq!(repaired[4], 17.0);
        assert_eq!(repaired[3], squares[3]);
        assert_eq!(repaired[5], squares[5]);
    }

    #[test]
    fn test_non_finite_values() {
        let input = column(&[0.0, 1.0, f64::INFINITY, 3.0, 4.0]);
        let (cleaned, mask) = detect_and_repair_artifacts(&input, 3.0).unwrap();

        assert_eq!(mask, vec![true, true, false, true, true]);
        assert_eq!(cleaned.get(2, 0), Some(2.0));
    }

    #[test]
    fn test_second_pass_is_clean() {
        let mut values: Vec<f64> = (0..200).map(|i| (2.0 * PI * i as f64 / 20.0).sin()).collect();
        values[100] = 50.0;
        let input = column(&values);

        let (first, mask) = detect_and_repair_artifacts(&input, 3.0).unwrap();
        assert!(!mask[100]);

        let (second, mask) = detect_and_repair_artifacts(&first, 3.0).unwrap();
        assert!(mask.iter().all(|&good| good));
        assert_eq!(second, first);
    }

    #[test]
    fn test_good_fraction() {
        assert_eq!(good_fraction(&[]), 1.0);
        assert_eq!(good_fraction(&[true, false, true, true]), 0.75);
    }

    #[test]
    fn test_stage_reports_kind() {
        let stage = ArtifactRepair::new(6.0);
        let (_, mask, report) = stage.apply(&column(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(mask.len(), 3);
        assert_eq!(report.kind, StageKind::ArtifactRepair);
        assert_eq!(report.name, "artifact_repair");
    }
}
