//! Synthetic-voice score aggregation.
//!
//! The offline detector scores a recording in ~2.5 s chunks and emits one
//! fake-probability per chunk. This module turns that series into a single
//! summary and an alert band. The same aggregation runs inside the detector
//! subprocess; keeping a pure copy here lets the pipeline re-derive the band
//! from raw chunk scores and unit-test the thresholds without audio.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Fake probability at or above which a single chunk counts as "high".
pub const HIGH_FAKE_THRESHOLD: f64 = 0.95;

/// Fake probability at or above which the call earns at least a caution band.
pub const CAUTION_FAKE_THRESHOLD: f64 = 0.85;

/// Fraction of high chunks required (with the other high conditions) for the
/// high band.
pub const HIGH_CHUNK_RATIO_THRESHOLD: f64 = 0.5;

// ---------------------------------------------------------------------------
// Alert band
// ---------------------------------------------------------------------------

/// How loudly the voice detector result should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceAlertBand {
    /// No synthetic-voice signal worth surfacing.
    None,
    /// Elevated fake probability; shown in review UIs, no alert row.
    Caution,
    /// Strong, sustained fake signal; raises a `synthetic_voice` alert.
    High,
}

impl VoiceAlertBand {
    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Caution => "caution",
            Self::High => "high",
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregated analysis
// ---------------------------------------------------------------------------

/// Summary of a per-chunk fake-score series.
///
/// Field names match the detector's JSON output so the subprocess result
/// deserializes straight into this struct; per-chunk score arrays are
/// intentionally not carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceAnalysis {
    /// Median chunk fake probability; `None` when there were no chunks.
    pub median_fake: Option<f64>,
    /// Maximum chunk fake probability; `None` when there were no chunks.
    pub max_fake: Option<f64>,
    /// Mean chunk fake probability; `0.0` when there were no chunks.
    pub binary_average_fake: f64,
    /// Number of scored chunks.
    pub chunk_count: u32,
    /// Chunks at or above [`HIGH_FAKE_THRESHOLD`].
    pub high_chunk_count: u32,
    /// `high_chunk_count / chunk_count`, `0.0` when there were no chunks.
    pub high_chunk_ratio: f64,
    /// The resulting alert band.
    pub alert_band: VoiceAlertBand,
}

/// Aggregate a series of per-chunk fake probabilities.
///
/// Band rules: `high` requires median >= 0.95 AND average >= 0.95 AND at
/// least half the chunks high; `caution` requires median >= 0.85 OR
/// average >= 0.85; anything else (including zero chunks) is `none`.
pub fn aggregate_chunk_scores(fake_scores: &[f64]) -> VoiceAnalysis {
    if fake_scores.is_empty() {
        return VoiceAnalysis {
            median_fake: None,
            max_fake: None,
            binary_average_fake: 0.0,
            chunk_count: 0,
            high_chunk_count: 0,
            high_chunk_ratio: 0.0,
            alert_band: VoiceAlertBand::None,
        };
    }

    let chunk_count = fake_scores.len();
    let median = median_of(fake_scores);
    let max = fake_scores.iter().copied().fold(f64::MIN, f64::max);
    let average = fake_scores.iter().sum::<f64>() / chunk_count as f64;
    let high_chunk_count = fake_scores
        .iter()
        .filter(|s| **s >= HIGH_FAKE_THRESHOLD)
        .count();
    let high_chunk_ratio = high_chunk_count as f64 / chunk_count as f64;

    let alert_band = if median >= HIGH_FAKE_THRESHOLD
        && average >= HIGH_FAKE_THRESHOLD
        && high_chunk_ratio >= HIGH_CHUNK_RATIO_THRESHOLD
    {
        VoiceAlertBand::High
    } else if median >= CAUTION_FAKE_THRESHOLD || average >= CAUTION_FAKE_THRESHOLD {
        VoiceAlertBand::Caution
    } else {
        VoiceAlertBand::None
    };

    VoiceAnalysis {
        median_fake: Some(median),
        max_fake: Some(max),
        binary_average_fake: average,
        chunk_count: chunk_count as u32,
        high_chunk_count: high_chunk_count as u32,
        high_chunk_ratio,
        alert_band,
    }
}

/// Median of a non-empty slice: middle element, or the mean of the two middle
/// elements for an even count.
fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Median ------------------------------------------------------------

    #[test]
    fn median_of_odd_count_is_middle_element() {
        let analysis = aggregate_chunk_scores(&[0.1, 0.9, 0.5]);
        assert_eq!(analysis.median_fake, Some(0.5));
    }

    #[test]
    fn median_of_even_count_averages_the_middle_pair() {
        let analysis = aggregate_chunk_scores(&[0.2, 0.4, 0.6, 0.8]);
        assert_eq!(analysis.median_fake, Some(0.5));
    }

    // -- Summary fields ----------------------------------------------------

    #[test]
    fn summary_counts_high_chunks() {
        let analysis = aggregate_chunk_scores(&[0.96, 0.10, 0.95, 0.94]);
        assert_eq!(analysis.chunk_count, 4);
        assert_eq!(analysis.high_chunk_count, 2);
        assert!((analysis.high_chunk_ratio - 0.5).abs() < 1e-9);
        assert_eq!(analysis.max_fake, Some(0.96));
    }

    #[test]
    fn zero_chunks_yield_empty_summary_and_no_band() {
        let analysis = aggregate_chunk_scores(&[]);
        assert_eq!(analysis.chunk_count, 0);
        assert_eq!(analysis.median_fake, None);
        assert_eq!(analysis.max_fake, None);
        assert_eq!(analysis.binary_average_fake, 0.0);
        assert_eq!(analysis.alert_band, VoiceAlertBand::None);
    }

    // -- Band thresholds ---------------------------------------------------

    #[test]
    fn uniformly_fake_chunks_reach_the_high_band() {
        let analysis = aggregate_chunk_scores(&[0.99, 0.98, 0.97, 0.99]);
        assert_eq!(analysis.alert_band, VoiceAlertBand::High);
    }

    #[test]
    fn high_median_with_dragged_down_average_stays_caution() {
        // One clearly-real chunk keeps the mean under 0.95 even though the
        // median clears it.
        let analysis = aggregate_chunk_scores(&[0.96, 0.97, 0.20]);
        assert!(analysis.median_fake.unwrap() >= HIGH_FAKE_THRESHOLD);
        assert_eq!(analysis.alert_band, VoiceAlertBand::Caution);
    }

    #[test]
    fn elevated_median_alone_earns_caution() {
        let analysis = aggregate_chunk_scores(&[0.86, 0.87, 0.88]);
        assert_eq!(analysis.alert_band, VoiceAlertBand::Caution);
    }

    #[test]
    fn elevated_average_alone_earns_caution() {
        // Median is low but one near-certain chunk drags the mean over 0.85.
        let analysis = aggregate_chunk_scores(&[0.80, 0.80, 0.999]);
        assert!(analysis.median_fake.unwrap() < CAUTION_FAKE_THRESHOLD);
        assert_eq!(analysis.alert_band, VoiceAlertBand::Caution);
    }

    #[test]
    fn mostly_real_chunks_stay_in_no_band() {
        let analysis = aggregate_chunk_scores(&[0.01, 0.05, 0.12, 0.30]);
        assert_eq!(analysis.alert_band, VoiceAlertBand::None);
    }

    // -- Serde compatibility -----------------------------------------------

    #[test]
    fn analysis_deserializes_from_detector_json() {
        // Shape emitted by the detector subprocess; extra per-chunk arrays
        // are ignored.
        let json = r#"{
            "median_fake": 0.97,
            "max_fake": 0.99,
            "chunk_count": 4,
            "fake_scores": [0.97, 0.96, 0.99, 0.98],
            "real_scores": [0.03, 0.04, 0.01, 0.02],
            "high_chunk_count": 4,
            "high_chunk_ratio": 1.0,
            "alert_band": "high",
            "binary_average_fake": 0.975
        }"#;
        let analysis: VoiceAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.alert_band, VoiceAlertBand::High);
        assert_eq!(analysis.chunk_count, 4);
        assert_eq!(analysis.median_fake, Some(0.97));
    }
}
