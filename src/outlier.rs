use serde::{Deserialize, Serialize};

/// Score returned when there is no usable baseline.
pub const NEUTRAL_SCORE: f64 = 1.0;

/// View statistics of the single video being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStats {
    pub view_count: u64,
}

/// View counts of a channel's most recent videos, used as the averaging
/// baseline. An empty sample means no comparison data is available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelSample(Vec<u64>);

impl ChannelSample {
    pub fn new(view_counts: Vec<u64>) -> Self {
        Self(view_counts)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn view_counts(&self) -> &[u64] {
        &self.0
    }

    /// Mean view count, or `None` for an empty sample.
    pub fn average(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.total() as f64 / self.0.len() as f64)
    }

    fn total(&self) -> u128 {
        self.0.iter().map(|&v| v as u128).sum()
    }
}

impl From<Vec<u64>> for ChannelSample {
    fn from(view_counts: Vec<u64>) -> Self {
        Self::new(view_counts)
    }
}

impl FromIterator<u64> for ChannelSample {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ratio of a video's views to its channel's recent average, rounded half-up
/// to two decimals.
///
/// Both "no sample" and "zero average" yield [`NEUTRAL_SCORE`]. Note that this
/// makes missing data indistinguishable from a video performing exactly at the
/// channel norm; callers that care should look at the sample size.
pub fn outlier_score(video_views: u64, sample: &ChannelSample) -> f64 {
    let total = sample.total();
    if total == 0 {
        return NEUTRAL_SCORE;
    }
    // views / (total / len), rounded in integer hundredths so ties like 1.005 go up.
    let numerator = video_views as u128 * sample.len() as u128;
    hundredths_half_up(numerator, total) as f64 / 100.0
}

/// Convenience wrapper over [`outlier_score`] taking the video's stats.
pub fn score(stats: VideoStats, sample: &ChannelSample) -> OutlierScore {
    OutlierScore {
        value: outlier_score(stats.view_count, sample),
        sample_size: sample.len(),
    }
}

/// A computed score together with the size of the baseline it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierScore {
    pub value: f64,
    pub sample_size: usize,
}

impl OutlierScore {
    /// Score used when the video's own view count is unavailable.
    pub fn neutral() -> Self {
        Self {
            value: NEUTRAL_SCORE,
            sample_size: 0,
        }
    }

    /// Whether the score was computed against real data.
    pub fn has_baseline(&self) -> bool {
        self.sample_size > 0
    }

    pub fn is_outlier(&self, threshold: f64) -> bool {
        self.value >= threshold
    }
}

/// `numerator / denominator` in hundredths, rounded half-up. `denominator` must be non-zero.
fn hundredths_half_up(numerator: u128, denominator: u128) -> u128 {
    (200 * numerator + denominator) / (2 * denominator)
}
