//! DTW feature builder (`spec.md` §4.2): pitch + RMS frames become a 3-column
//! weighted matrix the aligner can warp.

use choir_features::{Feature, interp_linear};

const LOG_PITCH_FLOOR_HZ: f64 = 50.0;
const LOG_PITCH_CEIL_HZ: f64 = 2000.0;

const WEIGHT_LOG_PITCH: f64 = 1.0;
const WEIGHT_VOICING: f64 = 0.5;
const WEIGHT_RMS: f64 = 0.3;

/// One weighted `[log_pitch', voicing, rms]` frame, ready for DTW distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DtwFrame {
    /// Frame timestamp (seconds), shared with the source pitch grid.
    pub time_s: f64,
    pub(crate) components: [f64; 3],
}

impl DtwFrame {
    /// Euclidean distance to another frame in weighted feature space.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Build the weighted DTW sequence for one recording's pitch grid, resampling
/// RMS onto the pitch timestamps via linear interpolation.
#[must_use]
pub fn build_sequence(feature: &Feature) -> Vec<DtwFrame> {
    feature
        .pitch_times
        .iter()
        .zip(&feature.pitch_values)
        .map(|(&time_s, &pitch_hz)| {
            let log_pitch = pitch_hz.map_or(0.0, |hz| {
                let floor = LOG_PITCH_FLOOR_HZ.log2();
                let ceil = LOG_PITCH_CEIL_HZ.log2();
                ((hz.max(LOG_PITCH_FLOOR_HZ).log2() - floor) / (ceil - floor)).clamp(0.0, 1.0)
            });
            let voicing = if pitch_hz.is_some() { 1.0 } else { 0.0 };
            let rms = interp_linear(&feature.rms_times, &feature.rms_values, time_s).clamp(0.0, 1.0);
            DtwFrame {
                time_s,
                components: [log_pitch * WEIGHT_LOG_PITCH, voicing * WEIGHT_VOICING, rms * WEIGHT_RMS],
            }
        })
        .collect()
}
