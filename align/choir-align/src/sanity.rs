//! Sanity checker (`spec.md` §4.6): a diagnostic pass over the deduplicated
//! path that flags regions where the warp ran far from a 1:1 tempo match.
//! Observational only — never consulted by the scorer.

use crate::normalize::NormalizedDeviation;

const SAMPLE_INTERVAL_S: f64 = 1.0;
const DRIFT_SLOPE_LOW: f64 = 0.5;
const DRIFT_SLOPE_HIGH: f64 = 2.0;

/// A user-time window where the local user/reference slope fell outside
/// `[0.5, 2.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftRegion {
    /// User time at the start of the region.
    pub user_time_s: f64,
    /// Reference time at the start of the region.
    pub ref_time_s: f64,
    /// `Δuser / Δref` between this sample and the previous one.
    pub slope: f64,
}

/// Result of the sanity pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSanity {
    /// `true` iff no drift regions were found.
    pub is_sane: bool,
    /// All detected drift regions, in user-time order.
    pub drift_regions: Vec<DriftRegion>,
    /// Mean of all finite slopes sampled (not just the drifting ones); `None`
    /// if fewer than two samples exist.
    pub mean_slope: Option<f64>,
}

/// Sample `path` at ~1 s intervals in user time and report drift.
#[must_use]
pub fn check_sanity(path: &[NormalizedDeviation]) -> PathSanity {
    let samples = sample_at_interval(path, SAMPLE_INTERVAL_S);

    let mut drift_regions = vec![];
    let mut slopes = vec![];
    for pair in samples.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let delta_user = curr.deviation.user_time_s - prev.deviation.user_time_s;
        let delta_ref = curr.deviation.ref_time_s - prev.deviation.ref_time_s;
        if delta_ref.abs() < f64::EPSILON {
            continue;
        }
        let slope = delta_user / delta_ref;
        if !slope.is_finite() {
            continue;
        }
        slopes.push(slope);
        if slope < DRIFT_SLOPE_LOW || slope > DRIFT_SLOPE_HIGH {
            drift_regions.push(DriftRegion {
                user_time_s: curr.deviation.user_time_s,
                ref_time_s: curr.deviation.ref_time_s,
                slope,
            });
        }
    }

    let mean_slope = if slopes.is_empty() { None } else { Some(slopes.iter().sum::<f64>() / slopes.len() as f64) };

    PathSanity { is_sane: drift_regions.is_empty(), drift_regions, mean_slope }
}

fn sample_at_interval(path: &[NormalizedDeviation], interval_s: f64) -> Vec<NormalizedDeviation> {
    let mut samples = vec![];
    let mut next_sample_time = 0.0;
    for &entry in path {
        if entry.deviation.user_time_s >= next_sample_time {
            samples.push(entry);
            next_sample_time = entry.deviation.user_time_s + interval_s;
        }
    }
    samples
}
