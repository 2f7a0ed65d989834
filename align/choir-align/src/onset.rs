//! Leading-noise trimming: find where real singing starts in the user
//! stream (`spec.md` §4.1).

use choir_features::Feature;
use choir_pitch::cents_between_folded;
use choir_time::windows;

const ONSET_WINDOW_S: f64 = 1.0;
const ONSET_STEP_S: f64 = 0.25;
const ONSET_SEARCH_HORIZON_S: f64 = 5.0;
const MIN_VOICING_RATIO: f64 = 0.30;
const MAX_PITCH_STABILITY_CENTS: f64 = 200.0;
const MAX_RANGE_MATCH_CENTS: f64 = 500.0;

/// Threshold above which the caller actually trims the user arrays; the
/// detector always returns its best estimate, trimmed or not.
pub const TRIM_THRESHOLD_S: f64 = 0.2;

/// Find the timestamp at which real singing begins in `user`, judged against
/// `reference`'s pitch range. Returns `0.0` if no window passes or the
/// reference has no voiced frames in its first 5 seconds.
#[must_use]
pub fn detect_singing_onset(user: &Feature, reference: &Feature) -> f64 {
    let Some(ref_median_hz) = median_voiced_hz_within(reference, ONSET_SEARCH_HORIZON_S) else {
        return 0.0;
    };

    let horizon = user.duration_s.min(ONSET_SEARCH_HORIZON_S);
    for window in windows(horizon, ONSET_WINDOW_S, ONSET_STEP_S) {
        let frames = pitch_frames_in(user, window.start.as_secs_f64(), window.end.as_secs_f64());
        if frames.is_empty() {
            continue;
        }
        let voiced: Vec<f64> = frames.iter().filter_map(|&hz| hz).collect();
        let voicing_ratio = voiced.len() as f64 / frames.len() as f64;
        if voicing_ratio < MIN_VOICING_RATIO {
            continue;
        }

        let window_median = median(&voiced);
        let stability_cents = std_dev_cents_from_median(&voiced, window_median);
        if stability_cents > MAX_PITCH_STABILITY_CENTS {
            continue;
        }

        let range_match_cents = cents_between_folded(window_median, ref_median_hz).abs();
        if range_match_cents > MAX_RANGE_MATCH_CENTS {
            continue;
        }

        return window.start.as_secs_f64();
    }

    0.0
}

fn median_voiced_hz_within(feature: &Feature, horizon_s: f64) -> Option<f64> {
    let voiced: Vec<f64> = feature
        .pitch_times
        .iter()
        .zip(&feature.pitch_values)
        .filter(|&(&t, _)| t < horizon_s)
        .filter_map(|(_, &hz)| hz)
        .collect();
    if voiced.is_empty() { None } else { Some(median(&voiced)) }
}

fn pitch_frames_in(feature: &Feature, start_s: f64, end_s: f64) -> Vec<Option<f64>> {
    feature
        .pitch_times
        .iter()
        .zip(&feature.pitch_values)
        .filter(|&(&t, _)| t >= start_s && t < end_s)
        .map(|(_, &hz)| hz)
        .collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 { (sorted[mid - 1] + sorted[mid]) / 2.0 } else { sorted[mid] }
}

fn std_dev_cents_from_median(voiced_hz: &[f64], median_hz: f64) -> f64 {
    let cents: Vec<f64> = voiced_hz.iter().map(|&hz| 1200.0 * (hz / median_hz).log2()).collect();
    let mean = cents.iter().sum::<f64>() / cents.len() as f64;
    let variance = cents.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / cents.len() as f64;
    variance.sqrt()
}
