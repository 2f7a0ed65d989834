//! Onset trimming and FastDTW alignment of a user recording against a
//! reference (`spec.md` §4.1-§4.6).
//!
//! [`align`] is the single public entry point: it detects leading silence,
//! truncates an over-long reference, warps the two feature streams, then
//! deduplicates, baseline-corrects, and sanity-checks the resulting path.

#![forbid(unsafe_code)]

mod builder;
mod deviation;
mod fastdtw;
mod normalize;
mod onset;
mod sanity;

pub use deviation::Deviation;
pub use fastdtw::{PathPair, RADIUS};
pub use normalize::NormalizedDeviation;
pub use onset::{TRIM_THRESHOLD_S, detect_singing_onset};
pub use sanity::{DriftRegion, PathSanity, check_sanity};

use choir_features::Feature;

/// Reference is truncated if longer than `user_duration * REF_TRUNCATE_FACTOR
/// + REF_TRUNCATE_MARGIN_S` (`spec.md` §4.3 pre-step).
const REF_TRUNCATE_FACTOR: f64 = 1.2;
const REF_TRUNCATE_MARGIN_S: f64 = 5.0;

/// Full alignment result: the deduplicated, baseline-corrected path plus its
/// diagnostic sanity report.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// One entry per unique user index, baseline-corrected, in ascending
    /// `user_idx` order.
    pub path: Vec<NormalizedDeviation>,
    /// Total FastDTW distance of the raw (pre-dedup) path.
    pub distance: f64,
    /// Timestamp (seconds) at which singing was judged to begin in `user`.
    pub singing_onset_s: f64,
    /// Diagnostic drift report over the same path.
    pub sanity: PathSanity,
}

/// Align `user` against `reference` end to end.
///
/// Returns an empty-path [`Alignment`] with zero distance if either input
/// has no pitch frames.
#[must_use]
pub fn align(user: &Feature, reference: &Feature) -> Alignment {
    if user.pitch_times.is_empty() || reference.pitch_times.is_empty() {
        return Alignment {
            path: vec![],
            distance: 0.0,
            singing_onset_s: 0.0,
            sanity: PathSanity { is_sane: true, drift_regions: vec![], mean_slope: None },
        };
    }

    let singing_onset_s = detect_singing_onset(user, reference);
    if singing_onset_s > TRIM_THRESHOLD_S {
        tracing::debug!(onset_s = singing_onset_s, "trimming leading silence before alignment");
    }
    let (trimmed_user, trim_frame_count) = if singing_onset_s > TRIM_THRESHOLD_S {
        trim_leading(user, singing_onset_s)
    } else {
        (user.clone(), 0)
    };

    let truncated_reference = truncate_reference(reference, trimmed_user.duration_s);
    if truncated_reference.duration_s < reference.duration_s {
        tracing::debug!(
            original_s = reference.duration_s,
            truncated_s = truncated_reference.duration_s,
            "truncating over-long reference"
        );
    }

    let user_sequence = builder::build_sequence(&trimmed_user);
    let reference_sequence = builder::build_sequence(&truncated_reference);
    let raw = fastdtw::fastdtw(&user_sequence, &reference_sequence, fastdtw::RADIUS);

    let shifted_path: Vec<PathPair> =
        raw.path.iter().map(|pair| PathPair { user_idx: pair.user_idx + trim_frame_count, ref_idx: pair.ref_idx }).collect();

    let deviations = deviation::compute_deviations(&shifted_path, user, reference);
    let path = normalize::normalize(&deviations);
    let sanity = check_sanity(&path);
    if !sanity.is_sane {
        tracing::warn!(drift_regions = sanity.drift_regions.len(), "alignment path failed sanity check");
    }

    tracing::info!(path_len = path.len(), distance = raw.distance, "alignment complete");
    Alignment { path, distance: raw.distance, singing_onset_s, sanity }
}

/// Drop pitch/RMS frames before `onset_s`, returning the trimmed copy plus
/// the number of pitch frames removed (for re-addressing path indices back
/// into the original arrays).
fn trim_leading(feature: &Feature, onset_s: f64) -> (Feature, usize) {
    let trim_frame_count = feature.pitch_times.partition_point(|&t| t < onset_s);
    let trimmed = Feature {
        pitch_values: feature.pitch_values[trim_frame_count..].to_vec(),
        pitch_times: feature.pitch_times[trim_frame_count..].to_vec(),
        onset_times: feature.onset_times.iter().copied().filter(|&t| t >= onset_s).collect(),
        rms_values: feature.rms_values.clone(),
        rms_times: feature.rms_times.clone(),
        duration_s: feature.duration_s - onset_s,
    };
    (trimmed, trim_frame_count)
}

/// Drop trailing reference frames if the reference runs far longer than the
/// (possibly trimmed) user recording (`spec.md` §4.3 pre-step).
fn truncate_reference(reference: &Feature, user_duration_s: f64) -> Feature {
    let cutoff_s = user_duration_s * REF_TRUNCATE_FACTOR + REF_TRUNCATE_MARGIN_S;
    if reference.duration_s <= cutoff_s {
        return reference.clone();
    }
    let cut_idx = reference.pitch_times.partition_point(|&t| t <= cutoff_s);
    Feature {
        pitch_values: reference.pitch_values[..cut_idx].to_vec(),
        pitch_times: reference.pitch_times[..cut_idx].to_vec(),
        onset_times: reference.onset_times.iter().copied().filter(|&t| t <= cutoff_s).collect(),
        rms_values: reference.rms_values.clone(),
        rms_times: reference.rms_times.clone(),
        duration_s: cutoff_s.min(reference.duration_s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady_feature(duration_s: f64, hz: f64) -> Feature {
        let step = 0.02;
        let n = (duration_s / step) as usize;
        Feature {
            pitch_values: vec![Some(hz); n],
            pitch_times: (0..n).map(|i| i as f64 * step).collect(),
            onset_times: vec![0.0],
            rms_values: vec![0.5; n],
            rms_times: (0..n).map(|i| i as f64 * step).collect(),
            duration_s,
        }
    }

    #[test]
    fn empty_user_yields_empty_alignment() {
        let user = Feature {
            pitch_values: vec![],
            pitch_times: vec![],
            onset_times: vec![],
            rms_values: vec![],
            rms_times: vec![],
            duration_s: 0.0,
        };
        let reference = steady_feature(1.0, 440.0);
        let alignment = align(&user, &reference);
        assert!(alignment.path.is_empty());
        assert!((alignment.distance).abs() < 1e-9);
    }

    #[test]
    fn identical_recordings_align_with_near_zero_pitch_deviation() {
        let user = steady_feature(2.0, 440.0);
        let reference = steady_feature(2.0, 440.0);
        let alignment = align(&user, &reference);
        assert!(!alignment.path.is_empty());
        for entry in &alignment.path {
            assert!(entry.deviation.pitch_cents.unwrap().abs() < 1e-6);
        }
    }

    #[test]
    fn path_indices_are_shifted_back_to_original_user_array_after_trim() {
        let step = 0.02;
        let mut pitch_values = vec![None; 100]; // 2s of silence
        let mut pitch_times: Vec<f64> = (0..100).map(|i| i as f64 * step).collect();
        pitch_values.extend(vec![Some(440.0); 100]); // 2s of singing
        pitch_times.extend((100..200).map(|i| i as f64 * step));
        let user = Feature {
            pitch_values,
            pitch_times,
            onset_times: vec![2.0],
            rms_values: vec![0.5; 200],
            rms_times: (0..200).map(|i| i as f64 * step).collect(),
            duration_s: 4.0,
        };
        let reference = steady_feature(2.0, 440.0);

        let alignment = align(&user, &reference);
        // Every reported user_idx must index into the ORIGINAL (200-frame)
        // array, not the trimmed (100-frame) one.
        for entry in &alignment.path {
            assert!(entry.deviation.user_idx < 200);
            assert!(user.pitch_values[entry.deviation.user_idx].is_some());
        }
    }

    #[test]
    fn overlong_reference_is_truncated_before_alignment() {
        let user = steady_feature(2.0, 440.0);
        let reference = steady_feature(20.0, 440.0); // far beyond 2*1.2+5=7.4s
        let alignment = align(&user, &reference);
        for entry in &alignment.path {
            assert!(entry.deviation.ref_time_s <= 7.5);
        }
    }

    #[test]
    fn median_of_normalized_timing_offsets_is_near_zero() {
        let user = steady_feature(3.0, 440.0);
        let reference = steady_feature(3.0, 440.0);
        let alignment = align(&user, &reference);
        let mut offsets: Vec<f64> = alignment.path.iter().map(|e| e.timing_offset_s).collect();
        offsets.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mid = offsets.len() / 2;
        let median =
            if offsets.len() % 2 == 0 { (offsets[mid - 1] + offsets[mid]) / 2.0 } else { offsets[mid] };
        assert!(median.abs() < 1e-9);
    }
}
