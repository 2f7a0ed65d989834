//! Piecewise-linear sub-scores and per-second section scores
//! (`spec.md` §4.7).

use crate::calibration::ScoringCalibration;
use choir_align::NormalizedDeviation;
use choir_features::Feature;
use choir_pitch::{Note12, cents_between};

/// `{pitchScore, timingScore, dynamicsScore, overallScore}`, all in `[0,
/// 100]`, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionScores {
    /// Pitch accuracy sub-score.
    pub pitch: f64,
    /// Timing accuracy sub-score.
    pub timing: f64,
    /// Dynamics match sub-score.
    pub dynamics: f64,
    /// Weighted overall score.
    pub overall: f64,
}

/// One per-second slice of the user timeline, with dominant-note annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionScore {
    /// Zero-based section index.
    pub section_index: usize,
    /// Section start time, seconds.
    pub start_time_s: f64,
    /// Section end time, seconds.
    pub end_time_s: f64,
    /// Sub-scores, or `None` if no voiced pitch samples fall in this
    /// section.
    pub scores: Option<DimensionScores>,
    /// Dominant reference note in this section (median Hz → nearest note),
    /// if any voiced reference samples fall in it.
    pub ref_note: Option<Note12>,
    /// Dominant user note in this section, if any voiced user samples fall
    /// in it.
    pub user_note: Option<Note12>,
    /// `ref_note`/`user_note` agree exactly (within `note_match_cents`).
    pub note_match: bool,
    /// `ref_note`/`user_note` share a pitch class.
    pub pitch_class_match: bool,
    /// Signed octave gap `user_note.octave - ref_note.octave`.
    pub octave_diff: Option<i32>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean_or(scores: &[f64], default: f64) -> f64 {
    if scores.is_empty() { default } else { scores.iter().sum::<f64>() / scores.len() as f64 }
}

/// Score a sequence of octave-folded cents deviations (unvoiced entries
/// already excluded by the caller).
fn score_pitch_samples(cents: &[f64], calibration: &ScoringCalibration) -> f64 {
    let perfect = calibration.pitch_perfect_band_cents;
    let zero = calibration.pitch_zero_cutoff_cents;
    let scores: Vec<f64> = cents
        .iter()
        .map(|&c| {
            let abs_c = c.abs();
            if abs_c <= perfect {
                100.0
            } else if abs_c >= zero {
                0.0
            } else {
                100.0 * (1.0 - (abs_c - perfect) / (zero - perfect))
            }
        })
        .collect();
    mean_or(&scores, calibration.no_sample_default_score)
}

/// Score a sequence of (already baseline-corrected) timing offsets.
fn score_timing_samples(offsets_s: &[f64], calibration: &ScoringCalibration) -> f64 {
    let perfect = calibration.timing_perfect_band_s;
    let zero = calibration.timing_zero_cutoff_s;
    let scores: Vec<f64> = offsets_s
        .iter()
        .map(|&off| {
            let abs_off = off.abs();
            if abs_off <= perfect {
                100.0
            } else if abs_off >= zero {
                0.0
            } else {
                100.0 * (1.0 - (abs_off - perfect) / (zero - perfect))
            }
        })
        .collect();
    mean_or(&scores, calibration.no_sample_default_score)
}

/// Score a sequence of energy ratios (unvoiced entries already excluded).
fn score_dynamics_samples(ratios: &[f64], calibration: &ScoringCalibration) -> f64 {
    let (perfect_low, perfect_high) = calibration.dynamics_perfect_band;
    let (zero_low, zero_high) = calibration.dynamics_zero_cutoff;
    let scores: Vec<f64> = ratios
        .iter()
        .map(|&ratio| {
            if ratio >= perfect_low && ratio <= perfect_high {
                100.0
            } else if ratio < zero_low || ratio > zero_high {
                0.0
            } else if ratio < perfect_low {
                100.0 * (ratio - zero_low) / (perfect_low - zero_low)
            } else {
                100.0 * (zero_high - ratio) / (zero_high - perfect_high)
            }
        })
        .collect();
    mean_or(&scores, calibration.no_sample_default_score)
}

fn weighted_overall(dims: (f64, f64, f64), calibration: &ScoringCalibration) -> f64 {
    dims.0 * calibration.overall_weight_pitch
        + dims.1 * calibration.overall_weight_timing
        + dims.2 * calibration.overall_weight_dynamics
}

/// Score the full deduplicated path: the top-level `{pitch, timing,
/// dynamics, overall}` scores reported by `ScoreReport`.
#[must_use]
pub fn score_path(path: &[NormalizedDeviation], calibration: &ScoringCalibration) -> DimensionScores {
    let cents: Vec<f64> = path.iter().filter_map(|e| e.deviation.pitch_cents).collect();
    let offsets: Vec<f64> = path.iter().map(|e| e.timing_offset_s).collect();
    let ratios: Vec<f64> = path.iter().filter_map(|e| e.deviation.energy_ratio).collect();

    let pitch = score_pitch_samples(&cents, calibration);
    let timing = score_timing_samples(&offsets, calibration);
    let dynamics = score_dynamics_samples(&ratios, calibration);
    let overall = weighted_overall((pitch, timing, dynamics), calibration);

    DimensionScores { pitch: round1(pitch), timing: round1(timing), dynamics: round1(dynamics), overall: round1(overall) }
}

/// Partition the user timeline into whole-second sections and score each
/// independently (`spec.md` §4.7 "Section scores").
#[must_use]
pub fn section_scores(
    path: &[NormalizedDeviation],
    user: &Feature,
    reference: &Feature,
    user_duration_s: f64,
    calibration: &ScoringCalibration,
) -> Vec<SectionScore> {
    let section_count = user_duration_s.ceil().max(0.0) as usize;
    (0..section_count)
        .map(|section_index| {
            let start_time_s = section_index as f64;
            let end_time_s = start_time_s + 1.0;
            let in_section: Vec<&NormalizedDeviation> = path
                .iter()
                .filter(|e| e.deviation.user_time_s >= start_time_s && e.deviation.user_time_s < end_time_s)
                .collect();

            let voiced_cents: Vec<f64> = in_section.iter().filter_map(|e| e.deviation.pitch_cents).collect();
            let scores = if voiced_cents.is_empty() {
                None
            } else {
                let offsets: Vec<f64> = in_section.iter().map(|e| e.timing_offset_s).collect();
                let ratios: Vec<f64> = in_section.iter().filter_map(|e| e.deviation.energy_ratio).collect();
                let pitch = score_pitch_samples(&voiced_cents, calibration);
                let timing = score_timing_samples(&offsets, calibration);
                let dynamics = score_dynamics_samples(&ratios, calibration);
                let overall = weighted_overall((pitch, timing, dynamics), calibration);
                Some(DimensionScores {
                    pitch: round1(pitch),
                    timing: round1(timing),
                    dynamics: round1(dynamics),
                    overall: round1(overall),
                })
            };

            let ref_hz: Vec<f64> =
                in_section.iter().filter_map(|e| reference.pitch_values[e.deviation.ref_idx]).collect();
            let user_hz: Vec<f64> =
                in_section.iter().filter_map(|e| user.pitch_values[e.deviation.user_idx]).collect();
            let ref_note = dominant_note(&ref_hz);
            let user_note = dominant_note(&user_hz);

            let note_match = ref_note.is_some()
                && user_note.is_some()
                && note_hz_distance_cents(&ref_hz, &user_hz) <= calibration.note_match_cents;
            let pitch_class_match = note_match
                || matches!((ref_note, user_note), (Some(r), Some(u)) if r.same_pitch_class(u));
            let octave_diff = match (ref_note, user_note) {
                (Some(r), Some(u)) => Some(u.octave_diff(r)),
                _ => None,
            };

            SectionScore {
                section_index,
                start_time_s,
                end_time_s,
                scores,
                ref_note,
                user_note,
                note_match,
                pitch_class_match,
                octave_diff,
            }
        })
        .collect()
}

fn note_hz_distance_cents(ref_hz: &[f64], user_hz: &[f64]) -> f64 {
    let r = median(ref_hz);
    let u = median(user_hz);
    cents_between(u, r).abs()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 { (sorted[mid - 1] + sorted[mid]) / 2.0 } else { sorted[mid] }
}

fn dominant_note(hz_values: &[f64]) -> Option<Note12> {
    if hz_values.is_empty() {
        return None;
    }
    Some(Note12::from_hz(median(hz_values)))
}
