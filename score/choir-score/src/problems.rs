//! Problem finder (`spec.md` §4.8): slide a 2 s / 1 s window over the user
//! timeline, rank by a weighted badness metric, keep the top three
//! non-overlapping windows.

use crate::calibration::ScoringCalibration;
use choir_align::NormalizedDeviation;
use choir_time::{Window, windows};

const PROBLEM_WINDOW_S: f64 = 2.0;
const PROBLEM_STEP_S: f64 = 1.0;

/// Which dimension(s) a problem window flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    /// Mean absolute cents exceeded `problem_pitch_issue_cents`.
    Pitch,
    /// Mean absolute timing offset exceeded `problem_timing_issue_s`.
    Timing,
    /// Mean energy ratio fell outside `problem_dynamics_issue_range`.
    Dynamics,
}

/// A localized problem window, with its dual-playback reference span.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemArea {
    /// Window start, user time.
    pub start_time_s: f64,
    /// Window end, user time.
    pub end_time_s: f64,
    /// Flagged dimensions.
    pub issues: Vec<Issue>,
    /// Mean absolute pitch deviation in cents over voiced pairs.
    pub avg_pitch_dev_cents: f64,
    /// Mean absolute timing offset, milliseconds.
    pub avg_timing_offset_ms: f64,
    /// Mean energy ratio over voiced pairs.
    pub avg_energy_ratio: f64,
    /// Earliest reference time touched by this window's pairs.
    pub ref_start_time_s: Option<f64>,
    /// Latest reference time touched by this window's pairs.
    pub ref_end_time_s: Option<f64>,
}

struct ScoredWindow {
    window: Window,
    badness: f64,
    area: ProblemArea,
}

/// Find up to `calibration.max_problem_areas` worst, pairwise non-overlapping
/// windows in the deduplicated path.
#[must_use]
pub fn find_problem_areas(
    path: &[NormalizedDeviation],
    user_duration_s: f64,
    calibration: &ScoringCalibration,
) -> Vec<ProblemArea> {
    let mut scored: Vec<ScoredWindow> = windows(user_duration_s, PROBLEM_WINDOW_S, PROBLEM_STEP_S)
        .filter_map(|window| score_window(window, path, calibration))
        .collect();

    scored.sort_by(|a, b| b.badness.partial_cmp(&a.badness).unwrap_or(core::cmp::Ordering::Equal));

    let mut selected: Vec<ScoredWindow> = vec![];
    for candidate in scored.drain(..) {
        if selected.len() >= calibration.max_problem_areas {
            break;
        }
        let overlaps = selected.iter().any(|s| s.window.overlaps(&candidate.window));
        if !overlaps {
            selected.push(candidate);
        }
    }

    selected.sort_by(|a, b| a.window.start.as_secs_f64().partial_cmp(&b.window.start.as_secs_f64()).unwrap());
    selected.into_iter().map(|s| s.area).collect()
}

fn score_window(window: Window, path: &[NormalizedDeviation], calibration: &ScoringCalibration) -> Option<ScoredWindow> {
    let start = window.start.as_secs_f64();
    let end = window.end.as_secs_f64();
    let in_window: Vec<&NormalizedDeviation> =
        path.iter().filter(|e| e.deviation.user_time_s >= start && e.deviation.user_time_s < end).collect();
    if in_window.is_empty() {
        return None;
    }

    let cents: Vec<f64> = in_window.iter().filter_map(|e| e.deviation.pitch_cents).collect();
    let offsets: Vec<f64> = in_window.iter().map(|e| e.timing_offset_s).collect();
    let ratios: Vec<f64> = in_window.iter().filter_map(|e| e.deviation.energy_ratio).collect();

    let mean_cents = mean_abs(&cents);
    let mean_offset_s = mean_abs(&offsets);
    let mean_ratio = mean(&ratios).unwrap_or(1.0);

    let mut issues = vec![];
    if mean_cents > calibration.problem_pitch_issue_cents {
        issues.push(Issue::Pitch);
    }
    if mean_offset_s > calibration.problem_timing_issue_s {
        issues.push(Issue::Timing);
    }
    let (low, high) = calibration.problem_dynamics_issue_range;
    if mean_ratio < low || mean_ratio > high {
        issues.push(Issue::Dynamics);
    }

    let badness = mean_cents / calibration.pitch_zero_cutoff_cents * calibration.badness_weight_pitch
        + mean_offset_s / calibration.timing_zero_cutoff_s * calibration.badness_weight_timing
        + (1.0 - mean_ratio).abs() * calibration.badness_weight_dynamics;

    let ref_times: Vec<f64> = in_window.iter().map(|e| e.deviation.ref_time_s).collect();
    let ref_start_time_s = ref_times.iter().copied().min_by(|a, b| a.partial_cmp(b).unwrap());
    let ref_end_time_s = ref_times.iter().copied().max_by(|a, b| a.partial_cmp(b).unwrap());

    Some(ScoredWindow {
        window,
        badness,
        area: ProblemArea {
            start_time_s: start,
            end_time_s: end,
            issues,
            avg_pitch_dev_cents: mean_cents,
            avg_timing_offset_ms: mean_offset_s * 1000.0,
            avg_energy_ratio: mean_ratio,
            ref_start_time_s,
            ref_end_time_s,
        },
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() { None } else { Some(values.iter().sum::<f64>() / values.len() as f64) }
}

fn mean_abs(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use choir_align::Deviation;

    fn entry(user_time_s: f64, pitch_cents: Option<f64>, timing_offset_s: f64, energy_ratio: Option<f64>, ref_time_s: f64) -> NormalizedDeviation {
        NormalizedDeviation {
            deviation: Deviation {
                user_idx: 0,
                ref_idx: 0,
                user_time_s,
                ref_time_s,
                pitch_cents,
                raw_timing_offset_s: timing_offset_s,
                energy_ratio,
            },
            timing_offset_s,
        }
    }

    #[test]
    fn no_issues_on_a_clean_path() {
        let path: Vec<_> = (0..10).map(|i| entry(i as f64 * 0.3, Some(0.0), 0.0, Some(1.0), i as f64 * 0.3)).collect();
        let calibration = ScoringCalibration::default();
        let areas = find_problem_areas(&path, 3.0, &calibration);
        for area in &areas {
            assert!(area.issues.is_empty());
        }
    }

    #[test]
    fn large_cents_deviation_flags_pitch_issue() {
        let path: Vec<_> = (0..10).map(|i| entry(i as f64 * 0.3, Some(300.0), 0.0, Some(1.0), i as f64 * 0.3)).collect();
        let calibration = ScoringCalibration::default();
        let areas = find_problem_areas(&path, 3.0, &calibration);
        assert!(areas.iter().any(|a| a.issues.contains(&Issue::Pitch)));
    }

    #[test]
    fn selected_areas_are_pairwise_non_overlapping() {
        let path: Vec<_> = (0..200)
            .map(|i| entry(i as f64 * 0.05, Some((i % 7) as f64 * 100.0), (i % 5) as f64 * 0.5, Some(1.0), i as f64 * 0.05))
            .collect();
        let calibration = ScoringCalibration::default();
        let areas = find_problem_areas(&path, 10.0, &calibration);
        for pair in areas.windows(2) {
            assert!(pair[0].end_time_s <= pair[1].start_time_s);
        }
    }

    #[test]
    fn at_most_three_areas_are_returned() {
        let path: Vec<_> = (0..400).map(|i| entry(i as f64 * 0.05, Some(500.0), 3.0, Some(0.05), i as f64 * 0.05)).collect();
        let calibration = ScoringCalibration::default();
        let areas = find_problem_areas(&path, 20.0, &calibration);
        assert!(areas.len() <= calibration.max_problem_areas);
    }

    #[test]
    fn reference_span_tracks_min_and_max_ref_time_in_window() {
        let path = vec![
            entry(0.0, Some(500.0), 3.0, Some(0.05), 10.0),
            entry(1.0, Some(500.0), 3.0, Some(0.05), 12.0),
        ];
        let calibration = ScoringCalibration::default();
        let areas = find_problem_areas(&path, 2.0, &calibration);
        assert_eq!(areas[0].ref_start_time_s, Some(10.0));
        assert_eq!(areas[0].ref_end_time_s, Some(12.0));
    }
}
