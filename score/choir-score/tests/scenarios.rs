//! End-to-end scenarios S1-S6 from `spec.md` §8, exercised against the public
//! `choir_score::score` entry point (plus `choir_align::align` directly for
//! S5, whose drift diagnostic isn't part of `ScoreResult`).

use choir_features::Feature;
use choir_score::{ScoringCalibration, score};

const STEP_S: f64 = 0.02;

fn sine_feature(duration_s: f64, hz: f64) -> Feature {
    let n = (duration_s / STEP_S).round() as usize;
    Feature {
        pitch_values: vec![Some(hz); n],
        pitch_times: (0..n).map(|i| i as f64 * STEP_S).collect(),
        onset_times: vec![0.0],
        rms_values: vec![0.5; n],
        rms_times: (0..n).map(|i| i as f64 * STEP_S).collect(),
        duration_s,
    }
}

#[test]
fn s1_perfect_replay_scores_one_hundred_with_one_matched_note() {
    let user = sine_feature(3.0, 440.0);
    let reference = sine_feature(3.0, 440.0);
    let calibration = ScoringCalibration::default();

    let result = score(&user, &reference, &calibration).expect("valid features");
    assert!((result.scores.overall - 100.0).abs() < 1e-6);
    assert!(result.sections.iter().all(|s| s.scores.is_some_and(|d| (d.overall - 100.0).abs() < 1e-6)));
    assert_eq!(result.note_comparison.len(), 1);
    assert!(result.note_comparison[0].note_match);
    assert_eq!(result.note_comparison[0].ref_note, "La4");
}

#[test]
fn s2_semitone_flat_throughout_scores_perfect_pitch() {
    let user = sine_feature(3.0, 415.3); // ~100 cents below 440 Hz
    let reference = sine_feature(3.0, 440.0);
    let calibration = ScoringCalibration::default();

    let result = score(&user, &reference, &calibration).expect("valid features");
    assert!((result.scores.pitch - 100.0).abs() < 1e-6);
    assert!(result.note_comparison.iter().all(|pair| pair.note_match));
}

#[test]
fn s3_octave_drop_folds_to_perfect_pitch() {
    let user = sine_feature(3.0, 220.0);
    let reference = sine_feature(3.0, 440.0);
    let calibration = ScoringCalibration::default();

    let result = score(&user, &reference, &calibration).expect("valid features");
    assert!((result.scores.pitch - 100.0).abs() < 1e-6);
    assert!(result.sections.iter().all(|s| s.pitch_class_match));
    assert!(result.sections.iter().all(|s| s.octave_diff == Some(-1)));
}

#[test]
fn s4_leading_silence_is_trimmed_before_scoring() {
    let n_silence = (2.0 / STEP_S) as usize;
    let n_singing = (3.0 / STEP_S) as usize;
    let mut pitch_values = vec![None; n_silence];
    pitch_values.extend(vec![Some(440.0); n_singing]);
    let pitch_times: Vec<f64> = (0..n_silence + n_singing).map(|i| i as f64 * STEP_S).collect();
    let user = Feature {
        pitch_values,
        pitch_times: pitch_times.clone(),
        onset_times: vec![2.0],
        rms_values: vec![0.5; n_silence + n_singing],
        rms_times: pitch_times,
        duration_s: 5.0,
    };
    let reference = sine_feature(3.0, 440.0);
    let calibration = ScoringCalibration::default();

    let result = score(&user, &reference, &calibration).expect("valid features");
    assert!(result.scores.overall >= 90.0);
    assert!(result.problems.iter().all(|p| !p.issues.contains(&choir_score::Issue::Timing)));
}

#[test]
fn s5_half_speed_drift_is_flagged_insane_but_pitch_stays_high() {
    // A rising glissando the reference sings in 4s; the user sings the same
    // pitch contour stretched over 8s (local slope ~= 2).
    let ref_duration = 4.0;
    let user_duration = 8.0;
    let n_ref = (ref_duration / STEP_S).round() as usize;
    let n_user = (user_duration / STEP_S).round() as usize;

    let hz_at = |fraction: f64| 300.0 + fraction * 300.0; // 300Hz..600Hz
    let reference = Feature {
        pitch_values: (0..n_ref).map(|i| Some(hz_at(i as f64 / n_ref as f64))).collect(),
        pitch_times: (0..n_ref).map(|i| i as f64 * STEP_S).collect(),
        onset_times: vec![0.0],
        rms_values: vec![0.5; n_ref],
        rms_times: (0..n_ref).map(|i| i as f64 * STEP_S).collect(),
        duration_s: ref_duration,
    };
    let user = Feature {
        pitch_values: (0..n_user).map(|i| Some(hz_at(i as f64 / n_user as f64))).collect(),
        pitch_times: (0..n_user).map(|i| i as f64 * STEP_S).collect(),
        onset_times: vec![0.0],
        rms_values: vec![0.5; n_user],
        rms_times: (0..n_user).map(|i| i as f64 * STEP_S).collect(),
        duration_s: user_duration,
    };

    let alignment = choir_align::align(&user, &reference);
    assert!(!alignment.sanity.is_sane);
    assert!(alignment.sanity.mean_slope.is_some_and(|slope| slope > 1.5));

    let calibration = ScoringCalibration::default();
    let result = score(&user, &reference, &calibration).expect("valid features");
    assert!(result.scores.pitch > 90.0);
}

#[test]
fn s6_repeated_same_pitch_note_emits_three_notes() {
    let do4_hz = 261.625_5;
    let note_frames = (0.4 / STEP_S).round() as usize;
    let gap_frames = (0.1 / STEP_S).round() as usize;

    let mut pitch_values = vec![];
    for _ in 0..3 {
        pitch_values.extend(vec![Some(do4_hz); note_frames]);
        pitch_values.extend(vec![None; gap_frames]);
    }
    let n = pitch_values.len();
    let pitch_times: Vec<f64> = (0..n).map(|i| i as f64 * STEP_S).collect();
    let duration_s = n as f64 * STEP_S;

    let reference = Feature {
        pitch_values: pitch_values.clone(),
        pitch_times: pitch_times.clone(),
        onset_times: vec![0.0, 0.5, 1.0],
        rms_values: vec![0.5; n],
        rms_times: pitch_times.clone(),
        duration_s,
    };
    let user = Feature {
        pitch_values,
        pitch_times: pitch_times.clone(),
        onset_times: vec![0.0, 0.5, 1.0],
        rms_values: vec![0.5; n],
        rms_times: pitch_times,
        duration_s,
    };
    let calibration = ScoringCalibration::default();

    let result = score(&user, &reference, &calibration).expect("valid features");
    assert_eq!(result.note_comparison.len(), 3);
    assert!(result.note_comparison.iter().all(|pair| pair.ref_note == "Do4"));
}
