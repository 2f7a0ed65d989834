//! Wires the alignment core, the piecewise-linear scorer, the problem
//! finder, and the note extractor/pairer into the single `score(user, ref)`
//! entry point described by `spec.md` §2.

#![forbid(unsafe_code)]

mod calibration;
mod notes;
mod pairing;
mod problems;
mod scorer;

pub use calibration::ScoringCalibration;
pub use notes::{ExtractedNote, extract_notes};
pub use pairing::{NotePair, pair_notes};
pub use problems::{Issue, ProblemArea, find_problem_areas};
pub use scorer::{DimensionScores, SectionScore, score_path, section_scores};

use choir_features::{Feature, InvalidFeatures};

/// Full output of one `score(user, ref)` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// Top-level `{pitch, timing, dynamics, overall}` scores.
    pub scores: DimensionScores,
    /// Per-second section scores over the user timeline.
    pub sections: Vec<SectionScore>,
    /// Up to three localized, non-overlapping problem windows.
    pub problems: Vec<ProblemArea>,
    /// Reference notes paired against nearest-in-time user notes.
    pub note_comparison: Vec<NotePair>,
}

fn degenerate_result(calibration: &ScoringCalibration) -> ScoreResult {
    let default = calibration.no_sample_default_score;
    ScoreResult {
        scores: DimensionScores { pitch: default, timing: default, dynamics: default, overall: default },
        sections: vec![],
        problems: vec![],
        note_comparison: vec![],
    }
}

fn is_degenerate(user: &Feature, reference: &Feature) -> bool {
    user.pitch_times.is_empty()
        || reference.pitch_times.is_empty()
        || user.duration_s <= 0.0
        || reference.duration_s <= 0.0
        || user.pitch_values.iter().all(Option::is_none)
}

/// Score `user` against `reference`.
///
/// # Errors
///
/// Returns [`InvalidFeatures`] if either input fails shape validation
/// (`spec.md` §7.1); no partial report is produced in that case.
pub fn score(user: &Feature, reference: &Feature, calibration: &ScoringCalibration) -> Result<ScoreResult, InvalidFeatures> {
    user.validate()?;
    reference.validate()?;

    if is_degenerate(user, reference) {
        tracing::debug!("degenerate input, defaulting to no-sample score");
        return Ok(degenerate_result(calibration));
    }

    let alignment = choir_align::align(user, reference);
    let scores = score_path(&alignment.path, calibration);
    let sections = section_scores(&alignment.path, user, reference, user.duration_s, calibration);
    let problems = find_problem_areas(&alignment.path, user.duration_s, calibration);

    let reference_notes = extract_notes(reference, calibration);
    let user_notes = extract_notes(user, calibration);
    let note_comparison = pair_notes(&reference_notes, &user_notes, calibration);

    tracing::info!(
        overall = scores.overall,
        problem_areas = problems.len(),
        notes_compared = note_comparison.len(),
        "scoring complete"
    );
    Ok(ScoreResult { scores, sections, problems, note_comparison })
}
