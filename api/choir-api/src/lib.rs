//! JSON-at-rest request/response shapes for the vocal-alignment-and-scoring
//! core (`spec.md` §6), plus the [`score`] entry point external callers use.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub use choir_features::{Feature, InvalidFeatures};
pub use choir_score::ScoringCalibration;

/// Score `user` against `reference`, producing the wire-ready
/// [`ScoreReport`].
///
/// # Errors
///
/// Returns [`InvalidFeatures`] if either input fails shape validation; no
/// partial report is produced.
pub fn score(user: &Feature, reference: &Feature, calibration: &ScoringCalibration) -> Result<ScoreReport, InvalidFeatures> {
    choir_score::score(user, reference, calibration).map(ScoreReport::from)
}

/// Top-level scoring output, matching `spec.md` §6's `ScoreReport` schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// Weighted overall score, `[0, 100]`, one decimal.
    pub overall_score: f64,
    /// Pitch accuracy sub-score.
    pub pitch_score: f64,
    /// Timing accuracy sub-score.
    pub timing_score: f64,
    /// Dynamics match sub-score.
    pub dynamics_score: f64,
    /// Per-second section scores over the user timeline.
    pub section_scores: Vec<SectionScoreDto>,
    /// Up to three localized, non-overlapping problem windows.
    pub problem_areas: Vec<ProblemAreaDto>,
    /// Reference notes paired against nearest-in-time user notes.
    pub note_comparison: Vec<NoteComparisonEntry>,
}

/// One per-second section of the user timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionScoreDto {
    /// Zero-based section index.
    pub section_index: usize,
    /// Section start time, seconds.
    pub start_time: f64,
    /// Section end time, seconds.
    pub end_time: f64,
    /// Weighted overall score for this section, or `null` if the section
    /// has no voiced pitch samples.
    pub overall_score: Option<f64>,
    /// Pitch sub-score, or `null`.
    pub pitch_score: Option<f64>,
    /// Timing sub-score, or `null`.
    pub timing_score: Option<f64>,
    /// Dynamics sub-score, or `null`.
    pub dynamics_score: Option<f64>,
    /// Dominant reference note label (e.g. `"La4"`), if any.
    pub ref_note: Option<String>,
    /// Dominant user note label, if any.
    pub user_note: Option<String>,
    /// `refNote`/`userNote` agree within the note-match cents tolerance.
    pub note_match: bool,
    /// `refNote`/`userNote` share a pitch class regardless of octave.
    pub pitch_class_match: bool,
    /// Signed octave gap `userNote - refNote`, if both are present.
    pub octave_diff: Option<i32>,
}

/// One localized problem window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemAreaDto {
    /// Window start, user time.
    pub start_time: f64,
    /// Window end, user time.
    pub end_time: f64,
    /// Flagged dimensions (`"pitch"`, `"timing"`, `"dynamics"`).
    pub issues: Vec<String>,
    /// Mean absolute pitch deviation in cents over voiced pairs.
    pub avg_pitch_dev_cents: f64,
    /// Mean absolute timing offset, milliseconds.
    pub avg_timing_offset_ms: f64,
    /// Mean energy ratio over voiced pairs.
    pub avg_energy_ratio: f64,
    /// Earliest reference time touched by this window's pairs, for dual
    /// playback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_start_time: Option<f64>,
    /// Latest reference time touched by this window's pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_end_time: Option<f64>,
}

/// One reference note paired against its nearest-in-time user note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteComparisonEntry {
    /// Zero-based index into the reference note sequence.
    pub note_index: usize,
    /// Reference note label (e.g. `"Do4"`).
    pub ref_note: String,
    /// Reference note start time, seconds.
    pub ref_start_time: f64,
    /// Reference note end time, seconds.
    pub ref_end_time: f64,
    /// Matched user note label, or `null` if unmatched.
    pub user_note: Option<String>,
    /// Matched user note start time, seconds, or `null`.
    pub user_start_time: Option<f64>,
    /// Matched user note end time, seconds, or `null`.
    pub user_end_time: Option<f64>,
    /// Hz distance within the note-match cents tolerance.
    pub note_match: bool,
    /// Same pitch class regardless of octave, or `null` if unmatched.
    pub pitch_class_match: Option<bool>,
    /// Signed octave gap, or `null` if unmatched.
    pub octave_diff: Option<i32>,
    /// Octave-unfolded cents offset, or `null` if unmatched.
    pub cents_off: Option<f64>,
    /// Timing offset in milliseconds, or `null` if unmatched.
    pub timing_offset_ms: Option<f64>,
}

impl From<choir_score::ScoreResult> for ScoreReport {
    fn from(result: choir_score::ScoreResult) -> Self {
        ScoreReport {
            overall_score: result.scores.overall,
            pitch_score: result.scores.pitch,
            timing_score: result.scores.timing,
            dynamics_score: result.scores.dynamics,
            section_scores: result.sections.into_iter().map(SectionScoreDto::from).collect(),
            problem_areas: result.problems.into_iter().map(ProblemAreaDto::from).collect(),
            note_comparison: result
                .note_comparison
                .into_iter()
                .enumerate()
                .map(|(note_index, pair)| NoteComparisonEntry::from_pair(note_index, pair))
                .collect(),
        }
    }
}

impl From<choir_score::SectionScore> for SectionScoreDto {
    fn from(section: choir_score::SectionScore) -> Self {
        SectionScoreDto {
            section_index: section.section_index,
            start_time: section.start_time_s,
            end_time: section.end_time_s,
            overall_score: section.scores.map(|s| s.overall),
            pitch_score: section.scores.map(|s| s.pitch),
            timing_score: section.scores.map(|s| s.timing),
            dynamics_score: section.scores.map(|s| s.dynamics),
            ref_note: section.ref_note.map(|n| n.label()),
            user_note: section.user_note.map(|n| n.label()),
            note_match: section.note_match,
            pitch_class_match: section.pitch_class_match,
            octave_diff: section.octave_diff,
        }
    }
}

impl From<choir_score::ProblemArea> for ProblemAreaDto {
    fn from(area: choir_score::ProblemArea) -> Self {
        ProblemAreaDto {
            start_time: area.start_time_s,
            end_time: area.end_time_s,
            issues: area.issues.into_iter().map(issue_label).collect(),
            avg_pitch_dev_cents: area.avg_pitch_dev_cents,
            avg_timing_offset_ms: area.avg_timing_offset_ms,
            avg_energy_ratio: area.avg_energy_ratio,
            ref_start_time: area.ref_start_time_s,
            ref_end_time: area.ref_end_time_s,
        }
    }
}

fn issue_label(issue: choir_score::Issue) -> String {
    match issue {
        choir_score::Issue::Pitch => "pitch".to_owned(),
        choir_score::Issue::Timing => "timing".to_owned(),
        choir_score::Issue::Dynamics => "dynamics".to_owned(),
    }
}

impl NoteComparisonEntry {
    fn from_pair(note_index: usize, pair: choir_score::NotePair) -> Self {
        NoteComparisonEntry {
            note_index,
            ref_note: pair.reference.note.label(),
            ref_start_time: pair.reference.start_s,
            ref_end_time: pair.reference.end_s,
            user_note: pair.user.map(|n| n.note.label()),
            user_start_time: pair.user.map(|n| n.start_s),
            user_end_time: pair.user.map(|n| n.end_s),
            note_match: pair.note_match,
            pitch_class_match: pair.pitch_class_match,
            octave_diff: pair.octave_diff,
            cents_off: pair.cents_off,
            timing_offset_ms: pair.timing_offset_ms,
        }
    }
}

impl ScoreReport {
    /// Render a short human-readable summary, matching the informal report
    /// format the wider pack's CLI layers print alongside JSON.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "Overall: {:.1}  (pitch {:.1} / timing {:.1} / dynamics {:.1})\n",
            self.overall_score, self.pitch_score, self.timing_score, self.dynamics_score
        );
        if self.problem_areas.is_empty() {
            out.push_str("No problem areas flagged.\n");
        } else {
            out.push_str("Problem areas:\n");
            for area in &self.problem_areas {
                let issues = if area.issues.is_empty() { "none".to_owned() } else { area.issues.join(", ") };
                out.push_str(&format!(
                    "  {:.1}s-{:.1}s [{issues}] cents={:.0} timing_ms={:.0} energy={:.2}\n",
                    area.start_time, area.end_time, area.avg_pitch_dev_cents, area.avg_timing_offset_ms, area.avg_energy_ratio
                ));
            }
        }
        out.push_str(&format!("Notes compared: {}\n", self.note_comparison.len()));
        out
    }
}
