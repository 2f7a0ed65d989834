//! Named calibration constants for the scorer and problem finder
//! (`spec.md` §4.7, §4.8). Collected into one struct so a future preset
//! system has a single seam to override from, even though the service
//! currently runs only [`ScoringCalibration::default`].

/// Thresholds and weights driving the pitch/timing/dynamics curves, the
/// overall weighting, and the problem-finder badness metric. All fields are
/// "the current calibrated values for choir-level scoring" per `spec.md`
/// §4.7 — kept as named, overridable fields rather than inline literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringCalibration {
    /// `|cents| ≤` this band scores 100.
    pub pitch_perfect_band_cents: f64,
    /// `|cents| ≥` this scores 0.
    pub pitch_zero_cutoff_cents: f64,
    /// `|Δt| ≤` this band scores 100.
    pub timing_perfect_band_s: f64,
    /// `|Δt| ≥` this scores 0.
    pub timing_zero_cutoff_s: f64,
    /// Energy ratio perfect band, inclusive (`[low, high]` scores 100).
    pub dynamics_perfect_band: (f64, f64),
    /// Energy ratio zero cutoffs (`≤ low` or `≥ high` scores 0).
    pub dynamics_zero_cutoff: (f64, f64),
    /// Sub-score used when a dimension has no samples to score.
    pub no_sample_default_score: f64,
    /// Overall-score weight on pitch.
    pub overall_weight_pitch: f64,
    /// Overall-score weight on timing.
    pub overall_weight_timing: f64,
    /// Overall-score weight on dynamics.
    pub overall_weight_dynamics: f64,
    /// Problem finder: mean `|cents|` above which `pitch` is an issue.
    pub problem_pitch_issue_cents: f64,
    /// Problem finder: mean `|Δt|` above which `timing` is an issue.
    pub problem_timing_issue_s: f64,
    /// Problem finder: energy ratio range outside which `dynamics` is an
    /// issue.
    pub problem_dynamics_issue_range: (f64, f64),
    /// Problem finder badness weight on mean cents (normalized by
    /// `pitch_zero_cutoff_cents`).
    pub badness_weight_pitch: f64,
    /// Problem finder badness weight on mean `|Δt|` (normalized by
    /// `timing_zero_cutoff_s`).
    pub badness_weight_timing: f64,
    /// Problem finder badness weight on `|1 - mean_ratio|`.
    pub badness_weight_dynamics: f64,
    /// Number of top non-overlapping problem windows to keep.
    pub max_problem_areas: usize,
    /// Minimum note duration to be emitted by the extractor, in seconds.
    pub min_note_duration_s: f64,
    /// Pitch-jump-from-running-median boundary, in cents.
    pub note_pitch_jump_cents: f64,
    /// Onset/energy-dip coincidence tolerance, in seconds.
    pub note_onset_tolerance_s: f64,
    /// Energy dip drop ratio (`rms[i] < ratio * rms[i-1]`).
    pub energy_dip_drop_ratio: f64,
    /// Energy dip recovery ratio (`rms[i+1] > ratio * rms[i]`).
    pub energy_dip_recovery_ratio: f64,
    /// Note-pairing search radius, in seconds.
    pub note_pairing_window_s: f64,
    /// Note-pairing maximum lookahead candidates.
    pub note_pairing_max_candidates: usize,
    /// `noteMatch` cents tolerance.
    pub note_match_cents: f64,
}

impl Default for ScoringCalibration {
    fn default() -> Self {
        Self {
            pitch_perfect_band_cents: 100.0,
            pitch_zero_cutoff_cents: 400.0,
            timing_perfect_band_s: 0.5,
            timing_zero_cutoff_s: 2.0,
            dynamics_perfect_band: (0.5, 2.0),
            dynamics_zero_cutoff: (0.2, 3.0),
            no_sample_default_score: 50.0,
            overall_weight_pitch: 0.70,
            overall_weight_timing: 0.15,
            overall_weight_dynamics: 0.15,
            problem_pitch_issue_cents: 150.0,
            problem_timing_issue_s: 1.5,
            problem_dynamics_issue_range: (0.35, 3.0),
            badness_weight_pitch: 0.70,
            badness_weight_timing: 0.15,
            badness_weight_dynamics: 0.15,
            max_problem_areas: 3,
            min_note_duration_s: 0.12,
            note_pitch_jump_cents: 100.0,
            note_onset_tolerance_s: 0.05,
            energy_dip_drop_ratio: 0.7,
            energy_dip_recovery_ratio: 1.3,
            note_pairing_window_s: 2.0,
            note_pairing_max_candidates: 8,
            note_match_cents: 100.0,
        }
    }
}
