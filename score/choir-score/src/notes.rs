//! Note extractor (`spec.md` §4.9, extraction half): groups voiced pitch
//! frames into discrete note events, independent of the DTW path.

use crate::calibration::ScoringCalibration;
use choir_features::{Feature, nearest_index};
use choir_pitch::{Note12, cents_between};

/// One extracted note event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedNote {
    /// Note start, seconds.
    pub start_s: f64,
    /// Note end, seconds.
    pub end_s: f64,
    /// Median fundamental of the contributing frames, Hz.
    pub hz: f64,
    /// Nearest 12-TET note.
    pub note: Note12,
}

struct Candidate {
    start_idx: usize,
    hz_values: Vec<f64>,
}

impl Candidate {
    fn last_idx(&self) -> usize {
        self.start_idx + self.hz_values.len() - 1
    }

    fn duration_so_far_s(&self, times: &[f64]) -> f64 {
        times[self.last_idx()] - times[self.start_idx]
    }

    fn running_median(&self) -> f64 {
        let mut sorted = self.hz_values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 { (sorted[mid - 1] + sorted[mid]) / 2.0 } else { sorted[mid] }
    }
}

/// Energy-dip timestamps (seconds) mapped onto the nearest pitch frame.
fn energy_dip_pitch_times(feature: &Feature, calibration: &ScoringCalibration) -> Vec<f64> {
    let rms = &feature.rms_values;
    let mut dips = vec![];
    for i in 1..rms.len().saturating_sub(1) {
        if rms[i] < calibration.energy_dip_drop_ratio * rms[i - 1]
            && rms[i + 1] > calibration.energy_dip_recovery_ratio * rms[i]
        {
            dips.push(feature.rms_times[i]);
        }
    }
    dips.into_iter()
        .filter_map(|t| {
            let idx = nearest_index(&feature.pitch_times, t)?;
            let nearest_time = feature.pitch_times[idx];
            if (nearest_time - t).abs() <= calibration.note_onset_tolerance_s { Some(nearest_time) } else { None }
        })
        .collect()
}

/// Walk `feature`'s pitch stream and emit notes per `spec.md` §4.9's four
/// boundary conditions.
#[must_use]
pub fn extract_notes(feature: &Feature, calibration: &ScoringCalibration) -> Vec<ExtractedNote> {
    let energy_dips = energy_dip_pitch_times(feature, calibration);
    let mut notes = vec![];
    let mut candidate: Option<Candidate> = None;

    for (idx, (&time_s, &pitch_hz)) in feature.pitch_times.iter().zip(&feature.pitch_values).enumerate() {
        let boundary_hit = match (&candidate, pitch_hz) {
            (None, _) => false,
            (Some(_), None) => true, // condition 1: unvoiced frame
            (Some(c), Some(hz)) => {
                let median = c.running_median();
                let pitch_jump = cents_between(hz, median).abs() > calibration.note_pitch_jump_cents;
                let long_enough = c.duration_so_far_s(&feature.pitch_times) >= calibration.min_note_duration_s;
                let at_onset = feature
                    .onset_times
                    .iter()
                    .any(|&o| (o - time_s).abs() <= calibration.note_onset_tolerance_s);
                let at_energy_dip = energy_dips.iter().any(|&d| (d - time_s).abs() <= calibration.note_onset_tolerance_s);
                pitch_jump || (long_enough && (at_onset || at_energy_dip))
            }
        };

        if boundary_hit {
            close_candidate(candidate.take(), feature, calibration, &mut notes);
        }

        if let Some(hz) = pitch_hz {
            candidate.get_or_insert_with(|| Candidate { start_idx: idx, hz_values: vec![] }).hz_values.push(hz);
        }
    }

    close_candidate(candidate, feature, calibration, &mut notes);
    notes
}

fn close_candidate(
    candidate: Option<Candidate>,
    feature: &Feature,
    calibration: &ScoringCalibration,
    notes: &mut Vec<ExtractedNote>,
) {
    let Some(candidate) = candidate else { return };
    let end_idx = candidate.last_idx();
    let start_s = feature.pitch_times[candidate.start_idx];
    let end_s = feature.pitch_times[end_idx];
    if end_s - start_s < calibration.min_note_duration_s {
        return;
    }
    let hz = candidate.running_median();
    notes.push(ExtractedNote { start_s, end_s, hz, note: Note12::from_hz(hz) });
}
