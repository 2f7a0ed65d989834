//! Note pairer (`spec.md` §4.9, pairing half): greedily matches reference
//! notes to user notes by nearest start time, grounded on the same
//! cursor-advance matching used for note-sequence comparison in the wider
//! pack (see `other_examples/…audio-ai` note-sequence comparator).

use crate::calibration::ScoringCalibration;
use crate::notes::ExtractedNote;
use choir_pitch::cents_between;

/// A reference note plus its matched user note, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotePair {
    /// The reference note.
    pub reference: ExtractedNote,
    /// The nearest-in-time user note, if one was found within tolerance.
    pub user: Option<ExtractedNote>,
    /// Octave-unfolded cents offset (`user.hz` vs `reference.hz`), if
    /// matched.
    pub cents_off: Option<f64>,
    /// `(user.start_s - reference.start_s) * 1000`, if matched.
    pub timing_offset_ms: Option<f64>,
    /// Hz distance within `note_match_cents`.
    pub note_match: bool,
    /// Same pitch class regardless of octave, if matched.
    pub pitch_class_match: Option<bool>,
    /// Signed octave gap, if matched.
    pub octave_diff: Option<i32>,
}

/// Pair each `reference` note, in order, with the nearest unconsumed `user`
/// note within `±note_pairing_window_s`, examining at most
/// `note_pairing_max_candidates` ahead of a monotonically advancing cursor.
#[must_use]
pub fn pair_notes(reference: &[ExtractedNote], user: &[ExtractedNote], calibration: &ScoringCalibration) -> Vec<NotePair> {
    let mut cursor = 0usize;
    reference
        .iter()
        .map(|&ref_note| {
            let search_end = (cursor + calibration.note_pairing_max_candidates).min(user.len());
            let best = user[cursor..search_end]
                .iter()
                .enumerate()
                .map(|(offset, &candidate)| (cursor + offset, candidate, (candidate.start_s - ref_note.start_s).abs()))
                .filter(|&(_, _, delta)| delta <= calibration.note_pairing_window_s)
                .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(core::cmp::Ordering::Equal));

            match best {
                Some((matched_idx, user_note, _)) => {
                    cursor = matched_idx + 1;
                    let cents_off = cents_between(user_note.hz, ref_note.hz);
                    let note_match = cents_off.abs() <= calibration.note_match_cents;
                    let pitch_class_match = note_match || user_note.note.same_pitch_class(ref_note.note);
                    NotePair {
                        reference: ref_note,
                        user: Some(user_note),
                        cents_off: Some(cents_off),
                        timing_offset_ms: Some((user_note.start_s - ref_note.start_s) * 1000.0),
                        note_match,
                        pitch_class_match: Some(pitch_class_match),
                        octave_diff: Some(user_note.note.octave_diff(ref_note.note)),
                    }
                }
                None => NotePair {
                    reference: ref_note,
                    user: None,
                    cents_off: None,
                    timing_offset_ms: None,
                    note_match: false,
                    pitch_class_match: None,
                    octave_diff: None,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use choir_pitch::Note12;

    fn note(start_s: f64, end_s: f64, hz: f64) -> ExtractedNote {
        ExtractedNote { start_s, end_s, hz, note: Note12::from_hz(hz) }
    }

    #[test]
    fn exact_match_pairs_every_note() {
        let calibration = ScoringCalibration::default();
        let reference = vec![note(0.0, 0.4, 440.0), note(0.4, 0.8, 493.88)];
        let user = reference.clone();
        let pairs = pair_notes(&reference, &user, &calibration);
        assert_eq!(pairs.len(), 2);
        for pair in &pairs {
            assert!(pair.note_match);
            assert_eq!(pair.octave_diff, Some(0));
        }
    }

    #[test]
    fn unmatched_reference_note_has_null_user_side() {
        let calibration = ScoringCalibration::default();
        let reference = vec![note(0.0, 0.4, 440.0)];
        let user: Vec<ExtractedNote> = vec![];
        let pairs = pair_notes(&reference, &user, &calibration);
        assert!(pairs[0].user.is_none());
        assert!(!pairs[0].note_match);
    }

    #[test]
    fn cursor_advances_past_matched_notes() {
        let calibration = ScoringCalibration::default();
        let reference = vec![note(0.0, 0.2, 440.0), note(1.0, 1.2, 440.0)];
        let user = vec![note(0.05, 0.25, 440.0), note(1.05, 1.25, 440.0)];
        let pairs = pair_notes(&reference, &user, &calibration);
        assert_eq!(pairs[0].user.unwrap().start_s, 0.05);
        assert_eq!(pairs[1].user.unwrap().start_s, 1.05);
    }

    #[test]
    fn note_outside_window_is_not_matched() {
        let calibration = ScoringCalibration::default();
        let reference = vec![note(0.0, 0.2, 440.0)];
        let user = vec![note(5.0, 5.2, 440.0)]; // 5s away, outside ±2.0s
        let pairs = pair_notes(&reference, &user, &calibration);
        assert!(pairs[0].user.is_none());
    }

    #[test]
    fn octave_drop_is_pitch_class_match_but_not_note_match() {
        let calibration = ScoringCalibration::default();
        let reference = vec![note(0.0, 0.2, 440.0)];
        let user = vec![note(0.0, 0.2, 220.0)];
        let pairs = pair_notes(&reference, &user, &calibration);
        assert!(!pairs[0].note_match);
        assert_eq!(pairs[0].pitch_class_match, Some(true));
        assert_eq!(pairs[0].octave_diff, Some(-1));
    }
}
