//! Deviation computer (`spec.md` §4.4): turns an index-space path pair into
//! musically meaningful pitch/timing/energy deviations.

use crate::fastdtw::PathPair;
use choir_features::{Feature, nearest_index};
use choir_pitch::cents_between_folded;

const ENERGY_RATIO_FLOOR: f64 = 1e-6;

/// Per-pair deviation between a user frame and its matched reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    /// `user_idx` from the source path pair.
    pub user_idx: usize,
    /// `ref_idx` from the source path pair.
    pub ref_idx: usize,
    /// User-side timestamp, seconds.
    pub user_time_s: f64,
    /// Reference-side timestamp, seconds.
    pub ref_time_s: f64,
    /// Octave-folded pitch deviation in cents; `None` if either frame is
    /// unvoiced.
    pub pitch_cents: Option<f64>,
    /// `user_time_s - ref_time_s`, before baseline removal.
    pub raw_timing_offset_s: f64,
    /// `user_rms / ref_rms` at nearest time, rounded to 4 decimals; `None`
    /// if the reference RMS is at or below the floor.
    pub energy_ratio: Option<f64>,
}

/// Compute one [`Deviation`] per path pair against the original (untrimmed,
/// untruncated) `user`/`reference` feature arrays.
#[must_use]
pub fn compute_deviations(path: &[PathPair], user: &Feature, reference: &Feature) -> Vec<Deviation> {
    path.iter()
        .map(|pair| {
            let user_time_s = user.pitch_times[pair.user_idx];
            let ref_time_s = reference.pitch_times[pair.ref_idx];

            let pitch_cents = match (user.pitch_values[pair.user_idx], reference.pitch_values[pair.ref_idx]) {
                (Some(u_hz), Some(r_hz)) if u_hz > 0.0 && r_hz > 0.0 => Some(cents_between_folded(u_hz, r_hz)),
                _ => None,
            };

            let energy_ratio = energy_ratio_at(user, user_time_s, reference, ref_time_s);

            Deviation {
                user_idx: pair.user_idx,
                ref_idx: pair.ref_idx,
                user_time_s,
                ref_time_s,
                pitch_cents,
                raw_timing_offset_s: user_time_s - ref_time_s,
                energy_ratio,
            }
        })
        .collect()
}

fn energy_ratio_at(user: &Feature, user_time_s: f64, reference: &Feature, ref_time_s: f64) -> Option<f64> {
    let user_rms = nearest_index(&user.rms_times, user_time_s).map(|i| user.rms_values[i])?;
    let ref_rms = nearest_index(&reference.rms_times, ref_time_s).map(|i| reference.rms_values[i])?;
    if ref_rms <= ENERGY_RATIO_FLOOR {
        return None;
    }
    Some((user_rms / ref_rms * 10_000.0).round() / 10_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(pitches: Vec<Option<f64>>, rms: Vec<f64>) -> Feature {
        let n = pitches.len();
        Feature {
            pitch_values: pitches,
            pitch_times: (0..n).map(|i| i as f64 * 0.1).collect(),
            onset_times: vec![],
            rms_values: rms.clone(),
            rms_times: (0..rms.len()).map(|i| i as f64 * 0.1).collect(),
            duration_s: n as f64 * 0.1,
        }
    }

    #[test]
    fn unison_pitch_has_zero_cents() {
        let user = feature(vec![Some(440.0)], vec![0.5]);
        let reference = feature(vec![Some(440.0)], vec![0.5]);
        let path = [PathPair { user_idx: 0, ref_idx: 0 }];
        let devs = compute_deviations(&path, &user, &reference);
        assert!((devs[0].pitch_cents.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn unvoiced_frame_yields_no_pitch_cents() {
        let user = feature(vec![None], vec![0.5]);
        let reference = feature(vec![Some(440.0)], vec![0.5]);
        let path = [PathPair { user_idx: 0, ref_idx: 0 }];
        let devs = compute_deviations(&path, &user, &reference);
        assert_eq!(devs[0].pitch_cents, None);
    }

    #[test]
    fn octave_difference_folds_to_near_zero_cents() {
        let user = feature(vec![Some(220.0)], vec![0.5]);
        let reference = feature(vec![Some(440.0)], vec![0.5]);
        let path = [PathPair { user_idx: 0, ref_idx: 0 }];
        let devs = compute_deviations(&path, &user, &reference);
        assert!(devs[0].pitch_cents.unwrap().abs() < 1e-6);
    }

    #[test]
    fn zero_reference_rms_yields_no_energy_ratio() {
        let user = feature(vec![Some(440.0)], vec![0.5]);
        let reference = feature(vec![Some(440.0)], vec![0.0]);
        let path = [PathPair { user_idx: 0, ref_idx: 0 }];
        let devs = compute_deviations(&path, &user, &reference);
        assert_eq!(devs[0].energy_ratio, None);
    }

    #[test]
    fn energy_ratio_is_rounded_to_four_decimals() {
        let user = feature(vec![Some(440.0)], vec![0.1]);
        let reference = feature(vec![Some(440.0)], vec![0.3]);
        let path = [PathPair { user_idx: 0, ref_idx: 0 }];
        let devs = compute_deviations(&path, &user, &reference);
        assert!((devs[0].energy_ratio.unwrap() - 0.3333).abs() < 1e-9);
    }

    #[test]
    fn raw_timing_offset_is_user_minus_reference_time() {
        let user = feature(vec![Some(440.0), Some(440.0)], vec![0.5, 0.5]);
        let reference = feature(vec![Some(440.0), Some(440.0)], vec![0.5, 0.5]);
        let path = [PathPair { user_idx: 1, ref_idx: 0 }];
        let devs = compute_deviations(&path, &user, &reference);
        assert!((devs[0].raw_timing_offset_s - 0.1).abs() < 1e-9);
    }
}
