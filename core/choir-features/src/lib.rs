//! The `Feature` record: an immutable time-series bundle produced upstream
//! (pitch/onset/RMS extraction from raw audio is out of scope here — see
//! `spec.md` §1) and consumed as input by the alignment and scoring core.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pitch/onset/RMS time series for one recording (user or reference).
///
/// `pitch_values[i]` is `None` for unvoiced frames; at rest as JSON this is
/// `null` (`spec.md` §6). Frame `i` of `pitch_values`/`pitch_times` and frame
/// `j` of `rms_values`/`rms_times` are independent grids — `onset_times` is
/// independent of both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Fundamental frequency per pitch frame, in Hz; `None` marks an
    /// unvoiced frame.
    pub pitch_values: Vec<Option<f64>>,
    /// Timestamps (seconds) for `pitch_values`, strictly increasing.
    pub pitch_times: Vec<f64>,
    /// Detected onset timestamps (seconds), independent of the pitch grid.
    pub onset_times: Vec<f64>,
    /// Peak-normalized RMS energy per frame, in `[0, 1]`.
    pub rms_values: Vec<f64>,
    /// Timestamps (seconds) for `rms_values`, strictly increasing.
    pub rms_times: Vec<f64>,
    /// Total audio duration in seconds.
    pub duration_s: f64,
}

/// Invalid input shape detected while validating a [`Feature`] record
/// (`spec.md` §7.1). Never raised for degenerate-but-well-shaped data (an
/// empty stream, zero duration, fully unvoiced) — those are handled, not
/// rejected.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidFeatures {
    /// Two parallel arrays that must share a length do not.
    #[error("{which}: pitch_values has {values_len} entries but pitch_times has {times_len}")]
    LengthMismatch {
        /// Which array pair failed (`"pitch"` or `"rms"`).
        which: &'static str,
        /// Length of the values array.
        values_len: usize,
        /// Length of the times array.
        times_len: usize,
    },
    /// A times array is not strictly increasing.
    #[error("{which}_times is not strictly increasing at index {index}")]
    NonMonotonicTimes {
        /// Which times array failed (`"pitch"` or `"rms"`).
        which: &'static str,
        /// Index of the first offending sample.
        index: usize,
    },
    /// The last pitch timestamp exceeds the declared duration.
    #[error("last pitch_times entry {last_time} exceeds duration_s {duration_s}")]
    DurationExceeded {
        /// The offending timestamp.
        last_time: f64,
        /// The declared duration.
        duration_s: f64,
    },
    /// An onset timestamp falls outside `[0, duration_s]`.
    #[error("onset_times entry {onset_s} falls outside [0, {duration_s}]")]
    OnsetOutOfRange {
        /// The offending onset timestamp.
        onset_s: f64,
        /// The declared duration.
        duration_s: f64,
    },
    /// A voiced pitch value is not finite and strictly positive.
    #[error("pitch_values[{index}] = {hz} is neither unvoiced nor a positive frequency")]
    NonPositiveHz {
        /// Index of the offending frame.
        index: usize,
        /// The offending value.
        hz: f64,
    },
    /// `duration_s` itself is not finite and non-negative.
    #[error("duration_s {duration_s} is not finite and non-negative")]
    InvalidDuration {
        /// The offending duration.
        duration_s: f64,
    },
}

impl Feature {
    /// Validate the shape invariants from `spec.md` §3, failing fast with
    /// [`InvalidFeatures`] on the first violation found. Degenerate data
    /// (empty arrays, zero duration) passes validation; it is handled by the
    /// scorer, not rejected here.
    pub fn validate(&self) -> Result<(), InvalidFeatures> {
        if !self.duration_s.is_finite() || self.duration_s < 0.0 {
            return Err(InvalidFeatures::InvalidDuration { duration_s: self.duration_s });
        }
        if self.pitch_values.len() != self.pitch_times.len() {
            return Err(InvalidFeatures::LengthMismatch {
                which: "pitch",
                values_len: self.pitch_values.len(),
                times_len: self.pitch_times.len(),
            });
        }
        if self.rms_values.len() != self.rms_times.len() {
            return Err(InvalidFeatures::LengthMismatch {
                which: "rms",
                values_len: self.rms_values.len(),
                times_len: self.rms_times.len(),
            });
        }
        check_strictly_increasing(&self.pitch_times, "pitch")?;
        check_strictly_increasing(&self.rms_times, "rms")?;
        if let Some(&last) = self.pitch_times.last()
            && last > self.duration_s
        {
            return Err(InvalidFeatures::DurationExceeded { last_time: last, duration_s: self.duration_s });
        }
        for &onset in &self.onset_times {
            if onset < 0.0 || onset > self.duration_s {
                return Err(InvalidFeatures::OnsetOutOfRange { onset_s: onset, duration_s: self.duration_s });
            }
        }
        for (index, value) in self.pitch_values.iter().enumerate() {
            if let Some(hz) = value
                && (!hz.is_finite() || *hz <= 0.0)
            {
                return Err(InvalidFeatures::NonPositiveHz { index, hz: *hz });
            }
        }
        Ok(())
    }

    /// Serialize to a compact (no extraneous whitespace) JSON string.
    ///
    /// Mirrors the original service's `features_to_json` helper: compact
    /// wire encoding is a documented operation, not an incidental derive.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (it cannot for a valid
    /// `Feature`, but the fallible `serde_json` API is preserved so callers
    /// do not need to `unwrap`).
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string (`features_from_json` in the original
    /// service).
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid `Feature` encoding.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn check_strictly_increasing(times: &[f64], which: &'static str) -> Result<(), InvalidFeatures> {
    for (index, pair) in times.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(InvalidFeatures::NonMonotonicTimes { which, index: index + 1 });
        }
    }
    Ok(())
}

/// Index of the element of `times` nearest to `t` (ties broken toward the
/// earlier index). Used to map a pitch-frame timestamp onto the nearest RMS
/// frame, and an energy-dip timestamp onto the nearest pitch frame.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn nearest_index(times: &[f64], t: f64) -> Option<usize> {
    times
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - t).abs().partial_cmp(&(*b - t).abs()).unwrap_or(core::cmp::Ordering::Equal))
        .map(|(index, _)| index)
}

/// Linearly interpolate `values` (sampled at `times`) at `t`, clamping to the
/// first/last value outside the sampled range. Used to resample RMS energy
/// onto the pitch time grid for the DTW feature builder.
///
/// Returns `0.0` if `times`/`values` are empty or mismatched in length.
#[must_use]
pub fn interp_linear(times: &[f64], values: &[f64], t: f64) -> f64 {
    if times.is_empty() || times.len() != values.len() {
        return 0.0;
    }
    if t <= times[0] {
        return values[0];
    }
    if t >= *times.last().expect("non-empty") {
        return *values.last().expect("non-empty");
    }
    let upper = times.partition_point(|&x| x <= t);
    let lower = upper - 1;
    let (t0, t1) = (times[lower], times[upper]);
    let (v0, v1) = (values[lower], values[upper]);
    if (t1 - t0).abs() < f64::EPSILON {
        return v0;
    }
    let frac = (t - t0) / (t1 - t0);
    v0 + frac * (v1 - v0)
}
