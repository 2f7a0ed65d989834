//! Path normalizer (`spec.md` §4.5): collapse DTW's many-to-one path into a
//! 1:1 mapping keyed by user index, then remove the constant timing offset
//! that a partial reference excerpt introduces.

use crate::deviation::Deviation;
use std::collections::BTreeMap;

/// A deduplicated, baseline-corrected deviation: one entry per unique
/// `user_idx`, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedDeviation {
    /// The underlying deviation this entry was chosen from.
    pub deviation: Deviation,
    /// `raw_timing_offset_s` minus the path-wide median offset.
    pub timing_offset_s: f64,
}

/// Deduplicate `deviations` to one entry per `user_idx` (smallest absolute
/// pitch-cents deviation wins; unvoiced entries count as `+inf`), then
/// subtract the median raw timing offset of the surviving entries.
///
/// The median is computed over the deduplicated population, not the raw
/// path: `Alignment::timing_offsets` is defined over the deduplicated path,
/// so the reported median must be exactly zero against that same
/// population, not merely close to it.
#[must_use]
pub fn normalize(deviations: &[Deviation]) -> Vec<NormalizedDeviation> {
    let mut by_user_idx: BTreeMap<usize, Deviation> = BTreeMap::new();
    for &dev in deviations {
        let candidate_badness = dev.pitch_cents.map_or(f64::INFINITY, f64::abs);
        by_user_idx
            .entry(dev.user_idx)
            .and_modify(|existing| {
                let existing_badness = existing.pitch_cents.map_or(f64::INFINITY, f64::abs);
                if candidate_badness < existing_badness {
                    *existing = dev;
                }
            })
            .or_insert(dev);
    }

    let deduped: Vec<Deviation> = by_user_idx.into_values().collect();
    let baseline = median(&deduped.iter().map(|d| d.raw_timing_offset_s).collect::<Vec<_>>());

    deduped
        .into_iter()
        .map(|deviation| NormalizedDeviation { deviation, timing_offset_s: deviation.raw_timing_offset_s - baseline })
        .collect()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 { (sorted[mid - 1] + sorted[mid]) / 2.0 } else { sorted[mid] }
}
