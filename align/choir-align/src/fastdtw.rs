//! Multi-resolution FastDTW (`spec.md` §4.3): near-linear-time approximate
//! DTW via coarsen → project → windowed-refine, after Salvador & Chan.
//!
//! Recursion bottoms out at `min_time_size = radius + 2`, where a full
//! windowed DTW is cheap enough to run directly. Each level up halves the
//! sequence (pairwise-averaging adjacent frames), recurses, then projects the
//! coarse path back to double resolution and expands it by `radius` frames in
//! every direction before running a windowed DTW at that resolution.

use crate::builder::DtwFrame;
use std::collections::HashMap;

/// One matched `(user_idx, ref_idx)` pair, in the original (un-coarsened)
/// index space of both sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPair {
    /// Index into the user sequence.
    pub user_idx: usize,
    /// Index into the reference sequence.
    pub ref_idx: usize,
}

/// Result of aligning two weighted DTW sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct DtwResult {
    /// Monotonic alignment path, in ascending `(user_idx, ref_idx)` order.
    pub path: Vec<PathPair>,
    /// Total accumulated distance along the path.
    pub distance: f64,
}

/// Radius (in coarse-level frames) of the search band around a projected
/// coarse-resolution path. `spec.md` §4.3 fixes this at 50.
pub const RADIUS: usize = 50;

/// Align `user` against `reference` with FastDTW at the given `radius`.
///
/// Returns an empty path and zero distance if either sequence is empty.
#[must_use]
pub fn fastdtw(user: &[DtwFrame], reference: &[DtwFrame], radius: usize) -> DtwResult {
    if user.is_empty() || reference.is_empty() {
        return DtwResult { path: vec![], distance: 0.0 };
    }

    let min_time_size = radius + 2;
    if user.len() <= min_time_size || reference.len() <= min_time_size {
        return windowed_dtw(user, reference, &full_window(user.len(), reference.len()));
    }

    let coarse_user = reduce_by_half(user);
    let coarse_reference = reduce_by_half(reference);
    let coarse = fastdtw(&coarse_user, &coarse_reference, radius);

    let window = expand_window(&coarse.path, user.len(), reference.len(), radius);
    windowed_dtw(user, reference, &window)
}

/// Pairwise-average adjacent frames, dropping a trailing unpaired frame.
fn reduce_by_half(sequence: &[DtwFrame]) -> Vec<DtwFrame> {
    sequence
        .chunks(2)
        .filter(|chunk| chunk.len() == 2)
        .map(|chunk| averaged(&chunk[0], &chunk[1]))
        .collect()
}

fn averaged(a: &DtwFrame, b: &DtwFrame) -> DtwFrame {
    // Distances only ever compare averaged frames to other averaged frames
    // within the same coarsening level, so the midpoint timestamp is never
    // observed outside bookkeeping and an arithmetic mean is adequate.
    let mut components = [0.0; 3];
    for i in 0..3 {
        components[i] = (a.components[i] + b.components[i]) / 2.0;
    }
    DtwFrame { time_s: (a.time_s + b.time_s) / 2.0, components }
}

/// Cells reachable at this resolution, keyed by user index, each mapping to
/// the set of reference indices in the search band.
type Window = HashMap<usize, Vec<usize>>;

fn full_window(user_len: usize, ref_len: usize) -> Window {
    let mut window = Window::with_capacity(user_len);
    let all_ref: Vec<usize> = (0..ref_len).collect();
    for u in 0..user_len {
        window.insert(u, all_ref.clone());
    }
    window
}

/// Project a coarse-resolution path to full resolution and expand it by
/// `radius` coarse cells in every direction.
fn expand_window(coarse_path: &[PathPair], user_len: usize, ref_len: usize, radius: usize) -> Window {
    let mut coarse_cells: std::collections::BTreeSet<(usize, usize)> = std::collections::BTreeSet::new();
    for pair in coarse_path {
        for du in -(radius as isize)..=(radius as isize) {
            for dv in -(radius as isize)..=(radius as isize) {
                let u = pair.user_idx as isize + du;
                let v = pair.ref_idx as isize + dv;
                if u >= 0 && v >= 0 {
                    coarse_cells.insert((u as usize, v as usize));
                }
            }
        }
    }

    let mut window = Window::new();
    for &(cu, cv) in &coarse_cells {
        for du in 0..2 {
            for dv in 0..2 {
                let u = cu * 2 + du;
                let v = cv * 2 + dv;
                if u < user_len && v < ref_len {
                    window.entry(u).or_default().push(v);
                }
            }
        }
    }
    for refs in window.values_mut() {
        refs.sort_unstable();
        refs.dedup();
    }
    window
}

/// Sparse windowed DTW: only `(u, v)` cells present in `window` are scored.
fn windowed_dtw(user: &[DtwFrame], reference: &[DtwFrame], window: &Window) -> DtwResult {
    let mut cost: HashMap<(usize, usize), f64> = HashMap::new();
    let mut back: HashMap<(usize, usize), (usize, usize)> = HashMap::new();

    let mut cells: Vec<(usize, usize)> =
        window.iter().flat_map(|(&u, refs)| refs.iter().map(move |&v| (u, v))).collect();
    cells.sort_unstable();

    for &(u, v) in &cells {
        let d = user[u].distance(&reference[v]);
        let candidates = [
            u.checked_sub(1).zip(v.checked_sub(1)),
            u.checked_sub(1).map(|pu| (pu, v)),
            v.checked_sub(1).map(|pv| (u, pv)),
        ];

        let mut best: Option<((usize, usize), f64)> = None;
        for candidate in candidates.into_iter().flatten() {
            let Some(&prev_cost) = cost.get(&candidate) else { continue };
            if best.is_none_or(|(_, bc)| prev_cost < bc) {
                best = Some((candidate, prev_cost));
            }
        }

        let total = d + best.map_or(0.0, |(_, prev_cost)| prev_cost);
        cost.insert((u, v), total);
        if let Some((prev, _)) = best {
            back.insert((u, v), prev);
        }
    }

    let end = (user.len() - 1, reference.len() - 1);
    let distance = *cost.get(&end).unwrap_or(&0.0);

    let mut path = vec![];
    let mut cursor = Some(end);
    while let Some(cell) = cursor {
        path.push(PathPair { user_idx: cell.0, ref_idx: cell.1 });
        cursor = back.get(&cell).copied();
    }
    path.reverse();

    DtwResult { path, distance }
}
