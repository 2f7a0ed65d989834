//! Seconds-denominated time primitives shared by the onset detector, the
//! section scorer, and the problem finder — all three slide a window across
//! `[0, duration)` and need the same arithmetic and iteration.

#![forbid(unsafe_code)]

use core::ops::{Add, Sub};

/// Tolerance used when deciding whether one more window fits before the end
/// of a timeline; guards against floating-point step accumulation dropping a
/// window that should legitimately be the last one.
const WINDOW_FIT_EPSILON: f64 = 1e-9;

/// An absolute point in time, in seconds. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SecondsPoint(f64);

/// A duration, in seconds. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SecondsSpan(f64);

impl SecondsPoint {
    /// Construct a time point.
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is not finite or negative.
    #[must_use]
    pub fn new(seconds: f64) -> Self {
        assert!(seconds.is_finite() && seconds >= 0.0, "time point must be finite and non-negative");
        Self(seconds)
    }

    /// Zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Raw seconds value.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0
    }

    /// Absolute distance to another point, as a [`SecondsSpan`].
    #[must_use]
    pub fn distance_to(self, other: Self) -> SecondsSpan {
        SecondsSpan::new((self.0 - other.0).abs())
    }
}

impl SecondsSpan {
    /// Construct a span.
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is not finite or negative.
    #[must_use]
    pub fn new(seconds: f64) -> Self {
        assert!(seconds.is_finite() && seconds >= 0.0, "duration must be finite and non-negative");
        Self(seconds)
    }

    /// Zero-length span.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Raw seconds value.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0
    }
}

impl Add<SecondsSpan> for SecondsPoint {
    type Output = SecondsPoint;

    fn add(self, rhs: SecondsSpan) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

impl Sub for SecondsPoint {
    type Output = SecondsSpan;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(self.0 >= rhs.0, "time point subtraction cannot go negative");
        SecondsSpan::new(self.0 - rhs.0)
    }
}

impl Add for SecondsSpan {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

/// A half-open `[start, end)` window over a timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Window start, inclusive.
    pub start: SecondsPoint,
    /// Window end, exclusive.
    pub end: SecondsPoint,
}

impl Window {
    /// Width of the window.
    #[must_use]
    pub fn span(&self) -> SecondsSpan {
        self.end - self.start
    }

    /// Whether `t` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, t: SecondsPoint) -> bool {
        t.as_secs_f64() >= self.start.as_secs_f64() && t.as_secs_f64() < self.end.as_secs_f64()
    }

    /// Whether this window overlaps another in time (open intersection).
    #[must_use]
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start.as_secs_f64() < other.end.as_secs_f64()
            && self.end.as_secs_f64() > other.start.as_secs_f64()
    }
}

/// Iterator over fixed-width, fixed-step windows covering `[0, limit)`.
///
/// Used by the onset detector (1.0 s window / 0.25 s step over the first
/// `min(5s, duration)`), the problem finder (2 s window / 1 s step over the
/// full user timeline), and (via whole-second windows) the section scorer.
#[derive(Debug, Clone)]
pub struct SlidingWindows {
    next_start: f64,
    window: f64,
    step: f64,
    limit: f64,
}

/// Build a [`SlidingWindows`] iterator.
#[must_use]
pub fn windows(limit_s: f64, window_s: f64, step_s: f64) -> SlidingWindows {
    assert!(window_s > 0.0, "window width must be positive");
    assert!(step_s > 0.0, "step must be positive");
    SlidingWindows { next_start: 0.0, window: window_s, step: step_s, limit: limit_s.max(0.0) }
}

impl Iterator for SlidingWindows {
    type Item = Window;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start + self.window > self.limit + WINDOW_FIT_EPSILON {
            return None;
        }
        let start = SecondsPoint::new(self.next_start);
        let end = SecondsPoint::new(self.next_start + self.window);
        self.next_start += self.step;
        Some(Window { start, end })
    }
}
