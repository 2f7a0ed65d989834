//! Cents arithmetic, octave folding, and solfège note naming on a 12-tone
//! equal-tempered grid (A4 = 440 Hz, MIDI 69).
//!
//! This crate is pure math: no I/O, no knowledge of frames or time. It backs
//! the pitch deviation computer, the onset detector's pitch-range check, and
//! the note extractor/pairer, all of which need the same cents and
//! note-naming logic.

#![forbid(unsafe_code)]

use core::fmt;

/// Reference tuning: A4 = 440 Hz is MIDI note 69.
const A4_HZ: f64 = 440.0;
const A4_MIDI: f64 = 69.0;
const STEPS_PER_OCTAVE: i32 = 12;

/// Cents between two frequencies: `1200 * log2(a_hz / b_hz)`.
///
/// Positive when `a_hz` is sharper than `b_hz`. Callers are responsible for
/// filtering unvoiced/non-positive frequencies before calling this.
#[must_use]
pub fn cents_between(a_hz: f64, b_hz: f64) -> f64 {
    1200.0 * (a_hz / b_hz).log2()
}

/// Fold a cents value into `(-600, +600]`, collapsing octave-ambiguous
/// pitch-tracker errors (and singers who enter an octave off) onto the same
/// scale as a true unison.
#[must_use]
pub fn fold_octave(cents: f64) -> f64 {
    let wrapped = (cents + 600.0).rem_euclid(1200.0) - 600.0;
    if wrapped <= -600.0 { wrapped + 1200.0 } else { wrapped }
}

/// Cents between two frequencies, folded into `(-600, +600]`.
#[must_use]
pub fn cents_between_folded(a_hz: f64, b_hz: f64) -> f64 {
    fold_octave(cents_between(a_hz, b_hz))
}

/// Solfège pitch-class name, sharps only (no flats), per `spec.md` §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    /// C
    Do,
    /// C#
    DoSharp,
    /// D
    Re,
    /// D#
    ReSharp,
    /// E
    Mi,
    /// F
    Fa,
    /// F#
    FaSharp,
    /// G
    Sol,
    /// G#
    SolSharp,
    /// A
    La,
    /// A#
    LaSharp,
    /// B
    Si,
}

impl NoteName {
    const ORDER: [NoteName; 12] = [
        NoteName::Do,
        NoteName::DoSharp,
        NoteName::Re,
        NoteName::ReSharp,
        NoteName::Mi,
        NoteName::Fa,
        NoteName::FaSharp,
        NoteName::Sol,
        NoteName::SolSharp,
        NoteName::La,
        NoteName::LaSharp,
        NoteName::Si,
    ];

    /// Pitch-class index 0 (Do) through 11 (Si).
    #[must_use]
    pub fn index(self) -> u8 {
        Self::ORDER.iter().position(|&n| n == self).expect("ORDER covers all variants") as u8
    }

    /// Build a pitch class from a semitone index, wrapping modulo 12.
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        Self::ORDER[index.rem_euclid(STEPS_PER_OCTAVE) as usize]
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoteName::Do => "Do",
            NoteName::DoSharp => "Do#",
            NoteName::Re => "Re",
            NoteName::ReSharp => "Re#",
            NoteName::Mi => "Mi",
            NoteName::Fa => "Fa",
            NoteName::FaSharp => "Fa#",
            NoteName::Sol => "Sol",
            NoteName::SolSharp => "Sol#",
            NoteName::La => "La",
            NoteName::LaSharp => "La#",
            NoteName::Si => "Si",
        };
        f.write_str(label)
    }
}

/// An absolute pitch on the 12-TET grid: a solfège name plus octave.
///
/// MIDI 69 (A4 = 440 Hz) is `Note12 { name: La, octave: 4 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note12 {
    /// Pitch-class name.
    pub name: NoteName,
    /// Octave number (scientific pitch notation; A4 = 440 Hz).
    pub octave: i32,
}

impl Note12 {
    /// Nearest `Note12` to a frequency in Hz.
    ///
    /// # Panics
    ///
    /// Panics if `hz` is not finite and positive; callers must filter
    /// unvoiced/non-positive frames before calling this.
    #[must_use]
    pub fn from_hz(hz: f64) -> Self {
        assert!(hz.is_finite() && hz > 0.0, "note naming requires a finite positive frequency");
        let midi = (A4_MIDI + 12.0 * (hz / A4_HZ).log2()).round() as i32;
        let octave = midi.div_euclid(STEPS_PER_OCTAVE) - 1;
        let name = NoteName::from_index(midi);
        Self { name, octave }
    }

    /// Display label such as `"La4"`, matching `spec.md` §6.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.name, self.octave)
    }

    /// `true` when both notes share a pitch class, regardless of octave.
    #[must_use]
    pub fn same_pitch_class(self, other: Self) -> bool {
        self.name == other.name
    }

    /// Signed octave gap (`self.octave - other.octave`).
    #[must_use]
    pub fn octave_diff(self, other: Self) -> i32 {
        self.octave - other.octave
    }
}

impl fmt::Display for Note12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
