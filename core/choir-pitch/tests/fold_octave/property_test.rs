use choir_pitch::{Note12, cents_between, cents_between_folded, fold_octave};
use proptest::prelude::*;

proptest! {
    #[test]
    fn folded_cents_always_land_in_half_open_range(cents in -10_000.0f64..=10_000.0) {
        let folded = fold_octave(cents);
        prop_assert!(folded > -600.0 && folded <= 600.0);
    }

    #[test]
    fn folding_is_invariant_to_whole_octave_shifts(cents in -2_000.0f64..=2_000.0, octaves in -5i32..=5) {
        let shifted = cents + f64::from(octaves) * 1200.0;
        let lhs = fold_octave(cents);
        let rhs = fold_octave(shifted);
        prop_assert!((lhs - rhs).abs() <= 1e-6);
    }

    #[test]
    fn cents_between_a_frequency_and_itself_is_zero(hz in 20.0f64..=8_000.0) {
        prop_assert!(cents_between(hz, hz).abs() < 1e-9);
    }

    #[test]
    fn octave_multiples_fold_to_near_zero(hz in 20.0f64..=2_000.0, octaves in 1i32..=4) {
        let shifted = hz * 2f64.powi(octaves);
        let folded = cents_between_folded(shifted, hz);
        prop_assert!(folded.abs() < 1e-6);
    }

    #[test]
    fn note_naming_never_panics_across_the_audible_range(hz in 40.0f64..=4_000.0) {
        let note = Note12::from_hz(hz);
        prop_assert!(!note.label().is_empty());
    }
}
