use choir_time::windows;
use proptest::prelude::*;

fn strictly_increasing_starts(all: &[choir_time::Window]) -> bool {
    all.windows(2).all(|pair| pair[1].start.as_secs_f64() - pair[0].start.as_secs_f64() > -1e-9)
}

proptest! {
    #[test]
    fn window_starts_are_monotonic_and_evenly_spaced(
        limit in 0.0f64..=120.0,
        window_s in 0.05f64..=5.0,
        step_s in 0.05f64..=5.0,
    ) {
        let all: Vec<_> = windows(limit, window_s, step_s).collect();
        prop_assert!(strictly_increasing_starts(&all));
        for pair in all.windows(2) {
            let gap = pair[1].start.as_secs_f64() - pair[0].start.as_secs_f64();
            prop_assert!((gap - step_s).abs() <= 1e-6 * (1.0 + step_s));
        }
    }

    #[test]
    fn every_window_fits_within_the_limit(
        limit in 0.0f64..=120.0,
        window_s in 0.05f64..=5.0,
        step_s in 0.05f64..=5.0,
    ) {
        let all: Vec<_> = windows(limit, window_s, step_s).collect();
        for w in &all {
            prop_assert!(w.end.as_secs_f64() <= limit + 1e-9);
            prop_assert!((w.span().as_secs_f64() - window_s).abs() <= 1e-9 * (1.0 + window_s));
        }
    }

    #[test]
    fn zero_limit_never_yields_a_window(window_s in 0.05f64..=5.0, step_s in 0.05f64..=5.0) {
        let all: Vec<_> = windows(0.0, window_s, step_s).collect();
        prop_assert!(all.is_empty());
    }
}
