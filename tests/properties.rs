//! Property-based tests for bracket matching and delta calibration

use isodelta::bracket::match_brackets;
use isodelta::delta::{calibrate, BracketAverage};
use isodelta::records::{RatioRecord, RatioTable};
use isodelta::standards::ReferenceStandard;
use proptest::prelude::*;
use std::collections::HashSet;

/// Build a single-series table from a run order of roles (true = reference)
fn series(roles: &[bool]) -> RatioTable {
    let records = roles
        .iter()
        .enumerate()
        .map(|(i, &is_reference)| {
            let injection = i as u32 + 1;
            if is_reference {
                RatioRecord::reference(injection, "18O", 0.00602, 0.00002)
            } else {
                RatioRecord::sample(injection, "18O", 0.00650, 0.00003)
            }
        })
        .collect();
    RatioTable::new(records).unwrap()
}

fn positive() -> impl Strategy<Value = f64> {
    1e-6f64..1.0
}

proptest! {
    /// A sample is matched exactly when both adjacent injections are references
    #[test]
    fn test_bracket_completeness(roles in prop::collection::vec(any::<bool>(), 0..60)) {
        let table = series(&roles);
        let outcome = match_brackets(&table).unwrap();

        let references: HashSet<u32> = table
            .iter()
            .filter(|r| r.is_reference())
            .map(|r| r.injection)
            .collect();
        let expected: Vec<u32> = table
            .iter()
            .filter(|r| !r.is_reference())
            .map(|r| r.injection)
            .filter(|&i| i > 0 && references.contains(&(i - 1)) && references.contains(&(i + 1)))
            .collect();

        let matched: Vec<u32> = outcome.matches.iter().map(|m| m.sample.injection).collect();
        prop_assert_eq!(&matched, &expected);
        prop_assert_eq!(outcome.sample_count(), table.sample_count());

        for m in &outcome.matches {
            prop_assert!(m.before.is_reference() && m.after.is_reference());
            prop_assert_eq!(m.before.injection + 1, m.sample.injection);
            prop_assert_eq!(m.after.injection, m.sample.injection + 1);
        }
    }

    /// Swapping the bracketing references leaves the reference value unchanged
    #[test]
    fn test_bracket_average_symmetry(
        rb in positive(), sb in 0.0f64..0.01,
        ra in positive(), sa in 0.0f64..0.01,
    ) {
        let forward = BracketAverage::new(rb, sb, ra, sa);
        let backward = BracketAverage::new(ra, sa, rb, sb);
        prop_assert_eq!(forward, backward);
    }

    /// Scaling every ratio and its error by one factor leaves delta and its
    /// uncertainty unchanged
    #[test]
    fn test_uncertainty_scaling(
        ratio in positive(),
        reference in positive(),
        rel_sem in 0.0f64..0.01,
        factor in 0.01f64..100.0,
        delta_known in -500.0f64..500.0,
    ) {
        let standard = ReferenceStandard::new("18O", delta_known);
        let base = calibrate(
            1, "18O",
            ratio, ratio * rel_sem,
            BracketAverage::new(reference, reference * rel_sem, reference, reference * rel_sem),
            &standard,
        ).unwrap();
        let scaled = calibrate(
            1, "18O",
            ratio * factor, ratio * factor * rel_sem,
            BracketAverage::new(
                reference * factor, reference * factor * rel_sem,
                reference * factor, reference * factor * rel_sem,
            ),
            &standard,
        ).unwrap();

        let tolerance = 1e-9 * (1.0 + base.delta.abs() + 1000.0);
        prop_assert!((base.delta - scaled.delta).abs() < tolerance);
        prop_assert!((base.delta_sem - scaled.delta_sem).abs() < tolerance);
    }

    /// Doubling both sample errors doubles the propagated delta error
    #[test]
    fn test_uncertainty_linear_in_errors(
        ratio in positive(),
        reference in positive(),
        sem in 1e-9f64..1e-3,
    ) {
        let standard = ReferenceStandard::new("18O", 57.5);
        let single = calibrate(
            1, "18O", ratio, sem,
            BracketAverage::new(reference, sem, reference, sem),
            &standard,
        ).unwrap();
        let double = calibrate(
            1, "18O", ratio, 2.0 * sem,
            BracketAverage::new(reference, 2.0 * sem, reference, 2.0 * sem),
            &standard,
        ).unwrap();

        prop_assert!((double.delta_sem - 2.0 * single.delta_sem).abs() <= 1e-9 * double.delta_sem.max(1.0));
        prop_assert_eq!(single.delta, double.delta);
    }

    /// A sample identical to its references reproduces the known delta
    #[test]
    fn test_delta_identity(reference in positive(), delta_known in -900.0f64..4000.0) {
        let standard = ReferenceStandard::new("18O", delta_known);
        let calibrated = calibrate(
            1, "18O", reference, 0.0,
            BracketAverage::new(reference, 0.0, reference, 0.0),
            &standard,
        ).unwrap();
        prop_assert!((calibrated.delta - delta_known).abs() < 1e-9 * (1.0 + delta_known.abs()));
    }
}
