use forcebench_core::handoff::Reading;
use forcebench_core::{FaultFilter, Verdict};
use proptest::prelude::*;
use rstest::rstest;

proptest! {
    /// With no zeros, every value passes through untouched.
    #[test]
    fn fault_free_stream_publishes_exact_values(
        start in 1.0f64..500.0,
        steps in proptest::collection::vec(-5.0f64..5.0, 1..200),
    ) {
        let mut f = FaultFilter::new(3, 10.0);
        let mut v = start;
        prop_assert_eq!(f.accept(v).reading(), Some(Reading::Force(v)));
        for d in steps {
            let next = v + d;
            prop_assume!(next != 0.0);
            v = next;
            prop_assert_eq!(f.accept(v).reading(), Some(Reading::Force(v)));
        }
        prop_assert_eq!(f.fault_count(), 0);
    }

    /// Fewer than E zeros never propagate zero; the last good value is republished.
    #[test]
    fn short_zero_bursts_republish_last_good(
        threshold in 1u32..10,
        good in 1.0f64..900.0,
        k_frac in 0.0f64..1.0,
    ) {
        let k = ((f64::from(threshold) - 1.0) * k_frac).round() as u32;
        let mut f = FaultFilter::new(threshold, 50.0);
        f.accept(good);
        for _ in 0..k {
            prop_assert_eq!(f.accept(0.0).reading(), Some(Reading::Force(good)));
        }
        prop_assert_eq!(f.accept(good + 1.0), Verdict::Accepted(good + 1.0));
    }
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(8)]
fn exhausted_budget_fails_exactly_once(#[case] threshold: u32) {
    let mut f = FaultFilter::new(threshold, 50.0);
    f.accept(42.0);
    for _ in 0..threshold {
        assert_eq!(f.accept(0.0), Verdict::Rejected(Some(42.0)));
    }
    assert_eq!(f.accept(0.0).reading(), Some(Reading::SensorFailed));
    assert!(f.is_failed());
    // A good value afterwards does not revive the sensor.
    assert_eq!(f.accept(42.0), Verdict::Failed);
}

#[test]
fn sustained_step_change_is_published_unchanged() {
    let mut f = FaultFilter::new(3, 200.0);
    f.accept(100.0);
    for _ in 0..5 {
        assert_eq!(f.accept(400.0), Verdict::Accepted(400.0));
    }
    assert_eq!(f.fault_count(), 0);
    assert!(!f.is_failed());
}

#[test]
fn jump_after_zeros_still_recovers() {
    let mut f = FaultFilter::new(2, 10.0);
    f.accept(100.0);
    assert_eq!(f.accept(0.0), Verdict::Rejected(Some(100.0)));
    assert_eq!(f.accept(500.0), Verdict::Accepted(500.0));
    assert_eq!(f.fault_count(), 0);
}

#[test]
fn a_good_value_resets_the_count() {
    let mut f = FaultFilter::new(2, 10.0);
    f.accept(100.0);
    f.accept(0.0);
    f.accept(0.0);
    assert_eq!(f.fault_count(), 2);
    // Count already at E: rule 3 fires before the value is considered.
    assert_eq!(f.accept(100.0), Verdict::Failed);

    let mut g = FaultFilter::new(2, 10.0);
    g.accept(100.0);
    g.accept(0.0);
    assert_eq!(g.accept(99.0), Verdict::Accepted(99.0));
    assert_eq!(g.fault_count(), 0);
}
