use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use forcebench_core::{DutyCfg, DutyGovernor};
use forcebench_traits::ManualClock;

fn governor(clock: &ManualClock) -> DutyGovernor {
    DutyGovernor::new(
        &DutyCfg {
            window_ms: 20_000,
            rest_fraction: 0.5,
        },
        Arc::new(clock.clone()),
    )
}

#[test]
fn no_rest_inside_the_window() {
    let clock = ManualClock::new();
    let mut gov = governor(&clock);
    clock.advance(Duration::from_secs(19));
    assert_eq!(gov.on_segment_complete(), None);
    assert_eq!(clock.total_slept(), Duration::ZERO);
    assert_eq!(gov.window_elapsed(), Duration::from_secs(19));
}

#[test]
fn full_window_forces_rest_and_resets() {
    let clock = ManualClock::new();
    let mut gov = governor(&clock);
    clock.advance(Duration::from_secs(20));
    assert_eq!(gov.on_segment_complete(), Some(Duration::from_secs(10)));
    assert_eq!(clock.total_slept(), Duration::from_secs(10));
    // Window restarts after the rest, not before it.
    assert_eq!(gov.window_elapsed(), Duration::ZERO);

    clock.advance(Duration::from_secs(5));
    assert_eq!(gov.on_segment_complete(), None);
}

#[test]
fn stop_flag_interrupts_the_rest() {
    let clock = ManualClock::new();
    let stop = Arc::new(AtomicBool::new(true));
    let mut gov = governor(&clock).with_stop_flag(stop);
    clock.advance(Duration::from_secs(30));
    assert_eq!(gov.on_segment_complete(), Some(Duration::ZERO));
    assert_eq!(gov.window_elapsed(), Duration::ZERO);
}

#[test]
fn zero_fraction_means_no_pause() {
    let clock = ManualClock::new();
    let mut gov = DutyGovernor::new(
        &DutyCfg {
            window_ms: 1_000,
            rest_fraction: 0.0,
        },
        Arc::new(clock.clone()),
    );
    clock.advance(Duration::from_secs(2));
    assert_eq!(gov.rest_duration(), Duration::ZERO);
    assert_eq!(gov.on_segment_complete(), Some(Duration::ZERO));
}
