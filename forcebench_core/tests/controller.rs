use std::sync::Arc;
use std::time::Duration;

use forcebench_core::controller::direction_toward;
use forcebench_core::mocks::RecordingActuator;
use forcebench_core::{
    AbortReason, ControlCfg, ControlStatus, ControllerBuilder, DutyCfg, ForceController, LimitKind,
    Reading, TrackerError,
};
use forcebench_hardware::{RigParams, SimActuator, SimRig, TravelModel};
use forcebench_traits::{Direction, ManualClock};
use proptest::prelude::*;
use rstest::rstest;

fn control(ceiling: f64, max_segment_mm: f64) -> ControlCfg {
    ControlCfg {
        force_ceiling: ceiling,
        step_size_mm: 1.0,
        max_segment_mm,
        max_travel_mm: 150.0,
        start_pos_mm: 50.0,
        settle_ms: 0,
    }
}

fn recording(setpoints: Vec<i32>, cfg: ControlCfg) -> (ForceController<RecordingActuator>, RecordingActuator) {
    let act = RecordingActuator::new();
    let ctl = ControllerBuilder::new()
        .with_actuator(act.clone())
        .with_setpoints(setpoints)
        .with_control(cfg)
        .with_clock(Arc::new(ManualClock::new()))
        .build()
        .unwrap();
    (ctl, act)
}

/// Spring rig reading exactly 0 at the start position, 1 unit per mm.
fn linear_rig() -> SimRig {
    SimRig::new(
        TravelModel::default(),
        RigParams {
            contact_mm: 50.0,
            stiffness: 1.0,
            preload: 0.0,
            counts_per_unit: 1.0,
        },
    )
}

#[test]
fn scenario_50_then_10() {
    let rig = linear_rig();
    let mut ctl = ControllerBuilder::new()
        .with_actuator(rig.actuator())
        .with_setpoints(vec![50, 10])
        .with_control(control(1000.0, 100.0))
        .with_clock(Arc::new(ManualClock::new()))
        .build()
        .unwrap();

    let mut extends = 0;
    let mut retracts = 0;
    let mut advanced = Vec::new();
    for _ in 0..500 {
        match ctl.step(Some(Reading::Force(rig.force()))).unwrap() {
            ControlStatus::Moved(Direction::Extend) => extends += 1,
            ControlStatus::Moved(Direction::Retract) => retracts += 1,
            ControlStatus::Advanced { reached, direction, .. } => {
                advanced.push((reached, direction, rig.force()));
                if advanced.len() == 2 {
                    break;
                }
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    assert_eq!(extends, 50);
    assert_eq!(advanced[0], (50, Direction::Retract, 50.0));
    // Equality keeps retracting, so the rig ends just below 10.
    assert_eq!(advanced[1].0, 10);
    assert_eq!(advanced[1].1, Direction::Extend);
    assert!(advanced[1].2 <= 10.0);
    assert_eq!(retracts, 41);
}

#[test]
fn ceiling_reading_aborts_without_moving() {
    let (mut ctl, act) = recording(vec![50], control(100.0, 20.0));
    assert!(matches!(
        ctl.step(Some(Reading::Force(20.0))).unwrap(),
        ControlStatus::Moved(Direction::Extend)
    ));
    match ctl.step(Some(Reading::Force(150.0))).unwrap() {
        ControlStatus::Aborted(TrackerError::Abort(AbortReason::MaxForce)) => {}
        other => panic!("expected MaxForce abort, got {other:?}"),
    }
    assert_eq!(act.moves().len(), 1);
}

#[test]
fn exactly_at_ceiling_is_an_abort() {
    let (mut ctl, act) = recording(vec![50], control(100.0, 20.0));
    assert!(matches!(
        ctl.step(Some(Reading::Force(100.0))).unwrap(),
        ControlStatus::Aborted(TrackerError::Abort(AbortReason::MaxForce))
    ));
    assert!(act.moves().is_empty());
}

#[test]
fn sensor_failed_sentinel_aborts() {
    let (mut ctl, _act) = recording(vec![50], control(100.0, 20.0));
    ctl.step(Some(Reading::Force(10.0))).unwrap();
    assert!(matches!(
        ctl.step(Some(Reading::SensorFailed)).unwrap(),
        ControlStatus::Aborted(TrackerError::Abort(AbortReason::SensorFailed))
    ));
}

#[test]
fn waits_until_first_measurement() {
    let (mut ctl, act) = recording(vec![50], control(100.0, 20.0));
    assert!(matches!(ctl.step(None).unwrap(), ControlStatus::Waiting));
    assert!(act.moves().is_empty());
}

#[test]
fn stale_reading_is_reused() {
    let (mut ctl, act) = recording(vec![50], control(100.0, 20.0));
    ctl.step(Some(Reading::Force(10.0))).unwrap();
    assert!(matches!(ctl.step(None).unwrap(), ControlStatus::Moved(Direction::Extend)));
    assert_eq!(act.moves().len(), 2);
    assert_eq!(ctl.last_measurement(), Some(10.0));
}

#[rstest]
#[case(50, 50.0, Direction::Retract)]
#[case(51, 50.0, Direction::Extend)]
#[case(10, 50.0, Direction::Retract)]
fn direction_tie_break(#[case] setpoint: i32, #[case] measurement: f64, #[case] expected: Direction) {
    assert_eq!(direction_toward(setpoint, measurement), expected);
}

#[test]
fn equality_satisfies_an_extending_setpoint() {
    let (mut ctl, act) = recording(vec![30, 70], control(100.0, 20.0));
    ctl.step(Some(Reading::Force(10.0))).unwrap();
    match ctl.step(Some(Reading::Force(30.0))).unwrap() {
        ControlStatus::Advanced { reached, setpoint, direction, .. } => {
            assert_eq!((reached, setpoint, direction), (30, 70, Direction::Extend));
        }
        other => panic!("expected advance, got {other:?}"),
    }
    assert_eq!(act.moves().len(), 1);
}

#[test]
fn first_reading_after_advance_sets_direction() {
    let (mut ctl, act) = recording(vec![50, 10], control(100.0, 20.0));
    assert!(matches!(
        ctl.step(Some(Reading::Force(0.0))).unwrap(),
        ControlStatus::Moved(Direction::Extend)
    ));
    match ctl.step(Some(Reading::Force(60.0))).unwrap() {
        ControlStatus::Advanced { setpoint, direction, .. } => {
            assert_eq!((setpoint, direction), (10, Direction::Retract));
        }
        other => panic!("expected advance, got {other:?}"),
    }
    // The load relaxed below 10 while settling: extend rather than skip 10.
    assert!(matches!(
        ctl.step(Some(Reading::Force(5.0))).unwrap(),
        ControlStatus::Moved(Direction::Extend)
    ));
    assert_eq!(ctl.setpoint(), 10);
    assert_eq!(act.moves().len(), 2);
}

#[test]
fn segment_limit_holds_and_is_not_fatal() {
    let (mut ctl, act) = recording(vec![50, 10], control(100.0, 3.0));
    for _ in 0..3 {
        assert!(matches!(
            ctl.step(Some(Reading::Force(0.5))).unwrap(),
            ControlStatus::Moved(Direction::Extend)
        ));
    }
    for _ in 0..5 {
        assert!(matches!(
            ctl.step(None).unwrap(),
            ControlStatus::Holding(LimitKind::Segment)
        ));
    }
    assert_eq!(act.moves().len(), 3);
    // The force finally reaches the setpoint: advance, segment resets.
    assert!(matches!(
        ctl.step(Some(Reading::Force(55.0))).unwrap(),
        ControlStatus::Advanced { .. }
    ));
    assert_eq!(ctl.segment_mm(), 0.0);
    assert!(matches!(
        ctl.step(None).unwrap(),
        ControlStatus::Moved(Direction::Retract)
    ));
}

#[test]
fn travel_limit_holds_at_end_of_stroke() {
    let mut cfg = control(1000.0, 100.0);
    cfg.start_pos_mm = 148.0;
    let (mut ctl, act) = recording(vec![500], cfg);
    ctl.step(Some(Reading::Force(1.0))).unwrap();
    ctl.step(None).unwrap();
    assert!(matches!(
        ctl.step(None).unwrap(),
        ControlStatus::Holding(LimitKind::Travel)
    ));
    assert_eq!(act.moves().len(), 2);
    assert_eq!(ctl.position_mm(), 150.0);
}

#[test]
fn actuator_fault_is_fatal() {
    let act = RecordingActuator::new().failing_after(1);
    let mut ctl = ControllerBuilder::new()
        .with_actuator(act.clone())
        .with_setpoints(vec![50])
        .with_control(control(100.0, 20.0))
        .build()
        .unwrap();
    ctl.step(Some(Reading::Force(1.0))).unwrap();
    let err = ctl.step(None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::Actuator(_))
    ));
    assert_eq!(act.moves().len(), 1);
}

#[test]
fn duty_rest_is_reported_on_advance() {
    let clock = ManualClock::new();
    let (act, mut ctl) = {
        let act = RecordingActuator::new();
        let ctl = ControllerBuilder::new()
            .with_actuator(act.clone())
            .with_setpoints(vec![20, 5])
            .with_control(control(100.0, 20.0))
            .with_duty(DutyCfg {
                window_ms: 20_000,
                rest_fraction: 0.5,
            })
            .with_clock(Arc::new(clock.clone()))
            .build()
            .unwrap();
        (act, ctl)
    };
    ctl.step(Some(Reading::Force(10.0))).unwrap();
    clock.advance(Duration::from_secs(21));
    match ctl.step(Some(Reading::Force(25.0))).unwrap() {
        ControlStatus::Advanced { rest, .. } => assert_eq!(rest, Some(Duration::from_secs(10))),
        other => panic!("expected advance, got {other:?}"),
    }
    assert_eq!(clock.total_slept(), Duration::from_secs(10));
    assert_eq!(ctl.governor().window_elapsed(), Duration::ZERO);
    assert_eq!(act.moves().len(), 1);
}

proptest! {
    #[test]
    fn steps_are_bounded_and_segments_monotone(
        setpoints in proptest::collection::vec(1i32..90, 1..5),
        readings in proptest::collection::vec(proptest::option::of(0.5f64..95.0), 1..300),
        step in 0.25f64..3.0,
    ) {
        let act = RecordingActuator::new();
        let mut ctl = ControllerBuilder::new()
            .with_actuator(act.clone())
            .with_setpoints(setpoints)
            .with_control(ControlCfg {
                force_ceiling: 100.0,
                step_size_mm: step,
                max_segment_mm: 10.0,
                max_travel_mm: 150.0,
                start_pos_mm: 50.0,
                settle_ms: 0,
            })
            .with_clock(Arc::new(ManualClock::new()))
            .build()
            .unwrap();

        for r in readings {
            let before = ctl.segment_mm();
            let measurement = r.or(ctl.last_measurement());
            match ctl.step(r.map(Reading::Force)).unwrap() {
                ControlStatus::Moved(Direction::Extend) => prop_assert!(ctl.segment_mm() > before),
                ControlStatus::Moved(Direction::Retract) => prop_assert!(ctl.segment_mm() < before),
                ControlStatus::Holding(_) | ControlStatus::Waiting => {
                    prop_assert_eq!(ctl.segment_mm(), before)
                }
                ControlStatus::Advanced { setpoint, direction, .. } => {
                    prop_assert_eq!(ctl.segment_mm(), 0.0);
                    let m = measurement.unwrap_or_default();
                    prop_assert_eq!(direction, direction_toward(setpoint, m));
                }
                ControlStatus::Aborted(e) => prop_assert!(false, "unexpected abort {e}"),
            }
            // The limit is checked before a step, so one step may cross it.
            prop_assert!(ctl.segment_mm().abs() < 10.0 + step + 1e-9);
        }
        for (d, _) in act.moves() {
            prop_assert!(d <= step);
        }
    }
}

#[test]
fn sim_actuator_type_is_accepted() {
    let rig = linear_rig();
    let ctl: ForceController<SimActuator> = ControllerBuilder::new()
        .with_actuator(rig.actuator())
        .with_setpoints(vec![1])
        .build()
        .unwrap();
    assert_eq!(ctl.position_mm(), 50.0);
}
