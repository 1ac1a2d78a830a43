use std::sync::atomic::AtomicBool;
use std::time::Duration;

use forcebench_core::jog::{JogCfg, jog};
use forcebench_core::mocks::{RecordingActuator, ScriptedSensor};
use forcebench_core::probe::probe;
use forcebench_core::{AbortReason, Calibration, FaultFilter, TrackerError};
use forcebench_hardware::{RigParams, SimRig, TravelModel};
use forcebench_traits::{Direction, ManualClock};
use rstest::rstest;

fn rig() -> SimRig {
    SimRig::new(
        TravelModel::default(),
        RigParams {
            contact_mm: 50.0,
            stiffness: 10.0,
            preload: 1.0,
            counts_per_unit: 1.0,
        },
    )
}

fn jog_cfg(ceiling: f64) -> JogCfg {
    JogCfg {
        force_ceiling: ceiling,
        read_timeout: Duration::from_millis(5),
        ..JogCfg::default()
    }
}

#[test]
fn jog_moves_in_unit_steps() {
    let rig = rig();
    let mut act = rig.actuator();
    let mut sensor = rig.sensor();
    let report = jog(
        &mut sensor,
        &mut act,
        &Calibration::new(1.0),
        &mut FaultFilter::new(5, 1_000.0),
        3.5,
        Direction::Extend,
        &jog_cfg(1_000.0),
        None,
    )
    .unwrap();
    assert_eq!(report.steps, 4);
    assert_eq!(report.moved_mm, 3.5);
    assert_eq!(rig.position_mm(), 53.5);
}

#[test]
fn jog_backs_off_at_ceiling() {
    let rig = rig();
    let mut act = rig.actuator();
    let mut sensor = rig.sensor();
    // 1 + 10 * (pos - 50) reaches 41 after four steps.
    let err = jog(
        &mut sensor,
        &mut act,
        &Calibration::new(1.0),
        &mut FaultFilter::new(5, 1_000.0),
        20.0,
        Direction::Extend,
        &jog_cfg(40.0),
        None,
    )
    .unwrap_err();
    assert_eq!(
        err.downcast_ref::<TrackerError>(),
        Some(&TrackerError::Abort(AbortReason::MaxForce))
    );
    assert_eq!(rig.position_mm(), 44.0);
}

#[rstest]
#[case(0.0)]
#[case(-1.0)]
#[case(150.5)]
fn jog_rejects_out_of_range_distance(#[case] distance: f64) {
    let mut act = RecordingActuator::new();
    let mut sensor = ScriptedSensor::from_values([1.0]);
    let res = jog(
        &mut sensor,
        &mut act,
        &Calibration::new(1.0),
        &mut FaultFilter::new(5, 1_000.0),
        distance,
        Direction::Retract,
        &jog_cfg(100.0),
        None,
    );
    assert!(res.is_err());
    assert!(act.moves().is_empty());
}

#[test]
fn jog_stops_on_flag() {
    let mut act = RecordingActuator::new();
    let mut sensor = ScriptedSensor::from_values([1.0]);
    let stop = AtomicBool::new(true);
    let report = jog(
        &mut sensor,
        &mut act,
        &Calibration::new(1.0),
        &mut FaultFilter::new(5, 1_000.0),
        5.0,
        Direction::Extend,
        &jog_cfg(100.0),
        Some(&stop),
    )
    .unwrap();
    assert!(report.interrupted);
    assert!(act.moves().is_empty());
}

#[test]
fn jog_aborts_on_dead_sensor() {
    let mut act = RecordingActuator::new();
    let mut sensor = ScriptedSensor::from_values([0.0]);
    let err = jog(
        &mut sensor,
        &mut act,
        &Calibration::new(1.0),
        &mut FaultFilter::new(3, 1_000.0),
        5.0,
        Direction::Extend,
        &jog_cfg(100.0),
        None,
    )
    .unwrap_err();
    assert_eq!(
        err.downcast_ref::<TrackerError>(),
        Some(&TrackerError::Abort(AbortReason::SensorFailed))
    );
    assert!(act.moves().is_empty());
}

#[test]
fn probe_reports_min_max_mean() {
    let mut sensor = ScriptedSensor::from_values([10.0, 12.0, 0.0, 14.0]);
    let clock = ManualClock::new();
    let report = probe(
        &mut sensor,
        &Calibration::new(1.0),
        &mut FaultFilter::new(3, 100.0),
        4,
        Duration::from_millis(5),
        &clock,
    )
    .unwrap();
    // The zero is rejected; the last value repeats to fill the fourth slot.
    assert_eq!(report.samples, 4);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.min, 10.0);
    assert_eq!(report.max, 14.0);
    assert_eq!(report.mean, 12.5);
}

#[test]
fn probe_needs_samples() {
    let mut sensor = ScriptedSensor::from_values([1.0]);
    assert!(
        probe(
            &mut sensor,
            &Calibration::new(1.0),
            &mut FaultFilter::new(3, 100.0),
            0,
            Duration::from_millis(5),
            &ManualClock::new(),
        )
        .is_err()
    );
}
