//! Manual positioning with a force guard.
//!
//! Moves the actuator in unit steps, reading the load cell directly before
//! each step. If the force reaches the ceiling, the actuator backs off and
//! the jog aborts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use forcebench_traits::{ActuatorDriver, Direction, ForceSensor};

use crate::calibration::Calibration;
use crate::error::{AbortReason, BuildError, Report, Result, TrackerError};
use crate::fault_filter::{FaultFilter, Verdict};
use crate::hw_error::map_actuator_error;
use crate::sampler::sample_once;

#[derive(Debug, Clone)]
pub struct JogCfg {
    pub step_mm: f64,
    /// Retract distance after the ceiling is hit.
    pub backoff_mm: f64,
    pub max_travel_mm: f64,
    pub force_ceiling: f64,
    pub read_timeout: Duration,
}

impl Default for JogCfg {
    fn default() -> Self {
        Self {
            step_mm: 1.0,
            backoff_mm: 10.0,
            max_travel_mm: 150.0,
            force_ceiling: 1000.0,
            read_timeout: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JogReport {
    pub moved_mm: f64,
    pub steps: u32,
    pub last_force: Option<f64>,
    /// The stop flag ended the jog early.
    pub interrupted: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn jog<S, A>(
    sensor: &mut S,
    actuator: &mut A,
    calibration: &Calibration,
    filter: &mut FaultFilter,
    distance_mm: f64,
    direction: Direction,
    cfg: &JogCfg,
    stop: Option<&AtomicBool>,
) -> Result<JogReport>
where
    S: ForceSensor + ?Sized,
    A: ActuatorDriver + ?Sized,
{
    if !(distance_mm > 0.0 && distance_mm <= cfg.max_travel_mm) {
        return Err(Report::new(BuildError::InvalidConfig(
            "jog distance must be in (0, max_travel_mm]",
        )));
    }
    tracing::info!(distance_mm, %direction, "jog start");

    let mut report = JogReport {
        moved_mm: 0.0,
        steps: 0,
        last_force: None,
        interrupted: false,
    };
    let mut remaining = distance_mm;
    while remaining > 0.0 {
        if stop.is_some_and(|s| s.load(Ordering::Relaxed)) {
            report.interrupted = true;
            break;
        }
        let force = match sample_once(sensor, calibration, filter, cfg.read_timeout) {
            Verdict::Failed => {
                return Err(Report::new(TrackerError::Abort(AbortReason::SensorFailed)));
            }
            v => match v.force() {
                Some(f) => f,
                None => continue,
            },
        };
        report.last_force = Some(force);

        if force >= cfg.force_ceiling {
            tracing::error!(force, ceiling = cfg.force_ceiling, "max force exceeded, backing off");
            actuator
                .move_by(cfg.backoff_mm, Direction::Retract)
                .map_err(|e| Report::new(map_actuator_error(e.as_ref())))?;
            return Err(Report::new(TrackerError::Abort(AbortReason::MaxForce)));
        }

        let step = cfg.step_mm.min(remaining);
        actuator
            .move_by(step, direction)
            .map_err(|e| Report::new(map_actuator_error(e.as_ref())))?;
        remaining -= step;
        report.moved_mm += step;
        report.steps += 1;
    }

    tracing::info!(moved_mm = report.moved_mm, steps = report.steps, "jog done");
    Ok(report)
}
