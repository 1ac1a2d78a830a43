//! Type-state builder for `ForceController`.
//!
//! `build()` only exists once an actuator and a setpoint sequence have been
//! supplied; everything else has defaults. Value checks happen in `build()`.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use forcebench_traits::{ActuatorDriver, Clock, Direction, MonotonicClock};

use crate::config::{ControlCfg, DutyCfg};
use crate::controller::ForceController;
use crate::duty::DutyGovernor;
use crate::error::{BuildError, Result};
use crate::setpoints::SetpointSource;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;

/// Builder for `ForceController`. `A` is the actuator once set, `P` the
/// setpoint list once set.
pub struct ControllerBuilder<A, P> {
    actuator: A,
    setpoints: P,
    control: Option<ControlCfg>,
    duty: Option<DutyCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    stop: Option<Arc<AtomicBool>>,
}

impl Default for ControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self {
            actuator: Missing,
            setpoints: Missing,
            control: None,
            duty: None,
            clock: None,
            stop: None,
        }
    }
}

impl<A, P> ControllerBuilder<A, P> {
    pub fn with_actuator<B: ActuatorDriver>(self, actuator: B) -> ControllerBuilder<B, P> {
        ControllerBuilder {
            actuator,
            setpoints: self.setpoints,
            control: self.control,
            duty: self.duty,
            clock: self.clock,
            stop: self.stop,
        }
    }

    pub fn with_setpoints(self, setpoints: Vec<i32>) -> ControllerBuilder<A, Vec<i32>> {
        ControllerBuilder {
            actuator: self.actuator,
            setpoints,
            control: self.control,
            duty: self.duty,
            clock: self.clock,
            stop: self.stop,
        }
    }

    pub fn with_control(mut self, control: ControlCfg) -> Self {
        self.control = Some(control);
        self
    }

    pub fn with_duty(mut self, duty: DutyCfg) -> Self {
        self.duty = Some(duty);
        self
    }

    /// Clock for settle delays and the duty governor. Defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Flag that cuts settle and rest pauses short.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(control: &ControlCfg, duty: &DutyCfg, setpoints: &[i32]) -> Result<()> {
    if !(control.step_size_mm.is_finite() && control.step_size_mm > 0.0) {
        return Err(invalid("step_size_mm must be > 0"));
    }
    if !(control.max_travel_mm.is_finite() && control.max_travel_mm > 0.0) {
        return Err(invalid("max_travel_mm must be > 0"));
    }
    if control.step_size_mm > control.max_travel_mm {
        return Err(invalid("step_size_mm must be <= max_travel_mm"));
    }
    if !(control.max_segment_mm >= control.step_size_mm) {
        return Err(invalid("max_segment_mm must be >= step_size_mm"));
    }
    if !(0.0..=control.max_travel_mm).contains(&control.start_pos_mm) {
        return Err(invalid("start_pos_mm must be within [0, max_travel_mm]"));
    }
    if !(control.force_ceiling.is_finite() && control.force_ceiling > 0.0) {
        return Err(invalid("force_ceiling must be > 0"));
    }
    if duty.window_ms == 0 {
        return Err(invalid("duty window_ms must be >= 1"));
    }
    if !(duty.rest_fraction.is_finite() && duty.rest_fraction >= 0.0) {
        return Err(invalid("duty rest_fraction must be >= 0"));
    }
    if let Some(&sp) = setpoints
        .iter()
        .find(|&&sp| f64::from(sp) >= control.force_ceiling)
    {
        return Err(eyre::Report::new(BuildError::SetpointAboveCeiling(sp)));
    }
    Ok(())
}

impl<A: ActuatorDriver> ControllerBuilder<A, Vec<i32>> {
    pub fn build(self) -> Result<ForceController<A>> {
        let control = self.control.unwrap_or_default();
        let duty = self.duty.unwrap_or_default();
        let mut setpoints = SetpointSource::new(self.setpoints).map_err(eyre::Report::new)?;
        validate(&control, &duty, setpoints.values())?;

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };
        let mut governor = DutyGovernor::new(&duty, clock.clone());
        if let Some(stop) = &self.stop {
            governor = governor.with_stop_flag(stop.clone());
        }

        let setpoint = setpoints.next_setpoint();
        let position_mm = control.start_pos_mm;
        Ok(ForceController {
            actuator: self.actuator,
            setpoints,
            cfg: control,
            governor,
            clock,
            stop: self.stop,
            setpoint,
            direction: Direction::Extend,
            segment_mm: 0.0,
            position_mm,
            last_measurement: None,
            hold_logged: false,
            reprime: false,
            completed: 0,
            moves: 0,
        })
    }
}
