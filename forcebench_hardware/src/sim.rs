//! Simulated test rig: an actuator pressing a spring onto the load cell.
//!
//! Force rises linearly with actuator position past the contact point, on
//! top of a small constant preload so an idle rig never reads exactly zero.
//! The simulated sensor and actuator share one `SimRig` handle.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use forcebench_traits::{ActuatorDriver, BoxError, Direction, ForceSensor};

use crate::travel::{MotionState, TravelModel};

#[derive(Debug, Clone, Copy)]
pub struct RigParams {
    /// Position where the pusher meets the spring.
    pub contact_mm: f64,
    /// Force units per millimetre of compression.
    pub stiffness: f64,
    /// Constant force present at all positions.
    pub preload: f64,
    /// Raw counts per force unit, matching the load cell calibration.
    pub counts_per_unit: f64,
}

impl Default for RigParams {
    fn default() -> Self {
        Self {
            contact_mm: 50.0,
            stiffness: 10.0,
            preload: 1.0,
            counts_per_unit: -735.23,
        }
    }
}

#[derive(Debug)]
struct RigState {
    params: RigParams,
    motion: MotionState,
    moves: u64,
    homings: u64,
    shut_down: bool,
}

#[derive(Debug, Clone)]
pub struct SimRig {
    model: TravelModel,
    state: Arc<Mutex<RigState>>,
}

impl SimRig {
    pub fn new(model: TravelModel, params: RigParams) -> Self {
        Self {
            model,
            state: Arc::new(Mutex::new(RigState {
                params,
                motion: MotionState::new(&model),
                moves: 0,
                homings: 0,
                shut_down: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RigState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn model(&self) -> &TravelModel {
        &self.model
    }

    /// Force currently applied to the load cell.
    pub fn force(&self) -> f64 {
        let s = self.lock();
        let compression = (s.motion.position_mm - s.params.contact_mm).max(0.0);
        s.params.preload + compression * s.params.stiffness
    }

    pub fn position_mm(&self) -> f64 {
        self.lock().motion.position_mm
    }

    pub fn moves(&self) -> u64 {
        self.lock().moves
    }

    /// Number of homing sequences that actually moved the actuator.
    pub fn homings(&self) -> u64 {
        self.lock().homings
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }

    pub fn counts_per_unit(&self) -> f64 {
        self.lock().params.counts_per_unit
    }

    pub fn sensor(&self) -> SimLoadCell {
        SimLoadCell {
            rig: self.clone(),
            samples: 0,
            fail_after: None,
            period: Duration::ZERO,
        }
    }

    pub fn actuator(&self) -> SimActuator {
        SimActuator {
            rig: self.clone(),
            time_scale: 0.0,
        }
    }
}

/// Simulated HX711: reports the rig force in raw counts.
#[derive(Debug)]
pub struct SimLoadCell {
    rig: SimRig,
    samples: u64,
    fail_after: Option<u64>,
    period: Duration,
}

impl SimLoadCell {
    /// After `n` samples, every further sample reads zero (dead sensor).
    pub fn with_fail_after(mut self, n: u64) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Emulate the converter's data-ready period by blocking in `raw_sample`.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

impl ForceSensor for SimLoadCell {
    fn raw_sample(&mut self, _timeout: Duration) -> Result<f64, BoxError> {
        if !self.period.is_zero() {
            std::thread::sleep(self.period);
        }
        self.samples = self.samples.saturating_add(1);
        if let Some(n) = self.fail_after
            && self.samples > n
        {
            return Ok(0.0);
        }
        let raw = self.rig.force() * self.rig.counts_per_unit();
        tracing::trace!(raw, "sim load cell sample");
        Ok(raw)
    }
}

/// Simulated actuator: moves the rig instantly, or in scaled real time.
#[derive(Debug)]
pub struct SimActuator {
    rig: SimRig,
    time_scale: f64,
}

impl SimActuator {
    /// Sleep `time_scale` times the modelled motion duration on each move.
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale.max(0.0);
        self
    }

    fn drive(&self, distance_mm: f64, direction: Direction) {
        let model = self.rig.model;
        if self.time_scale > 0.0 {
            let t = model.motion_time(distance_mm, direction).mul_f64(self.time_scale);
            std::thread::sleep(t);
        }
        let mut s = self.rig.lock();
        s.motion.record_move(&model, distance_mm, direction);
        s.moves = s.moves.saturating_add(1);
    }
}

impl ActuatorDriver for SimActuator {
    fn move_by(&mut self, distance_mm: f64, direction: Direction) -> Result<(), BoxError> {
        self.rig.model.check_distance(distance_mm)?;
        self.drive(distance_mm, direction);
        tracing::debug!(distance_mm, %direction, "sim actuator moved");
        Ok(())
    }

    fn reset_to_home(&mut self) -> Result<(), BoxError> {
        if self.rig.lock().motion.homed {
            tracing::debug!("sim actuator already home");
            return Ok(());
        }
        let model = self.rig.model;
        for (distance, direction) in model.home_plan() {
            self.drive(distance, direction);
        }
        let mut s = self.rig.lock();
        s.motion.record_home(&model);
        s.homings = s.homings.saturating_add(1);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.rig.lock().shut_down = true;
        tracing::debug!("sim actuator released");
    }
}
