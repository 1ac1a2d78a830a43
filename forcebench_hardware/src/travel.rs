//! Time-based travel model for open-loop linear actuators.
//!
//! The actuators on the bench have no position feedback: a move of `d` mm is
//! realised by driving the motor for `d / mm_per_sec` seconds. Retraction is
//! slower than extension on these units, so retract distances are divided by
//! an empirical correction factor before being converted to time.

use std::time::Duration;

use forcebench_traits::Direction;

use crate::error::{HwError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelModel {
    /// Extension speed at full duty.
    pub mm_per_sec: f64,
    /// Retract distance multiplier denominator (measured 0.9261 on the bench unit).
    pub retract_correction: f64,
    /// Full stroke; single moves may not exceed it.
    pub max_travel_mm: f64,
    /// Home position, measured from the fully retracted end.
    pub start_pos_mm: f64,
}

impl Default for TravelModel {
    fn default() -> Self {
        Self {
            mm_per_sec: 34.46,
            retract_correction: 0.9261,
            max_travel_mm: 150.0,
            start_pos_mm: 50.0,
        }
    }
}

impl TravelModel {
    /// Reject distances outside `(0, max_travel_mm]` and non-finite values.
    pub fn check_distance(&self, distance_mm: f64) -> Result<()> {
        if !distance_mm.is_finite() || distance_mm <= 0.0 || distance_mm > self.max_travel_mm {
            return Err(HwError::InvalidDistance(distance_mm));
        }
        Ok(())
    }

    /// Distance actually commanded to the motor after the retract correction.
    pub fn corrected_distance(&self, distance_mm: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Extend => distance_mm,
            Direction::Retract => distance_mm / self.retract_correction,
        }
    }

    /// Drive time for a move.
    pub fn motion_time(&self, distance_mm: f64, direction: Direction) -> Duration {
        let secs = self.corrected_distance(distance_mm, direction) / self.mm_per_sec;
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        }
    }

    /// Position after a move, clamped to the stroke.
    pub fn advance(&self, position_mm: f64, distance_mm: f64, direction: Direction) -> f64 {
        let next = match direction {
            Direction::Extend => position_mm + distance_mm,
            Direction::Retract => position_mm - distance_mm,
        };
        next.clamp(0.0, self.max_travel_mm)
    }

    /// Moves that bring the actuator home: retract the whole stroke against
    /// the end stop, then extend to the start position.
    pub fn home_plan(&self) -> Vec<(f64, Direction)> {
        let mut plan = vec![(self.max_travel_mm, Direction::Retract)];
        if self.start_pos_mm > 0.0 {
            plan.push((self.start_pos_mm, Direction::Extend));
        }
        plan
    }
}

/// Position bookkeeping shared by the driver implementations.
#[derive(Debug, Clone, Copy)]
pub struct MotionState {
    pub position_mm: f64,
    /// True right after a completed homing sequence and until the next move.
    pub homed: bool,
}

impl MotionState {
    pub fn new(model: &TravelModel) -> Self {
        Self {
            position_mm: model.start_pos_mm,
            homed: false,
        }
    }

    pub fn record_move(&mut self, model: &TravelModel, distance_mm: f64, direction: Direction) {
        self.position_mm = model.advance(self.position_mm, distance_mm, direction);
        self.homed = false;
    }

    pub fn record_home(&mut self, model: &TravelModel) {
        self.position_mm = model.start_pos_mm;
        self.homed = true;
    }
}
