//! Force-tracking controller.
//!
//! Each call to [`ForceController::step`] consumes the newest reading (or
//! reuses the previous one) and makes one decision: step toward the
//! setpoint, hold at a limit, advance to the next setpoint, or abort.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use forcebench_traits::{ActuatorDriver, Clock, Direction};

use crate::config::ControlCfg;
use crate::duty::DutyGovernor;
use crate::error::{AbortReason, Result};
use crate::handoff::Reading;
use crate::hw_error::map_actuator_error;
use crate::setpoints::SetpointSource;
use crate::status::{ControlStatus, LimitKind};

/// Slack for float accumulation in segment and travel bookkeeping.
const MM_EPS: f64 = 1e-9;

pub struct ForceController<A: ActuatorDriver> {
    pub(crate) actuator: A,
    pub(crate) setpoints: SetpointSource,
    pub(crate) cfg: ControlCfg,
    pub(crate) governor: DutyGovernor,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) stop: Option<Arc<AtomicBool>>,
    pub(crate) setpoint: i32,
    pub(crate) direction: Direction,
    /// Net signed movement since the last setpoint transition.
    pub(crate) segment_mm: f64,
    /// Estimated absolute actuator position.
    pub(crate) position_mm: f64,
    pub(crate) last_measurement: Option<f64>,
    pub(crate) hold_logged: bool,
    /// Set on advance: the next fresh reading re-derives the direction.
    pub(crate) reprime: bool,
    pub(crate) completed: u64,
    pub(crate) moves: u64,
}

impl<A: ActuatorDriver> core::fmt::Debug for ForceController<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ForceController")
            .field("setpoint", &self.setpoint)
            .field("direction", &self.direction)
            .field("segment_mm", &self.segment_mm)
            .field("position_mm", &self.position_mm)
            .field("last_measurement", &self.last_measurement)
            .finish_non_exhaustive()
    }
}

impl<A: ActuatorDriver> ForceController<A> {
    /// One control cycle. `None` means no new reading since the last cycle.
    pub fn step(&mut self, reading: Option<Reading>) -> Result<ControlStatus> {
        let measurement = match reading {
            Some(Reading::SensorFailed) => {
                tracing::error!(setpoint = self.setpoint, "sensor failed");
                return Ok(ControlStatus::Aborted(AbortReason::SensorFailed.into()));
            }
            Some(Reading::Force(v)) => {
                if self.last_measurement.is_none() {
                    self.direction = direction_toward(self.setpoint, v);
                    tracing::debug!(measurement = v, direction = %self.direction, "first measurement");
                } else if self.reprime {
                    self.direction = direction_toward(self.setpoint, v);
                    tracing::debug!(measurement = v, direction = %self.direction, "settled measurement");
                }
                self.reprime = false;
                self.last_measurement = Some(v);
                v
            }
            None => match self.last_measurement {
                Some(v) => v,
                None => return Ok(ControlStatus::Waiting),
            },
        };

        if measurement >= self.cfg.force_ceiling {
            tracing::error!(
                measurement,
                ceiling = self.cfg.force_ceiling,
                "max force exceeded"
            );
            return Ok(ControlStatus::Aborted(AbortReason::MaxForce.into()));
        }

        let target = f64::from(self.setpoint);
        match self.direction {
            Direction::Extend if target > measurement => self.try_step(Direction::Extend),
            Direction::Retract if target <= measurement => self.try_step(Direction::Retract),
            _ => Ok(self.advance(measurement)),
        }
    }

    fn limit_for(&self, direction: Direction) -> Option<LimitKind> {
        let step = self.cfg.step_size_mm;
        match direction {
            Direction::Extend => {
                if self.segment_mm >= self.cfg.max_segment_mm - MM_EPS {
                    Some(LimitKind::Segment)
                } else if self.position_mm + step > self.cfg.max_travel_mm + MM_EPS {
                    Some(LimitKind::Travel)
                } else {
                    None
                }
            }
            Direction::Retract => {
                if -self.segment_mm >= self.cfg.max_segment_mm - MM_EPS {
                    Some(LimitKind::Segment)
                } else if self.position_mm - step < -MM_EPS {
                    Some(LimitKind::Travel)
                } else {
                    None
                }
            }
        }
    }

    fn try_step(&mut self, direction: Direction) -> Result<ControlStatus> {
        if let Some(limit) = self.limit_for(direction) {
            if !self.hold_logged {
                tracing::warn!(
                    setpoint = self.setpoint,
                    segment_mm = self.segment_mm,
                    position_mm = self.position_mm,
                    %direction,
                    "{limit}, holding position"
                );
                self.hold_logged = true;
            }
            return Ok(ControlStatus::Holding(limit));
        }

        let step = self.cfg.step_size_mm;
        self.actuator
            .move_by(step, direction)
            .map_err(|e| eyre::Report::new(map_actuator_error(e.as_ref())))?;
        match direction {
            Direction::Extend => {
                self.segment_mm += step;
                self.position_mm += step;
            }
            Direction::Retract => {
                self.segment_mm -= step;
                self.position_mm -= step;
            }
        }
        self.moves += 1;
        tracing::trace!(
            %direction,
            segment_mm = self.segment_mm,
            position_mm = self.position_mm,
            "step"
        );
        Ok(ControlStatus::Moved(direction))
    }

    fn advance(&mut self, measurement: f64) -> ControlStatus {
        let reached = self.setpoint;
        self.setpoint = self.setpoints.next_setpoint();
        self.segment_mm = 0.0;
        self.hold_logged = false;
        self.completed += 1;

        crate::util::interruptible_sleep(
            self.clock.as_ref(),
            Duration::from_millis(self.cfg.settle_ms),
            self.stop.as_deref(),
        );
        let rest = self.governor.on_segment_complete();

        // Provisional; the settle and rest can move the force, so the first
        // reading taken after them decides.
        self.direction = direction_toward(self.setpoint, measurement);
        self.reprime = true;
        tracing::info!(
            reached,
            measurement,
            next = self.setpoint,
            direction = %self.direction,
            "setpoint reached"
        );
        ControlStatus::Advanced {
            reached,
            setpoint: self.setpoint,
            direction: self.direction,
            rest,
        }
    }

    /// Return the actuator to its start position and reset position tracking.
    pub fn home(&mut self) -> Result<()> {
        self.actuator
            .reset_to_home()
            .map_err(|e| eyre::Report::new(map_actuator_error(e.as_ref())))?;
        self.position_mm = self.cfg.start_pos_mm;
        Ok(())
    }

    pub fn setpoint(&self) -> i32 {
        self.setpoint
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn segment_mm(&self) -> f64 {
        self.segment_mm
    }

    pub fn position_mm(&self) -> f64 {
        self.position_mm
    }

    pub fn last_measurement(&self) -> Option<f64> {
        self.last_measurement
    }

    /// Setpoints satisfied so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Steps issued so far.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn governor(&self) -> &DutyGovernor {
        &self.governor
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }
}

/// `Extend` iff the setpoint lies above the measurement; ties retract.
#[inline]
pub fn direction_toward(setpoint: i32, measurement: f64) -> Direction {
    if f64::from(setpoint) > measurement {
        Direction::Extend
    } else {
        Direction::Retract
    }
}
