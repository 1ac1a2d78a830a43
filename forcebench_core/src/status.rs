//! Outcome of a single controller cycle.

use std::time::Duration;

use forcebench_traits::Direction;

use crate::error::TrackerError;

/// Which travel limit stopped a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Net movement for the current setpoint reached `max_segment_mm`.
    Segment,
    /// The step would leave `[0, max_travel_mm]`.
    Travel,
}

impl core::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LimitKind::Segment => f.write_str("segment limit reached"),
            LimitKind::Travel => f.write_str("travel limit reached"),
        }
    }
}

#[derive(Debug)]
pub enum ControlStatus {
    /// No measurement has ever arrived.
    Waiting,
    /// One step was issued.
    Moved(Direction),
    /// A limit blocks the next step; position is held.
    Holding(LimitKind),
    /// The setpoint was satisfied and the next one is now active.
    Advanced {
        reached: i32,
        setpoint: i32,
        direction: Direction,
        /// Forced rest applied by the duty governor, if any.
        rest: Option<Duration>,
    },
    /// A safety rule tripped; the caller must run the shutdown sequence.
    Aborted(TrackerError),
}
