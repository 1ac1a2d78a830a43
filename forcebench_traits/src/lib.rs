pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type crossing the capability boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Travel direction of a linear actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Extend,
    Retract,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Extend => Direction::Retract,
            Direction::Retract => Direction::Extend,
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::Extend => f.write_str("extend"),
            Direction::Retract => f.write_str("retract"),
        }
    }
}

/// Source of raw load-cell samples.
///
/// `raw_sample` may block up to `timeout` waiting for the converter to
/// signal data-ready. The returned value is uncalibrated; scaling to force
/// units happens in the sampler.
pub trait ForceSensor {
    fn raw_sample(&mut self, timeout: std::time::Duration) -> Result<f64, BoxError>;
}

/// Motion capability of a linear actuator.
///
/// `move_by` blocks for the physical duration of the motion. Distances are
/// millimetres and strictly positive.
pub trait ActuatorDriver {
    fn move_by(&mut self, distance_mm: f64, direction: Direction) -> Result<(), BoxError>;
    /// Return to the home position. Calling this again without any motion in
    /// between must be a no-op.
    fn reset_to_home(&mut self) -> Result<(), BoxError>;
    /// Stop driving and release the hardware. Infallible; errors are logged.
    fn shutdown(&mut self);
}

impl<T: ForceSensor + ?Sized> ForceSensor for Box<T> {
    fn raw_sample(&mut self, timeout: std::time::Duration) -> Result<f64, BoxError> {
        (**self).raw_sample(timeout)
    }
}

impl<T: ActuatorDriver + ?Sized> ActuatorDriver for Box<T> {
    fn move_by(&mut self, distance_mm: f64, direction: Direction) -> Result<(), BoxError> {
        (**self).move_by(distance_mm, direction)
    }
    fn reset_to_home(&mut self) -> Result<(), BoxError> {
        (**self).reset_to_home()
    }
    fn shutdown(&mut self) {
        (**self).shutdown();
    }
}
