use thiserror::Error;

/// Why a run was aborted by a safety rule.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    #[error("sensor failed")]
    SensorFailed,
    #[error("max force exceeded")]
    MaxForce,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackerError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("actuator fault: {0}")]
    Actuator(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("aborted: {0}")]
    Abort(AbortReason),
}

impl From<AbortReason> for TrackerError {
    fn from(r: AbortReason) -> Self {
        Self::Abort(r)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("setpoint sequence is empty")]
    EmptySetpoints,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("setpoint {0} is not below the force ceiling")]
    SetpointAboveCeiling(i32),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
