#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Force-tracking core (hardware-agnostic).
//!
//! All hardware interactions go through `forcebench_traits::ForceSensor`
//! and `forcebench_traits::ActuatorDriver`.
//!
//! ## Architecture
//!
//! - **Sampling**: a `Sampler` thread calibrates and fault-filters raw
//!   samples and publishes them through a single-slot `handoff`.
//! - **Control**: `ForceController` chases a cyclic `SetpointSource` one
//!   step at a time, holding at segment/travel limits and aborting at the
//!   force ceiling or on sensor failure.
//! - **Duty cycle**: `DutyGovernor` forces a rest after each active window.
//! - **Runner**: `runner::run` homes, tracks, and always finishes through
//!   `runner::shutdown_sequence`.
//! - **Bench utilities**: `jog` and `probe`.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod duty;
pub mod error;
pub mod fault_filter;
pub mod handoff;
pub mod hw_error;
pub mod jog;
pub mod mocks;
pub mod probe;
pub mod runner;
pub mod sampler;
pub mod setpoints;
pub mod status;
pub mod util;

pub use builder::{ControllerBuilder, Missing};
pub use calibration::Calibration;
pub use config::{ControlCfg, DutyCfg, SensorCfg};
pub use controller::ForceController;
pub use duty::DutyGovernor;
pub use error::{AbortReason, BuildError, Result, TrackerError};
pub use fault_filter::{FaultFilter, Verdict};
pub use handoff::{HandoffReader, HandoffWriter, Reading, handoff};
pub use hw_error::{map_actuator_error, map_hw_error};
pub use runner::{RunOptions, RunSummary, StopCause};
pub use sampler::Sampler;
pub use setpoints::SetpointSource;
pub use status::{ControlStatus, LimitKind};
