//! Hardware backends for the force bench.
//!
//! The simulated rig is always available. GPIO backends (HX711 load cell,
//! PWM and H-bridge linear actuators) require the `hardware` feature and a
//! Linux target.

pub mod error;
pub mod load_cell;
pub mod sim;
pub mod travel;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hx711;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod linear;

pub use error::HwError;
pub use load_cell::Hx711Gain;
pub use sim::{RigParams, SimActuator, SimLoadCell, SimRig};
pub use travel::{MotionState, TravelModel};

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hx711::HardwareLoadCell;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use linear::{HBridgeLinearActuator, PwmLinearActuator};
