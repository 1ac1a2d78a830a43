//! GPIO-driven linear actuators.
//!
//! Both drivers are open loop: motion is timed from the `TravelModel`.

use forcebench_traits::{ActuatorDriver, BoxError, Direction};
use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, warn};

use crate::error::{HwError, Result};
use crate::travel::{MotionState, TravelModel};

fn output(gpio: &Gpio, pin: u8, what: &str) -> Result<OutputPin> {
    gpio.get(pin)
        .map(|p| p.into_output_low())
        .map_err(|e| HwError::Gpio(format!("open motor pins ({what} {pin}): {e}")))
}

/// Actuator with a direction input and a PWM-driven enable.
pub struct PwmLinearActuator {
    dir: OutputPin,
    pwm: OutputPin,
    frequency_hz: f64,
    duty_cycle: f64,
    model: TravelModel,
    state: MotionState,
}

impl PwmLinearActuator {
    pub fn new(
        dir_pin: u8,
        pwm_pin: u8,
        frequency_hz: f64,
        duty_cycle: f64,
        model: TravelModel,
    ) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(Self {
            dir: output(&gpio, dir_pin, "dir")?,
            pwm: output(&gpio, pwm_pin, "pwm")?,
            frequency_hz,
            duty_cycle: duty_cycle.clamp(0.0, 1.0),
            state: MotionState::new(&model),
            model,
        })
    }

    fn drive(&mut self, distance_mm: f64, direction: Direction) -> Result<()> {
        match direction {
            Direction::Extend => self.dir.set_low(),
            Direction::Retract => self.dir.set_high(),
        }
        let t = self.model.motion_time(distance_mm, direction);
        self.pwm
            .set_pwm_frequency(self.frequency_hz, self.duty_cycle)
            .map_err(|e| HwError::Gpio(format!("start pwm: {e}")))?;
        std::thread::sleep(t);
        self.pwm
            .clear_pwm()
            .map_err(|e| HwError::Gpio(format!("stop pwm: {e}")))?;
        self.pwm.set_low();
        self.state.record_move(&self.model, distance_mm, direction);
        debug!(distance_mm, %direction, drive_ms = t.as_millis() as u64, "actuator moved");
        Ok(())
    }
}

impl ActuatorDriver for PwmLinearActuator {
    fn move_by(&mut self, distance_mm: f64, direction: Direction) -> std::result::Result<(), BoxError> {
        self.model.check_distance(distance_mm)?;
        self.drive(distance_mm, direction)?;
        Ok(())
    }

    fn reset_to_home(&mut self) -> std::result::Result<(), BoxError> {
        if self.state.homed {
            return Ok(());
        }
        for (distance, direction) in self.model.home_plan() {
            self.drive(distance, direction)?;
        }
        self.state.record_home(&self.model);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.pwm.clear_pwm() {
            warn!(error = %e, "clear pwm on shutdown");
        }
        self.pwm.set_low();
        self.dir.set_low();
    }
}

/// Actuator behind an H-bridge: IN1/IN2 select direction, EN gates power.
pub struct HBridgeLinearActuator {
    in1: OutputPin,
    in2: OutputPin,
    enable: OutputPin,
    model: TravelModel,
    state: MotionState,
}

impl HBridgeLinearActuator {
    pub fn new(in1_pin: u8, in2_pin: u8, enable_pin: u8, model: TravelModel) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(Self {
            in1: output(&gpio, in1_pin, "in1")?,
            in2: output(&gpio, in2_pin, "in2")?,
            enable: output(&gpio, enable_pin, "enable")?,
            state: MotionState::new(&model),
            model,
        })
    }

    fn brake(&mut self) {
        self.enable.set_low();
        self.in1.set_low();
        self.in2.set_low();
    }

    fn drive(&mut self, distance_mm: f64, direction: Direction) {
        match direction {
            Direction::Extend => {
                self.in1.set_high();
                self.in2.set_low();
            }
            Direction::Retract => {
                self.in1.set_low();
                self.in2.set_high();
            }
        }
        let t = self.model.motion_time(distance_mm, direction);
        self.enable.set_high();
        std::thread::sleep(t);
        self.brake();
        self.state.record_move(&self.model, distance_mm, direction);
        debug!(distance_mm, %direction, drive_ms = t.as_millis() as u64, "actuator moved");
    }
}

impl ActuatorDriver for HBridgeLinearActuator {
    fn move_by(&mut self, distance_mm: f64, direction: Direction) -> std::result::Result<(), BoxError> {
        self.model.check_distance(distance_mm)?;
        self.drive(distance_mm, direction);
        Ok(())
    }

    fn reset_to_home(&mut self) -> std::result::Result<(), BoxError> {
        if self.state.homed {
            return Ok(());
        }
        for (distance, direction) in self.model.home_plan() {
            self.drive(distance, direction);
        }
        self.state.record_home(&self.model);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.brake();
    }
}
