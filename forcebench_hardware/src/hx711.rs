use std::time::Duration;

use forcebench_traits::{BoxError, ForceSensor};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use tracing::{debug, trace};

use crate::error::{HwError, Result};
use crate::load_cell::Hx711Gain;
use crate::util::{mean, sign_extend_24, wait_until_low_with_timeout};

pub struct Hx711 {
    dout: InputPin,
    sck: OutputPin,
    gain: Hx711Gain,
}

impl Hx711 {
    pub fn new(dout: InputPin, mut sck: OutputPin, gain: Hx711Gain) -> Self {
        sck.set_low(); // clock idle low; high for >60us powers the chip down
        Self { dout, sck, gain }
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        let dout = &self.dout;
        wait_until_low_with_timeout(|| dout.is_high(), timeout, Duration::from_micros(200))?;

        let mut word: u32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay();
            word = (word << 1) | u32::from(self.dout.is_high());
            self.sck.set_low();
            spin_delay();
        }
        for _ in 0..self.gain.extra_pulses() {
            self.sck.set_high();
            spin_delay();
            self.sck.set_low();
            spin_delay();
        }

        let value = sign_extend_24(word);
        trace!(raw = value, "hx711 raw read");
        Ok(value)
    }
}

#[inline(always)]
fn spin_delay() {
    std::hint::spin_loop();
}

/// HX711-backed load cell: averages a window of conversions and subtracts
/// the tare offset captured at construction.
pub struct HardwareLoadCell {
    hx711: Hx711,
    readings_per_measurement: usize,
    tare: f64,
}

impl HardwareLoadCell {
    pub fn new(
        dout_pin: u8,
        sck_pin: u8,
        gain: Hx711Gain,
        readings_per_measurement: usize,
        tare_readings: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let dout = gpio
            .get(dout_pin)
            .map_err(|e| HwError::Gpio(format!("open hx711 dout {dout_pin}: {e}")))?
            .into_input();
        let sck = gpio
            .get(sck_pin)
            .map_err(|e| HwError::Gpio(format!("open hx711 sck {sck_pin}: {e}")))?
            .into_output();
        let mut cell = Self {
            hx711: Hx711::new(dout, sck, gain),
            readings_per_measurement: readings_per_measurement.max(1),
            tare: 0.0,
        };
        // The first conversion after power-up uses the default gain; discard it.
        let _ = cell.hx711.read_with_timeout(timeout)?;
        cell.tare = cell.mean_of(tare_readings.max(1), timeout)?;
        debug!(tare = cell.tare, "hx711 zeroed");
        Ok(cell)
    }

    fn mean_of(&mut self, n: usize, timeout: Duration) -> Result<f64> {
        let mut buf = Vec::with_capacity(n);
        for _ in 0..n {
            buf.push(self.hx711.read_with_timeout(timeout)?);
        }
        mean(&buf).ok_or(HwError::Timeout)
    }
}

impl ForceSensor for HardwareLoadCell {
    fn raw_sample(&mut self, timeout: Duration) -> std::result::Result<f64, BoxError> {
        let avg = self.mean_of(self.readings_per_measurement, timeout)?;
        Ok(avg - self.tare)
    }
}
