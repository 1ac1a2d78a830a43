#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and setpoint loading for the force bench.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Setpoints come either inline (`[setpoints] values`) or from a file
//!   (`.csv`: every cell is a setpoint, `.txt`: whitespace separated).
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub lc_dout: u8,
    pub lc_sck: u8,
    /// Direction pin on the PWM actuator, IN1 on the H-bridge.
    pub motor_in1: u8,
    /// PWM pin on the PWM actuator, IN2 on the H-bridge.
    pub motor_in2: u8,
    /// H-bridge enable; unused by the PWM actuator.
    pub motor_en: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoadCellCfg {
    /// HX711 input channel, "A" or "B".
    pub channel: char,
    pub gain: u8,
    /// Raw counts per force unit (negative when the cell is mounted inverted).
    pub counts_per_unit: f64,
    /// Conversions averaged into one raw sample.
    pub readings_per_measurement: usize,
    /// Conversions averaged for the tare offset at start-up.
    pub tare_readings: usize,
    /// Max wait for HX711 data-ready per conversion.
    pub read_timeout_ms: u64,
}

impl Default for LoadCellCfg {
    fn default() -> Self {
        Self {
            channel: 'A',
            gain: 64,
            counts_per_unit: -735.23,
            readings_per_measurement: 1,
            tare_readings: 99,
            read_timeout_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    /// Sampler pacing. 0 lets the load cell's data-ready signal pace sampling.
    pub sample_rate_hz: u32,
    /// Consecutive rejected readings tolerated before the sensor is declared failed.
    pub fault_threshold: u32,
    /// Largest plausible change between two consecutive readings.
    pub fault_delta: f64,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 80,
            fault_threshold: 5,
            fault_delta: 200.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    /// Abort when a measurement reaches this force.
    pub force_ceiling: f64,
    pub step_size_mm: f64,
    /// Net travel allowed while chasing one setpoint.
    pub max_segment_mm: f64,
    /// Pause after a setpoint is satisfied to let the actuator coast.
    pub settle_ms: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            force_ceiling: 1000.0,
            step_size_mm: 1.0,
            max_segment_mm: 20.0,
            settle_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DutyCfg {
    /// Length of the active window before a forced rest.
    pub window_ms: u64,
    /// Rest length as a fraction of the window.
    pub rest_fraction: f64,
}

impl Default for DutyCfg {
    fn default() -> Self {
        Self {
            window_ms: 20_000,
            rest_fraction: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorKind {
    /// Direction pin plus PWM-gated power.
    #[default]
    Pwm,
    /// IN1/IN2 direction pair plus enable pin.
    Hbridge,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActuatorCfg {
    pub kind: ActuatorKind,
    pub mm_per_sec: f64,
    pub retract_correction: f64,
    pub max_travel_mm: f64,
    pub start_pos_mm: f64,
    pub pwm_frequency_hz: f64,
    /// PWM duty in [0.0, 1.0].
    pub duty_cycle: f64,
}

impl Default for ActuatorCfg {
    fn default() -> Self {
        Self {
            kind: ActuatorKind::Pwm,
            mm_per_sec: 34.46,
            retract_correction: 0.9261,
            max_travel_mm: 150.0,
            start_pos_mm: 50.0,
            pwm_frequency_hz: 20_000.0,
            duty_cycle: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SetpointsCfg {
    /// Setpoint file, resolved relative to the config file.
    pub file: Option<PathBuf>,
    /// Inline setpoints; take precedence over `file`.
    pub values: Vec<i32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub load_cell: LoadCellCfg,
    #[serde(default)]
    pub sensor: SensorCfg,
    #[serde(default)]
    pub control: ControlCfg,
    #[serde(default)]
    pub duty: DutyCfg,
    #[serde(default)]
    pub actuator: ActuatorCfg,
    #[serde(default)]
    pub setpoints: SetpointsCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Load cell
        if !matches!(self.load_cell.channel.to_ascii_uppercase(), 'A' | 'B') {
            eyre::bail!("load_cell.channel must be \"A\" or \"B\"");
        }
        if !matches!(self.load_cell.gain, 32 | 64 | 128) {
            eyre::bail!("load_cell.gain must be one of 32, 64, 128");
        }
        if !self.load_cell.counts_per_unit.is_finite() || self.load_cell.counts_per_unit == 0.0 {
            eyre::bail!("load_cell.counts_per_unit must be finite and non-zero");
        }
        if self.load_cell.readings_per_measurement == 0 {
            eyre::bail!("load_cell.readings_per_measurement must be >= 1");
        }
        if self.load_cell.read_timeout_ms == 0 {
            eyre::bail!("load_cell.read_timeout_ms must be >= 1");
        }

        // Sensor
        if self.sensor.fault_threshold == 0 {
            eyre::bail!("sensor.fault_threshold must be >= 1");
        }
        if !(self.sensor.fault_delta.is_finite() && self.sensor.fault_delta > 0.0) {
            eyre::bail!("sensor.fault_delta must be > 0");
        }
        if self.sensor.sample_rate_hz > 10_000 {
            eyre::bail!("sensor.sample_rate_hz is unreasonably large (>10kHz)");
        }

        // Control
        if !(self.control.force_ceiling.is_finite() && self.control.force_ceiling > 0.0) {
            eyre::bail!("control.force_ceiling must be > 0");
        }
        if !(self.control.step_size_mm.is_finite() && self.control.step_size_mm > 0.0) {
            eyre::bail!("control.step_size_mm must be > 0");
        }
        if self.control.step_size_mm > self.actuator.max_travel_mm {
            eyre::bail!("control.step_size_mm must be <= actuator.max_travel_mm");
        }
        if !(self.control.max_segment_mm >= self.control.step_size_mm) {
            eyre::bail!("control.max_segment_mm must be >= control.step_size_mm");
        }
        if self.control.settle_ms > 60 * 1000 {
            eyre::bail!("control.settle_ms is unreasonably large (>1min)");
        }

        // Duty
        if self.duty.window_ms == 0 {
            eyre::bail!("duty.window_ms must be >= 1");
        }
        if !(0.0..=10.0).contains(&self.duty.rest_fraction) {
            eyre::bail!("duty.rest_fraction must be in [0.0, 10.0]");
        }

        // Actuator
        if !(self.actuator.mm_per_sec.is_finite() && self.actuator.mm_per_sec > 0.0) {
            eyre::bail!("actuator.mm_per_sec must be > 0");
        }
        if !(self.actuator.retract_correction > 0.0 && self.actuator.retract_correction <= 2.0) {
            eyre::bail!("actuator.retract_correction must be in (0.0, 2.0]");
        }
        if !(self.actuator.max_travel_mm.is_finite() && self.actuator.max_travel_mm > 0.0) {
            eyre::bail!("actuator.max_travel_mm must be > 0");
        }
        if !(0.0..=self.actuator.max_travel_mm).contains(&self.actuator.start_pos_mm) {
            eyre::bail!("actuator.start_pos_mm must be within [0, actuator.max_travel_mm]");
        }
        if !(0.0..=1.0).contains(&self.actuator.duty_cycle) {
            eyre::bail!("actuator.duty_cycle must be in [0.0, 1.0]");
        }
        if self.actuator.kind == ActuatorKind::Pwm && self.actuator.pwm_frequency_hz <= 0.0 {
            eyre::bail!("actuator.pwm_frequency_hz must be > 0");
        }
        if self.actuator.kind == ActuatorKind::Hbridge && self.pins.motor_en.is_none() {
            eyre::bail!("pins.motor_en is missing (required for actuator.kind = \"hbridge\")");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly (got {r:?})");
        }

        // Setpoints
        if let Some(bad) = self
            .setpoints
            .values
            .iter()
            .find(|&&v| f64::from(v) >= self.control.force_ceiling)
        {
            eyre::bail!("setpoints.values contains {bad}, which is not below control.force_ceiling");
        }

        Ok(())
    }

    /// Resolve the setpoint sequence: inline values first, then the file
    /// (relative paths are taken from `base_dir`).
    pub fn resolve_setpoints(&self, base_dir: Option<&Path>) -> eyre::Result<Vec<i32>> {
        if !self.setpoints.values.is_empty() {
            return Ok(self.setpoints.values.clone());
        }
        match &self.setpoints.file {
            Some(file) => {
                let path = match base_dir {
                    Some(dir) if file.is_relative() => dir.join(file),
                    _ => file.clone(),
                };
                load_setpoints(&path)
            }
            None => eyre::bail!("no setpoints configured: set [setpoints] values or file"),
        }
    }
}

/// Load an ordered setpoint sequence from a `.csv` or `.txt` file.
pub fn load_setpoints(path: &Path) -> eyre::Result<Vec<i32>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let values = match ext.as_deref() {
        Some("csv") => load_setpoints_csv(path)?,
        Some("txt") => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| eyre::eyre!("open setpoint file {:?}: {}", path, e))?;
            parse_setpoints_txt(&text)?
        }
        _ => eyre::bail!("invalid setpoint file format {:?}: expected .csv or .txt", path),
    };
    if values.is_empty() {
        eyre::bail!("setpoint file {:?} is empty", path);
    }
    Ok(values)
}

fn parse_setpoint(cell: &str, row: usize, col: usize) -> eyre::Result<i32> {
    cell.parse::<i32>()
        .map_err(|_| eyre::eyre!("setpoint at row {row}, column {col} is not an integer: {cell:?}"))
}

fn load_setpoints_csv(path: &Path) -> eyre::Result<Vec<i32>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open setpoint CSV {:?}: {}", path, e))?;

    let mut out = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 1, e))?;
        for (col, cell) in rec.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            out.push(parse_setpoint(cell, idx + 1, col + 1)?);
        }
    }
    Ok(out)
}

/// Parse whitespace-separated setpoints; `#` starts a comment.
pub fn parse_setpoints_txt(text: &str) -> eyre::Result<Vec<i32>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        for (col, tok) in line.split_whitespace().enumerate() {
            out.push(parse_setpoint(tok, idx + 1, col + 1)?);
        }
    }
    Ok(out)
}
