//! Runtime configuration structs for the tracking loop.

use std::time::Duration;

/// Sampler and fault-filter settings.
#[derive(Debug, Clone)]
pub struct SensorCfg {
    /// Consecutive rejected readings tolerated (`E`).
    pub fault_threshold: u32,
    /// Largest plausible jump between consecutive readings (`D`).
    pub fault_delta: f64,
    /// Paced sampling rate; 0 selects event-driven sampling.
    pub sample_rate_hz: u32,
    /// Per-read timeout handed to the sensor.
    pub read_timeout_ms: u64,
}

impl SensorCfg {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            fault_threshold: 5,
            fault_delta: 200.0,
            sample_rate_hz: 80,
            read_timeout_ms: 500,
        }
    }
}

/// Controller limits and motion parameters.
#[derive(Debug, Clone)]
pub struct ControlCfg {
    pub force_ceiling: f64,
    pub step_size_mm: f64,
    pub max_segment_mm: f64,
    pub max_travel_mm: f64,
    /// Actuator position right after homing.
    pub start_pos_mm: f64,
    pub settle_ms: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            force_ceiling: 1000.0,
            step_size_mm: 1.0,
            max_segment_mm: 20.0,
            max_travel_mm: 150.0,
            start_pos_mm: 50.0,
            settle_ms: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DutyCfg {
    pub window_ms: u64,
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
