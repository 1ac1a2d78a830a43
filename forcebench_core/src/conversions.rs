//! `From` implementations bridging `forcebench_config` types to core types.

use crate::calibration::Calibration;
use crate::config::{ControlCfg, DutyCfg, SensorCfg};

// ── SensorCfg ────────────────────────────────────────────────────────────────

impl From<&forcebench_config::Config> for SensorCfg {
    fn from(c: &forcebench_config::Config) -> Self {
        Self {
            fault_threshold: c.sensor.fault_threshold,
            fault_delta: c.sensor.fault_delta,
            sample_rate_hz: c.sensor.sample_rate_hz,
            read_timeout_ms: c.load_cell.read_timeout_ms,
        }
    }
}

// ── ControlCfg ───────────────────────────────────────────────────────────────

impl From<&forcebench_config::Config> for ControlCfg {
    fn from(c: &forcebench_config::Config) -> Self {
        Self {
            force_ceiling: c.control.force_ceiling,
            step_size_mm: c.control.step_size_mm,
            max_segment_mm: c.control.max_segment_mm,
            max_travel_mm: c.actuator.max_travel_mm,
            start_pos_mm: c.actuator.start_pos_mm,
            settle_ms: c.control.settle_ms,
        }
    }
}

// ── DutyCfg ──────────────────────────────────────────────────────────────────

impl From<&forcebench_config::DutyCfg> for DutyCfg {
    fn from(c: &forcebench_config::DutyCfg) -> Self {
        Self {
            window_ms: c.window_ms,
            rest_fraction: c.rest_fraction,
        }
    }
}

// ── Calibration ──────────────────────────────────────────────────────────────

impl From<&forcebench_config::LoadCellCfg> for Calibration {
    fn from(c: &forcebench_config::LoadCellCfg) -> Self {
        Self::new(c.counts_per_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_sections_flow_into_core_types() {
        let cfg = forcebench_config::load_toml(
            r#"
[pins]
lc_dout = 5
lc_sck = 6
motor_in1 = 23
motor_in2 = 18

[control]
force_ceiling = 400.0
max_segment_mm = 12.5

[actuator]
max_travel_mm = 100.0
start_pos_mm = 30.0

[load_cell]
counts_per_unit = 2.0
read_timeout_ms = 250
"#,
        )
        .unwrap();
        let control = ControlCfg::from(&cfg);
        assert_eq!(control.force_ceiling, 400.0);
        assert_eq!(control.max_segment_mm, 12.5);
        assert_eq!(control.max_travel_mm, 100.0);
        assert_eq!(control.start_pos_mm, 30.0);
        let sensor = SensorCfg::from(&cfg);
        assert_eq!(sensor.read_timeout_ms, 250);
        assert_eq!(Calibration::from(&cfg.load_cell).to_force(10.0), 5.0);
        assert_eq!(DutyCfg::from(&cfg.duty).window_ms, 20_000);
    }
}
