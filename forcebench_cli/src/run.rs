//! Hardware assembly and command execution.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use forcebench_config::{ActuatorCfg, Config};
use forcebench_core::error::{Report, Result};
use forcebench_core::jog::{JogCfg, JogReport};
use forcebench_core::probe::ProbeReport;
use forcebench_core::runner::{self, RunOptions, RunSummary};
use forcebench_core::{
    Calibration, ControlCfg, ControllerBuilder, DutyCfg, FaultFilter, Sampler, SensorCfg,
    map_actuator_error,
};
use forcebench_hardware::TravelModel;
use forcebench_traits::{ActuatorDriver, Direction, ForceSensor, MonotonicClock};

/// Sensor and actuator for one command, boxed so sim and hardware share a path.
pub struct Rig {
    pub sensor: Box<dyn ForceSensor + Send>,
    pub actuator: Box<dyn ActuatorDriver + Send>,
    pub backend: &'static str,
}

fn travel_model(a: &ActuatorCfg) -> TravelModel {
    TravelModel {
        mm_per_sec: a.mm_per_sec,
        retract_correction: a.retract_correction,
        max_travel_mm: a.max_travel_mm,
        start_pos_mm: a.start_pos_mm,
    }
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn make_rig(cfg: &Config) -> Result<Rig> {
    use forcebench_hardware::{RigParams, SimRig};

    fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
    }

    let mut params = RigParams {
        contact_mm: cfg.actuator.start_pos_mm,
        counts_per_unit: cfg.load_cell.counts_per_unit,
        ..RigParams::default()
    };
    if let Some(k) = env_parse::<f64>("FORCEBENCH_SIM_STIFFNESS") {
        params.stiffness = k;
    }
    let rig = SimRig::new(travel_model(&cfg.actuator), params);

    let mut sensor = rig.sensor();
    if let Some(n) = env_parse::<u64>("FORCEBENCH_SIM_FAIL_AFTER") {
        sensor = sensor.with_fail_after(n);
    }
    if cfg.sensor.sample_rate_hz == 0 {
        // Event mode relies on the converter blocking; emulate an 80 Hz HX711.
        sensor = sensor.with_period(Duration::from_micros(12_500));
    }
    let actuator = rig
        .actuator()
        .with_time_scale(env_parse::<f64>("FORCEBENCH_SIM_TIME_SCALE").unwrap_or(0.0));

    tracing::info!(stiffness = params.stiffness, "using simulated rig");
    Ok(Rig {
        sensor: Box::new(sensor),
        actuator: Box::new(actuator),
        backend: "sim",
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn make_rig(cfg: &Config) -> Result<Rig> {
    use forcebench_config::ActuatorKind;
    use forcebench_hardware::{
        HBridgeLinearActuator, HardwareLoadCell, Hx711Gain, PwmLinearActuator,
    };

    let lc = &cfg.load_cell;
    let gain = Hx711Gain::from_channel_gain(lc.channel, lc.gain)?;
    let sensor = HardwareLoadCell::new(
        cfg.pins.lc_dout,
        cfg.pins.lc_sck,
        gain,
        lc.readings_per_measurement,
        lc.tare_readings,
        Duration::from_millis(lc.read_timeout_ms),
    )
    .wrap_err("open hx711")?;

    let model = travel_model(&cfg.actuator);
    let actuator: Box<dyn ActuatorDriver + Send> = match cfg.actuator.kind {
        ActuatorKind::Pwm => Box::new(
            PwmLinearActuator::new(
                cfg.pins.motor_in1,
                cfg.pins.motor_in2,
                cfg.actuator.pwm_frequency_hz,
                cfg.actuator.duty_cycle,
                model,
            )
            .wrap_err("open motor pins")?,
        ),
        ActuatorKind::Hbridge => {
            let enable = cfg
                .pins
                .motor_en
                .ok_or_else(|| eyre::eyre!("invalid configuration: pins.motor_en is missing"))?;
            Box::new(
                HBridgeLinearActuator::new(cfg.pins.motor_in1, cfg.pins.motor_in2, enable, model)
                    .wrap_err("open motor pins")?,
            )
        }
    };

    tracing::info!(kind = ?cfg.actuator.kind, "hardware rig ready");
    Ok(Rig {
        sensor: Box::new(sensor),
        actuator,
        backend: "hardware",
    })
}

fn filter_for(sensor: &SensorCfg) -> FaultFilter {
    FaultFilter::new(sensor.fault_threshold, sensor.fault_delta)
}

/// Track `setpoints` until stopped, a cycle limit, or a fault.
pub fn run_track(
    cfg: &Config,
    setpoints: Vec<i32>,
    max_force: Option<f64>,
    cycles: Option<u64>,
    stop: &Arc<AtomicBool>,
) -> Result<RunSummary> {
    let mut control = ControlCfg::from(cfg);
    if let Some(f) = max_force {
        control.force_ceiling = f;
    }
    let sensor_cfg = SensorCfg::from(cfg);
    let calibration = Calibration::from(&cfg.load_cell);

    let rig = make_rig(cfg)?;
    let controller = ControllerBuilder::new()
        .with_actuator(rig.actuator)
        .with_setpoints(setpoints)
        .with_control(control)
        .with_duty(DutyCfg::from(&cfg.duty))
        .with_stop_flag(stop.clone())
        .build()?;

    let filter = filter_for(&sensor_cfg);
    let timeout = sensor_cfg.read_timeout();
    let hz = sensor_cfg.sample_rate_hz;
    let sampler = if hz > 0 {
        Sampler::spawn(rig.sensor, calibration, filter, hz, timeout, MonotonicClock::new())
    } else {
        Sampler::spawn_event(rig.sensor, calibration, filter, timeout, MonotonicClock::new())
    };

    let stall_ms = runner::compute_stall_threshold_ms(
        sensor_cfg.read_timeout_ms,
        forcebench_core::util::period_ms(hz),
    );
    let opts = RunOptions {
        max_setpoints: cycles,
        stall_threshold: Some(Duration::from_millis(stall_ms)),
        ..RunOptions::default()
    };
    runner::run(controller, sampler, stop, &opts)
}

pub fn run_jog(
    cfg: &Config,
    distance_mm: f64,
    direction: Direction,
    stop: &AtomicBool,
) -> Result<JogReport> {
    let sensor_cfg = SensorCfg::from(cfg);
    let jog_cfg = JogCfg {
        step_mm: cfg.control.step_size_mm,
        max_travel_mm: cfg.actuator.max_travel_mm,
        force_ceiling: cfg.control.force_ceiling,
        read_timeout: sensor_cfg.read_timeout(),
        ..JogCfg::default()
    };
    let mut rig = make_rig(cfg)?;
    let result = forcebench_core::jog::jog(
        &mut rig.sensor,
        &mut rig.actuator,
        &Calibration::from(&cfg.load_cell),
        &mut filter_for(&sensor_cfg),
        distance_mm,
        direction,
        &jog_cfg,
        Some(stop),
    );
    rig.actuator.shutdown();
    result
}

pub fn run_probe(cfg: &Config, samples: usize) -> Result<ProbeReport> {
    let sensor_cfg = SensorCfg::from(cfg);
    let mut rig = make_rig(cfg)?;
    let result = forcebench_core::probe::probe(
        &mut rig.sensor,
        &Calibration::from(&cfg.load_cell),
        &mut filter_for(&sensor_cfg),
        samples,
        sensor_cfg.read_timeout(),
        &MonotonicClock::new(),
    );
    rig.actuator.shutdown();
    result
}

/// Send the actuator home and release the driver.
pub fn run_release(cfg: &Config) -> Result<()> {
    let mut rig = make_rig(cfg)?;
    let homed = rig
        .actuator
        .reset_to_home()
        .map_err(|e| Report::new(map_actuator_error(e.as_ref())));
    rig.actuator.shutdown();
    homed?;
    tracing::info!("actuator released");
    Ok(())
}

/// Bring up the rig and build a controller without moving anything.
pub fn self_check(cfg: &Config, setpoints: Vec<i32>) -> Result<&'static str> {
    let n = setpoints.len();
    let rig = make_rig(cfg)?;
    let backend = rig.backend;
    let mut controller = ControllerBuilder::new()
        .with_actuator(rig.actuator)
        .with_setpoints(setpoints)
        .with_control(ControlCfg::from(cfg))
        .with_duty(DutyCfg::from(&cfg.duty))
        .build()
        .wrap_err("self-check: controller")?;
    controller.actuator_mut().shutdown();
    tracing::info!(setpoints = n, backend, "self-check passed");
    Ok(backend)
}
