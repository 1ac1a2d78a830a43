//! Human-readable error descriptions and structured JSON error formatting.

use forcebench_core::error::{AbortReason, BuildError, TrackerError};
use forcebench_hardware::HwError;

pub fn abort_reason_name(r: AbortReason) -> &'static str {
    match r {
        AbortReason::SensorFailed => "SensorFailed",
        AbortReason::MaxForce => "MaxForce",
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<TrackerError>() {
        Some(TrackerError::Abort(r)) => abort_reason_name(*r),
        Some(TrackerError::Actuator(_)) => "Actuator",
        Some(TrackerError::Hardware(_)) => "Hardware",
        Some(TrackerError::Timeout) => "Timeout",
        Some(TrackerError::Config(_)) => "Config",
        None if err.downcast_ref::<BuildError>().is_some() => "Config",
        None => "Error",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::EmptySetpoints => {
                "What happened: The setpoint sequence is empty.\nLikely causes: [setpoints] has no values and the setpoint file has no entries.\nHow to fix: Add at least one integer setpoint.".to_string()
            }
            BuildError::SetpointAboveCeiling(sp) => format!(
                "What happened: Setpoint {sp} is not below the force ceiling.\nLikely causes: control.force_ceiling (or --max-force) set too low for the sequence.\nHow to fix: Raise the ceiling or lower the setpoint."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<TrackerError>() {
        return match te {
            TrackerError::Abort(AbortReason::SensorFailed) => {
                "What happened: The load cell failed.\nLikely causes: Too many consecutive zero or unreadable samples (wiring, power, or a dead HX711).\nHow to fix: Check the load cell wiring, then run `forcebench probe` before tracking again.".to_string()
            }
            TrackerError::Abort(AbortReason::MaxForce) => {
                "What happened: Measured force reached the ceiling.\nLikely causes: Setpoint too close to the ceiling, or the actuator ran into a hard stop.\nHow to fix: Check the rig, then raise control.force_ceiling or lower the setpoints.".to_string()
            }
            TrackerError::Timeout => {
                "What happened: No accepted load cell reading within the stall window.\nLikely causes: HX711 not wired correctly, no power/ground, or read timeout too low.\nHow to fix: Verify DOUT/SCK pins and power, and consider raising load_cell.read_timeout_ms.".to_string()
            }
            TrackerError::Actuator(msg) => format!(
                "What happened: Actuator fault ({msg}).\nLikely causes: Motor driver wiring or a rejected move distance.\nHow to fix: Check [pins] and [actuator] in the config, then run `forcebench release`."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::Timeout | HwError::DataReadyTimeout => {
                "What happened: HX711 did not produce data within the configured timeout.\nLikely causes: Wrong DOUT/SCK pins, wiring/power issues, or timeout configured too low.\nHow to fix: Check [pins] in the config, verify 5V/GND, and raise load_cell.read_timeout_ms.".to_string()
            }
            HwError::Gpio(msg) => format!(
                "What happened: Failed to initialize hardware pins ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO."
            ),
            other => format!("What happened: {other}.\nHow to fix: Check the [load_cell] and [actuator] sections."),
        };
    }

    // Config and setpoint loading errors carry context chains
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") || lower.contains("missing field") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nDetails: {msg}\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("setpoint") {
        return format!(
            "What happened: Setpoints could not be loaded.\nDetails: {msg}\nHow to fix: Setpoint files must contain integers only (.csv cells or whitespace-separated .txt)."
        );
    }

    format!(
        "Something went wrong: {msg}\nHow to fix: Re-run with --log-level=debug for details."
    )
}

/// Stable exit codes: 3 sensor failed, 4 max force, 5 actuator fault, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<TrackerError>() {
        Some(TrackerError::Abort(AbortReason::SensorFailed)) => 3,
        Some(TrackerError::Abort(AbortReason::MaxForce)) => 4,
        Some(TrackerError::Actuator(_)) => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
