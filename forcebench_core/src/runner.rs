use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use forcebench_traits::ActuatorDriver;

use crate::controller::ForceController;
use crate::error::{Report, Result, TrackerError};
use crate::sampler::Sampler;
use crate::status::ControlStatus;

/// Why a run ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The stop flag was raised (operator interrupt).
    Operator,
    /// `max_setpoints` setpoints were satisfied.
    CycleLimit,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stop cleanly after this many satisfied setpoints.
    pub max_setpoints: Option<u64>,
    /// Pause between cycles that issued no motion.
    pub idle_poll: Duration,
    /// Abort with `Timeout` when no sample was accepted for this long.
    pub stall_threshold: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_setpoints: None,
            idle_poll: Duration::from_millis(2),
            stall_threshold: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cause: StopCause,
    pub setpoints_completed: u64,
    pub moves: u64,
    pub last_measurement: Option<f64>,
}

/// Stall threshold from the per-read timeout and sampling period: four read
/// timeouts, but never less than two periods.
#[inline]
pub fn compute_stall_threshold_ms(sensor_timeout_ms: u64, period_ms: u64) -> u64 {
    sensor_timeout_ms
        .saturating_mul(4)
        .max(period_ms.saturating_mul(2))
        .max(1)
}

/// Home the actuator, then track setpoints until the stop flag is raised,
/// `max_setpoints` is reached, or a fault aborts the run. The shutdown
/// sequence runs on every one of these paths.
pub fn run<A: ActuatorDriver>(
    controller: ForceController<A>,
    sampler: Sampler,
    stop: &AtomicBool,
    opts: &RunOptions,
) -> Result<RunSummary> {
    let mut controller = controller;
    let mut sampler = sampler;
    tracing::info!(
        setpoint = controller.setpoint(),
        max_setpoints = ?opts.max_setpoints,
        "run start"
    );

    let result = controller
        .home()
        .and_then(|()| track(&mut controller, &sampler, stop, opts));

    if let Err(e) = &result {
        tracing::error!(error = %e, "run aborted");
    }
    shutdown_sequence(controller.actuator_mut(), &mut sampler);
    result
}

fn track<A: ActuatorDriver>(
    controller: &mut ForceController<A>,
    sampler: &Sampler,
    stop: &AtomicBool,
    opts: &RunOptions,
) -> Result<RunSummary> {
    let summary = |c: &ForceController<A>, cause| RunSummary {
        cause,
        setpoints_completed: c.completed(),
        moves: c.moves(),
        last_measurement: c.last_measurement(),
    };

    loop {
        if stop.load(Ordering::Relaxed) {
            tracing::info!("stop requested");
            return Ok(summary(controller, StopCause::Operator));
        }
        if opts
            .max_setpoints
            .is_some_and(|max| controller.completed() >= max)
        {
            tracing::info!(completed = controller.completed(), "setpoint limit reached");
            return Ok(summary(controller, StopCause::CycleLimit));
        }
        if let Some(limit) = opts.stall_threshold {
            let stalled = sampler.stalled_for_now();
            if u128::from(stalled) > limit.as_millis() {
                tracing::error!(stalled_ms = stalled, "sensor stalled");
                return Err(Report::new(TrackerError::Timeout));
            }
        }

        match controller.step(sampler.latest())? {
            ControlStatus::Moved(_) | ControlStatus::Advanced { .. } => {}
            ControlStatus::Waiting | ControlStatus::Holding(_) => {
                std::thread::sleep(opts.idle_poll);
            }
            ControlStatus::Aborted(e) => return Err(Report::new(e)),
        }
    }
}

/// Single teardown path: stop the sampler, send the actuator home, release
/// the driver, then join the sampler thread. Failures are logged, never
/// propagated.
pub fn shutdown_sequence<A: ActuatorDriver + ?Sized>(actuator: &mut A, sampler: &mut Sampler) {
    tracing::info!("shutdown: stopping sampler");
    sampler.request_stop();
    if let Err(e) = actuator.reset_to_home() {
        tracing::warn!(error = %e, "shutdown: could not return actuator home");
    }
    actuator.shutdown();
    sampler.join();
    tracing::info!("shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::compute_stall_threshold_ms;

    #[test]
    fn threshold_is_four_timeouts() {
        assert_eq!(compute_stall_threshold_ms(500, 12), 2000);
    }

    #[test]
    fn threshold_spans_two_periods_at_least() {
        assert_eq!(compute_stall_threshold_ms(1, 100), 200);
        assert_eq!(compute_stall_threshold_ms(0, 0), 1);
    }
}
