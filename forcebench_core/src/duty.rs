//! Duty-cycle governor: forces a rest after each active window.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use forcebench_traits::Clock;

use crate::config::DutyCfg;

pub struct DutyGovernor {
    clock: Arc<dyn Clock + Send + Sync>,
    window: Duration,
    rest_fraction: f64,
    window_start: Instant,
    stop: Option<Arc<AtomicBool>>,
}

impl DutyGovernor {
    pub fn new(cfg: &DutyCfg, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let rest_fraction = if cfg.rest_fraction.is_finite() {
            cfg.rest_fraction.max(0.0)
        } else {
            0.0
        };
        let window_start = clock.now();
        Self {
            clock,
            window: Duration::from_millis(cfg.window_ms),
            rest_fraction,
            window_start,
            stop: None,
        }
    }

    /// Cut rests short once `stop` is set.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Time spent in the current window.
    pub fn window_elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.window_start)
    }

    /// Length of the rest imposed once a window fills up.
    pub fn rest_duration(&self) -> Duration {
        self.window.mul_f64(self.rest_fraction)
    }

    /// Called after every satisfied setpoint. When the window has filled,
    /// blocks for the rest period and opens a new window afterwards.
    /// Returns the rest actually taken.
    pub fn on_segment_complete(&mut self) -> Option<Duration> {
        let elapsed = self.window_elapsed();
        if elapsed < self.window {
            return None;
        }
        let rest = self.rest_duration();
        tracing::info!(
            elapsed = ?elapsed,
            rest = ?rest,
            "duty window full, resting"
        );
        let slept =
            crate::util::interruptible_sleep(self.clock.as_ref(), rest, self.stop.as_deref());
        self.window_start = self.clock.now();
        Some(slept)
    }
}

impl core::fmt::Debug for DutyGovernor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DutyGovernor")
            .field("window", &self.window)
            .field("rest_fraction", &self.rest_fraction)
            .field("window_elapsed", &self.window_elapsed())
            .finish()
    }
}
