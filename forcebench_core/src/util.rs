//! Common time/period helpers for forcebench_core.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use forcebench_traits::Clock;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Longest uninterrupted slice of a pause; bounds stop-flag latency.
pub const PAUSE_SLICE: Duration = Duration::from_millis(50);

/// Compute the period in microseconds for a given sampling rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Compute the period in milliseconds for a given sampling rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 millisecond.
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Sleep `total` through `clock` in slices, returning early once `stop` is set.
/// Returns the time actually slept.
pub fn interruptible_sleep(
    clock: &dyn Clock,
    total: Duration,
    stop: Option<&AtomicBool>,
) -> Duration {
    let mut slept = Duration::ZERO;
    while slept < total {
        if stop.is_some_and(|s| s.load(Ordering::Relaxed)) {
            break;
        }
        let slice = (total - slept).min(PAUSE_SLICE);
        clock.sleep(slice);
        slept += slice;
    }
    slept
}

#[cfg(test)]
mod tests {
    use super::*;
    use forcebench_traits::ManualClock;

    #[test]
    fn periods_clamp_zero_hz() {
        assert_eq!(period_us(0), 1_000_000);
        assert_eq!(period_ms(0), 1_000);
        assert_eq!(period_ms(80), 12);
        assert_eq!(period_ms(5_000), 1);
    }

    #[test]
    fn sleep_runs_to_completion_without_stop() {
        let clock = ManualClock::new();
        let slept = interruptible_sleep(&clock, Duration::from_millis(175), None);
        assert_eq!(slept, Duration::from_millis(175));
        assert_eq!(clock.total_slept(), Duration::from_millis(175));
    }

    #[test]
    fn stop_flag_cuts_the_pause_short() {
        let clock = ManualClock::new();
        let stop = AtomicBool::new(true);
        let slept = interruptible_sleep(&clock, Duration::from_secs(10), Some(&stop));
        assert_eq!(slept, Duration::ZERO);
    }
}
