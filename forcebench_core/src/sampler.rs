//! Background force sampling.
//!
//! Spawns a thread that owns the `ForceSensor`, calibrates and filters each
//! sample, and publishes into the single-slot handoff. Tracks the last-ok
//! timestamp for watchdog logic. Event-driven and paced variants are
//! provided.
//!
//! Each `Sampler` owns exactly one thread, stopped and joined on `Drop`.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use forcebench_traits::{Clock, ForceSensor};

use crate::calibration::Calibration;
use crate::fault_filter::{FaultFilter, Verdict};
use crate::handoff::{HandoffReader, HandoffWriter, Reading, handoff};
use crate::hw_error::map_hw_error;

/// Read, calibrate and filter one sample.
pub fn sample_once<S: ForceSensor + ?Sized>(
    sensor: &mut S,
    calibration: &Calibration,
    filter: &mut FaultFilter,
    timeout: Duration,
) -> Verdict {
    match sensor.raw_sample(timeout) {
        Ok(raw) => filter.accept(calibration.to_force(raw)),
        Err(e) => {
            let err = map_hw_error(e.as_ref());
            tracing::warn!(error = %err, "force sensor read failed");
            filter.on_read_error()
        }
    }
}

struct Shared {
    shutdown: AtomicBool,
    finished: AtomicBool,
    last_ok: AtomicU64,
    published: AtomicU64,
}

pub struct Sampler {
    reader: HandoffReader,
    shared: Arc<Shared>,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    join_handle: Option<JoinHandle<()>>,
}

impl Sampler {
    /// Sampler paced at `hz` through `clock`.
    pub fn spawn<S, C>(
        sensor: S,
        calibration: Calibration,
        filter: FaultFilter,
        hz: u32,
        timeout: Duration,
        clock: C,
    ) -> Self
    where
        S: ForceSensor + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let period = Duration::from_micros(crate::util::period_us(hz));
        Self::start(sensor, calibration, filter, Some(period), timeout, clock)
    }

    /// Event-driven sampler: relies on the sensor blocking in `raw_sample`
    /// until data is ready and adds no sleeps of its own.
    pub fn spawn_event<S, C>(
        sensor: S,
        calibration: Calibration,
        filter: FaultFilter,
        timeout: Duration,
        clock: C,
    ) -> Self
    where
        S: ForceSensor + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        Self::start(sensor, calibration, filter, None, timeout, clock)
    }

    fn start<S, C>(
        mut sensor: S,
        calibration: Calibration,
        mut filter: FaultFilter,
        period: Option<Duration>,
        timeout: Duration,
        clock: C,
    ) -> Self
    where
        S: ForceSensor + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (writer, reader) = handoff();
        let shared = Arc::new(Shared {
            shutdown: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            last_ok: AtomicU64::new(0),
            published: AtomicU64::new(0),
        });
        let clock = Arc::new(clock);
        let epoch = clock.now();
        let thread_shared = shared.clone();
        let thread_clock = clock.clone();

        let join_handle = std::thread::spawn(move || {
            sampling_loop(
                &mut sensor,
                &calibration,
                &mut filter,
                &writer,
                &thread_shared,
                period,
                timeout,
                &*thread_clock,
                epoch,
            );
            thread_shared.finished.store(true, Ordering::Release);
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            reader,
            shared,
            clock,
            epoch,
            join_handle: Some(join_handle),
        }
    }

    /// Newest reading since the last call, if any.
    pub fn latest(&self) -> Option<Reading> {
        self.reader.latest()
    }

    /// Ask the thread to exit after its current read. Does not wait.
    pub fn request_stop(&self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop the thread and wait for it to exit. Idempotent.
    pub fn join(&mut self) {
        self.request_stop();
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("sampler thread joined"),
                Err(e) => tracing::warn!(?e, "sampler thread panicked"),
            }
        }
    }

    /// True once the thread has left its loop (stop request or sensor failure).
    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Acquire)
    }

    /// Readings published so far, republished values included.
    pub fn published(&self) -> u64 {
        self.shared.published.load(Ordering::Relaxed)
    }

    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.shared.last_ok.load(Ordering::Relaxed))
    }

    /// Milliseconds since the last accepted sample, read off the sampling clock.
    pub fn stalled_for_now(&self) -> u64 {
        self.stalled_for(self.clock.ms_since(self.epoch))
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        // Exits after the in-flight read, bounded by the sensor timeout.
        self.join();
    }
}

#[allow(clippy::too_many_arguments)]
fn sampling_loop<S: ForceSensor, C: Clock>(
    sensor: &mut S,
    calibration: &Calibration,
    filter: &mut FaultFilter,
    writer: &HandoffWriter,
    shared: &Shared,
    period: Option<Duration>,
    timeout: Duration,
    clock: &C,
    epoch: Instant,
) {
    loop {
        if shared.shutdown.load(Ordering::Relaxed) {
            tracing::debug!("sampler thread received shutdown signal");
            break;
        }

        let verdict = sample_once(sensor, calibration, filter, timeout);
        if let Some(reading) = verdict.reading() {
            writer.publish(reading);
            shared.published.fetch_add(1, Ordering::Relaxed);
        }
        match verdict {
            Verdict::Accepted(force) => {
                shared.last_ok.store(clock.ms_since(epoch), Ordering::Relaxed);
                tracing::trace!(force, "sample accepted");
            }
            Verdict::Rejected(held) => {
                tracing::warn!(
                    fault_count = filter.fault_count(),
                    ?held,
                    "transient sensor fault"
                );
            }
            Verdict::Failed => {
                tracing::error!("fault budget exhausted, sensor failed");
                break;
            }
        }

        if let Some(p) = period {
            if shared.shutdown.load(Ordering::Relaxed) {
                break;
            }
            clock.sleep(p);
        }
    }
}
