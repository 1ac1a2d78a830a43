//! Test and helper mocks for forcebench_core.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use forcebench_traits::{ActuatorDriver, BoxError, Direction, ForceSensor};

/// A sensor that always errors on read.
pub struct NoopSensor;

impl ForceSensor for NoopSensor {
    fn raw_sample(&mut self, _timeout: Duration) -> Result<f64, BoxError> {
        Err(Box::new(std::io::Error::other("noop sensor")))
    }
}

/// Replays a fixed list of raw samples, then repeats the last one forever.
/// `None` entries read as errors.
pub struct ScriptedSensor {
    script: VecDeque<Option<f64>>,
    last: Option<f64>,
    period: Duration,
}

impl ScriptedSensor {
    pub fn new(script: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: None,
            period: Duration::ZERO,
        }
    }

    /// Script of successful raw values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(values.into_iter().map(Some))
    }

    /// Block this long inside every read.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

impl ForceSensor for ScriptedSensor {
    fn raw_sample(&mut self, _timeout: Duration) -> Result<f64, BoxError> {
        if !self.period.is_zero() {
            std::thread::sleep(self.period);
        }
        let next = match self.script.pop_front() {
            Some(v) => {
                self.last = v;
                v
            }
            None => self.last,
        };
        next.ok_or_else(|| Box::new(std::io::Error::other("scripted read error")) as BoxError)
    }
}

#[derive(Debug, Default)]
struct ActuatorLog {
    moves: Vec<(f64, Direction)>,
    homings: u32,
    homed: bool,
    shut_down: bool,
    fail_after: Option<usize>,
}

/// Actuator that records every command. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    log: Arc<Mutex<ActuatorLog>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `move_by` after the first `n` succeed.
    pub fn failing_after(self, n: usize) -> Self {
        self.lock().fail_after = Some(n);
        self
    }

    fn lock(&self) -> MutexGuard<'_, ActuatorLog> {
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn moves(&self) -> Vec<(f64, Direction)> {
        self.lock().moves.clone()
    }

    /// Homing sequences that actually moved the actuator.
    pub fn homings(&self) -> u32 {
        self.lock().homings
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }
}

impl ActuatorDriver for RecordingActuator {
    fn move_by(&mut self, distance_mm: f64, direction: Direction) -> Result<(), BoxError> {
        let mut log = self.lock();
        if log.fail_after.is_some_and(|n| log.moves.len() >= n) {
            return Err(Box::new(std::io::Error::other("motor driver fault")));
        }
        log.moves.push((distance_mm, direction));
        log.homed = false;
        Ok(())
    }

    fn reset_to_home(&mut self) -> Result<(), BoxError> {
        let mut log = self.lock();
        if !log.homed {
            log.homings += 1;
            log.homed = true;
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.lock().shut_down = true;
    }
}
