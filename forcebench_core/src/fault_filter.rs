//! Transient-fault containment for calibrated force readings.
//!
//! Rules, applied in order with threshold `E` and delta `D`:
//! 1. zero (or non-finite) value while fewer than `E` faults are counted:
//!    count it and republish the last good value;
//! 2. jump larger than `D` from the last good value while more than `E`
//!    faults are counted: count it and republish the last good value;
//! 3. `E` faults already counted: the sensor has failed, for good;
//! 4. otherwise accept the value and clear the count.
//!
//! Rule 3 trips as soon as the count reaches `E`, so rule 2 never holds a
//! value back: a jump larger than `D` is taken as the new level. A real
//! change of load on the rig must not read as a dying sensor.
//!
//! A read error from the sensor counts like rule 1. The first valid value
//! has nothing to be compared against and is accepted as-is.

use crate::handoff::Reading;

/// Outcome of feeding one sample to the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Accepted(f64),
    /// Rejected as transient; carries the value to republish, if any.
    Rejected(Option<f64>),
    Failed,
}

impl Verdict {
    /// What the sampler should publish for this verdict.
    pub fn reading(self) -> Option<Reading> {
        match self {
            Verdict::Accepted(v) | Verdict::Rejected(Some(v)) => Some(Reading::Force(v)),
            Verdict::Rejected(None) => None,
            Verdict::Failed => Some(Reading::SensorFailed),
        }
    }

    /// The measurement this verdict stands for, if there is one.
    pub fn force(self) -> Option<f64> {
        match self {
            Verdict::Accepted(v) | Verdict::Rejected(Some(v)) => Some(v),
            Verdict::Rejected(None) | Verdict::Failed => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FaultFilter {
    threshold: u32,
    delta: f64,
    count: u32,
    last_good: Option<f64>,
    failed: bool,
}

impl FaultFilter {
    pub fn new(threshold: u32, delta: f64) -> Self {
        Self {
            threshold,
            delta,
            count: 0,
            last_good: None,
            failed: false,
        }
    }

    pub fn accept(&mut self, value: f64) -> Verdict {
        if self.failed {
            return Verdict::Failed;
        }
        let blank = value == 0.0 || !value.is_finite();
        let within_budget = self.count < self.threshold;

        if blank && within_budget {
            return self.reject();
        }
        if self.count > self.threshold
            && self
                .last_good
                .is_some_and(|prev| (value - prev).abs() > self.delta)
        {
            return self.reject();
        }
        if !within_budget {
            self.failed = true;
            return Verdict::Failed;
        }
        self.count = 0;
        self.last_good = Some(value);
        Verdict::Accepted(value)
    }

    /// Account for a sample the sensor could not deliver.
    pub fn on_read_error(&mut self) -> Verdict {
        if self.failed {
            return Verdict::Failed;
        }
        if self.count < self.threshold {
            return self.reject();
        }
        self.failed = true;
        Verdict::Failed
    }

    fn reject(&mut self) -> Verdict {
        self.count += 1;
        Verdict::Rejected(self.last_good)
    }

    pub fn fault_count(&self) -> u32 {
        self.count
    }

    pub fn last_good(&self) -> Option<f64> {
        self.last_good
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}
