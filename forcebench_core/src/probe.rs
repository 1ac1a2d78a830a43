//! Load-cell bench check: collect filtered measurements and summarize them.

use std::time::Duration;

use forcebench_traits::{Clock, ForceSensor};

use crate::calibration::Calibration;
use crate::error::{AbortReason, BuildError, Report, Result, TrackerError};
use crate::fault_filter::{FaultFilter, Verdict};
use crate::sampler::sample_once;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub samples: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Samples the filter rejected along the way.
    pub rejected: u32,
    pub elapsed: Duration,
}

pub fn probe<S: ForceSensor + ?Sized>(
    sensor: &mut S,
    calibration: &Calibration,
    filter: &mut FaultFilter,
    samples: usize,
    timeout: Duration,
    clock: &dyn Clock,
) -> Result<ProbeReport> {
    if samples == 0 {
        return Err(Report::new(BuildError::InvalidConfig("probe needs at least one sample")));
    }
    let start = clock.now();
    let mut values = Vec::with_capacity(samples);
    let mut rejected = 0u32;

    while values.len() < samples {
        match sample_once(sensor, calibration, filter, timeout) {
            Verdict::Accepted(v) => values.push(v),
            Verdict::Rejected(_) => rejected += 1,
            Verdict::Failed => {
                return Err(Report::new(TrackerError::Abort(AbortReason::SensorFailed)));
            }
        }
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let report = ProbeReport {
        samples: values.len(),
        min,
        max,
        mean,
        rejected,
        elapsed: clock.now().saturating_duration_since(start),
    };
    tracing::info!(
        samples = report.samples,
        min,
        max,
        mean,
        rejected,
        "probe complete"
    );
    Ok(report)
}
