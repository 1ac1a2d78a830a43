//! Maps `Box<dyn Error>` from trait boundaries to typed `TrackerError`.
//!
//! The capability traits use `BoxError`; this module converts those to the
//! typed enum, with an optional feature-gated path for
//! `forcebench_hardware::HwError` downcasting.

use crate::error::TrackerError;

/// Map a sensing-side error to a typed `TrackerError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> TrackerError {
    #[cfg(feature = "hardware-errors")]
    {
        use forcebench_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout | HwError::DataReadyTimeout => TrackerError::Timeout,
                other => TrackerError::Hardware(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        TrackerError::Timeout
    } else {
        TrackerError::Hardware(s)
    }
}

/// Map an actuator-side error. Every motion failure is an actuator fault.
pub fn map_actuator_error(e: &(dyn std::error::Error + 'static)) -> TrackerError {
    #[cfg(feature = "hardware-errors")]
    {
        use forcebench_hardware::error::HwError;
        if let Some(HwError::InvalidDistance(d)) = e.downcast_ref::<HwError>() {
            return TrackerError::Actuator(format!("rejected distance {d} mm"));
        }
    }
    TrackerError::Actuator(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_timeout_maps_to_timeout() {
        let e = std::io::Error::other("read timeout");
        assert_eq!(map_hw_error(&e), TrackerError::Timeout);
    }

    #[test]
    fn other_errors_map_to_hardware() {
        let e = std::io::Error::other("bus fault");
        assert_eq!(map_hw_error(&e), TrackerError::Hardware("bus fault".into()));
    }

    #[test]
    fn actuator_errors_are_actuator_faults() {
        let e = std::io::Error::other("driver stalled");
        assert!(matches!(map_actuator_error(&e), TrackerError::Actuator(s) if s == "driver stalled"));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_are_downcast() {
        use forcebench_hardware::error::HwError;
        assert_eq!(map_hw_error(&HwError::DataReadyTimeout), TrackerError::Timeout);
        assert!(matches!(
            map_actuator_error(&HwError::InvalidDistance(-1.0)),
            TrackerError::Actuator(s) if s.contains("-1")
        ));
    }
}
