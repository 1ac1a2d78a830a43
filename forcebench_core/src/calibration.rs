/// Linear calibration from raw load-cell counts to force units.
/// force = raw / counts_per_unit + offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub counts_per_unit: f64,
    pub offset: f64,
}

impl Calibration {
    pub fn new(counts_per_unit: f64) -> Self {
        Self {
            counts_per_unit,
            offset: 0.0,
        }
    }

    /// Convert a raw (tared) sample. A zero `counts_per_unit` yields a
    /// non-finite value, which the fault filter rejects.
    #[inline]
    pub fn to_force(&self, raw: f64) -> f64 {
        raw / self.counts_per_unit + self.offset
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(-735.23)
    }
}
