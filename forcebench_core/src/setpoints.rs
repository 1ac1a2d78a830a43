//! Cyclic setpoint sequence.

use crate::error::BuildError;

/// Ordered force targets, served forever: after the last element the
/// sequence wraps to the first.
#[derive(Debug, Clone)]
pub struct SetpointSource {
    values: Vec<i32>,
    cursor: usize,
}

impl SetpointSource {
    pub fn new(values: Vec<i32>) -> Result<Self, BuildError> {
        if values.is_empty() {
            return Err(BuildError::EmptySetpoints);
        }
        Ok(Self { values, cursor: 0 })
    }

    /// Next setpoint, cycling back to index 0 after the last one.
    pub fn next_setpoint(&mut self) -> i32 {
        let v = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        v
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }
}

impl Iterator for SetpointSource {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        Some(self.next_setpoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_is_rejected() {
        assert_eq!(SetpointSource::new(vec![]).unwrap_err(), BuildError::EmptySetpoints);
    }

    #[test]
    fn wraps_after_last() {
        let src = SetpointSource::new(vec![50, 10, 30]).unwrap();
        let seen: Vec<i32> = src.take(7).collect();
        assert_eq!(seen, vec![50, 10, 30, 50, 10, 30, 50]);
    }

    #[test]
    fn single_value_repeats() {
        let mut src = SetpointSource::new(vec![7]).unwrap();
        assert_eq!(src.next_setpoint(), 7);
        assert_eq!(src.next_setpoint(), 7);
    }
}
