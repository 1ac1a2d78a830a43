//! HX711 channel/gain selection.

use crate::error::{HwError, Result};

/// Input channel and PGA gain of the next HX711 conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hx711Gain {
    A128,
    B32,
    A64,
}

impl Hx711Gain {
    pub fn from_channel_gain(channel: char, gain: u8) -> Result<Self> {
        match (channel.to_ascii_uppercase(), gain) {
            ('A', 128) => Ok(Self::A128),
            ('B', 32) => Ok(Self::B32),
            ('A', 64) => Ok(Self::A64),
            _ => Err(HwError::UnsupportedGain { channel, gain }),
        }
    }

    /// Extra SCK pulses after the 24 data bits that select the next conversion.
    pub fn extra_pulses(self) -> u8 {
        match self {
            Self::A128 => 1,
            Self::B32 => 2,
            Self::A64 => 3,
        }
    }
}
