use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("load cell timeout")]
    Timeout,
    #[error("hx711 data-ready timeout")]
    DataReadyTimeout,
    #[error("invalid movement distance: {0} mm")]
    InvalidDistance(f64),
    #[error("unsupported load cell channel/gain: {channel}/{gain}")]
    UnsupportedGain { channel: char, gain: u8 },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
