//! Single-slot, latest-value-wins mailbox between the sampler thread and
//! the controller.
//!
//! Built on a `bounded(1)` crossbeam channel. The writer keeps a receiver
//! clone so it can evict an unread value instead of blocking; the reader
//! drains whatever is queued and keeps the newest.
use crossbeam_channel as xch;

/// Payload crossing the handoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Calibrated, filtered force.
    Force(f64),
    /// Fault budget exhausted; the sampler has stopped.
    SensorFailed,
}

pub struct HandoffWriter {
    tx: xch::Sender<Reading>,
    evict: xch::Receiver<Reading>,
}

pub struct HandoffReader {
    rx: xch::Receiver<Reading>,
}

/// Create a connected writer/reader pair.
pub fn handoff() -> (HandoffWriter, HandoffReader) {
    let (tx, rx) = xch::bounded(1);
    (
        HandoffWriter {
            tx,
            evict: rx.clone(),
        },
        HandoffReader { rx },
    )
}

impl HandoffWriter {
    /// Publish `reading`, overwriting any value the reader has not taken yet.
    /// Never blocks.
    pub fn publish(&self, reading: Reading) {
        let mut msg = reading;
        loop {
            match self.tx.try_send(msg) {
                Ok(()) => return,
                Err(xch::TrySendError::Full(m)) => {
                    let _ = self.evict.try_recv();
                    msg = m;
                }
                Err(xch::TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl HandoffReader {
    /// Newest unread value, or `None` when nothing arrived since the last call.
    pub fn latest(&self) -> Option<Reading> {
        self.rx.try_iter().last()
    }
}
