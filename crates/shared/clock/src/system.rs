use chrono::Utc;
use xbridge_ports::{Clock, Timestamp};

/// Real system clock
///
/// Returns the current wall-clock time; live connectors anchor their
/// trailing windows on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}
