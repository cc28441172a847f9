use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use xbridge_ports::{Clock, Timestamp};

/// Clock frozen at a given instant
///
/// Time only moves through [`advance`](ManualClock::advance) or
/// [`set_time`](ManualClock::set_time). Clones share the same instant, so a
/// test can hold one handle while a connector reads through another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<RwLock<Timestamp>>,
}

impl ManualClock {
    pub fn at(time: Timestamp) -> Self {
        Self {
            current: Arc::new(RwLock::new(time)),
        }
    }

    /// Frozen at the current wall-clock time
    pub fn frozen_now() -> Self {
        Self::at(Utc::now())
    }

    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    pub fn set_time(&self, time: Timestamp) {
        *self.current.write() = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.read()
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
