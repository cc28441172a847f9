use chrono::{DateTime, Utc};
use xbridge_core::UnixTime;

pub type Timestamp = DateTime<Utc>;

/// Port for time abstraction
///
/// Trailing windows are anchored on this clock, so tests can pin "now":
/// - Real system time for live connectors
/// - Manually driven time for deterministic tests
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Current time as unix seconds
    fn unix_now(&self) -> UnixTime {
        self.now().timestamp()
    }

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
