//! xbridge Clock Infrastructure
//!
//! Time sources for anchoring trailing windows:
//!
//! - [`SystemClock`]: wall-clock time for live connectors
//! - [`ManualClock`]: frozen time that only moves when told to
//!
//! ## Usage
//!
//! ```ignore
//! use xbridge_clock::{Clock, ManualClock};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let clock = ManualClock::at(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
//! clock.advance(Duration::hours(1));
//! assert_eq!(clock.unix_now(), 1_700_003_600);
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use xbridge_ports::Clock;
