use chrono::Duration;
use xbridge_core::UnixTime;
use xbridge_ports::Clock;

/// Default trailing span for klines and trade history
pub const DEFAULT_TRAILING_HOURS: i64 = 12;

/// Closed time interval `[start, end]` in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingWindow {
    pub start: UnixTime,
    pub end: UnixTime,
}

impl TrailingWindow {
    pub fn new(start: UnixTime, end: UnixTime) -> Self {
        Self { start, end }
    }

    /// Window of `span` ending at `end`
    pub fn ending_at(end: UnixTime, span: Duration) -> Self {
        Self {
            start: end - span.num_seconds(),
            end,
        }
    }

    /// Window of `span` ending now according to `clock`
    pub fn trailing(clock: &dyn Clock, span: Duration) -> Self {
        Self::ending_at(clock.unix_now(), span)
    }

    pub fn default_span() -> Duration {
        Duration::hours(DEFAULT_TRAILING_HOURS)
    }

    pub fn contains(&self, time: UnixTime) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn span_seconds(&self) -> i64 {
        self.end - self.start
    }
}
