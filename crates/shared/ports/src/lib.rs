//! xbridge Ports
//!
//! Port definitions (traits) for the xbridge connectors.
//! These define the boundary between normalized exchange data and the
//! venue-specific adapters that produce it.

mod client;
mod clock;
mod error;
mod log_sink;

pub use client::ApiClient;
pub use clock::{Clock, Timestamp};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use log_sink::{LogCapture, LogSink};
