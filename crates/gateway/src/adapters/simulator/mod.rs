//! Simulated exchange connector
//!
//! In-memory venue used by tests and paper sessions. Speaks the same
//! [`ApiClient`](xbridge_ports::ApiClient) contract as a live connector.

mod exchange;
mod market;

pub use exchange::SimulatedExchange;
