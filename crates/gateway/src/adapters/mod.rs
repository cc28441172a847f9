//! Exchange connectors
//!
//! Each adapter implements the [`ApiClient`](xbridge_ports::ApiClient) port
//! for one venue, translating canonical symbols to native notation and
//! native payloads into the normalized model.

pub mod simulator;

pub use simulator::SimulatedExchange;
