//! Tradable pair definitions
//!
//! Pairs are identified canonically as `"LEFT_RIGHT"` (e.g. `"BTC_ETH"`).
//! Connectors translate to and from the exchange's native notation.

mod pair;

pub use pair::{CurrencyPair, PairNotation};
