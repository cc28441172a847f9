//! Market data normalizers
//!
//! Turn raw exchange payloads (already decoded into core values) into the
//! uniform model: sorted books, oldest-first candles and trade histories
//! restricted to the trailing window. Invariant violations surface as
//! validation errors; nothing is silently repaired.

mod candles;
mod order_book;
mod trades;
mod window;

pub use candles::{RawCandle, build_kline, normalize_candles};
pub use order_book::normalize_order_book;
pub use trades::{
    MAX_TRADE_PAGES, TradeCursor, collect_trailing_trades, normalize_trade_history,
};
pub use window::{DEFAULT_TRAILING_HOURS, TrailingWindow};
