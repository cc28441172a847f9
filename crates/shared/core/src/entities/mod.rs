mod balance;
mod book;
mod candle;
mod decimals;
mod maked_order;
mod order_status;
mod side;
mod trade;

pub use balance::{Balance, Balances};
pub use book::{Order, OrderBook};
pub use candle::{Color, KLine, PriceCandle, VolumeCandle};
pub use decimals::Decimals;
pub use maked_order::MakedOrder;
pub use order_status::Status;
pub use side::Side;
pub use trade::{Trade, TradeHistory};
