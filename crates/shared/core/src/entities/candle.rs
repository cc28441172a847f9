use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::values::{Amount, Price, UnixTime};

/// Volume candle colour, serialized as the literal RGBA strings charting
/// front-ends consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "rgba(0, 150, 136, 0.5)")]
    Green,
    #[serde(rename = "rgba(255, 82, 82, 0.5)")]
    Red,
}

impl Color {
    pub const GREEN: &'static str = "rgba(0, 150, 136, 0.5)";
    pub const RED: &'static str = "rgba(255, 82, 82, 0.5)";

    /// Green iff the candle closed above its open
    pub fn for_move(open: Price, close: Price) -> Self {
        if close > open { Color::Green } else { Color::Red }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Green => Self::GREEN,
            Color::Red => Self::RED,
        }
    }
}

/// OHLC candle; `time` is the bucket start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCandle {
    pub time: UnixTime,
    #[serde(with = "rust_decimal::serde::float")]
    pub open: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Price,
}

impl PriceCandle {
    /// Candle opened by a single trade
    pub fn opened_at(time: UnixTime, price: Price) -> Self {
        Self {
            time,
            open: price,
            close: price,
            high: price,
            low: price,
        }
    }

    /// Fold a later trade into the candle
    pub fn update(&mut self, price: Price) {
        self.close = price;
        self.high = self.high.max(price);
        self.low = self.low.min(price);
    }

    pub fn color(&self) -> Color {
        Color::for_move(self.open, self.close)
    }
}

/// Traded volume for one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeCandle {
    pub time: UnixTime,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Amount,
    pub color: Color,
}

impl VolumeCandle {
    /// Volume candle matching a price candle; colour derived from its move
    pub fn for_price(candle: &PriceCandle, value: Amount) -> Self {
        Self {
            time: candle.time,
            value,
            color: candle.color(),
        }
    }
}

/// Price and volume candles over the trailing window, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KLine {
    pub price_candles: Vec<PriceCandle>,
    pub volume_candles: Vec<VolumeCandle>,
}

impl KLine {
    pub fn len(&self) -> usize {
        self.price_candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.price_candles.is_empty()
    }

    /// Check ordering, pairing and colour invariants
    pub fn validate(&self) -> DomainResult<()> {
        if self.price_candles.len() != self.volume_candles.len() {
            return Err(DomainError::CandleMismatch(format!(
                "{} price candles vs {} volume candles",
                self.price_candles.len(),
                self.volume_candles.len()
            )));
        }
        if let Some(index) = first_descending(self.price_candles.iter().map(|c| c.time)) {
            return Err(DomainError::NonChronological {
                series: "priceCandles",
                index,
            });
        }

        for (price, volume) in self.price_candles.iter().zip(&self.volume_candles) {
            if price.time != volume.time {
                return Err(DomainError::CandleMismatch(format!(
                    "price candle at {} paired with volume candle at {}",
                    price.time, volume.time
                )));
            }
            if volume.color != price.color() {
                return Err(DomainError::CandleMismatch(format!(
                    "volume colour at {} disagrees with close - open",
                    price.time
                )));
            }
            if volume.value < Decimal::ZERO {
                return Err(DomainError::Negative {
                    field: "volume",
                    value: volume.value,
                });
            }
        }
        Ok(())
    }
}

/// Index of the first element smaller than its predecessor
pub(crate) fn first_descending(times: impl Iterator<Item = UnixTime>) -> Option<usize> {
    let mut previous: Option<UnixTime> = None;
    for (index, time) in times.enumerate() {
        if previous.is_some_and(|p| time < p) {
            return Some(index);
        }
        previous = Some(time);
    }
    None
}
