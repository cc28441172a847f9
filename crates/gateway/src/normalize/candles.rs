use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xbridge_core::{
    Amount, DomainError, DomainResult, KLine, Price, PriceCandle, Trade, UnixTime, VolumeCandle,
};

use super::TrailingWindow;

/// Native OHLCV row as returned by exchanges that bucket server-side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandle {
    pub time: UnixTime,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Amount,
}

/// Bucket raw trades into candles of `period_minutes`
///
/// Buckets start on multiples of the period since the epoch. Trades outside
/// `window` are ignored and buckets without trades are omitted. Volume is the
/// traded amount in the right currency.
pub fn build_kline(
    trades: &[Trade],
    period_minutes: u32,
    window: &TrailingWindow,
) -> DomainResult<KLine> {
    let period = period_seconds(period_minutes)?;

    let mut in_window: Vec<&Trade> = trades.iter().filter(|t| window.contains(t.time)).collect();
    in_window.sort_by_key(|t| t.time);

    let mut buckets: BTreeMap<UnixTime, (PriceCandle, Amount)> = BTreeMap::new();
    for trade in in_window {
        if trade.price <= Decimal::ZERO {
            return Err(DomainError::NonPositive {
                field: "price",
                value: trade.price,
            });
        }
        if trade.amount < Decimal::ZERO {
            return Err(DomainError::Negative {
                field: "amount",
                value: trade.amount,
            });
        }

        let bucket = trade.time - trade.time.rem_euclid(period);
        buckets
            .entry(bucket)
            .and_modify(|(candle, volume)| {
                candle.update(trade.price);
                *volume += trade.amount;
            })
            .or_insert_with(|| (PriceCandle::opened_at(bucket, trade.price), trade.amount));
    }

    Ok(assemble(buckets.into_values()))
}

/// Normalize server-side candles: window filter, chronological order and
/// volume colours derived from each candle's move
pub fn normalize_candles(raw: Vec<RawCandle>, window: &TrailingWindow) -> DomainResult<KLine> {
    let mut rows: Vec<RawCandle> = raw.into_iter().filter(|c| window.contains(c.time)).collect();
    rows.sort_by_key(|c| c.time);

    for pair in rows.windows(2) {
        if pair[0].time == pair[1].time {
            return Err(DomainError::CandleMismatch(format!(
                "duplicate candle at {}",
                pair[0].time
            )));
        }
    }
    for row in &rows {
        check_row(row)?;
    }

    let kline = assemble(rows.into_iter().map(|row| {
        (
            PriceCandle {
                time: row.time,
                open: row.open,
                close: row.close,
                high: row.high,
                low: row.low,
            },
            row.volume,
        )
    }));
    kline.validate()?;
    Ok(kline)
}

fn period_seconds(period_minutes: u32) -> DomainResult<i64> {
    if period_minutes == 0 {
        return Err(DomainError::NonPositive {
            field: "candle period",
            value: Decimal::ZERO,
        });
    }
    Ok(i64::from(period_minutes) * 60)
}

fn check_row(row: &RawCandle) -> DomainResult<()> {
    for (field, value) in [
        ("open", row.open),
        ("high", row.high),
        ("low", row.low),
        ("close", row.close),
    ] {
        if value <= Decimal::ZERO {
            return Err(DomainError::NonPositive { field, value });
        }
    }
    if row.high < row.open.max(row.close) || row.low > row.open.min(row.close) {
        return Err(DomainError::CandleMismatch(format!(
            "candle at {} has range [{}, {}] outside its open/close",
            row.time, row.low, row.high
        )));
    }
    if row.volume < Decimal::ZERO {
        return Err(DomainError::Negative {
            field: "volume",
            value: row.volume,
        });
    }
    Ok(())
}

fn assemble(candles: impl Iterator<Item = (PriceCandle, Amount)>) -> KLine {
    let mut kline = KLine::default();
    for (candle, volume) in candles {
        kline
            .volume_candles
            .push(VolumeCandle::for_price(&candle, volume));
        kline.price_candles.push(candle);
    }
    kline
}
