use std::future::Future;

use log::{debug, warn};
use rust_decimal::Decimal;
use xbridge_core::{DomainError, DomainResult, Trade, TradeHistory, UnixTime};

use super::TrailingWindow;

/// Upper bound on pages fetched for one trailing history
pub const MAX_TRADE_PAGES: usize = 50;

/// Restrict trades to `window` and order them oldest first
///
/// The sort is stable, so trades sharing a timestamp keep venue order.
pub fn normalize_trade_history(
    trades: Vec<Trade>,
    window: &TrailingWindow,
) -> DomainResult<TradeHistory> {
    let mut history = Vec::with_capacity(trades.len());
    for trade in trades {
        if !window.contains(trade.time) {
            continue;
        }
        if trade.price <= Decimal::ZERO {
            return Err(DomainError::NonPositive {
                field: "price",
                value: trade.price,
            });
        }
        if trade.amount <= Decimal::ZERO {
            return Err(DomainError::NonPositive {
                field: "amount",
                value: trade.amount,
            });
        }
        history.push(trade);
    }
    history.sort_by_key(|t| t.time);
    Ok(TradeHistory::new(history))
}

/// Position in a newest-first trade feed
///
/// Trades at `time` can span a page boundary, so the cursor also counts how
/// many of them were already returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeCursor {
    /// Oldest timestamp reached so far
    pub time: UnixTime,
    /// Trades at exactly `time` already returned
    pub seen_at_time: usize,
}

impl TradeCursor {
    /// Cursor after receiving `page`; `None` if the page is empty
    pub fn advance(previous: Option<TradeCursor>, page: &[Trade]) -> Option<TradeCursor> {
        let oldest = page.iter().map(|t| t.time).min()?;
        let at_oldest = page.iter().filter(|t| t.time == oldest).count();
        let seen_at_time = match previous {
            Some(c) if c.time == oldest => c.seen_at_time + at_oldest,
            _ => at_oldest,
        };
        Some(TradeCursor {
            time: oldest,
            seen_at_time,
        })
    }

    /// Returns true if a trade at `time` may follow this cursor
    pub fn admits(&self, time: UnixTime) -> bool {
        time <= self.time
    }
}

/// Drive exchange-side pagination until the window start is covered
///
/// `fetch_page(cursor)` must return the next trades after `cursor` in a
/// newest-first feed (the newest page when `None`): everything older than
/// `cursor.time`, plus the trades at `cursor.time` past the first
/// `cursor.seen_at_time`. Collection stops when a page reaches back past
/// `window.start`, comes back empty, returns trades newer than the cursor,
/// or after `max_pages` pages.
pub async fn collect_trailing_trades<F, Fut, E>(
    window: &TrailingWindow,
    max_pages: usize,
    mut fetch_page: F,
) -> Result<TradeHistory, E>
where
    F: FnMut(Option<TradeCursor>) -> Fut,
    Fut: Future<Output = Result<Vec<Trade>, E>>,
    E: From<DomainError>,
{
    let mut collected = Vec::new();
    let mut cursor: Option<TradeCursor> = None;

    for page in 0..max_pages {
        let batch = fetch_page(cursor).await?;
        if let Some(c) = cursor {
            if batch.iter().any(|t| !c.admits(t.time)) {
                warn!("Trade pagination stalled at cursor {}", c.time);
                break;
            }
        }
        let Some(next) = TradeCursor::advance(cursor, &batch) else {
            debug!("Trade page {} empty, history exhausted", page);
            break;
        };
        collected.extend(batch);

        // trades at the window start may continue on the next page
        if next.time < window.start {
            break;
        }
        cursor = Some(next);

        if page + 1 == max_pages {
            warn!(
                "Trade history truncated after {} pages; oldest trade at {}",
                max_pages, next.time
            );
        }
    }

    // newest-first feed; reversed so equal timestamps stay in venue order
    collected.reverse();
    Ok(normalize_trade_history(collected, window)?)
}
