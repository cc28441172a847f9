use std::cmp::Reverse;

use rust_decimal::Decimal;
use xbridge_core::{
    Amount, CurrencyPair, Decimals, DomainResult, Order, OrderBook, OrderId, Price, Quantity,
    Side, Trade, UnixTime, checked_add, checked_mul,
};

use crate::normalize::{TradeCursor, normalize_order_book};

/// Executed part of a limit order crossing resting liquidity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fill {
    /// Quantity traded, in the right currency
    pub right: Quantity,
    /// Counter-value paid or received, in the left currency
    pub left: Amount,
}

impl Fill {
    pub fn is_empty(&self) -> bool {
        self.right.is_zero()
    }
}

/// Unfilled remainder of an account order shown on the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resting {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

/// Execution against one of the account's resting orders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerFill {
    pub id: OrderId,
    pub right: Quantity,
    pub price: Price,
}

/// Outcome of crossing one incoming order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Take {
    /// What the incoming order executed
    pub fill: Fill,
    /// Resting account orders it executed against, in match order
    pub makers: Vec<MakerFill>,
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Venue(usize),
    Own(usize),
}

/// State of one simulated market
///
/// `book` holds third-party liquidity the way the venue reports it:
/// unsorted until the first match rewrites it. The account's own unfilled
/// orders live in `resting` and are merged into every book snapshot.
#[derive(Debug, Clone)]
pub struct Market {
    pub pair: CurrencyPair,
    pub decimals: Decimals,
    pub book: OrderBook,
    pub resting: Vec<Resting>,
    pub trades: Vec<Trade>,
}

impl Market {
    pub fn new(pair: CurrencyPair, decimals: Decimals) -> Self {
        Self {
            pair,
            decimals,
            book: OrderBook::default(),
            resting: Vec::new(),
            trades: Vec::new(),
        }
    }

    /// Public book: third-party levels plus the account's resting orders
    pub fn visible_book(&self) -> DomainResult<OrderBook> {
        let mut book = self.book.clone();
        for order in &self.resting {
            let level = Order::new(order.price, order.quantity);
            match order.side {
                Side::Buy => book.bids.push(level),
                Side::Sell => book.asks.push(level),
            }
        }
        normalize_order_book(book)
    }

    /// Cross a limit order against resting liquidity at maker prices
    ///
    /// Third-party levels and the account's own resting orders are matched
    /// in price priority, third-party first at equal prices. Consumed
    /// liquidity leaves the book and every execution is recorded as a
    /// public trade stamped `now`. Nothing changes if the walk fails.
    pub fn take(
        &mut self,
        side: Side,
        amount: Quantity,
        limit: Price,
        now: UnixTime,
    ) -> DomainResult<Take> {
        let mut book = normalize_order_book(self.book.clone())?;
        let mut resting = self.resting.clone();
        let levels = match side {
            Side::Buy => &mut book.asks,
            Side::Sell => &mut book.bids,
        };

        let mut queue: Vec<(Price, Level)> = levels
            .iter()
            .enumerate()
            .map(|(i, level)| (level.price, Level::Venue(i)))
            .chain(
                resting
                    .iter()
                    .enumerate()
                    .filter(|(_, order)| order.side == side.opposite())
                    .map(|(i, order)| (order.price, Level::Own(i))),
            )
            .collect();
        match side {
            Side::Buy => queue.sort_by(|a, b| a.0.cmp(&b.0)),
            Side::Sell => queue.sort_by(|a, b| b.0.cmp(&a.0)),
        }

        let mut take = Take::default();
        let mut trades = Vec::new();
        for (price, level) in queue {
            let remaining = amount - take.fill.right;
            if remaining <= Decimal::ZERO {
                break;
            }
            let crosses = match side {
                Side::Buy => price <= limit,
                Side::Sell => price >= limit,
            };
            if !crosses {
                break;
            }

            let available = match level {
                Level::Venue(i) => &mut levels[i].quantity,
                Level::Own(i) => &mut resting[i].quantity,
            };
            let traded = remaining.min(*available);
            *available -= traded;

            let value = checked_mul("fill", traded, price)?;
            take.fill.left = checked_add("fill", take.fill.left, value)?;
            take.fill.right += traded;
            if let Level::Own(i) = level {
                take.makers.push(MakerFill {
                    id: resting[i].id.clone(),
                    right: traded,
                    price,
                });
            }
            trades.push(Trade::new(now, traded, price, side));
        }
        levels.retain(|level| !level.quantity.is_zero());
        resting.retain(|order| !order.quantity.is_zero());

        self.book = book;
        self.resting = resting;
        self.trades.extend(trades);
        Ok(take)
    }

    /// Show the unfilled part of an account order on the book
    pub fn rest(&mut self, id: OrderId, side: Side, price: Price, quantity: Quantity) {
        if quantity > Decimal::ZERO {
            self.resting.push(Resting {
                id,
                side,
                price,
                quantity,
            });
        }
    }

    /// Take an account order off the book
    pub fn unrest(&mut self, id: &str) {
        self.resting.retain(|order| order.id != id);
    }

    /// Reduce an account order after an off-book execution
    pub fn reduce_resting(&mut self, id: &str, executed: Quantity) {
        if let Some(order) = self.resting.iter_mut().find(|order| order.id == id) {
            order.quantity = (order.quantity - executed).max(Decimal::ZERO);
        }
        self.resting.retain(|order| !order.quantity.is_zero());
    }

    /// One page of the newest-first public trade feed following `cursor`
    ///
    /// Equal timestamps are ordered latest-recorded first, so a cursor count
    /// always skips the same trades.
    pub fn trade_page(&self, cursor: Option<TradeCursor>, limit: usize) -> Vec<Trade> {
        let mut feed: Vec<(usize, &Trade)> = self.trades.iter().enumerate().collect();
        feed.sort_by_key(|(seq, trade)| Reverse((trade.time, *seq)));

        let skip = cursor.map_or(0, |c| {
            feed.iter().filter(|(_, t)| t.time > c.time).count() + c.seen_at_time
        });
        feed.into_iter()
            .skip(skip)
            .take(limit)
            .map(|(_, trade)| *trade)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn market() -> Market {
        let mut market = Market::new(CurrencyPair::new("BTC", "ETH"), Decimals::new(4, 4));
        market.book = OrderBook {
            asks: vec![Order::new(dec!(105), dec!(2)), Order::new(dec!(101), dec!(1))],
            bids: vec![Order::new(dec!(95), dec!(3)), Order::new(dec!(100), dec!(1))],
        };
        market
    }

    #[test]
    fn test_buy_walks_asks_at_maker_prices() {
        let mut market = market();
        let take = market.take(Side::Buy, dec!(2), dec!(106), 10).unwrap();
        assert_eq!(take.fill.right, dec!(2));
        assert_eq!(take.fill.left, dec!(101) + dec!(105));
        assert!(take.makers.is_empty());

        assert_eq!(market.book.asks, vec![Order::new(dec!(105), dec!(1))]);
        assert_eq!(market.trades.len(), 2);
        assert_eq!(market.trades[0].price, dec!(101));
    }

    #[test]
    fn test_passive_order_does_not_trade() {
        let mut market = market();
        let take = market.take(Side::Sell, dec!(1), dec!(100.5), 10).unwrap();
        assert!(take.fill.is_empty());
        assert!(market.trades.is_empty());
        // book is now held sorted
        assert_eq!(market.book.bids[0].price, dec!(100));
    }

    #[test]
    fn test_resting_orders_are_visible_and_matchable() {
        let mut market = market();
        market.rest("7".to_string(), Side::Sell, dec!(100.5), dec!(1));
        market.rest("8".to_string(), Side::Buy, dec!(99), dec!(2));

        let book = market.visible_book().unwrap();
        assert_eq!(book.asks[0], Order::new(dec!(100.5), dec!(1)));
        assert_eq!(book.bids[1], Order::new(dec!(99), dec!(2)));

        let take = market.take(Side::Buy, dec!(1.5), dec!(101), 10).unwrap();
        assert_eq!(take.fill.right, dec!(1.5));
        assert_eq!(take.fill.left, dec!(100.5) + dec!(50.5));
        assert_eq!(
            take.makers,
            vec![MakerFill {
                id: "7".to_string(),
                right: dec!(1),
                price: dec!(100.5)
            }]
        );
        assert!(market.resting.iter().all(|order| order.id != "7"));
        assert_eq!(market.book.asks[0], Order::new(dec!(101), dec!(0.5)));

        market.reduce_resting("8", dec!(0.5));
        assert_eq!(market.resting[0].quantity, dec!(1.5));
        market.unrest("8");
        assert!(market.resting.is_empty());
    }

    #[test]
    fn test_overflowing_walk_changes_nothing() {
        let mut market = market();
        market.book.bids = vec![Order::new(Decimal::MAX, dec!(2))];
        assert!(market.take(Side::Sell, dec!(2), dec!(1), 10).is_err());
        assert_eq!(market.book.bids, vec![Order::new(Decimal::MAX, dec!(2))]);
        assert!(market.trades.is_empty());
    }

    #[test]
    fn test_trade_pages_newest_first() {
        let mut market = market();
        market.trades = (1..=5)
            .map(|t| Trade::new(t, dec!(1), dec!(100), Side::Buy))
            .collect();
        let times: Vec<_> = market.trade_page(None, 2).iter().map(|t| t.time).collect();
        assert_eq!(times, vec![5, 4]);
        let cursor = TradeCursor {
            time: 4,
            seen_at_time: 1,
        };
        let times: Vec<_> = market
            .trade_page(Some(cursor), 10)
            .iter()
            .map(|t| t.time)
            .collect();
        assert_eq!(times, vec![3, 2, 1]);
    }

    #[test]
    fn test_trade_page_resumes_inside_equal_timestamps() {
        let mut market = market();
        market.trades = (0..5)
            .map(|i| Trade::new(7, dec!(1) + Decimal::from(i), dec!(100), Side::Sell))
            .collect();
        let first = market.trade_page(None, 3);
        let cursor = TradeCursor::advance(None, &first);
        let rest = market.trade_page(cursor, 3);
        assert_eq!(first.len() + rest.len(), 5);

        let mut amounts: Vec<_> = first.iter().chain(&rest).map(|t| t.amount).collect();
        amounts.sort();
        assert_eq!(amounts, vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
    }
}
