use serde::{Deserialize, Serialize};

use crate::entities::Side;
use crate::error::{DomainError, DomainResult};

/// Separator of the canonical symbol form
pub const CANONICAL_SEPARATOR: char = '_';

/// A spot pair in canonical form, e.g. `BTC_ETH`
///
/// `left` is the base currency the pair is priced in; `right` is the
/// currency acquired by a buy and delivered by a sell. Prices are quoted as
/// left per one unit of right, amounts are denominated in right.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub left: String,
    pub right: String,
}

/// How an exchange spells a pair natively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairNotation {
    /// Text between the two legs (may be empty)
    pub separator: &'static str,
    /// Native form lists the right leg first (`ETHBTC` for `BTC_ETH`)
    pub right_first: bool,
    /// Native form is lower case
    pub lowercase: bool,
}

impl PairNotation {
    /// The canonical `LEFT_RIGHT` form
    pub const CANONICAL: Self = Self {
        separator: "_",
        right_first: false,
        lowercase: false,
    };

    /// Concatenated, right leg first: `ETHBTC`
    pub const CONCAT: Self = Self {
        separator: "",
        right_first: true,
        lowercase: false,
    };

    /// Dash separated, right leg first: `ETH-BTC`
    pub const DASHED: Self = Self {
        separator: "-",
        right_first: true,
        lowercase: false,
    };

    /// Slash separated, right leg first: `ETH/BTC`
    pub const SLASHED: Self = Self {
        separator: "/",
        right_first: true,
        lowercase: false,
    };
}

impl CurrencyPair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into().to_uppercase(),
            right: right.into().to_uppercase(),
        }
    }

    /// Parse the canonical `LEFT_RIGHT` form
    pub fn parse(symbol: &str) -> DomainResult<Self> {
        let invalid = || DomainError::InvalidSymbol(symbol.to_string());

        let (left, right) = symbol.split_once(CANONICAL_SEPARATOR).ok_or_else(invalid)?;
        if !is_ticker(left) || !is_ticker(right) {
            return Err(invalid());
        }
        Ok(Self::new(left, right))
    }

    /// Render the pair in an exchange's notation
    pub fn to_native(&self, notation: PairNotation) -> String {
        let (first, second) = if notation.right_first {
            (&self.right, &self.left)
        } else {
            (&self.left, &self.right)
        };
        let native = format!("{}{}{}", first, notation.separator, second);
        if notation.lowercase {
            native.to_lowercase()
        } else {
            native
        }
    }

    /// Parse an exchange's native spelling back into canonical form.
    ///
    /// Only notations with a separator can be split unambiguously.
    pub fn from_native(native: &str, notation: PairNotation) -> DomainResult<Self> {
        let invalid = || DomainError::InvalidSymbol(native.to_string());
        if notation.separator.is_empty() {
            return Err(invalid());
        }

        let (first, second) = native.split_once(notation.separator).ok_or_else(invalid)?;
        if !is_ticker(first) || !is_ticker(second) {
            return Err(invalid());
        }
        if notation.right_first {
            Ok(Self::new(second, first))
        } else {
            Ok(Self::new(first, second))
        }
    }

    /// Asset spent by an order on `side`
    pub fn spent_asset(&self, side: Side) -> &str {
        match side {
            Side::Buy => &self.left,
            Side::Sell => &self.right,
        }
    }

    /// Asset received by an order on `side`
    pub fn received_asset(&self, side: Side) -> &str {
        self.spent_asset(side.opposite())
    }
}

fn is_ticker(leg: &str) -> bool {
    !leg.is_empty() && leg.chars().all(char::is_alphanumeric)
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.left, CANONICAL_SEPARATOR, self.right)
    }
}

impl std::str::FromStr for CurrencyPair {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let pair = CurrencyPair::parse("BTC_ETH").unwrap();
        assert_eq!(pair.left, "BTC");
        assert_eq!(pair.right, "ETH");
        assert_eq!(pair.to_string(), "BTC_ETH");

        let lower: CurrencyPair = "usdt_xrp".parse().unwrap();
        assert_eq!(lower, CurrencyPair::new("USDT", "XRP"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for symbol in ["", "BTCETH", "BTC_", "_ETH", "BTC-ETH", "BTC_E-TH"] {
            assert!(
                matches!(CurrencyPair::parse(symbol), Err(DomainError::InvalidSymbol(_))),
                "{symbol} should be rejected"
            );
        }
    }

    #[test]
    fn test_native_notations() {
        let pair = CurrencyPair::parse("BTC_ETH").unwrap();
        assert_eq!(pair.to_native(PairNotation::CANONICAL), "BTC_ETH");
        assert_eq!(pair.to_native(PairNotation::CONCAT), "ETHBTC");
        assert_eq!(pair.to_native(PairNotation::DASHED), "ETH-BTC");
        assert_eq!(pair.to_native(PairNotation::SLASHED), "ETH/BTC");

        let lower = PairNotation {
            lowercase: true,
            ..PairNotation::CONCAT
        };
        assert_eq!(pair.to_native(lower), "ethbtc");
    }

    #[test]
    fn test_from_native_round_trip() {
        let pair = CurrencyPair::parse("BTC_ETH").unwrap();
        for notation in [
            PairNotation::CANONICAL,
            PairNotation::DASHED,
            PairNotation::SLASHED,
        ] {
            let native = pair.to_native(notation);
            assert_eq!(CurrencyPair::from_native(&native, notation).unwrap(), pair);
        }
        assert!(CurrencyPair::from_native("ETHBTC", PairNotation::CONCAT).is_err());
    }

    #[test]
    fn test_legs_per_side() {
        let pair = CurrencyPair::parse("BTC_ETH").unwrap();
        assert_eq!(pair.spent_asset(Side::Buy), "BTC");
        assert_eq!(pair.received_asset(Side::Buy), "ETH");
        assert_eq!(pair.spent_asset(Side::Sell), "ETH");
        assert_eq!(pair.received_asset(Side::Sell), "BTC");
    }
}
