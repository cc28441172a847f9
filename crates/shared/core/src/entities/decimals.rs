use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::book::ensure_positive;
use crate::error::{DomainError, DomainResult};
use crate::values::{Price, Quantity};

/// Precision an exchange accepts for one symbol
///
/// Every outgoing price and amount must fit these scales before submission.
/// Prices are rounded to the nearest step; amounts are truncated so an order
/// never commits more than the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decimals {
    /// Decimal places accepted for prices
    pub price_decs: u32,
    /// Decimal places accepted for amounts
    pub amount_decs: u32,
}

impl Decimals {
    /// Largest scale a decimal value can carry
    pub const MAX_DECS: u32 = 28;

    pub fn new(price_decs: u32, amount_decs: u32) -> Self {
        Self {
            price_decs,
            amount_decs,
        }
    }

    /// Both scales fit the decimal representation
    pub fn validate(&self) -> DomainResult<()> {
        step("priceDecs", self.price_decs)?;
        step("amountDecs", self.amount_decs)?;
        Ok(())
    }

    /// Smallest price increment (e.g. 0.01 for two decimals)
    pub fn price_step(&self) -> DomainResult<Decimal> {
        step("priceDecs", self.price_decs)
    }

    /// Smallest amount increment
    pub fn amount_step(&self) -> DomainResult<Decimal> {
        step("amountDecs", self.amount_decs)
    }

    /// Round a price to the accepted scale, half away from zero
    pub fn round_price(&self, price: Price) -> Price {
        price
            .round_dp_with_strategy(self.price_decs, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    }

    /// Truncate an amount to the accepted scale
    pub fn truncate_amount(&self, amount: Quantity) -> Quantity {
        amount
            .round_dp_with_strategy(self.amount_decs, RoundingStrategy::ToZero)
            .normalize()
    }

    /// Strict check: fail if the price carries more decimals than accepted
    pub fn check_price(&self, price: Price) -> DomainResult<()> {
        check_scale("price", price, self.price_decs)
    }

    /// Strict check: fail if the amount carries more decimals than accepted
    pub fn check_amount(&self, amount: Quantity) -> DomainResult<()> {
        check_scale("amount", amount, self.amount_decs)
    }

    /// Bring an (amount, price) pair to submission precision.
    ///
    /// Both inputs must be positive, and the amount must survive truncation.
    pub fn prepare(&self, amount: Quantity, price: Price) -> DomainResult<(Quantity, Price)> {
        self.validate()?;
        ensure_positive("amount", amount)?;
        ensure_positive("price", price)?;

        let amount = self.truncate_amount(amount);
        let price = self.round_price(price);

        ensure_positive("amount", amount)?;
        ensure_positive("price", price)?;
        Ok((amount, price))
    }
}

fn step(field: &'static str, decimals: u32) -> DomainResult<Decimal> {
    Decimal::try_new(1, decimals).map_err(|_| DomainError::Scale { field, decimals })
}

fn check_scale(field: &'static str, value: Decimal, decimals: u32) -> DomainResult<()> {
    if value.normalize().scale() > decimals {
        return Err(DomainError::Precision {
            field,
            value,
            decimals,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_and_truncate() {
        let decs = Decimals::new(2, 4);
        assert_eq!(decs.round_price(dec!(123.456)), dec!(123.46));
        assert_eq!(decs.round_price(dec!(123.455)), dec!(123.46));
        assert_eq!(decs.round_price(dec!(123.454)), dec!(123.45));
        assert_eq!(decs.truncate_amount(dec!(0.123456)), dec!(0.1234));
        assert_eq!(decs.truncate_amount(dec!(0.99999)), dec!(0.9999));
    }

    #[test]
    fn test_strict_checks() {
        let decs = Decimals::new(2, 4);
        assert!(decs.check_price(dec!(123.45)).is_ok());
        assert!(decs.check_price(dec!(123.4500)).is_ok());
        assert_eq!(
            decs.check_price(dec!(123.456)),
            Err(DomainError::Precision {
                field: "price",
                value: dec!(123.456),
                decimals: 2
            })
        );
        assert!(decs.check_amount(dec!(0.1234)).is_ok());
        assert!(decs.check_amount(dec!(0.123456)).is_err());
    }

    #[test]
    fn test_prepare() {
        let decs = Decimals::new(2, 4);
        let (amount, price) = decs.prepare(dec!(0.123456), dec!(123.456)).unwrap();
        assert_eq!(amount, dec!(0.1234));
        assert_eq!(price, dec!(123.46));
        assert!(decs.check_amount(amount).is_ok());
        assert!(decs.check_price(price).is_ok());
    }

    #[test]
    fn test_prepare_rejects_dust_and_non_positive() {
        let decs = Decimals::new(2, 4);
        assert!(matches!(
            decs.prepare(dec!(0.00001), dec!(10)),
            Err(DomainError::NonPositive {
                field: "amount",
                ..
            })
        ));
        assert!(decs.prepare(dec!(1), dec!(0)).is_err());
        assert!(decs.prepare(dec!(-1), dec!(10)).is_err());
        assert!(decs.prepare(dec!(1), dec!(0.001)).is_err());
    }

    #[test]
    fn test_steps() {
        let decs = Decimals::new(2, 8);
        assert_eq!(decs.price_step(), Ok(dec!(0.01)));
        assert_eq!(decs.amount_step(), Ok(dec!(0.00000001)));
        assert_eq!(Decimals::new(0, 0).price_step(), Ok(dec!(1)));
        assert_eq!(
            Decimals::new(0, Decimals::MAX_DECS).amount_step(),
            Ok(Decimal::new(1, 28))
        );
    }

    #[test]
    fn test_out_of_range_scale_is_an_error() {
        let decs: Decimals = serde_json::from_str(r#"{"priceDecs":2,"amountDecs":29}"#).unwrap();
        assert_eq!(
            decs.amount_step(),
            Err(DomainError::Scale {
                field: "amountDecs",
                decimals: 29
            })
        );
        assert!(decs.price_step().is_ok());
        assert!(decs.validate().is_err());
        assert!(decs.prepare(dec!(1), dec!(1)).is_err());
        assert!(Decimals::new(u32::MAX, 2).validate().is_err());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(Decimals::new(2, 4)).unwrap();
        assert_eq!(json["priceDecs"], 2);
        assert_eq!(json["amountDecs"], 4);
    }
}
