//! Currency conversion service.
//!
//! Conversion is deterministic per (from, to) pair: the rate provider is
//! queried once per conversion and any failure surfaces as a typed error,
//! never a partially converted amount.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{CostError, CostResult};
use crate::models::{Currency, Money};

/// A single exchange rate between two currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRate {
    pub from: Currency,
    pub to: Currency,
    pub rate: Decimal,
}

/// Source of exchange rates.
///
/// Implementations must be deterministic per (from, to) pair for the
/// lifetime of the provider instance.
#[cfg_attr(test, mockall::automock)]
pub trait ExchangeRateProvider: Send + Sync {
    /// Rate to multiply an amount in `from` by to express it in `to`.
    fn rate(&self, from: Currency, to: Currency) -> CostResult<Decimal>;
}

/// Rate provider backed by a fixed table, with inverse derivation.
///
/// Suitable for tests, simulation mode, and deployments that pin rates at
/// startup.
#[derive(Debug, Clone, Default)]
pub struct FixedRateProvider {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl FixedRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

impl ExchangeRateProvider for FixedRateProvider {
    fn rate(&self, from: Currency, to: Currency) -> CostResult<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        if let Some(rate) = self.rates.get(&(from, to)) {
            return Ok(*rate);
        }
        // Derive the inverse when only the opposite direction is pinned.
        if let Some(rate) = self.rates.get(&(to, from)) {
            if !rate.is_zero() {
                return Ok(Decimal::ONE / rate);
            }
        }
        Err(CostError::RateUnavailable { from, to })
    }
}

/// Service converting money between currencies at a configured rate.
pub struct CurrencyService {
    provider: Box<dyn ExchangeRateProvider>,
}

impl CurrencyService {
    pub fn new(provider: Box<dyn ExchangeRateProvider>) -> Self {
        Self { provider }
    }

    /// Parse an ISO code into the supported currency set.
    pub fn parse_currency(code: &str) -> CostResult<Currency> {
        Currency::from_str(code).map_err(|_| CostError::UnknownCurrency(code.to_string()))
    }

    /// Convert an amount into the target currency.
    ///
    /// Identity conversions are free; everything else multiplies by the
    /// provider's rate for the pair.
    pub fn convert(&self, amount: Money, target: Currency) -> CostResult<Money> {
        if amount.currency == target {
            return Ok(amount);
        }

        let rate = self.provider.rate(amount.currency, target)?;
        let converted = Money::new(amount.amount * rate, target);
        debug!(
            from = %amount.currency,
            to = %target,
            rate = %rate,
            "Converted amount"
        );
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn service() -> CurrencyService {
        let provider = FixedRateProvider::new()
            .with_rate(Currency::Eur, Currency::Usd, dec!(1.10))
            .with_rate(Currency::Gbp, Currency::Usd, dec!(1.25));
        CurrencyService::new(Box::new(provider))
    }

    #[test]
    fn test_identity_conversion_is_exact() {
        let amount = Money::new(dec!(99.999), Currency::Usd);
        let converted = service().convert(amount, Currency::Usd).unwrap();
        assert_eq!(converted, amount);
    }

    #[test]
    fn test_conversion_applies_rate_exactly() {
        let amount = Money::new(dec!(100), Currency::Eur);
        let converted = service().convert(amount, Currency::Usd).unwrap();
        assert_eq!(converted.amount, dec!(110.00));
        assert_eq!(converted.currency, Currency::Usd);
    }

    #[test]
    fn test_inverse_rate_is_derived() {
        let amount = Money::new(dec!(110), Currency::Usd);
        let converted = service().convert(amount, Currency::Eur).unwrap();
        // 110 / 1.10 = 100
        assert_eq!(converted.amount.round_dp(10), dec!(100).round_dp(10));
    }

    #[test]
    fn test_missing_rate_is_an_error() {
        let amount = Money::new(dec!(5), Currency::Jpy);
        let err = service().convert(amount, Currency::Usd).unwrap_err();
        assert!(matches!(err, CostError::RateUnavailable { .. }));
    }

    #[test]
    fn test_unknown_currency_code() {
        let err = CurrencyService::parse_currency("DOGE").unwrap_err();
        assert!(matches!(err, CostError::UnknownCurrency(_)));
    }

    #[test]
    fn test_mock_provider_is_consulted_once_per_conversion() {
        let mut mock = MockExchangeRateProvider::new();
        mock.expect_rate()
            .times(1)
            .returning(|_, _| Ok(dec!(2)));
        let service = CurrencyService::new(Box::new(mock));
        let converted = service
            .convert(Money::new(dec!(3), Currency::Eur), Currency::Usd)
            .unwrap();
        assert_eq!(converted.amount, dec!(6));
    }
}
