use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{CostError, CostResult};

/// Average hours in a month, used to project hourly rates to monthly cost
pub const HOURS_PER_MONTH: u32 = 730;

/// Seconds in a 30-day month, used to project request rates to monthly volumes
pub const SECONDS_PER_MONTH: u64 = 2_592_000;

/// Cloud provider enumeration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    Aws,
    Azure,
    Gcp,
}

/// Canonical resource type enumeration
///
/// Provider-specific service names map into exactly one of these through
/// the normalization mapping tables.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceType {
    #[default]
    Compute,
    Storage,
    Network,
    Database,
    Container,
    Serverless,
    Cache,
    Queue,
    LoadBalancer,
    Dns,
    Cdn,
    Monitoring,
    Security,
    Iam,
    Other,
}

/// Billing model under which a resource is charged
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BillingType {
    #[default]
    OnDemand,
    Reserved,
    Spot,
    SavingsPlan,
}

/// Currency enumeration (ISO 4217 codes)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
    Hash,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cad,
    Aud,
}

/// Exact-decimal money amount in a single currency.
///
/// All cost arithmetic in the platform goes through this type; floats are
/// never used on cost paths. Rounding happens only at display boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Add two amounts, requiring matching currencies.
    pub fn checked_add(&self, other: &Money) -> CostResult<Money> {
        if self.currency != other.currency {
            return Err(CostError::CurrencyMismatch {
                expected: self.currency,
                actual: other.currency,
            });
        }
        Ok(Money::new(self.amount + other.amount, self.currency))
    }

    /// Subtract `other`, requiring matching currencies. May go negative
    /// (savings calculations rely on that).
    pub fn checked_sub(&self, other: &Money) -> CostResult<Money> {
        if self.currency != other.currency {
            return Err(CostError::CurrencyMismatch {
                expected: self.currency,
                actual: other.currency,
            });
        }
        Ok(Money::new(self.amount - other.amount, self.currency))
    }

    /// Sum an iterator of amounts into one, requiring a single currency.
    pub fn try_sum<'a, I>(currency: Currency, amounts: I) -> CostResult<Money>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        let mut total = Money::zero(currency);
        for amount in amounts {
            total = total.checked_add(amount)?;
        }
        Ok(total)
    }

    /// Round to two decimal places with banker's rounding.
    ///
    /// For serialization/report boundaries only; internal arithmetic keeps
    /// full precision.
    pub fn rounded_for_display(&self) -> Money {
        Money::new(
            self.amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
            self.currency,
        )
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.rounded_for_display().amount, self.currency)
    }
}

/// Named additive contributor to a cost estimate.
///
/// A full estimate's monthly cost is always the exact sum of its
/// components' monthly costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComponent {
    pub name: String,
    pub monthly_cost: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_cost: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl CostComponent {
    pub fn monthly(name: impl Into<String>, monthly_cost: Money) -> Self {
        Self {
            name: name.into(),
            monthly_cost,
            hourly_cost: None,
            unit: None,
        }
    }

    pub fn hourly(name: impl Into<String>, hourly_cost: Money) -> Self {
        let monthly = Money::new(
            hourly_cost.amount * Decimal::from(HOURS_PER_MONTH),
            hourly_cost.currency,
        );
        Self {
            name: name.into(),
            monthly_cost: monthly,
            hourly_cost: Some(hourly_cost),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_provider_round_trips_through_strings() {
        assert_eq!(CloudProvider::Aws.to_string(), "aws");
        assert_eq!(CloudProvider::from_str("azure").unwrap(), CloudProvider::Azure);
        assert!(CloudProvider::from_str("oracle").is_err());
    }

    #[test]
    fn test_resource_type_snake_case() {
        assert_eq!(ResourceType::LoadBalancer.to_string(), "load_balancer");
        assert_eq!(
            ResourceType::from_str("load_balancer").unwrap(),
            ResourceType::LoadBalancer
        );
    }

    #[test]
    fn test_currency_uppercase_codes() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::from_str("EUR").unwrap(), Currency::Eur);
        assert!(Currency::from_str("XYZ").is_err());
    }

    #[test]
    fn test_money_addition_same_currency() {
        let a = Money::new(dec!(1.10), Currency::Usd);
        let b = Money::new(dec!(2.05), Currency::Usd);
        assert_eq!(a.checked_add(&b).unwrap().amount, dec!(3.15));
    }

    #[test]
    fn test_money_addition_rejects_mixed_currencies() {
        let a = Money::new(dec!(1), Currency::Usd);
        let b = Money::new(dec!(1), Currency::Eur);
        let err = a.checked_add(&b).unwrap_err();
        assert!(matches!(err, CostError::CurrencyMismatch { .. }));
    }

    #[test]
    fn test_money_try_sum() {
        let amounts = vec![
            Money::new(dec!(10.5), Currency::Usd),
            Money::new(dec!(0.25), Currency::Usd),
            Money::new(dec!(4), Currency::Usd),
        ];
        let total = Money::try_sum(Currency::Usd, &amounts).unwrap();
        assert_eq!(total.amount, dec!(14.75));
    }

    #[test]
    fn test_display_uses_bankers_rounding() {
        // 2.005 rounds to 2.00 (nearest even), 2.015 rounds to 2.02
        let low = Money::new(dec!(2.005), Currency::Usd);
        let high = Money::new(dec!(2.015), Currency::Usd);
        assert_eq!(low.rounded_for_display().amount, dec!(2.00));
        assert_eq!(high.rounded_for_display().amount, dec!(2.02));
    }

    #[test]
    fn test_hourly_component_projects_to_monthly() {
        let component = CostComponent::hourly("Compute", Money::new(dec!(0.10), Currency::Usd));
        assert_eq!(component.monthly_cost.amount, dec!(73.00));
        assert_eq!(component.hourly_cost.unwrap().amount, dec!(0.10));
    }
}
