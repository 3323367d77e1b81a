//! Quantity-proportional pricing.
//!
//! Storage capacity and data transfer are priced through ordered tier
//! lists; request-based services are priced per million requests projected
//! from a sustained request rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CostError, CostResult};
use crate::models::{HOURS_PER_MONTH, SECONDS_PER_MONTH};

/// One segment of a tiered price schedule.
///
/// `max_quantity == None` marks the open-ended final tier. A valid
/// schedule starts at zero and covers `[0, inf)` contiguously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub min_quantity: Decimal,
    pub max_quantity: Option<Decimal>,
    /// Price per unit within this tier
    pub rate: Decimal,
}

impl PricingTier {
    pub fn new(min_quantity: Decimal, max_quantity: Option<Decimal>, rate: Decimal) -> Self {
        Self {
            min_quantity,
            max_quantity,
            rate,
        }
    }
}

fn validate_tiers(tiers: &[PricingTier]) -> CostResult<()> {
    if tiers.is_empty() {
        return Err(CostError::InvalidPricingTiers(
            "tier list must not be empty".to_string(),
        ));
    }

    if !tiers[0].min_quantity.is_zero() {
        return Err(CostError::InvalidPricingTiers(format!(
            "first tier must start at 0, starts at {}",
            tiers[0].min_quantity
        )));
    }

    for window in tiers.windows(2) {
        let (current, next) = (&window[0], &window[1]);
        match current.max_quantity {
            None => {
                return Err(CostError::InvalidPricingTiers(
                    "open-ended tier must be last".to_string(),
                ));
            }
            Some(max) if max <= current.min_quantity => {
                return Err(CostError::InvalidPricingTiers(format!(
                    "tier bounds must satisfy min < max, got [{}, {})",
                    current.min_quantity, max
                )));
            }
            Some(max) if max != next.min_quantity => {
                return Err(CostError::InvalidPricingTiers(format!(
                    "tiers must be contiguous: tier ends at {} but next starts at {}",
                    max, next.min_quantity
                )));
            }
            Some(_) => {}
        }
    }

    if let Some(last) = tiers.last() {
        if let Some(max) = last.max_quantity {
            if max <= last.min_quantity {
                return Err(CostError::InvalidPricingTiers(format!(
                    "tier bounds must satisfy min < max, got [{}, {})",
                    last.min_quantity, max
                )));
            }
        }
    }

    Ok(())
}

/// Cost of `quantity` units across an ordered tier schedule.
///
/// Each tier contributes `min(remaining, tier size) * rate` until the
/// quantity is exhausted.
pub fn tiered_cost(quantity: Decimal, tiers: &[PricingTier]) -> CostResult<Decimal> {
    if quantity.is_sign_negative() {
        return Err(CostError::NegativeQuantity(quantity));
    }
    validate_tiers(tiers)?;

    let mut remaining = quantity;
    let mut total = Decimal::ZERO;

    for tier in tiers {
        if remaining.is_zero() {
            break;
        }
        let usage = match tier.max_quantity {
            Some(max) => remaining.min(max - tier.min_quantity),
            None => remaining,
        };
        total += usage * tier.rate;
        remaining -= usage;
    }

    Ok(total)
}

/// Monthly cost of a sustained request rate priced per million requests.
pub fn monthly_request_cost(requests_per_second: u64, price_per_million: Decimal) -> Decimal {
    let monthly_requests = Decimal::from(requests_per_second) * Decimal::from(SECONDS_PER_MONTH);
    monthly_requests / Decimal::from(1_000_000u32) * price_per_million
}

/// Monthly cost of an hourly rate over the average month.
pub fn monthly_from_hourly(hourly_rate: Decimal) -> Decimal {
    hourly_rate * Decimal::from(HOURS_PER_MONTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn transfer_tiers() -> Vec<PricingTier> {
        vec![
            PricingTier::new(dec!(0), Some(dec!(1024)), dec!(0.09)),
            PricingTier::new(dec!(1024), Some(dec!(10240)), dec!(0.085)),
            PricingTier::new(dec!(10240), None, dec!(0.07)),
        ]
    }

    #[test]
    fn test_quantity_within_first_tier() {
        let cost = tiered_cost(dec!(500), &transfer_tiers()).unwrap();
        assert_eq!(cost, dec!(45.00));
    }

    #[test]
    fn test_doubling_within_a_tier_doubles_contribution() {
        let tiers = transfer_tiers();
        let single = tiered_cost(dec!(200), &tiers).unwrap();
        let double = tiered_cost(dec!(400), &tiers).unwrap();
        assert_eq!(double, single * dec!(2));
    }

    #[test]
    fn test_quantity_spanning_all_tiers() {
        // 12,288 GB = 1024 @ 0.09 + 9216 @ 0.085 + 2048 @ 0.07
        let cost = tiered_cost(dec!(12288), &transfer_tiers()).unwrap();
        let expected = dec!(1024) * dec!(0.09) + dec!(9216) * dec!(0.085) + dec!(2048) * dec!(0.07);
        assert_eq!(cost, expected);
    }

    #[test]
    fn test_quantity_exactly_on_tier_boundary() {
        let cost = tiered_cost(dec!(1024), &transfer_tiers()).unwrap();
        assert_eq!(cost, dec!(1024) * dec!(0.09));
    }

    #[test]
    fn test_zero_quantity_is_free() {
        assert_eq!(tiered_cost(dec!(0), &transfer_tiers()).unwrap(), dec!(0));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let err = tiered_cost(dec!(-1), &transfer_tiers()).unwrap_err();
        assert!(matches!(err, CostError::NegativeQuantity(_)));
    }

    #[test]
    fn test_gapped_tiers_rejected() {
        let tiers = vec![
            PricingTier::new(dec!(0), Some(dec!(100)), dec!(0.10)),
            PricingTier::new(dec!(200), None, dec!(0.05)),
        ];
        let err = tiered_cost(dec!(50), &tiers).unwrap_err();
        assert!(matches!(err, CostError::InvalidPricingTiers(_)));
    }

    #[test]
    fn test_tiers_not_starting_at_zero_rejected() {
        let tiers = vec![PricingTier::new(dec!(1), None, dec!(0.10))];
        let err = tiered_cost(dec!(50), &tiers).unwrap_err();
        assert!(matches!(err, CostError::InvalidPricingTiers(_)));
    }

    #[test]
    fn test_open_ended_tier_must_be_last() {
        let tiers = vec![
            PricingTier::new(dec!(0), None, dec!(0.10)),
            PricingTier::new(dec!(100), Some(dec!(200)), dec!(0.05)),
        ];
        let err = tiered_cost(dec!(50), &tiers).unwrap_err();
        assert!(matches!(err, CostError::InvalidPricingTiers(_)));
    }

    #[test]
    fn test_inverted_tier_bounds_rejected() {
        let tiers = vec![
            PricingTier::new(dec!(0), Some(dec!(100)), dec!(0.10)),
            PricingTier::new(dec!(100), Some(dec!(50)), dec!(0.05)),
        ];
        let err = tiered_cost(dec!(10), &tiers).unwrap_err();
        assert!(matches!(err, CostError::InvalidPricingTiers(_)));
    }

    #[test]
    fn test_monthly_request_cost() {
        // 100 rps -> 259,200,000 requests -> 259.2 million @ 0.025
        let cost = monthly_request_cost(100, dec!(0.025));
        assert_eq!(cost, dec!(6.48));
    }

    #[test]
    fn test_monthly_from_hourly() {
        assert_eq!(monthly_from_hourly(dec!(0.10)), dec!(73.00));
    }
}
