use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domain_costs::{BillingType, CloudProvider, Currency, Money, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{NormalizationError, NormalizationResult};

/// Closed half-open time window `[start_time, end_time)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> NormalizationResult<Self> {
        if end_time <= start_time {
            return Err(NormalizationError::InvalidWindow {
                start_time,
                end_time,
            });
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }
}

/// Provider-neutral identity and shape of a priced resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub provider: CloudProvider,
    pub provider_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub region: String,
    pub billing_type: BillingType,
    /// Provider fields projected through the mapping rules
    pub specifications: serde_json::Map<String, JsonValue>,
}

/// Organizational attribution of a cost entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostAllocation {
    pub project: Option<String>,
    pub cost_center: Option<String>,
    pub environment: Option<String>,
    #[serde(default)]
    pub custom_tags: HashMap<String, String>,
}

/// Fixed-shape cost record: one bucket per coarse resource family, all in
/// one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub compute: Money,
    pub storage: Money,
    pub network: Money,
    pub other: Money,
}

impl CostBreakdown {
    pub fn zero(currency: Currency) -> Self {
        Self {
            compute: Money::zero(currency),
            storage: Money::zero(currency),
            network: Money::zero(currency),
            other: Money::zero(currency),
        }
    }

    /// Place the full amount in the bucket for a canonical type.
    ///
    /// Types without a dedicated bucket (database, container, ...) route
    /// to `other`; a per-type routing table would slot in here if costs
    /// ever need splitting.
    pub fn from_single_bucket(resource_type: ResourceType, amount: Money) -> Self {
        let mut breakdown = Self::zero(amount.currency);
        match resource_type {
            ResourceType::Compute => breakdown.compute = amount,
            ResourceType::Storage => breakdown.storage = amount,
            ResourceType::Network => breakdown.network = amount,
            _ => breakdown.other = amount,
        }
        breakdown
    }

    pub fn currency(&self) -> Currency {
        self.compute.currency
    }

    /// Exact sum across all four buckets.
    pub fn total(&self) -> Money {
        let currency = self.currency();
        // Buckets share one currency by construction, so plain addition
        // is safe here.
        Money::new(
            self.compute.amount + self.storage.amount + self.network.amount + self.other.amount,
            currency,
        )
    }

    fn buckets(&self) -> [&Money; 4] {
        [&self.compute, &self.storage, &self.network, &self.other]
    }

    fn non_zero_count(&self) -> usize {
        self.buckets().iter().filter(|m| !m.is_zero()).count()
    }

    fn currencies_match(&self, currency: Currency) -> bool {
        self.buckets().iter().all(|m| m.currency == currency)
    }
}

/// One provider cost record in canonical form.
///
/// Produced by the normalizer, consumed by the aggregator; never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCostEntry {
    pub id: String,
    pub account_id: String,
    pub resource: ResourceMetadata,
    pub allocation: CostAllocation,
    pub cost_breakdown: CostBreakdown,
    pub currency: Currency,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl NormalizedCostEntry {
    /// Build an entry, enforcing the creation invariants: a valid time
    /// window, bucket currencies equal to the entry currency, and at most
    /// one non-zero bucket.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        id: String,
        account_id: String,
        resource: ResourceMetadata,
        allocation: CostAllocation,
        cost_breakdown: CostBreakdown,
        currency: Currency,
        window: TimeWindow,
    ) -> NormalizationResult<Self> {
        if !cost_breakdown.currencies_match(currency) {
            return Err(NormalizationError::DataNormalization {
                provider: resource.provider.to_string(),
                message: format!(
                    "cost breakdown currency {} does not match entry currency {}",
                    cost_breakdown.currency(),
                    currency
                ),
                details: HashMap::new(),
            });
        }
        if cost_breakdown.non_zero_count() > 1 {
            return Err(NormalizationError::DataNormalization {
                provider: resource.provider.to_string(),
                message: "exactly one cost bucket may be non-zero at creation".to_string(),
                details: HashMap::new(),
            });
        }
        Ok(Self {
            id,
            account_id,
            resource,
            allocation,
            cost_breakdown,
            currency,
            start_time: window.start_time,
            end_time: window.end_time,
        })
    }

    pub fn total_cost(&self) -> Money {
        self.cost_breakdown.total()
    }
}

/// Output of the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAggregation {
    pub group_by: Vec<String>,
    pub time_period: String,
    pub costs: HashMap<String, Money>,
    pub resource_counts: HashMap<String, usize>,
    pub total_cost: Money,
    pub currency: Currency,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn metadata() -> ResourceMetadata {
        ResourceMetadata {
            provider: CloudProvider::Aws,
            provider_id: "i-123".into(),
            name: "api".into(),
            resource_type: ResourceType::Compute,
            region: "us-east-1".into(),
            billing_type: BillingType::OnDemand,
            specifications: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_window_rejects_equal_bounds() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let err = TimeWindow::new(at, at).unwrap_err();
        assert!(matches!(err, NormalizationError::InvalidWindow { .. }));
    }

    #[test]
    fn test_single_bucket_routing() {
        let amount = Money::new(dec!(100), Currency::Usd);
        let compute = CostBreakdown::from_single_bucket(ResourceType::Compute, amount);
        assert_eq!(compute.compute.amount, dec!(100));
        assert!(compute.storage.is_zero());

        // Database has no dedicated bucket and lands in `other`.
        let database = CostBreakdown::from_single_bucket(ResourceType::Database, amount);
        assert_eq!(database.other.amount, dec!(100));
        assert!(database.compute.is_zero());
    }

    #[test]
    fn test_breakdown_total_sums_buckets() {
        let breakdown = CostBreakdown::from_single_bucket(
            ResourceType::Network,
            Money::new(dec!(12.34), Currency::Usd),
        );
        assert_eq!(breakdown.total().amount, dec!(12.34));
    }

    #[test]
    fn test_entry_rejects_two_non_zero_buckets() {
        let mut breakdown = CostBreakdown::from_single_bucket(
            ResourceType::Compute,
            Money::new(dec!(1), Currency::Usd),
        );
        breakdown.storage = Money::new(dec!(2), Currency::Usd);

        let err = NormalizedCostEntry::try_new(
            "aws-i-123".into(),
            "acct".into(),
            metadata(),
            CostAllocation::default(),
            breakdown,
            Currency::Usd,
            window(),
        )
        .unwrap_err();
        assert!(matches!(err, NormalizationError::DataNormalization { .. }));
    }

    #[test]
    fn test_entry_rejects_currency_mismatch() {
        let breakdown = CostBreakdown::from_single_bucket(
            ResourceType::Compute,
            Money::new(dec!(1), Currency::Eur),
        );
        let err = NormalizedCostEntry::try_new(
            "aws-i-123".into(),
            "acct".into(),
            metadata(),
            CostAllocation::default(),
            breakdown,
            Currency::Usd,
            window(),
        )
        .unwrap_err();
        assert!(matches!(err, NormalizationError::DataNormalization { .. }));
    }
}
