use std::collections::{BTreeSet, HashMap};

use domain_costs::{CloudProvider, CostComponent, Money};
use provider_adapters::{
    DnsType, LoadBalancerType, NatType, NetworkServiceType, OperatingSystem, PerformanceTier,
    PurchaseOption, ReplicationType, StorageClass, StorageType, TransitType, VpnType,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// VM sizing minimums.
///
/// Optional fields are genuine absences: `gpu_count: None` means "no GPU
/// filter", which is distinct from requiring zero GPUs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmSize {
    pub vcpus: u32,
    pub memory_gb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_disk_gb: Option<u64>,
}

/// Requirements for a VM comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmRequirements {
    pub region: String,
    pub size: VmSize,
    pub operating_system: OperatingSystem,
    pub purchase_option: PurchaseOption,
    #[serde(default)]
    pub required_features: BTreeSet<String>,
    #[serde(default)]
    pub required_certifications: BTreeSet<String>,
}

/// Requirements for a storage comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRequirements {
    pub region: String,
    pub storage_type: StorageType,
    pub capacity_gb: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iops: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput_mbps: Option<u32>,
    /// Mandatory for block storage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_tier: Option<PerformanceTier>,
    #[serde(default)]
    pub required_features: BTreeSet<String>,
    #[serde(default)]
    pub required_certifications: BTreeSet<String>,
}

/// Requirements for a network comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRequirements {
    pub region: String,
    pub service_type: NetworkServiceType,
    pub bandwidth_gbps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_transfer_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u64>,
    #[serde(default)]
    pub high_availability: bool,
    #[serde(default)]
    pub cross_region: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer_type: Option<LoadBalancerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_type: Option<DnsType>,
    /// Mandatory when `service_type` is VPN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpn_type: Option<VpnType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit_type: Option<TransitType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_type: Option<NatType>,
    #[serde(default)]
    pub required_features: BTreeSet<String>,
    #[serde(default)]
    pub required_certifications: BTreeSet<String>,
}

/// Engine-level filter overrides applied after requirement filters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonFilter {
    /// Restrict the fan-out to these providers (empty = all)
    #[serde(default)]
    pub providers: BTreeSet<CloudProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_vcpus: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_vcpus: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_memory_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_gb: Option<f64>,
    #[serde(default)]
    pub storage_classes: BTreeSet<StorageClass>,
    #[serde(default)]
    pub replication_types: BTreeSet<ReplicationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hourly_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_monthly_cost: Option<Decimal>,
}

impl ComparisonFilter {
    pub fn for_providers<I: IntoIterator<Item = CloudProvider>>(providers: I) -> Self {
        Self {
            providers: providers.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// A cost estimate an engine can rank.
pub trait RankableEstimate {
    fn provider(&self) -> CloudProvider;
    fn monthly_cost(&self) -> Money;
    /// Stable display name used as the final tie-break
    fn option_name(&self) -> String;
}

/// Cost estimate for one VM option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmCostEstimate {
    pub provider: CloudProvider,
    pub region: String,
    pub instance_type: String,
    pub operating_system: OperatingSystem,
    pub purchase_option: PurchaseOption,
    pub hourly_cost: Money,
    pub monthly_cost: Money,
    pub cost_components: Vec<CostComponent>,
}

impl RankableEstimate for VmCostEstimate {
    fn provider(&self) -> CloudProvider {
        self.provider
    }
    fn monthly_cost(&self) -> Money {
        self.monthly_cost
    }
    fn option_name(&self) -> String {
        self.instance_type.clone()
    }
}

/// Cost estimate for one storage option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageCostEstimate {
    pub provider: CloudProvider,
    pub storage_type: StorageType,
    pub storage_class: StorageClass,
    pub replication_type: ReplicationType,
    pub region: String,
    pub capacity_gb: u64,
    pub monthly_cost: Money,
    pub cost_components: Vec<CostComponent>,
    pub features: BTreeSet<String>,
}

impl RankableEstimate for StorageCostEstimate {
    fn provider(&self) -> CloudProvider {
        self.provider
    }
    fn monthly_cost(&self) -> Money {
        self.monthly_cost
    }
    fn option_name(&self) -> String {
        format!("{}-{}", self.storage_type, self.storage_class)
    }
}

/// Cost estimate for one network option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCostEstimate {
    pub provider: CloudProvider,
    pub service_type: NetworkServiceType,
    pub region: String,
    pub option_name: String,
    pub monthly_cost: Money,
    pub cost_components: Vec<CostComponent>,
    pub features: BTreeSet<String>,
}

impl RankableEstimate for NetworkCostEstimate {
    fn provider(&self) -> CloudProvider {
        self.provider
    }
    fn monthly_cost(&self) -> Money {
        self.monthly_cost
    }
    fn option_name(&self) -> String {
        self.option_name.clone()
    }
}

/// A comparison: the inputs, every surviving estimate, and the pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison<R, E> {
    pub requirements: R,
    pub estimates: Vec<E>,
    pub recommended_option: E,
}

/// A comparison plus its execution telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult<R, E> {
    pub comparison: Comparison<R, E>,
    pub filters_applied: ComparisonFilter,
    pub total_options_considered: usize,
    pub filtered_options_count: usize,
    pub processing_time_ms: u64,
    pub cache_hit: bool,
}

/// Per-provider outcome of an operation that must not hide partial
/// failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialResult<T> {
    pub successes: HashMap<CloudProvider, T>,
    pub failures: HashMap<CloudProvider, String>,
}

impl<T> PartialResult<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Deterministically sort estimates and return the ranked list.
///
/// Order: lowest monthly cost, then provider preference order, then
/// option name. The head of the ranked list is the recommendation.
pub fn rank_estimates<E: RankableEstimate>(
    mut estimates: Vec<E>,
    provider_preference: &[CloudProvider],
) -> Vec<E> {
    let preference_index = |provider: CloudProvider| -> usize {
        provider_preference
            .iter()
            .position(|p| *p == provider)
            .unwrap_or(provider_preference.len())
    };
    estimates.sort_by(|a, b| {
        a.monthly_cost()
            .amount
            .cmp(&b.monthly_cost().amount)
            .then_with(|| preference_index(a.provider()).cmp(&preference_index(b.provider())))
            .then_with(|| a.option_name().cmp(&b.option_name()))
    });
    estimates
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_costs::Currency;
    use rust_decimal_macros::dec;

    fn estimate(provider: CloudProvider, name: &str, monthly: Decimal) -> VmCostEstimate {
        VmCostEstimate {
            provider,
            region: "us-east-1".into(),
            instance_type: name.into(),
            operating_system: OperatingSystem::Linux,
            purchase_option: PurchaseOption::OnDemand,
            hourly_cost: Money::zero(Currency::Usd),
            monthly_cost: Money::new(monthly, Currency::Usd),
            cost_components: vec![],
        }
    }

    #[test]
    fn test_rank_prefers_lowest_cost() {
        let ranked = rank_estimates(
            vec![
                estimate(CloudProvider::Azure, "b", dec!(87.60)),
                estimate(CloudProvider::Aws, "a", dec!(73.00)),
            ],
            &[],
        );
        assert_eq!(ranked[0].provider, CloudProvider::Aws);
    }

    #[test]
    fn test_rank_breaks_cost_ties_by_preference_order() {
        let ranked = rank_estimates(
            vec![
                estimate(CloudProvider::Aws, "a", dec!(100)),
                estimate(CloudProvider::Gcp, "g", dec!(100)),
            ],
            &[CloudProvider::Gcp, CloudProvider::Aws],
        );
        assert_eq!(ranked[0].provider, CloudProvider::Gcp);
    }

    #[test]
    fn test_rank_breaks_remaining_ties_by_option_name() {
        let ranked = rank_estimates(
            vec![
                estimate(CloudProvider::Aws, "zeta", dec!(50)),
                estimate(CloudProvider::Aws, "alpha", dec!(50)),
            ],
            &[],
        );
        assert_eq!(ranked[0].instance_type, "alpha");
    }
}
