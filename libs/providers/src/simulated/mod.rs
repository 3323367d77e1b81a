//! Fixture-backed adapters for offline development and tests.
//!
//! Each provider module builds a deterministic fixture set (catalogs,
//! rate tables, a small inventory); `SimulatedAdapter` serves the full
//! `CloudAdapter` surface from it. Same inputs always produce the same
//! outputs.

pub mod aws;
pub mod azure;
pub mod gcp;

use std::collections::HashMap;

use async_trait::async_trait;
use domain_costs::{
    monthly_from_hourly, monthly_request_cost, tiered_cost, CloudProvider, CostComponent, Currency,
    CurrencyService, FixedRateProvider, Money, PricingTier, ResourceType,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::catalog::{
    NetworkCostQuery, NetworkCostQuote, NetworkOption, NetworkServiceType, OperatingSystem,
    PricingData, PricingUnit, PurchaseOption, ReplicationType, ResourceConfiguration, ResourceCost,
    ResourceMetrics, StorageClass, StorageOption, StorageType, VmInstanceType,
};
use crate::error::{AdapterError, AdapterResult};
use crate::CloudAdapter;

/// A VM offering plus its on-demand Linux hourly rate.
#[derive(Debug, Clone)]
pub struct VmFixture {
    pub spec: VmInstanceType,
    pub hourly_usd: Decimal,
}

/// A storage offering plus its rate tables.
#[derive(Debug, Clone)]
pub struct StorageFixture {
    pub spec: StorageOption,
    /// Capacity pricing tiers (per GB-month, USD)
    pub capacity_tiers: Vec<PricingTier>,
    /// IOPS included before provisioned-IOPS charges apply
    pub free_iops: u32,
    /// USD per provisioned IOPS-month beyond the free allotment
    pub iops_rate: Decimal,
    /// Throughput included before provisioned-throughput charges apply
    pub free_throughput_mbps: u32,
    /// USD per provisioned MBps-month beyond the free allotment
    pub throughput_rate: Decimal,
}

/// How a network service's base charge is quoted.
#[derive(Debug, Clone, Copy)]
pub enum BaseCharge {
    /// Per-hour services (VPN, transit, NAT gateways)
    Hourly(Decimal),
    /// Flat monthly services
    Monthly(Decimal),
}

/// A network offering plus its base charge.
#[derive(Debug, Clone)]
pub struct NetworkFixture {
    pub spec: NetworkOption,
    pub base: BaseCharge,
}

/// A deployed resource with its metrics and cost attribution.
#[derive(Debug, Clone)]
pub struct ResourceFixture {
    pub configuration: ResourceConfiguration,
    pub metrics: ResourceMetrics,
    pub cost: ResourceCost,
}

/// The complete fixture universe for one provider.
pub struct ProviderFixtures {
    pub provider: CloudProvider,
    pub regions: Vec<String>,
    pub vms: Vec<VmFixture>,
    pub storage: Vec<StorageFixture>,
    pub network: Vec<NetworkFixture>,
    /// Data-transfer pricing tiers (per GB, USD)
    pub transfer_tiers: Vec<PricingTier>,
    /// USD per million requests, by service type
    pub request_prices: HashMap<NetworkServiceType, Decimal>,
    pub resources: Vec<ResourceFixture>,
}

/// Cross-provider region equivalence groups (AWS, Azure, GCP).
const REGION_EQUIVALENTS: &[(&str, &str, &str)] = &[
    ("us-east-1", "eastus", "us-central1"),
    ("us-west-2", "westus2", "us-east1"),
    ("eu-west-1", "westeurope", "europe-west1"),
];

/// Adapter serving the `CloudAdapter` surface from a fixture set.
pub struct SimulatedAdapter {
    fixtures: ProviderFixtures,
    currency: CurrencyService,
}

fn simulation_rates() -> FixedRateProvider {
    FixedRateProvider::new()
        .with_rate(Currency::Usd, Currency::Eur, Decimal::new(92, 2))
        .with_rate(Currency::Usd, Currency::Gbp, Decimal::new(80, 2))
        .with_rate(Currency::Usd, Currency::Jpy, Decimal::new(1495, 1))
        .with_rate(Currency::Usd, Currency::Cad, Decimal::new(137, 2))
        .with_rate(Currency::Usd, Currency::Aud, Decimal::new(152, 2))
}

impl SimulatedAdapter {
    pub fn new(fixtures: ProviderFixtures) -> Self {
        Self {
            fixtures,
            currency: CurrencyService::new(Box::new(simulation_rates())),
        }
    }

    pub fn aws() -> Self {
        Self::new(aws::fixtures())
    }

    pub fn azure() -> Self {
        Self::new(azure::fixtures())
    }

    pub fn gcp() -> Self {
        Self::new(gcp::fixtures())
    }

    fn provider_name(&self) -> String {
        self.fixtures.provider.to_string()
    }

    /// Translate a requested region to this provider's native region.
    ///
    /// Native names pass through; the well-known cross-provider
    /// equivalents (us-east-1 / eastus / us-central1, ...) translate so a
    /// single comparison region reaches every provider. Anything else is
    /// unsupported.
    fn resolve_region(&self, region: &str) -> AdapterResult<String> {
        if self.fixtures.regions.iter().any(|r| r == region) {
            return Ok(region.to_string());
        }

        let native = REGION_EQUIVALENTS
            .iter()
            .find(|(aws, azure, gcp)| [aws, azure, gcp].iter().any(|r| **r == region))
            .map(|(aws, azure, gcp)| match self.fixtures.provider {
                CloudProvider::Aws => *aws,
                CloudProvider::Azure => *azure,
                CloudProvider::Gcp => *gcp,
            });

        match native {
            Some(native) if self.fixtures.regions.iter().any(|r| r == native) => {
                Ok(native.to_string())
            }
            _ => Err(AdapterError::UnsupportedRegion {
                provider: self.provider_name(),
                region: region.to_string(),
            }),
        }
    }

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::Usd)
    }

    fn os_multiplier(operating_system: OperatingSystem) -> Decimal {
        match operating_system {
            OperatingSystem::Linux => Decimal::ONE,
            OperatingSystem::Windows => Decimal::new(15, 1), // 1.5x for license
        }
    }

    fn purchase_multiplier(purchase_option: PurchaseOption) -> Decimal {
        match purchase_option {
            PurchaseOption::OnDemand => Decimal::ONE,
            PurchaseOption::Reserved => Decimal::new(62, 2), // 1-year commitment
            PurchaseOption::Spot => Decimal::new(30, 2),
        }
    }

    fn storage_fixture(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        replication: Option<ReplicationType>,
    ) -> AdapterResult<&StorageFixture> {
        self.fixtures
            .storage
            .iter()
            .find(|f| {
                f.spec.storage_type == storage_type
                    && f.spec.storage_class == storage_class
                    && replication.is_none_or(|r| f.spec.replication_type == r)
            })
            .ok_or_else(|| AdapterError::NotFound {
                provider: self.provider_name(),
                what: format!("{storage_type}/{storage_class} storage offering"),
            })
    }
}

#[async_trait]
impl CloudAdapter for SimulatedAdapter {
    fn provider(&self) -> CloudProvider {
        self.fixtures.provider
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn list_instance_types(&self, region: &str) -> AdapterResult<Vec<VmInstanceType>> {
        let native = self.resolve_region(region)?;
        debug!(provider = %self.fixtures.provider, region = %native, "Listing simulated instance types");
        Ok(self
            .fixtures
            .vms
            .iter()
            .map(|f| {
                let mut spec = f.spec.clone();
                spec.region = native.clone();
                spec
            })
            .collect())
    }

    async fn list_storage_options(
        &self,
        storage_type: StorageType,
        region: &str,
    ) -> AdapterResult<Vec<StorageOption>> {
        let native = self.resolve_region(region)?;
        Ok(self
            .fixtures
            .storage
            .iter()
            .filter(|f| f.spec.storage_type == storage_type)
            .map(|f| {
                let mut spec = f.spec.clone();
                spec.region = native.clone();
                spec
            })
            .collect())
    }

    async fn list_network_options(
        &self,
        service_type: NetworkServiceType,
        region: &str,
    ) -> AdapterResult<Vec<NetworkOption>> {
        let native = self.resolve_region(region)?;
        Ok(self
            .fixtures
            .network
            .iter()
            .filter(|f| f.spec.service_type == service_type)
            .map(|f| {
                let mut spec = f.spec.clone();
                spec.region = native.clone();
                spec
            })
            .collect())
    }

    async fn get_compute_costs(
        &self,
        instance_type: &str,
        region: &str,
        operating_system: OperatingSystem,
        purchase_option: PurchaseOption,
    ) -> AdapterResult<CostComponent> {
        self.resolve_region(region)?;
        let fixture = self
            .fixtures
            .vms
            .iter()
            .find(|f| f.spec.instance_type == instance_type)
            .ok_or_else(|| AdapterError::NotFound {
                provider: self.provider_name(),
                what: format!("instance type {instance_type}"),
            })?;

        let hourly = fixture.hourly_usd
            * Self::os_multiplier(operating_system)
            * Self::purchase_multiplier(purchase_option);
        Ok(CostComponent::hourly("Compute", Self::usd(hourly)))
    }

    async fn get_storage_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        replication: ReplicationType,
        region: &str,
        capacity_gb: u64,
    ) -> AdapterResult<CostComponent> {
        self.resolve_region(region)?;
        let fixture = self.storage_fixture(storage_type, storage_class, Some(replication))?;
        let monthly = tiered_cost(Decimal::from(capacity_gb), &fixture.capacity_tiers).map_err(
            |e| AdapterError::PricingUnavailable {
                provider: self.provider_name(),
                what: format!("{storage_type}/{storage_class} capacity pricing"),
                details: HashMap::from([("error".to_string(), e.to_string())]),
            },
        )?;
        Ok(CostComponent::monthly("Storage", Self::usd(monthly)).with_unit("gb_month"))
    }

    async fn get_iops_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        region: &str,
        iops: u32,
    ) -> AdapterResult<CostComponent> {
        self.resolve_region(region)?;
        let fixture = self.storage_fixture(storage_type, storage_class, None)?;
        let billable = iops.saturating_sub(fixture.free_iops);
        let monthly = Decimal::from(billable) * fixture.iops_rate;
        Ok(CostComponent::monthly("IOPS", Self::usd(monthly)).with_unit("iops_month"))
    }

    async fn get_throughput_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        region: &str,
        throughput_mbps: u32,
    ) -> AdapterResult<CostComponent> {
        self.resolve_region(region)?;
        let fixture = self.storage_fixture(storage_type, storage_class, None)?;
        let billable = throughput_mbps.saturating_sub(fixture.free_throughput_mbps);
        let monthly = Decimal::from(billable) * fixture.throughput_rate;
        Ok(CostComponent::monthly("Throughput", Self::usd(monthly)).with_unit("mbps_month"))
    }

    async fn get_network_costs(&self, query: &NetworkCostQuery) -> AdapterResult<NetworkCostQuote> {
        self.resolve_region(&query.region)?;
        let fixture = self
            .fixtures
            .network
            .iter()
            .find(|f| {
                f.spec.service_type == query.service_type
                    && (query.load_balancer_type.is_none()
                        || f.spec.load_balancer_type == query.load_balancer_type)
                    && (query.dns_type.is_none() || f.spec.dns_type == query.dns_type)
                    && (query.vpn_type.is_none() || f.spec.vpn_type == query.vpn_type)
            })
            .ok_or_else(|| AdapterError::NotFound {
                provider: self.provider_name(),
                what: format!("{} offering", query.service_type),
            })?;

        let mut components = Vec::new();

        let base = match fixture.base {
            BaseCharge::Hourly(rate) => monthly_from_hourly(rate),
            BaseCharge::Monthly(amount) => amount,
        };
        components.push(CostComponent::monthly("Service", Self::usd(base)));

        // Data transfer applies to services that move payload bytes.
        let transfer_billable = matches!(
            query.service_type,
            NetworkServiceType::LoadBalancer
                | NetworkServiceType::Cdn
                | NetworkServiceType::Vpn
                | NetworkServiceType::Transit
                | NetworkServiceType::Nat
        );
        if let Some(transfer_gb) = query.data_transfer_gb.filter(|_| transfer_billable) {
            let cost = tiered_cost(Decimal::from(transfer_gb), &self.fixtures.transfer_tiers)
                .map_err(|e| AdapterError::PricingUnavailable {
                    provider: self.provider_name(),
                    what: "data transfer pricing".to_string(),
                    details: HashMap::from([("error".to_string(), e.to_string())]),
                })?;
            components.push(CostComponent::monthly("Data Transfer", Self::usd(cost)).with_unit("gb"));
        }

        // Request charges apply to request-counted services.
        let requests_billable = matches!(
            query.service_type,
            NetworkServiceType::LoadBalancer
                | NetworkServiceType::Cdn
                | NetworkServiceType::Dns
                | NetworkServiceType::Waf
        );
        if let Some(rps) = query.requests_per_second.filter(|_| requests_billable) {
            if let Some(price_per_million) = self.fixtures.request_prices.get(&query.service_type) {
                let cost = monthly_request_cost(rps, *price_per_million);
                components
                    .push(CostComponent::monthly("Requests", Self::usd(cost)).with_unit("requests"));
            }
        }

        let monthly_cost = Money::try_sum(
            Currency::Usd,
            components.iter().map(|c| &c.monthly_cost),
        )
        .map_err(|e| AdapterError::PricingUnavailable {
            provider: self.provider_name(),
            what: "network cost composition".to_string(),
            details: HashMap::from([("error".to_string(), e.to_string())]),
        })?;

        Ok(NetworkCostQuote {
            monthly_cost,
            components,
        })
    }

    async fn get_pricing_data(
        &self,
        region: &str,
        currency: Currency,
    ) -> AdapterResult<Vec<PricingData>> {
        self.resolve_region(region)?;
        let mut records = Vec::new();

        for fixture in &self.fixtures.vms {
            let unit_price = self
                .currency
                .convert(Self::usd(fixture.hourly_usd), currency)
                .map_err(|e| AdapterError::PricingUnavailable {
                    provider: self.provider_name(),
                    what: format!("currency conversion to {currency}"),
                    details: HashMap::from([("error".to_string(), e.to_string())]),
                })?;
            records.push(PricingData {
                provider: self.fixtures.provider,
                sku: format!(
                    "{}-{}-{}",
                    self.fixtures.provider, fixture.spec.instance_type, region
                ),
                service_name: "Compute Instance".to_string(),
                resource_type: ResourceType::Compute,
                region: region.to_string(),
                unit_price,
                pricing_unit: PricingUnit::Hour,
                description: format!(
                    "{} - {} vCPU, {} GB memory",
                    fixture.spec.instance_type, fixture.spec.vcpus, fixture.spec.memory_gb
                ),
                attributes: HashMap::from([
                    ("vcpus".to_string(), fixture.spec.vcpus.to_string()),
                    ("memory_gb".to_string(), fixture.spec.memory_gb.to_string()),
                ]),
                effective_date: chrono::Utc::now(),
            });
        }

        for fixture in &self.fixtures.storage {
            let Some(first_tier) = fixture.capacity_tiers.first() else {
                continue;
            };
            let unit_price = self
                .currency
                .convert(Self::usd(first_tier.rate), currency)
                .map_err(|e| AdapterError::PricingUnavailable {
                    provider: self.provider_name(),
                    what: format!("currency conversion to {currency}"),
                    details: HashMap::from([("error".to_string(), e.to_string())]),
                })?;
            records.push(PricingData {
                provider: self.fixtures.provider,
                sku: format!(
                    "{}-{}-{}-{}",
                    self.fixtures.provider,
                    fixture.spec.storage_type,
                    fixture.spec.storage_class,
                    region
                ),
                service_name: "Storage".to_string(),
                resource_type: ResourceType::Storage,
                region: region.to_string(),
                unit_price,
                pricing_unit: PricingUnit::GbMonth,
                description: format!(
                    "{} {} storage",
                    fixture.spec.storage_class, fixture.spec.storage_type
                ),
                attributes: HashMap::from([(
                    "storage_class".to_string(),
                    fixture.spec.storage_class.to_string(),
                )]),
                effective_date: chrono::Utc::now(),
            });
        }

        Ok(records)
    }

    async fn get_resources(
        &self,
        ids: Option<&[String]>,
        types: Option<&[ResourceType]>,
    ) -> AdapterResult<Vec<ResourceConfiguration>> {
        Ok(self
            .fixtures
            .resources
            .iter()
            .map(|f| &f.configuration)
            .filter(|c| ids.is_none_or(|ids| ids.contains(&c.id)))
            .filter(|c| types.is_none_or(|types| types.contains(&c.resource_type)))
            .cloned()
            .collect())
    }

    async fn get_metrics(&self, resource_id: &str) -> AdapterResult<ResourceMetrics> {
        self.fixtures
            .resources
            .iter()
            .find(|f| f.configuration.id == resource_id)
            .map(|f| f.metrics.clone())
            .ok_or_else(|| AdapterError::NotFound {
                provider: self.provider_name(),
                what: format!("resource {resource_id}"),
            })
    }

    async fn get_cost(&self, resource_id: &str) -> AdapterResult<ResourceCost> {
        self.fixtures
            .resources
            .iter()
            .find(|f| f.configuration.id == resource_id)
            .map(|f| f.cost.clone())
            .ok_or_else(|| AdapterError::NotFound {
                provider: self.provider_name(),
                what: format!("resource {resource_id}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LoadBalancerType;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_unknown_region_is_rejected() {
        let adapter = SimulatedAdapter::aws();
        let err = adapter.list_instance_types("mars-north-1").await.unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedRegion { .. }));
    }

    #[tokio::test]
    async fn test_scenario_catalog_prices_are_pinned() {
        // The three scenario instances the whole test suite leans on.
        let aws = SimulatedAdapter::aws()
            .get_compute_costs(
                "t3.medium",
                "us-east-1",
                OperatingSystem::Linux,
                PurchaseOption::OnDemand,
            )
            .await
            .unwrap();
        assert_eq!(aws.hourly_cost.unwrap().amount, dec!(0.10));
        assert_eq!(aws.monthly_cost.amount, dec!(73.00));

        let azure = SimulatedAdapter::azure()
            .get_compute_costs(
                "Standard_B2s",
                "eastus",
                OperatingSystem::Linux,
                PurchaseOption::OnDemand,
            )
            .await
            .unwrap();
        assert_eq!(azure.hourly_cost.unwrap().amount, dec!(0.12));

        let gcp = SimulatedAdapter::gcp()
            .get_compute_costs(
                "n1-standard-2",
                "us-central1",
                OperatingSystem::Linux,
                PurchaseOption::OnDemand,
            )
            .await
            .unwrap();
        assert_eq!(gcp.hourly_cost.unwrap().amount, dec!(0.11));
    }

    #[tokio::test]
    async fn test_windows_and_spot_multipliers() {
        let adapter = SimulatedAdapter::aws();
        let windows = adapter
            .get_compute_costs(
                "t3.medium",
                "us-east-1",
                OperatingSystem::Windows,
                PurchaseOption::OnDemand,
            )
            .await
            .unwrap();
        assert_eq!(windows.hourly_cost.unwrap().amount, dec!(0.150));

        let spot = adapter
            .get_compute_costs(
                "t3.medium",
                "us-east-1",
                OperatingSystem::Linux,
                PurchaseOption::Spot,
            )
            .await
            .unwrap();
        assert_eq!(spot.hourly_cost.unwrap().amount, dec!(0.0300));
    }

    #[tokio::test]
    async fn test_unknown_instance_type_not_found() {
        let adapter = SimulatedAdapter::aws();
        let err = adapter
            .get_compute_costs(
                "quantum.9000xl",
                "us-east-1",
                OperatingSystem::Linux,
                PurchaseOption::OnDemand,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_network_quote_totals_components() {
        let adapter = SimulatedAdapter::aws();
        let quote = adapter
            .get_network_costs(&NetworkCostQuery {
                service_type: NetworkServiceType::LoadBalancer,
                region: "us-east-1".into(),
                bandwidth_gbps: 1.0,
                data_transfer_gb: Some(500),
                requests_per_second: Some(100),
                high_availability: true,
                cross_region: false,
                load_balancer_type: Some(LoadBalancerType::Application),
                dns_type: None,
                vpn_type: None,
                transit_type: None,
                nat_type: None,
            })
            .await
            .unwrap();

        let total = Money::try_sum(
            Currency::Usd,
            quote.components.iter().map(|c| &c.monthly_cost),
        )
        .unwrap();
        assert_eq!(quote.monthly_cost, total);
        assert_eq!(quote.components.len(), 3); // Service + Data Transfer + Requests
    }

    #[tokio::test]
    async fn test_pricing_data_honours_currency() {
        let adapter = SimulatedAdapter::gcp();
        let usd = adapter
            .get_pricing_data("us-central1", Currency::Usd)
            .await
            .unwrap();
        let eur = adapter
            .get_pricing_data("us-central1", Currency::Eur)
            .await
            .unwrap();
        assert_eq!(usd.len(), eur.len());
        assert!(eur.iter().all(|p| p.unit_price.currency == Currency::Eur));
    }

    #[tokio::test]
    async fn test_inventory_round_trip() {
        let adapter = SimulatedAdapter::aws();
        let resources = adapter.get_resources(None, None).await.unwrap();
        assert!(!resources.is_empty());

        let first = &resources[0];
        let metrics = adapter.get_metrics(&first.id).await.unwrap();
        assert_eq!(metrics.resource_id, first.id);

        let cost = adapter.get_cost(&first.id).await.unwrap();
        assert_eq!(cost.resource_id, first.id);

        let err = adapter.get_metrics("i-does-not-exist").await.unwrap_err();
        assert!(matches!(err, AdapterError::NotFound { .. }));
    }
}
