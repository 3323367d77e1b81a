//! The adapter trait every supported provider implements.

use async_trait::async_trait;
use domain_costs::{CloudProvider, CostComponent, Currency, ResourceType};

use crate::catalog::{
    NetworkCostQuery, NetworkCostQuote, NetworkOption, NetworkServiceType, OperatingSystem,
    PricingData, PurchaseOption, ReplicationType, ResourceConfiguration, ResourceCost,
    ResourceMetrics, StorageClass, StorageOption, StorageType, VmInstanceType,
};
use crate::error::AdapterResult;

/// Uniform query surface over one provider's catalog, pricing, and usage
/// APIs.
///
/// Every operation is suspendable and returns a typed result or a typed
/// error. Discriminators (`OperatingSystem`, `StorageClass`, ...) are core
/// enumerations; implementations translate to provider-native strings
/// internally. Retry of transient failures is the implementation's
/// responsibility; callers never retry an error the adapter surfaced as
/// non-transient.
#[async_trait]
pub trait CloudAdapter: Send + Sync {
    /// The provider this adapter fronts
    fn provider(&self) -> CloudProvider;

    /// Whether the adapter has the configuration it needs to serve calls
    fn is_configured(&self) -> bool;

    /// List VM offerings available in a region
    async fn list_instance_types(&self, region: &str) -> AdapterResult<Vec<VmInstanceType>>;

    /// List storage offerings of one type available in a region
    async fn list_storage_options(
        &self,
        storage_type: StorageType,
        region: &str,
    ) -> AdapterResult<Vec<StorageOption>>;

    /// List network offerings of one service type available in a region
    async fn list_network_options(
        &self,
        service_type: NetworkServiceType,
        region: &str,
    ) -> AdapterResult<Vec<NetworkOption>>;

    /// Base compute cost for an instance type
    async fn get_compute_costs(
        &self,
        instance_type: &str,
        region: &str,
        operating_system: OperatingSystem,
        purchase_option: PurchaseOption,
    ) -> AdapterResult<CostComponent>;

    /// Capacity cost for a storage configuration
    async fn get_storage_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        replication: ReplicationType,
        region: &str,
        capacity_gb: u64,
    ) -> AdapterResult<CostComponent>;

    /// Provisioned IOPS cost for block storage
    async fn get_iops_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        region: &str,
        iops: u32,
    ) -> AdapterResult<CostComponent>;

    /// Provisioned throughput cost for block storage
    async fn get_throughput_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        region: &str,
        throughput_mbps: u32,
    ) -> AdapterResult<CostComponent>;

    /// Total network service cost with its additive components
    async fn get_network_costs(&self, query: &NetworkCostQuery) -> AdapterResult<NetworkCostQuote>;

    /// Raw catalog price records for a region
    async fn get_pricing_data(
        &self,
        region: &str,
        currency: Currency,
    ) -> AdapterResult<Vec<PricingData>>;

    /// Deployed resources, optionally filtered by id and canonical type
    async fn get_resources(
        &self,
        ids: Option<&[String]>,
        types: Option<&[ResourceType]>,
    ) -> AdapterResult<Vec<ResourceConfiguration>>;

    /// Utilization metrics for one deployed resource
    async fn get_metrics(&self, resource_id: &str) -> AdapterResult<ResourceMetrics>;

    /// Current cost attribution for one deployed resource
    async fn get_cost(&self, resource_id: &str) -> AdapterResult<ResourceCost>;
}

/// Registry of adapters, one per provider.
pub struct AdapterRegistry {
    adapters: Vec<std::sync::Arc<dyn CloudAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    pub fn register(&mut self, adapter: std::sync::Arc<dyn CloudAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn get(&self, provider: CloudProvider) -> Option<std::sync::Arc<dyn CloudAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.provider() == provider)
            .cloned()
    }

    pub fn configured(&self) -> Vec<std::sync::Arc<dyn CloudAdapter>> {
        self.adapters
            .iter()
            .filter(|a| a.is_configured())
            .cloned()
            .collect()
    }

    pub fn providers(&self) -> Vec<CloudProvider> {
        self.adapters.iter().map(|a| a.provider()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
