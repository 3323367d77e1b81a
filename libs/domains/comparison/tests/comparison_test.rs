//! End-to-end comparison tests against the fixture-backed adapters.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain_comparison::{
    ComparisonError, ComparisonFilter, EngineOptions, NetworkComparisonEngine,
    NetworkRequirements, StorageComparisonEngine, StorageRequirements, VmComparisonEngine,
    VmRequirements, VmSize,
};
use domain_costs::{CloudProvider, CostComponent, Currency, Money, ResourceType};
use provider_adapters::{
    AdapterError, AdapterFactory, AdapterRegistry, AdapterResult, CloudAdapter, NetworkCostQuery,
    NetworkCostQuote, NetworkOption, NetworkServiceType, OperatingSystem, PerformanceTier,
    PricingData, PurchaseOption, ReplicationType, ResourceConfiguration, ResourceCost,
    ResourceMetrics, StorageClass, StorageOption, StorageType, VmInstanceType, VpnType,
};
use rust_decimal_macros::dec;

fn registry() -> Arc<AdapterRegistry> {
    Arc::new(AdapterFactory::simulated().build_registry())
}

fn vm_requirements() -> VmRequirements {
    VmRequirements {
        region: "us-east-1".into(),
        size: VmSize {
            vcpus: 2,
            memory_gb: 4.0,
            gpu_count: None,
            local_disk_gb: None,
        },
        operating_system: OperatingSystem::Linux,
        purchase_option: PurchaseOption::OnDemand,
        required_features: BTreeSet::new(),
        required_certifications: BTreeSet::new(),
    }
}

#[tokio::test]
async fn vm_comparison_across_three_providers_recommends_cheapest() {
    let engine = VmComparisonEngine::new(registry(), EngineOptions::default());
    let result = engine.compare(&vm_requirements(), None).await.unwrap();

    // All three providers contribute estimates.
    let providers: BTreeSet<CloudProvider> = result
        .comparison
        .estimates
        .iter()
        .map(|e| e.provider)
        .collect();
    assert_eq!(providers.len(), 3);

    // AWS t3.medium at $0.10/hr wins: 0.10 * 730 = 73.00 monthly.
    let recommended = &result.comparison.recommended_option;
    assert_eq!(recommended.provider, CloudProvider::Aws);
    assert_eq!(recommended.instance_type, "t3.medium");
    assert_eq!(recommended.monthly_cost.amount, dec!(73.00));

    // The recommendation is one of the estimates.
    assert!(result
        .comparison
        .estimates
        .iter()
        .any(|e| e == recommended));

    assert!(result.total_options_considered >= result.filtered_options_count);
}

#[tokio::test]
async fn vm_estimate_monthly_cost_equals_component_sum() {
    let engine = VmComparisonEngine::new(registry(), EngineOptions::default());
    let mut requirements = vm_requirements();
    // Force a local-disk instance so estimates carry two components.
    requirements.size.local_disk_gb = Some(50);
    let result = engine.compare(&requirements, None).await.unwrap();

    for estimate in &result.comparison.estimates {
        let total = Money::try_sum(
            Currency::Usd,
            estimate.cost_components.iter().map(|c| &c.monthly_cost),
        )
        .unwrap();
        assert_eq!(estimate.monthly_cost, total);
        assert!(estimate.cost_components.len() >= 2);
    }
}

#[tokio::test]
async fn vm_comparison_second_run_hits_catalog_cache() {
    let engine = VmComparisonEngine::new(registry(), EngineOptions::default());
    let first = engine.compare(&vm_requirements(), None).await.unwrap();
    assert!(!first.cache_hit);

    let second = engine.compare(&vm_requirements(), None).await.unwrap();
    assert!(second.cache_hit);
    assert_eq!(
        first.comparison.recommended_option,
        second.comparison.recommended_option
    );
}

#[tokio::test]
async fn vm_comparison_filters_restrict_providers() {
    let engine = VmComparisonEngine::new(registry(), EngineOptions::default());
    let filters = ComparisonFilter::for_providers([CloudProvider::Gcp]);
    let result = engine
        .compare(&vm_requirements(), Some(&filters))
        .await
        .unwrap();

    assert!(result
        .comparison
        .estimates
        .iter()
        .all(|e| e.provider == CloudProvider::Gcp));
    assert_eq!(
        result.comparison.recommended_option.instance_type,
        "n1-standard-2"
    );
}

#[tokio::test]
async fn vm_comparison_cost_ceiling_excludes_expensive_options() {
    let engine = VmComparisonEngine::new(registry(), EngineOptions::default());
    let filters = ComparisonFilter {
        max_monthly_cost: Some(dec!(80)),
        ..Default::default()
    };
    let result = engine
        .compare(&vm_requirements(), Some(&filters))
        .await
        .unwrap();
    assert!(result
        .comparison
        .estimates
        .iter()
        .all(|e| e.monthly_cost.amount <= dec!(80)));
}

#[tokio::test]
async fn vm_comparison_with_impossible_requirements_reports_no_match() {
    let engine = VmComparisonEngine::new(registry(), EngineOptions::default());
    let mut requirements = vm_requirements();
    requirements.size.vcpus = 4096;

    let err = engine.compare(&requirements, None).await.unwrap_err();
    match err {
        ComparisonError::NoMatchingOptions { providers, regions, .. } => {
            assert_eq!(providers.len(), 3);
            assert_eq!(regions, vec!["us-east-1".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn storage_comparison_prices_block_storage_with_iops_and_throughput() {
    let engine = StorageComparisonEngine::new(registry(), EngineOptions::default());
    let requirements = StorageRequirements {
        region: "us-east-1".into(),
        storage_type: StorageType::Block,
        capacity_gb: 500,
        iops: Some(6_000),
        throughput_mbps: Some(250),
        performance_tier: Some(PerformanceTier::GeneralPurpose),
        required_features: BTreeSet::new(),
        required_certifications: BTreeSet::new(),
    };

    let result = engine.compare(&requirements, None).await.unwrap();
    let recommended = &result.comparison.recommended_option;

    // Base capacity + provisioned IOPS + provisioned throughput.
    let names: Vec<&str> = recommended
        .cost_components
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert!(names.contains(&"Storage"));
    assert!(names.contains(&"IOPS"));
    assert!(names.contains(&"Throughput"));

    let total = Money::try_sum(
        Currency::Usd,
        recommended.cost_components.iter().map(|c| &c.monthly_cost),
    )
    .unwrap();
    assert_eq!(recommended.monthly_cost, total);
}

#[tokio::test]
async fn storage_comparison_object_tier_pricing_is_exact() {
    let engine = StorageComparisonEngine::new(registry(), EngineOptions::default());
    let requirements = StorageRequirements {
        region: "us-east-1".into(),
        storage_type: StorageType::Object,
        capacity_gb: 1_000,
        iops: None,
        throughput_mbps: None,
        performance_tier: None,
        required_features: BTreeSet::new(),
        required_certifications: BTreeSet::new(),
    };
    let filters = ComparisonFilter {
        providers: [CloudProvider::Aws].into_iter().collect(),
        storage_classes: [StorageClass::Standard].into_iter().collect(),
        ..Default::default()
    };

    let result = engine.compare(&requirements, Some(&filters)).await.unwrap();
    // 1000 GB in the first S3 tier at $0.023/GB.
    assert_eq!(
        result.comparison.recommended_option.monthly_cost.amount,
        dec!(23.000)
    );
}

#[tokio::test]
async fn network_comparison_composes_transfer_and_request_components() {
    let engine = NetworkComparisonEngine::new(registry(), EngineOptions::default());
    let requirements = NetworkRequirements {
        region: "us-east-1".into(),
        service_type: NetworkServiceType::LoadBalancer,
        bandwidth_gbps: 1.0,
        data_transfer_gb: Some(2_048),
        requests_per_second: Some(100),
        high_availability: true,
        cross_region: false,
        load_balancer_type: None,
        dns_type: None,
        vpn_type: None,
        transit_type: None,
        nat_type: None,
        required_features: BTreeSet::new(),
        required_certifications: BTreeSet::new(),
    };

    let result = engine.compare(&requirements, None).await.unwrap();
    for estimate in &result.comparison.estimates {
        let names: Vec<&str> = estimate
            .cost_components
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert!(names.contains(&"Service"));
        assert!(names.contains(&"Data Transfer"));
        assert!(names.contains(&"Requests"));

        let total = Money::try_sum(
            Currency::Usd,
            estimate.cost_components.iter().map(|c| &c.monthly_cost),
        )
        .unwrap();
        assert_eq!(estimate.monthly_cost, total);
    }
}

#[tokio::test]
async fn network_vpn_comparison_prices_hourly_service_monthly() {
    let engine = NetworkComparisonEngine::new(registry(), EngineOptions::default());
    let requirements = NetworkRequirements {
        region: "us-east-1".into(),
        service_type: NetworkServiceType::Vpn,
        bandwidth_gbps: 0.5,
        data_transfer_gb: None,
        requests_per_second: None,
        high_availability: true,
        cross_region: true,
        load_balancer_type: None,
        dns_type: None,
        vpn_type: Some(VpnType::SiteToSite),
        transit_type: None,
        nat_type: None,
        required_features: BTreeSet::new(),
        required_certifications: BTreeSet::new(),
    };

    let result = engine.compare(&requirements, None).await.unwrap();
    // Azure's 0.04/hr site-to-site gateway is cheapest: 0.04 * 730.
    let recommended = &result.comparison.recommended_option;
    assert_eq!(recommended.provider, CloudProvider::Azure);
    assert_eq!(recommended.monthly_cost.amount, dec!(29.20));
}

#[tokio::test]
async fn network_state_surfaces_partial_failures() {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(provider_adapters::SimulatedAdapter::aws()));
    registry.register(Arc::new(failing_adapter()));
    let engine = NetworkComparisonEngine::new(Arc::new(registry), EngineOptions::default());

    let state = engine.network_state("us-east-1").await;
    assert!(state.successes.contains_key(&CloudProvider::Aws));
    assert!(state.failures.contains_key(&CloudProvider::Azure));
    assert!(!state.is_complete());
}

#[tokio::test(start_paused = true)]
async fn comparison_deadline_discards_partial_results() {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(provider_adapters::SimulatedAdapter::aws()));
    registry.register(Arc::new(hanging_adapter()));

    let options = EngineOptions {
        comparison_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let engine = VmComparisonEngine::new(Arc::new(registry), options);

    let err = engine.compare(&vm_requirements(), None).await.unwrap_err();
    assert!(matches!(err, ComparisonError::Timeout { timeout_secs: 2 }));
}

#[tokio::test]
async fn failing_provider_drops_without_failing_comparison() {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(provider_adapters::SimulatedAdapter::aws()));
    registry.register(Arc::new(failing_adapter()));
    let engine = VmComparisonEngine::new(Arc::new(registry), EngineOptions::default());

    let result = engine.compare(&vm_requirements(), None).await.unwrap();
    assert!(result
        .comparison
        .estimates
        .iter()
        .all(|e| e.provider == CloudProvider::Aws));
}

/// Adapter stub: either fails every call or never completes.
struct ScriptedAdapter {
    provider: CloudProvider,
    hang: bool,
}

impl ScriptedAdapter {
    fn error(&self) -> AdapterError {
        AdapterError::Api {
            provider: self.provider.to_string(),
            message: "unreachable".into(),
        }
    }

    async fn outcome<T>(&self) -> AdapterResult<T> {
        if self.hang {
            futures::future::pending::<()>().await;
        }
        Err(self.error())
    }
}

/// Adapter that fails every call, standing in for an unreachable provider.
fn failing_adapter() -> ScriptedAdapter {
    ScriptedAdapter {
        provider: CloudProvider::Azure,
        hang: false,
    }
}

/// Adapter that never completes, standing in for a stalled provider.
fn hanging_adapter() -> ScriptedAdapter {
    ScriptedAdapter {
        provider: CloudProvider::Gcp,
        hang: true,
    }
}

#[async_trait]
impl CloudAdapter for ScriptedAdapter {
    fn provider(&self) -> CloudProvider {
        self.provider
    }
    fn is_configured(&self) -> bool {
        true
    }
    async fn list_instance_types(&self, _region: &str) -> AdapterResult<Vec<VmInstanceType>> {
        self.outcome().await
    }
    async fn list_storage_options(
        &self,
        _storage_type: StorageType,
        _region: &str,
    ) -> AdapterResult<Vec<StorageOption>> {
        self.outcome().await
    }
    async fn list_network_options(
        &self,
        _service_type: NetworkServiceType,
        _region: &str,
    ) -> AdapterResult<Vec<NetworkOption>> {
        self.outcome().await
    }
    async fn get_compute_costs(
        &self,
        _instance_type: &str,
        _region: &str,
        _operating_system: OperatingSystem,
        _purchase_option: PurchaseOption,
    ) -> AdapterResult<CostComponent> {
        self.outcome().await
    }
    async fn get_storage_costs(
        &self,
        _storage_type: StorageType,
        _storage_class: StorageClass,
        _replication: ReplicationType,
        _region: &str,
        _capacity_gb: u64,
    ) -> AdapterResult<CostComponent> {
        self.outcome().await
    }
    async fn get_iops_costs(
        &self,
        _storage_type: StorageType,
        _storage_class: StorageClass,
        _region: &str,
        _iops: u32,
    ) -> AdapterResult<CostComponent> {
        self.outcome().await
    }
    async fn get_throughput_costs(
        &self,
        _storage_type: StorageType,
        _storage_class: StorageClass,
        _region: &str,
        _throughput_mbps: u32,
    ) -> AdapterResult<CostComponent> {
        self.outcome().await
    }
    async fn get_network_costs(
        &self,
        _query: &NetworkCostQuery,
    ) -> AdapterResult<NetworkCostQuote> {
        self.outcome().await
    }
    async fn get_pricing_data(
        &self,
        _region: &str,
        _currency: Currency,
    ) -> AdapterResult<Vec<PricingData>> {
        self.outcome().await
    }
    async fn get_resources(
        &self,
        _ids: Option<&[String]>,
        _types: Option<&[ResourceType]>,
    ) -> AdapterResult<Vec<ResourceConfiguration>> {
        self.outcome().await
    }
    async fn get_metrics(&self, _resource_id: &str) -> AdapterResult<ResourceMetrics> {
        self.outcome().await
    }
    async fn get_cost(&self, _resource_id: &str) -> AdapterResult<ResourceCost> {
        self.outcome().await
    }
}
