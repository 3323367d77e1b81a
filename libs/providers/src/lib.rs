//! Provider capability adapters.
//!
//! One uniform, suspendable query surface (`CloudAdapter`) over each cloud
//! provider's catalog, pricing, and usage APIs, plus the retry policy and
//! process-wide catalog cache the engines share. The `AdapterFactory`
//! chooses live or fixture-backed implementations at startup; nothing in
//! the platform consults a global mode flag.

pub mod adapter;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod live;
pub mod retry;
pub mod simulated;

pub use adapter::{AdapterRegistry, CloudAdapter};
pub use cache::{CacheKey, CachedValue, CatalogCache};
pub use catalog::{
    DnsType, LoadBalancerType, NatType, NetworkCostQuery, NetworkCostQuote, NetworkOption,
    NetworkServiceType, OperatingSystem, PerformanceTier, PricingData, PricingUnit, PurchaseOption,
    ReplicationType, ResourceConfiguration, ResourceCost, ResourceMetrics, StorageClass,
    StorageOption, StorageType, TransitType, VmInstanceType, VpnType,
};
pub use error::{AdapterError, AdapterResult};
pub use live::LiveAdapter;
pub use retry::RetryPolicy;
pub use simulated::SimulatedAdapter;

use std::sync::Arc;
use std::time::Duration;

use core_config::EngineConfig;
use domain_costs::CloudProvider;
use strum::IntoEnumIterator;
use tracing::info;

/// Builds the adapter set the engines run against.
///
/// Simulation mode is decided once, at construction, from the injected
/// configuration.
pub struct AdapterFactory {
    simulation_mode: bool,
    retry: RetryPolicy,
    gcp_api_key: Option<String>,
}

impl AdapterFactory {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            simulation_mode: config.simulation_mode,
            retry: RetryPolicy::new(config.max_retries, Duration::from_millis(200)),
            gcp_api_key: None,
        }
    }

    pub fn simulated() -> Self {
        Self {
            simulation_mode: true,
            retry: RetryPolicy::default(),
            gcp_api_key: None,
        }
    }

    pub fn with_gcp_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.gcp_api_key = Some(api_key.into());
        self
    }

    /// Build one adapter for a provider.
    pub fn build(&self, provider: CloudProvider) -> Arc<dyn CloudAdapter> {
        if self.simulation_mode {
            let adapter = match provider {
                CloudProvider::Aws => SimulatedAdapter::aws(),
                CloudProvider::Azure => SimulatedAdapter::azure(),
                CloudProvider::Gcp => SimulatedAdapter::gcp(),
            };
            Arc::new(adapter)
        } else {
            let api_key = match provider {
                CloudProvider::Gcp => self.gcp_api_key.clone(),
                _ => None,
            };
            Arc::new(LiveAdapter::new(provider, self.retry.clone(), api_key))
        }
    }

    /// Build a registry holding every supported provider.
    pub fn build_registry(&self) -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        for provider in CloudProvider::iter() {
            registry.register(self.build(provider));
        }
        info!(
            simulation = self.simulation_mode,
            providers = registry.providers().len(),
            "Adapter registry initialized"
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_all_providers() {
        let registry = AdapterFactory::simulated().build_registry();
        assert_eq!(registry.providers().len(), 3);
        assert!(registry.get(CloudProvider::Aws).is_some());
        assert!(registry.get(CloudProvider::Azure).is_some());
        assert!(registry.get(CloudProvider::Gcp).is_some());
    }

    #[test]
    fn test_simulation_mode_comes_from_config() {
        let mut config = core_config::EngineConfig::default();
        config.simulation_mode = true;
        let factory = AdapterFactory::new(&config);
        assert!(factory.simulation_mode);
    }
}
