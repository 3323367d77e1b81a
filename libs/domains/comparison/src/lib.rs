//! Cost comparison engines.
//!
//! One engine per resource class (VM, storage, network). Each validates
//! requirements, fans out to every eligible provider adapter in parallel
//! under a single deadline, filters the returned catalogs, composes
//! multi-tier cost estimates, and ranks the survivors deterministically.

pub mod error;
pub mod fanout;
pub mod models;
pub mod network;
pub mod storage;
pub mod vm;

pub use error::{ComparisonEngineResult, ComparisonError};
pub use models::{
    rank_estimates, Comparison, ComparisonFilter, ComparisonResult, NetworkCostEstimate,
    NetworkRequirements, PartialResult, RankableEstimate, StorageCostEstimate,
    StorageRequirements, VmCostEstimate, VmRequirements, VmSize,
};
pub use network::NetworkComparisonEngine;
pub use storage::StorageComparisonEngine;
pub use vm::VmComparisonEngine;

use std::sync::Arc;
use std::time::Duration;

use core_config::EngineConfig;
use domain_costs::CloudProvider;
use provider_adapters::{AdapterRegistry, CloudAdapter};

/// Knobs shared by the three comparison engines.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Deadline for one whole comparison fan-out
    pub comparison_timeout: Duration,
    /// TTL for cached provider catalogs
    pub cache_ttl: Duration,
    /// Tie-break order when estimates cost the same
    pub provider_preference: Vec<CloudProvider>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            comparison_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
            provider_preference: Vec::new(),
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            comparison_timeout: config.comparison_timeout,
            cache_ttl: config.cache_ttl,
            provider_preference: Vec::new(),
        }
    }

    pub fn with_provider_preference(mut self, preference: Vec<CloudProvider>) -> Self {
        self.provider_preference = preference;
        self
    }

    /// Configured adapters, narrowed by the filter's provider set.
    pub(crate) fn eligible_adapters(
        &self,
        registry: &AdapterRegistry,
        filters: Option<&ComparisonFilter>,
    ) -> Vec<Arc<dyn CloudAdapter>> {
        registry
            .configured()
            .into_iter()
            .filter(|adapter| match filters {
                Some(f) if !f.providers.is_empty() => f.providers.contains(&adapter.provider()),
                _ => true,
            })
            .collect()
    }
}
