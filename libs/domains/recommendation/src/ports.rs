//! External ports the recommendation engine consumes.
//!
//! Inventory, cost optimization, and metrics backends plug in through
//! these traits; the engine never talks to provider SDKs directly.

use std::collections::HashMap;

use async_trait::async_trait;
use domain_costs::{CloudProvider, Money, ResourceType};
use serde::{Deserialize, Serialize};

use crate::error::PortError;

/// A deployed resource as the inventory reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryResource {
    pub id: String,
    pub provider: CloudProvider,
    pub resource_type: ResourceType,
    pub region: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_gbps: Option<f64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Current cost attribution for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCostSummary {
    pub resource_id: String,
    pub monthly_cost: Money,
}

/// A cost-saving change the optimizer proposes for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOpportunity {
    pub optimization_type: String,
    pub estimated_monthly_cost: Money,
    pub description: String,
    pub implementation_steps: Vec<String>,
    pub risks: Vec<String>,
}

/// Current performance standing of one resource, overall in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePerformance {
    pub resource_id: String,
    pub overall_score: f64,
}

/// A performance-improving change proposed for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceOpportunity {
    pub optimization_type: String,
    pub projected_score: f64,
    pub description: String,
    pub implementation_steps: Vec<String>,
    pub risks: Vec<String>,
}

/// Inventory of deployed resources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryPort: Send + Sync {
    async fn list_resources<'a>(
        &'a self,
        resource_type: Option<ResourceType>,
        region: Option<&'a str>,
    ) -> Result<Vec<InventoryResource>, PortError>;

    async fn get_resource(&self, id: &str) -> Result<InventoryResource, PortError>;
}

/// Source of per-resource costs and saving opportunities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CostOptimizerPort: Send + Sync {
    async fn resource_cost(&self, resource_id: &str) -> Result<ResourceCostSummary, PortError>;

    async fn optimization_opportunities(
        &self,
        resource_id: &str,
    ) -> Result<Vec<OptimizationOpportunity>, PortError>;
}

/// Source of per-resource performance standings and opportunities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsPort: Send + Sync {
    async fn performance(&self, resource_id: &str) -> Result<ResourcePerformance, PortError>;

    async fn performance_opportunities(
        &self,
        resource_id: &str,
    ) -> Result<Vec<PerformanceOpportunity>, PortError>;
}
