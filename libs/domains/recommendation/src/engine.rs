//! The recommendation engine.
//!
//! Derives cost-optimization, performance-optimization, placement, and
//! migration recommendations from the selection engine, the inventory,
//! and the optimizer/metrics ports. Every recommendation carries a
//! `valid_until` stamp.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use domain_comparison::{NetworkRequirements, StorageRequirements, VmRequirements, VmSize};
use domain_costs::ResourceType;
use domain_selection::{
    ResourceClassRequirements, SelectionEngine, SelectionError, SelectionPolicy,
    SelectionRequirements,
};
use provider_adapters::{
    NetworkServiceType, OperatingSystem, PurchaseOption, StorageType,
};
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, warn};

use crate::error::{RecommendationError, RecommendationResult};
use crate::models::{
    CostOptimizationRecommendation, MigrationComplexity, MigrationRecommendation,
    PerformanceOptimizationRecommendation, PlacementRecommendation,
};
use crate::ports::{CostOptimizerPort, InventoryPort, InventoryResource, MetricsPort};

/// Engine for generating resource recommendations.
pub struct RecommendationEngine {
    selection_engine: Arc<SelectionEngine>,
    inventory: Arc<dyn InventoryPort>,
    optimizer: Arc<dyn CostOptimizerPort>,
    metrics: Arc<dyn MetricsPort>,
    recommendation_ttl: Duration,
    max_alternatives: usize,
    min_savings_percent: f64,
    min_performance_improvement: f64,
}

impl RecommendationEngine {
    pub fn new(
        selection_engine: Arc<SelectionEngine>,
        inventory: Arc<dyn InventoryPort>,
        optimizer: Arc<dyn CostOptimizerPort>,
        metrics: Arc<dyn MetricsPort>,
    ) -> Self {
        Self {
            selection_engine,
            inventory,
            optimizer,
            metrics,
            recommendation_ttl: Duration::from_secs(3600),
            max_alternatives: 3,
            min_savings_percent: 10.0,
            min_performance_improvement: 10.0,
        }
    }

    pub fn with_recommendation_ttl(mut self, ttl: Duration) -> Self {
        self.recommendation_ttl = ttl;
        self
    }

    pub fn with_max_alternatives(mut self, max_alternatives: usize) -> Self {
        self.max_alternatives = max_alternatives;
        self
    }

    pub fn with_savings_floor(mut self, min_savings_percent: f64) -> Self {
        self.min_savings_percent = min_savings_percent;
        self
    }

    fn valid_until(&self) -> chrono::DateTime<Utc> {
        Utc::now() + self.recommendation_ttl
    }

    /// Cost-reduction recommendations for deployed resources of one type
    /// in one region, best savings first.
    pub async fn cost_optimization_recommendations(
        &self,
        resource_type: ResourceType,
        region: &str,
        max_recommendations: usize,
    ) -> RecommendationResult<Vec<CostOptimizationRecommendation>> {
        let resources = self
            .inventory
            .list_resources(Some(resource_type), Some(region))
            .await
            .map_err(RecommendationError::Inventory)?;

        let mut recommendations = Vec::new();
        for resource in resources {
            let current = self
                .optimizer
                .resource_cost(&resource.id)
                .await
                .map_err(RecommendationError::Optimizer)?;
            let opportunities = self
                .optimizer
                .optimization_opportunities(&resource.id)
                .await
                .map_err(RecommendationError::Optimizer)?;

            for opportunity in opportunities {
                let savings_percent = percent_change(
                    current.monthly_cost.amount,
                    opportunity.estimated_monthly_cost.amount,
                );
                if savings_percent < self.min_savings_percent {
                    debug!(
                        resource_id = %resource.id,
                        savings_percent,
                        "Opportunity below savings floor, skipping"
                    );
                    continue;
                }
                recommendations.push(CostOptimizationRecommendation {
                    resource_id: resource.id.clone(),
                    resource_type,
                    region: region.to_string(),
                    current_monthly_cost: current.monthly_cost,
                    optimized_monthly_cost: opportunity.estimated_monthly_cost,
                    savings_percent,
                    optimization_type: opportunity.optimization_type,
                    description: opportunity.description,
                    implementation_steps: opportunity.implementation_steps,
                    risks: opportunity.risks,
                    valid_until: self.valid_until(),
                });
            }
        }

        recommendations.sort_by(|a, b| {
            b.savings_percent
                .partial_cmp(&a.savings_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        recommendations.truncate(max_recommendations);
        info!(
            resource_type = %resource_type,
            region = region,
            count = recommendations.len(),
            "Generated cost optimization recommendations"
        );
        Ok(recommendations)
    }

    /// Performance-improvement recommendations for deployed resources,
    /// best improvement first.
    pub async fn performance_optimization_recommendations(
        &self,
        resource_type: ResourceType,
        region: &str,
        max_recommendations: usize,
    ) -> RecommendationResult<Vec<PerformanceOptimizationRecommendation>> {
        let resources = self
            .inventory
            .list_resources(Some(resource_type), Some(region))
            .await
            .map_err(RecommendationError::Inventory)?;

        let mut recommendations = Vec::new();
        for resource in resources {
            let current = self
                .metrics
                .performance(&resource.id)
                .await
                .map_err(RecommendationError::Metrics)?;
            if current.overall_score <= 0.0 {
                continue;
            }
            let opportunities = self
                .metrics
                .performance_opportunities(&resource.id)
                .await
                .map_err(RecommendationError::Metrics)?;

            for opportunity in opportunities {
                let improvement_percent = (opportunity.projected_score - current.overall_score)
                    / current.overall_score
                    * 100.0;
                if improvement_percent < self.min_performance_improvement {
                    continue;
                }
                recommendations.push(PerformanceOptimizationRecommendation {
                    resource_id: resource.id.clone(),
                    resource_type,
                    region: region.to_string(),
                    current_score: current.overall_score,
                    projected_score: opportunity.projected_score,
                    improvement_percent,
                    optimization_type: opportunity.optimization_type,
                    description: opportunity.description,
                    implementation_steps: opportunity.implementation_steps,
                    risks: opportunity.risks,
                    valid_until: self.valid_until(),
                });
            }
        }

        recommendations.sort_by(|a, b| {
            b.improvement_percent
                .partial_cmp(&a.improvement_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        recommendations.truncate(max_recommendations);
        Ok(recommendations)
    }

    /// Placement recommendations: the selection's pick plus up to
    /// `max_alternatives` runners-up.
    pub async fn placement_recommendations(
        &self,
        requirements: &SelectionRequirements,
        policy: Option<&SelectionPolicy>,
    ) -> RecommendationResult<Vec<PlacementRecommendation>> {
        let outcome = self.selection_engine.select(requirements, policy).await?;
        let resource_class = requirements.class.class_name().to_string();
        let valid_until = self.valid_until();

        let mut recommendations = vec![PlacementRecommendation {
            provider: outcome.selected_option.provider,
            region: outcome.selected_option.region.clone(),
            resource_class: resource_class.clone(),
            monthly_cost: outcome.selected_option.cost.monthly_cost,
            performance_score: outcome.selected_option.performance_score.overall_score,
            compliance_score: outcome.selected_option.compliance_score.overall_score,
            total_score: outcome.selected_option.total_score,
            ranking_factors: outcome.selected_option.ranking_factors.clone(),
            is_primary: true,
            valid_until,
        }];

        for option in outcome
            .alternative_options
            .iter()
            .take(self.max_alternatives)
        {
            recommendations.push(PlacementRecommendation {
                provider: option.provider,
                region: option.region.clone(),
                resource_class: resource_class.clone(),
                monthly_cost: option.cost.monthly_cost,
                performance_score: option.performance_score.overall_score,
                compliance_score: option.compliance_score.overall_score,
                total_score: option.total_score,
                ranking_factors: option.ranking_factors.clone(),
                is_primary: false,
                valid_until,
            });
        }

        Ok(recommendations)
    }

    /// Migration recommendations for deployed resources: cross-provider
    /// moves clearing either the savings or the performance floor,
    /// ordered by combined benefit.
    pub async fn migration_recommendations(
        &self,
        resource_type: ResourceType,
        region: &str,
        max_recommendations: usize,
    ) -> RecommendationResult<Vec<MigrationRecommendation>> {
        let resources = self
            .inventory
            .list_resources(Some(resource_type), Some(region))
            .await
            .map_err(RecommendationError::Inventory)?;

        let mut recommendations = Vec::new();
        for resource in resources {
            let current_cost = self
                .optimizer
                .resource_cost(&resource.id)
                .await
                .map_err(RecommendationError::Optimizer)?;
            let current_performance = self
                .metrics
                .performance(&resource.id)
                .await
                .map_err(RecommendationError::Metrics)?;

            let requirements = match requirements_from_resource(&resource) {
                Ok(requirements) => requirements,
                Err(err) => {
                    debug!(resource_id = %resource.id, error = %err, "Skipping migration candidate");
                    continue;
                }
            };

            let outcome = match self.selection_engine.select(&requirements, None).await {
                Ok(outcome) => outcome,
                Err(SelectionError::NoMatchingProviders { .. }) => continue,
                Err(err) => return Err(err.into()),
            };

            for option in std::iter::once(&outcome.selected_option)
                .chain(outcome.alternative_options.iter())
            {
                // Staying put is not a migration.
                if option.provider == resource.provider {
                    continue;
                }

                let cost_savings_percent = percent_change(
                    current_cost.monthly_cost.amount,
                    option.cost.monthly_cost.amount,
                );
                let performance_improvement_percent = if current_performance.overall_score > 0.0 {
                    (option.performance_score.overall_score - current_performance.overall_score)
                        / current_performance.overall_score
                        * 100.0
                } else {
                    0.0
                };

                if cost_savings_percent < self.min_savings_percent
                    && performance_improvement_percent < self.min_performance_improvement
                {
                    continue;
                }

                recommendations.push(MigrationRecommendation {
                    resource_id: resource.id.clone(),
                    current_provider: resource.provider,
                    target_provider: option.provider,
                    resource_type,
                    region: region.to_string(),
                    current_monthly_cost: current_cost.monthly_cost,
                    target_monthly_cost: option.cost.monthly_cost,
                    cost_savings_percent,
                    current_performance: current_performance.overall_score,
                    target_performance: option.performance_score.overall_score,
                    performance_improvement_percent,
                    complexity: MigrationComplexity::Medium,
                    estimated_duration: "2-4 hours".to_string(),
                    migration_steps: migration_steps(),
                    risks: migration_risks(),
                    valid_until: self.valid_until(),
                });
            }
        }

        recommendations.sort_by(|a, b| {
            b.combined_benefit()
                .partial_cmp(&a.combined_benefit())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        recommendations.truncate(max_recommendations);
        Ok(recommendations)
    }
}

/// Percentage saved moving from `current` to `proposed`; negative when
/// the proposal costs more.
fn percent_change(current: rust_decimal::Decimal, proposed: rust_decimal::Decimal) -> f64 {
    if current.is_zero() {
        return 0.0;
    }
    ((current - proposed) / current * rust_decimal::Decimal::from(100u32))
        .to_f64()
        .unwrap_or(0.0)
}

/// Rebuild selection requirements from an inventoried resource.
fn requirements_from_resource(
    resource: &InventoryResource,
) -> RecommendationResult<SelectionRequirements> {
    let class = match resource.resource_type {
        ResourceType::Compute => {
            let (Some(vcpus), Some(memory_gb)) = (resource.vcpus, resource.memory_gb) else {
                return Err(RecommendationError::InvalidResource {
                    id: resource.id.clone(),
                    message: "compute resource lacks vcpus/memory".to_string(),
                });
            };
            ResourceClassRequirements::Compute(VmRequirements {
                region: resource.region.clone(),
                size: VmSize {
                    vcpus,
                    memory_gb,
                    gpu_count: None,
                    local_disk_gb: None,
                },
                operating_system: OperatingSystem::Linux,
                purchase_option: PurchaseOption::OnDemand,
                required_features: BTreeSet::new(),
                required_certifications: BTreeSet::new(),
            })
        }
        ResourceType::Storage => {
            let Some(capacity_gb) = resource.capacity_gb else {
                return Err(RecommendationError::InvalidResource {
                    id: resource.id.clone(),
                    message: "storage resource lacks capacity".to_string(),
                });
            };
            ResourceClassRequirements::Storage(StorageRequirements {
                region: resource.region.clone(),
                storage_type: StorageType::Object,
                capacity_gb,
                iops: None,
                throughput_mbps: None,
                performance_tier: None,
                required_features: BTreeSet::new(),
                required_certifications: BTreeSet::new(),
            })
        }
        ResourceType::Network | ResourceType::LoadBalancer => {
            let Some(bandwidth_gbps) = resource.bandwidth_gbps else {
                return Err(RecommendationError::InvalidResource {
                    id: resource.id.clone(),
                    message: "network resource lacks bandwidth".to_string(),
                });
            };
            ResourceClassRequirements::Network(NetworkRequirements {
                region: resource.region.clone(),
                service_type: NetworkServiceType::LoadBalancer,
                bandwidth_gbps,
                data_transfer_gb: None,
                requests_per_second: None,
                high_availability: false,
                cross_region: false,
                load_balancer_type: None,
                dns_type: None,
                vpn_type: None,
                transit_type: None,
                nat_type: None,
                required_features: BTreeSet::new(),
                required_certifications: BTreeSet::new(),
            })
        }
        other => {
            return Err(RecommendationError::InvalidResource {
                id: resource.id.clone(),
                message: format!("no migration path for resource type {other}"),
            });
        }
    };

    Ok(SelectionRequirements {
        name: format!("migration-{}", resource.id),
        regions: BTreeSet::from([resource.region.clone()]),
        min_availability_pct: 99.9,
        required_features: BTreeSet::new(),
        required_certifications: BTreeSet::new(),
        compliance_frameworks: BTreeSet::new(),
        preferred_providers: vec![],
        excluded_providers: BTreeSet::new(),
        max_monthly_budget: None,
        class,
    })
}

fn migration_steps() -> Vec<String> {
    [
        "Prepare migration plan and success criteria",
        "Export data and configuration from the current provider",
        "Provision equivalent resources in the target provider",
        "Migrate data and verify integrity",
        "Cut over DNS and routing",
        "Decommission the old resources",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn migration_risks() -> Vec<String> {
    [
        "Potential downtime during cutover",
        "Data transfer costs",
        "Configuration compatibility issues",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{
        MockCostOptimizerPort, MockInventoryPort, MockMetricsPort, OptimizationOpportunity,
        PerformanceOpportunity, ResourceCostSummary, ResourcePerformance,
    };
    use core_config::EngineConfig;
    use domain_costs::{CloudProvider, Currency, Money};
    use provider_adapters::AdapterFactory;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn selection_engine() -> Arc<SelectionEngine> {
        let registry = Arc::new(AdapterFactory::simulated().build_registry());
        Arc::new(SelectionEngine::new(registry, &EngineConfig::default()))
    }

    fn compute_resource(id: &str, provider: CloudProvider) -> InventoryResource {
        InventoryResource {
            id: id.into(),
            provider,
            resource_type: ResourceType::Compute,
            region: "us-east-1".into(),
            name: format!("{id}-name"),
            vcpus: Some(2),
            memory_gb: Some(4.0),
            capacity_gb: None,
            bandwidth_gbps: None,
            tags: HashMap::new(),
        }
    }

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::Usd)
    }

    fn engine(
        inventory: MockInventoryPort,
        optimizer: MockCostOptimizerPort,
        metrics: MockMetricsPort,
    ) -> RecommendationEngine {
        RecommendationEngine::new(
            selection_engine(),
            Arc::new(inventory),
            Arc::new(optimizer),
            Arc::new(metrics),
        )
    }

    #[tokio::test]
    async fn cost_recommendations_apply_the_savings_floor() {
        let mut inventory = MockInventoryPort::new();
        inventory.expect_list_resources().returning(|_, _| {
            Ok(vec![compute_resource("i-1", CloudProvider::Aws)])
        });

        let mut optimizer = MockCostOptimizerPort::new();
        optimizer.expect_resource_cost().returning(|id| {
            Ok(ResourceCostSummary {
                resource_id: id.to_string(),
                monthly_cost: usd(dec!(100)),
            })
        });
        optimizer.expect_optimization_opportunities().returning(|_| {
            Ok(vec![
                OptimizationOpportunity {
                    optimization_type: "rightsize".into(),
                    estimated_monthly_cost: usd(dec!(50)),
                    description: "Downsize to a smaller instance".into(),
                    implementation_steps: vec!["Resize".into()],
                    risks: vec!["Brief restart".into()],
                },
                OptimizationOpportunity {
                    optimization_type: "rightsize".into(),
                    estimated_monthly_cost: usd(dec!(95)),
                    description: "Marginal change".into(),
                    implementation_steps: vec![],
                    risks: vec![],
                },
            ])
        });

        let engine = engine(inventory, optimizer, MockMetricsPort::new());
        let recommendations = engine
            .cost_optimization_recommendations(ResourceType::Compute, "us-east-1", 5)
            .await
            .unwrap();

        // 50% savings passes the 10% floor, 5% does not.
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].savings_percent, 50.0);
        assert!(recommendations[0].valid_until > Utc::now());
    }

    #[tokio::test]
    async fn performance_recommendations_require_meaningful_improvement() {
        let mut inventory = MockInventoryPort::new();
        inventory.expect_list_resources().returning(|_, _| {
            Ok(vec![compute_resource("i-2", CloudProvider::Aws)])
        });

        let mut metrics = MockMetricsPort::new();
        metrics.expect_performance().returning(|id| {
            Ok(ResourcePerformance {
                resource_id: id.to_string(),
                overall_score: 0.5,
            })
        });
        metrics.expect_performance_opportunities().returning(|_| {
            Ok(vec![
                PerformanceOpportunity {
                    optimization_type: "instance_upgrade".into(),
                    projected_score: 0.65,
                    description: "Upgrade tier".into(),
                    implementation_steps: vec![],
                    risks: vec![],
                },
                PerformanceOpportunity {
                    optimization_type: "tuning".into(),
                    projected_score: 0.52,
                    description: "Minor tuning".into(),
                    implementation_steps: vec![],
                    risks: vec![],
                },
            ])
        });

        let engine = engine(inventory, MockCostOptimizerPort::new(), metrics);
        let recommendations = engine
            .performance_optimization_recommendations(ResourceType::Compute, "us-east-1", 5)
            .await
            .unwrap();

        assert_eq!(recommendations.len(), 1);
        assert!((recommendations[0].improvement_percent - 30.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn placement_recommendations_mark_one_primary() {
        let engine = engine(
            MockInventoryPort::new(),
            MockCostOptimizerPort::new(),
            MockMetricsPort::new(),
        );

        let requirements = SelectionRequirements {
            name: "placement".into(),
            regions: BTreeSet::from(["us-east-1".to_string()]),
            min_availability_pct: 99.9,
            required_features: BTreeSet::new(),
            required_certifications: BTreeSet::new(),
            compliance_frameworks: BTreeSet::new(),
            preferred_providers: vec![],
            excluded_providers: BTreeSet::new(),
            max_monthly_budget: None,
            class: ResourceClassRequirements::Compute(VmRequirements {
                region: String::new(),
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
            }),
        };

        let recommendations = engine
            .placement_recommendations(&requirements, None)
            .await
            .unwrap();

        assert!(!recommendations.is_empty());
        assert!(recommendations[0].is_primary);
        assert!(recommendations[1..].iter().all(|r| !r.is_primary));
        assert_eq!(recommendations[0].provider, CloudProvider::Aws);
        assert!(recommendations.len() <= 4); // primary + max_alternatives
    }

    #[tokio::test]
    async fn migration_recommendations_propose_cheaper_providers() {
        let mut inventory = MockInventoryPort::new();
        inventory.expect_list_resources().returning(|_, _| {
            Ok(vec![compute_resource("vm-exp", CloudProvider::Azure)])
        });

        let mut optimizer = MockCostOptimizerPort::new();
        optimizer.expect_resource_cost().returning(|id| {
            Ok(ResourceCostSummary {
                resource_id: id.to_string(),
                monthly_cost: usd(dec!(200)),
            })
        });

        let mut metrics = MockMetricsPort::new();
        metrics.expect_performance().returning(|id| {
            Ok(ResourcePerformance {
                resource_id: id.to_string(),
                overall_score: 0.7,
            })
        });

        let engine = engine(inventory, optimizer, metrics);
        let recommendations = engine
            .migration_recommendations(ResourceType::Compute, "us-east-1", 5)
            .await
            .unwrap();

        assert!(!recommendations.is_empty());
        let top = &recommendations[0];
        // The current provider never appears as a target.
        assert!(recommendations
            .iter()
            .all(|r| r.target_provider != CloudProvider::Azure));
        // AWS at 73.00 against a 200.00 bill clears the savings floor.
        assert_eq!(top.target_provider, CloudProvider::Aws);
        assert!(top.cost_savings_percent > 60.0);

        // Ordered by combined benefit.
        for pair in recommendations.windows(2) {
            assert!(pair[0].combined_benefit() >= pair[1].combined_benefit());
        }
    }

    #[test]
    fn requirements_from_compute_resource_round_trips_fields() {
        let resource = compute_resource("i-9", CloudProvider::Gcp);
        let requirements = requirements_from_resource(&resource).unwrap();
        match requirements.class {
            ResourceClassRequirements::Compute(vm) => {
                assert_eq!(vm.size.vcpus, 2);
                assert_eq!(vm.size.memory_gb, 4.0);
            }
            other => panic!("unexpected class: {other:?}"),
        }
    }

    #[test]
    fn unsupported_resource_types_cannot_seed_migrations() {
        let mut resource = compute_resource("q-1", CloudProvider::Aws);
        resource.resource_type = ResourceType::Queue;
        assert!(matches!(
            requirements_from_resource(&resource).unwrap_err(),
            RecommendationError::InvalidResource { .. }
        ));
    }
}
