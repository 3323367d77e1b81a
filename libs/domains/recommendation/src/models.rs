use chrono::{DateTime, Utc};
use domain_costs::{CloudProvider, Money, ResourceType};
use domain_selection::RankingFactors;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Effort class of a migration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MigrationComplexity {
    Low,
    #[default]
    Medium,
    High,
}

/// A cost-reduction recommendation for one deployed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostOptimizationRecommendation {
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub region: String,
    pub current_monthly_cost: Money,
    pub optimized_monthly_cost: Money,
    pub savings_percent: f64,
    pub optimization_type: String,
    pub description: String,
    pub implementation_steps: Vec<String>,
    pub risks: Vec<String>,
    pub valid_until: DateTime<Utc>,
}

/// A performance-improvement recommendation for one deployed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceOptimizationRecommendation {
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub region: String,
    pub current_score: f64,
    pub projected_score: f64,
    pub improvement_percent: f64,
    pub optimization_type: String,
    pub description: String,
    pub implementation_steps: Vec<String>,
    pub risks: Vec<String>,
    pub valid_until: DateTime<Utc>,
}

/// A placement recommendation derived from a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecommendation {
    pub provider: CloudProvider,
    pub region: String,
    pub resource_class: String,
    pub monthly_cost: Money,
    pub performance_score: f64,
    pub compliance_score: f64,
    pub total_score: f64,
    pub ranking_factors: RankingFactors,
    pub is_primary: bool,
    pub valid_until: DateTime<Utc>,
}

/// A cross-provider migration recommendation for one deployed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRecommendation {
    pub resource_id: String,
    pub current_provider: CloudProvider,
    pub target_provider: CloudProvider,
    pub resource_type: ResourceType,
    pub region: String,
    pub current_monthly_cost: Money,
    pub target_monthly_cost: Money,
    pub cost_savings_percent: f64,
    pub current_performance: f64,
    pub target_performance: f64,
    pub performance_improvement_percent: f64,
    pub complexity: MigrationComplexity,
    pub estimated_duration: String,
    pub migration_steps: Vec<String>,
    pub risks: Vec<String>,
    pub valid_until: DateTime<Utc>,
}

impl MigrationRecommendation {
    /// Combined benefit used for ordering candidates.
    pub fn combined_benefit(&self) -> f64 {
        self.cost_savings_percent + self.performance_improvement_percent
    }
}
