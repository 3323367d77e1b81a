use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use domain_comparison::{NetworkRequirements, StorageRequirements, VmRequirements};
use domain_costs::{CloudProvider, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{SelectionError, SelectionResult as Result};

/// Compliance frameworks a provider can attest to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ComplianceFramework {
    Hipaa,
    PciDss,
    Soc2,
    Iso27001,
    Gdpr,
    Fedramp,
}

/// Per-class requirements wrapped for selection.
///
/// A sum type rather than three optional fields: exactly one class is
/// always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ResourceClassRequirements {
    Compute(VmRequirements),
    Storage(StorageRequirements),
    Network(NetworkRequirements),
}

impl ResourceClassRequirements {
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Compute(_) => "compute",
            Self::Storage(_) => "storage",
            Self::Network(_) => "network",
        }
    }
}

/// What the caller wants placed, and under which constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequirements {
    /// Caller-supplied name; also keys the active-evaluation set
    pub name: String,
    pub regions: BTreeSet<String>,
    /// Availability SLA floor, percent (e.g. 99.9)
    pub min_availability_pct: f64,
    #[serde(default)]
    pub required_features: BTreeSet<String>,
    #[serde(default)]
    pub required_certifications: BTreeSet<String>,
    #[serde(default)]
    pub compliance_frameworks: BTreeSet<ComplianceFramework>,
    #[serde(default)]
    pub preferred_providers: Vec<CloudProvider>,
    #[serde(default)]
    pub excluded_providers: BTreeSet<CloudProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_monthly_budget: Option<Decimal>,
    pub class: ResourceClassRequirements,
}

/// Ranking weights; must sum to 1.0 within floating tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionWeights {
    pub cost: f64,
    pub performance: f64,
    pub compliance: f64,
    pub preference: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            cost: 0.4,
            performance: 0.3,
            compliance: 0.2,
            preference: 0.1,
        }
    }
}

impl SelectionWeights {
    pub fn validate(&self) -> Result<()> {
        let parts = [self.cost, self.performance, self.compliance, self.preference];
        if parts.iter().any(|w| *w < 0.0 || *w > 1.0) {
            return Err(SelectionError::PolicyValidation {
                message: "weights must each be within [0, 1]".to_string(),
            });
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(SelectionError::PolicyValidation {
                message: format!("weights must sum to 1.0, got {sum}"),
            });
        }
        Ok(())
    }
}

/// One capability filter a policy applies before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SelectionRule {
    RequireFeature { feature: String },
    RequireCertification { certification: String },
    ExcludeProvider { provider: CloudProvider },
    MinAvailability { pct: f64 },
}

/// Weights and rules overriding the defaults when ranking options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<SelectionWeights>,
    /// Applied in order as capability filters before scoring
    #[serde(default)]
    pub rules: Vec<SelectionRule>,
}

/// What one provider offers for a resource class in a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCapability {
    pub provider: CloudProvider,
    pub region: String,
    pub features: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
    pub compliance_frameworks: BTreeSet<ComplianceFramework>,
    pub availability_sla_pct: f64,
}

/// Best-candidate cost for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCost {
    pub provider: CloudProvider,
    pub region: String,
    pub option_name: String,
    pub monthly_cost: Money,
}

/// Performance scoring, each factor in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScore {
    pub provider: CloudProvider,
    pub latency_score: f64,
    pub throughput_score: f64,
    pub reliability_score: f64,
    pub scalability_score: f64,
    pub overall_score: f64,
}

/// Compliance scoring, each factor in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceScore {
    pub provider: CloudProvider,
    pub framework_scores: HashMap<ComplianceFramework, f64>,
    pub certification_coverage: f64,
    pub feature_coverage: f64,
    pub overall_score: f64,
}

/// The per-factor inputs behind a total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingFactors {
    pub cost_score: f64,
    pub performance_score: f64,
    pub compliance_score: f64,
    pub preference_score: f64,
    pub weights: SelectionWeights,
}

/// One ranked provider option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOption {
    pub provider: CloudProvider,
    pub region: String,
    pub capability: ProviderCapability,
    pub cost: ProviderCost,
    pub performance_score: PerformanceScore,
    pub compliance_score: ComplianceScore,
    pub total_score: f64,
    pub ranking_factors: RankingFactors,
}

/// Outcome of a selection: the pick, alternatives, and the comparison
/// matrices behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub requirements: SelectionRequirements,
    pub selected_option: ProviderOption,
    pub alternative_options: Vec<ProviderOption>,
    pub selection_factors: RankingFactors,
    pub cost_comparison: HashMap<CloudProvider, ProviderCost>,
    pub performance_comparison: HashMap<CloudProvider, PerformanceScore>,
    pub compliance_comparison: HashMap<CloudProvider, ComplianceScore>,
    pub valid_until: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!(SelectionWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = SelectionWeights {
            cost: 0.9,
            performance: 0.3,
            compliance: 0.2,
            preference: 0.1,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = SelectionWeights {
            cost: -0.1,
            performance: 0.5,
            compliance: 0.4,
            preference: 0.2,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_framework_codes() {
        assert_eq!(ComplianceFramework::PciDss.to_string(), "pci-dss");
        assert_eq!(
            "iso27001".parse::<ComplianceFramework>().ok(),
            None,
            "framework codes are kebab-case"
        );
        assert_eq!(
            "iso-27001".parse::<ComplianceFramework>().unwrap(),
            ComplianceFramework::Iso27001
        );
    }
}
