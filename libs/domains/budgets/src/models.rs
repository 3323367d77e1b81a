use chrono::{DateTime, Utc};
use domain_costs::{CloudProvider, Money};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Budget evaluation period.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl BudgetPeriod {
    /// Days the forecast projects over.
    pub fn forecast_days(&self) -> u32 {
        match self {
            BudgetPeriod::Monthly => 30,
            BudgetPeriod::Quarterly => 90,
            BudgetPeriod::Annually => 365,
        }
    }
}

/// One alerting threshold: fires when spend crosses the percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetThreshold {
    /// Percent of the budget amount, in (0, 100]
    pub percentage: f64,
    /// The absolute amount the percentage corresponds to
    pub amount: Money,
}

/// A spending budget with ordered alert thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Budget {
    #[validate(length(min = 1, max = 255))]
    pub id: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub amount: Money,
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Sorted ascending by percentage
    pub thresholds: Vec<BudgetThreshold>,
    /// Scopes which costs count against this budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<CloudProvider>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Alert lifecycle states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Active,
    Acknowledged,
    Resolved,
}

/// A threshold crossing, one per threshold per evaluation period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub id: Uuid,
    pub budget_id: String,
    pub threshold_percentage: f64,
    pub spent: Money,
    pub status: AlertStatus,
    pub message: String,
    pub triggered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Point-in-time spend standing for a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budget_id: String,
    pub amount: Money,
    pub spent: Money,
    pub remaining: Money,
    pub percent_used: f64,
    pub active_alerts: usize,
    pub as_of: DateTime<Utc>,
}

/// One historical spending observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSample {
    pub date: DateTime<Utc>,
    pub amount: Money,
}

/// Projected spending over the next period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingForecast {
    pub budget_id: String,
    pub period: BudgetPeriod,
    pub projected_spend: Money,
    pub daily_run_rate: Money,
    pub samples_used: usize,
    pub will_exceed_budget: bool,
    pub generated_at: DateTime<Utc>,
}

/// Criteria for querying budgets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<BudgetPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<CloudProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_at: Option<DateTime<Utc>>,
}

impl BudgetQuery {
    pub fn matches(&self, budget: &Budget) -> bool {
        self.name_contains
            .as_ref()
            .is_none_or(|needle| budget.name.contains(needle.as_str()))
            && self.period.is_none_or(|p| budget.period == p)
            && self.provider.is_none_or(|p| budget.provider == Some(p))
            && self.active_at.is_none_or(|at| {
                budget.start_date <= at && budget.end_date.is_none_or(|end| at < end)
            })
    }
}
