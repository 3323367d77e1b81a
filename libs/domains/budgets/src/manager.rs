//! Budget lifecycle, alert derivation, and forecasting.

use std::sync::Arc;

use chrono::Utc;
use domain_costs::Money;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    AlertStatus, Budget, BudgetAlert, BudgetPeriod, BudgetQuery, BudgetSummary, SpendingForecast,
    SpendingSample,
};
use crate::repository::BudgetRepository;

/// Manager for budget CRUD, threshold alerts, and spending forecasts.
pub struct BudgetManager<R: BudgetRepository> {
    repository: Arc<R>,
    /// Minimum historical samples a forecast needs
    forecast_data_points: usize,
}

impl<R: BudgetRepository> BudgetManager<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            forecast_data_points: 7,
        }
    }

    pub fn with_forecast_data_points(mut self, forecast_data_points: usize) -> Self {
        self.forecast_data_points = forecast_data_points;
        self
    }

    /// Create a new budget after validating its shape.
    pub async fn create_budget(&self, budget: Budget) -> BudgetResult<Budget> {
        validate_budget(&budget)?;
        self.repository.insert(budget.clone()).await?;
        info!(budget_id = %budget.id, amount = %budget.amount, "Created budget");
        Ok(budget)
    }

    pub async fn get_budget(&self, budget_id: &str) -> BudgetResult<Budget> {
        self.repository
            .get(budget_id)
            .await?
            .ok_or_else(|| BudgetError::NotFound(budget_id.to_string()))
    }

    /// Replace a budget's definition; the id cannot change.
    pub async fn update_budget(&self, mut budget: Budget) -> BudgetResult<Budget> {
        validate_budget(&budget)?;
        // Existence check keeps NotFound ahead of validation surprises.
        self.get_budget(&budget.id).await?;
        budget.updated_at = Utc::now();
        self.repository.update(budget.clone()).await?;
        Ok(budget)
    }

    /// Delete a budget; its alerts and samples go with it.
    pub async fn delete_budget(&self, budget_id: &str) -> BudgetResult<()> {
        self.repository.delete(budget_id).await?;
        info!(budget_id = budget_id, "Deleted budget and cascaded alerts");
        Ok(())
    }

    pub async fn query_budgets(&self, query: &BudgetQuery) -> BudgetResult<Vec<Budget>> {
        let mut budgets: Vec<Budget> = self
            .repository
            .list()
            .await?
            .into_iter()
            .filter(|b| query.matches(b))
            .collect();
        budgets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(budgets)
    }

    /// Record an observed spend level and derive alerts for any newly
    /// crossed thresholds (one alert per threshold per evaluation
    /// period).
    pub async fn evaluate_spending(
        &self,
        budget_id: &str,
        spent: Money,
    ) -> BudgetResult<Vec<BudgetAlert>> {
        let budget = self.get_budget(budget_id).await?;
        if spent.currency != budget.amount.currency {
            return Err(BudgetError::Validation {
                field: "spent".into(),
                message: format!(
                    "spend currency {} does not match budget currency {}",
                    spent.currency, budget.amount.currency
                ),
            });
        }

        self.repository
            .append_sample(
                budget_id,
                SpendingSample {
                    date: Utc::now(),
                    amount: spent,
                },
            )
            .await?;

        let percent_used = percent_of(spent.amount, budget.amount.amount);
        let existing = self.repository.alerts(budget_id).await?;

        let mut new_alerts = Vec::new();
        for threshold in &budget.thresholds {
            if percent_used < threshold.percentage {
                continue;
            }
            let already_raised = existing.iter().chain(new_alerts.iter()).any(|a| {
                a.threshold_percentage == threshold.percentage && a.status != AlertStatus::Resolved
            });
            if already_raised {
                continue;
            }

            let alert = BudgetAlert {
                id: Uuid::new_v4(),
                budget_id: budget_id.to_string(),
                threshold_percentage: threshold.percentage,
                spent,
                status: AlertStatus::Active,
                message: format!(
                    "Budget '{}' crossed {}% ({} of {})",
                    budget.name, threshold.percentage, spent, budget.amount
                ),
                triggered_at: Utc::now(),
                acknowledged_at: None,
                resolved_at: None,
            };
            self.repository.insert_alert(alert.clone()).await?;
            new_alerts.push(alert);
        }

        if !new_alerts.is_empty() {
            info!(
                budget_id = budget_id,
                alerts = new_alerts.len(),
                percent_used,
                "Raised budget alerts"
            );
        }
        Ok(new_alerts)
    }

    pub async fn get_alerts(
        &self,
        budget_id: &str,
        status: Option<AlertStatus>,
    ) -> BudgetResult<Vec<BudgetAlert>> {
        self.get_budget(budget_id).await?;
        Ok(self
            .repository
            .alerts(budget_id)
            .await?
            .into_iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .collect())
    }

    /// Move an alert through its lifecycle.
    pub async fn update_alert_status(
        &self,
        alert_id: Uuid,
        status: AlertStatus,
    ) -> BudgetResult<BudgetAlert> {
        let mut alert = self
            .repository
            .get_alert(alert_id)
            .await?
            .ok_or(BudgetError::AlertNotFound(alert_id))?;

        match status {
            AlertStatus::Acknowledged => alert.acknowledged_at = Some(Utc::now()),
            AlertStatus::Resolved => alert.resolved_at = Some(Utc::now()),
            AlertStatus::Active => {}
        }
        alert.status = status;
        self.repository.update_alert(alert.clone()).await?;
        Ok(alert)
    }

    /// Current standing of a budget.
    pub async fn get_summary(&self, budget_id: &str) -> BudgetResult<BudgetSummary> {
        let budget = self.get_budget(budget_id).await?;
        let samples = self.repository.samples(budget_id).await?;
        let spent = samples
            .last()
            .map(|s| s.amount)
            .unwrap_or_else(|| Money::zero(budget.amount.currency));
        let active_alerts = self
            .repository
            .alerts(budget_id)
            .await?
            .iter()
            .filter(|a| a.status == AlertStatus::Active)
            .count();

        Ok(BudgetSummary {
            budget_id: budget_id.to_string(),
            amount: budget.amount,
            remaining: Money::new(budget.amount.amount - spent.amount, budget.amount.currency),
            percent_used: percent_of(spent.amount, budget.amount.amount),
            spent,
            active_alerts,
            as_of: Utc::now(),
        })
    }

    /// Linear forecast of next-period spend from the recorded samples.
    pub async fn get_forecast(
        &self,
        budget_id: &str,
        period: BudgetPeriod,
    ) -> BudgetResult<SpendingForecast> {
        let budget = self.get_budget(budget_id).await?;
        let samples = self.repository.samples(budget_id).await?;

        if samples.len() < self.forecast_data_points {
            return Err(BudgetError::InsufficientData {
                required: self.forecast_data_points,
                available: samples.len(),
            });
        }

        let n = samples.len();
        let amounts: Vec<Decimal> = samples.iter().map(|s| s.amount.amount).collect();

        // Least-squares fit over sample index.
        let n_dec = Decimal::from(n as u64);
        let mean_x = Decimal::from((n as u64 * (n as u64 - 1)) / 2) / n_dec;
        let mean_y = amounts.iter().copied().sum::<Decimal>() / n_dec;

        let mut numerator = Decimal::ZERO;
        let mut denominator = Decimal::ZERO;
        for (i, amount) in amounts.iter().enumerate() {
            let dx = Decimal::from(i as u64) - mean_x;
            numerator += dx * (*amount - mean_y);
            denominator += dx * dx;
        }
        let slope = if denominator.is_zero() {
            Decimal::ZERO
        } else {
            numerator / denominator
        };
        let intercept = mean_y - slope * mean_x;

        // Project each day of the next period and sum.
        let days = period.forecast_days();
        let mut projected = Decimal::ZERO;
        for day in 0..days {
            let x = Decimal::from(n as u64 + u64::from(day));
            let value = intercept + slope * x;
            projected += value.max(Decimal::ZERO);
        }

        let daily_run_rate = projected / Decimal::from(days);
        let currency = budget.amount.currency;

        Ok(SpendingForecast {
            budget_id: budget_id.to_string(),
            period,
            projected_spend: Money::new(projected, currency),
            daily_run_rate: Money::new(daily_run_rate, currency),
            samples_used: n,
            will_exceed_budget: projected > budget.amount.amount,
            generated_at: Utc::now(),
        })
    }
}

fn percent_of(spent: Decimal, amount: Decimal) -> f64 {
    if amount.is_zero() {
        return 0.0;
    }
    (spent / amount * Decimal::from(100u32))
        .to_f64()
        .unwrap_or(0.0)
}

fn validate_budget(budget: &Budget) -> BudgetResult<()> {
    budget
        .validate()
        .map_err(|e| BudgetError::Validation {
            field: "budget".into(),
            message: e.to_string(),
        })?;
    if budget.amount.amount <= Decimal::ZERO {
        return Err(BudgetError::Validation {
            field: "amount".into(),
            message: "budget amount must be greater than 0".into(),
        });
    }
    if let Some(end) = budget.end_date {
        if end <= budget.start_date {
            return Err(BudgetError::Validation {
                field: "end_date".into(),
                message: "end date must be after start date".into(),
            });
        }
    }
    for threshold in &budget.thresholds {
        if threshold.percentage <= 0.0 || threshold.percentage > 100.0 {
            return Err(BudgetError::Validation {
                field: "thresholds".into(),
                message: format!(
                    "threshold percentage {} must be within (0, 100]",
                    threshold.percentage
                ),
            });
        }
    }
    let sorted = budget
        .thresholds
        .windows(2)
        .all(|pair| pair[0].percentage < pair[1].percentage);
    if !sorted {
        return Err(BudgetError::Validation {
            field: "thresholds".into(),
            message: "thresholds must be sorted ascending by percentage".into(),
        });
    }
    Ok(())
}
