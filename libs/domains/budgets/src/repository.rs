use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{Budget, BudgetAlert, SpendingSample};

/// Repository trait for budget persistence.
///
/// A budget owns its alerts and spending samples; deleting the budget
/// cascades to both.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    async fn insert(&self, budget: Budget) -> BudgetResult<()>;

    async fn get(&self, budget_id: &str) -> BudgetResult<Option<Budget>>;

    async fn update(&self, budget: Budget) -> BudgetResult<()>;

    /// Remove the budget together with its alerts and samples
    async fn delete(&self, budget_id: &str) -> BudgetResult<()>;

    async fn list(&self) -> BudgetResult<Vec<Budget>>;

    async fn insert_alert(&self, alert: BudgetAlert) -> BudgetResult<()>;

    async fn alerts(&self, budget_id: &str) -> BudgetResult<Vec<BudgetAlert>>;

    async fn update_alert(&self, alert: BudgetAlert) -> BudgetResult<()>;

    async fn get_alert(&self, alert_id: Uuid) -> BudgetResult<Option<BudgetAlert>>;

    async fn append_sample(&self, budget_id: &str, sample: SpendingSample) -> BudgetResult<()>;

    async fn samples(&self, budget_id: &str) -> BudgetResult<Vec<SpendingSample>>;
}

#[derive(Default)]
struct Store {
    budgets: HashMap<String, Budget>,
    alerts: HashMap<String, Vec<BudgetAlert>>,
    samples: HashMap<String, Vec<SpendingSample>>,
}

/// In-memory repository with multi-reader/single-writer discipline.
#[derive(Default)]
pub struct InMemoryBudgetRepository {
    store: RwLock<Store>,
}

impl InMemoryBudgetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BudgetRepository for InMemoryBudgetRepository {
    async fn insert(&self, budget: Budget) -> BudgetResult<()> {
        let mut store = self.store.write().await;
        if store.budgets.contains_key(&budget.id) {
            return Err(BudgetError::AlreadyExists(budget.id));
        }
        store.alerts.entry(budget.id.clone()).or_default();
        store.samples.entry(budget.id.clone()).or_default();
        store.budgets.insert(budget.id.clone(), budget);
        Ok(())
    }

    async fn get(&self, budget_id: &str) -> BudgetResult<Option<Budget>> {
        Ok(self.store.read().await.budgets.get(budget_id).cloned())
    }

    async fn update(&self, budget: Budget) -> BudgetResult<()> {
        let mut store = self.store.write().await;
        if !store.budgets.contains_key(&budget.id) {
            return Err(BudgetError::NotFound(budget.id));
        }
        store.budgets.insert(budget.id.clone(), budget);
        Ok(())
    }

    async fn delete(&self, budget_id: &str) -> BudgetResult<()> {
        let mut store = self.store.write().await;
        if store.budgets.remove(budget_id).is_none() {
            return Err(BudgetError::NotFound(budget_id.to_string()));
        }
        store.alerts.remove(budget_id);
        store.samples.remove(budget_id);
        Ok(())
    }

    async fn list(&self) -> BudgetResult<Vec<Budget>> {
        Ok(self.store.read().await.budgets.values().cloned().collect())
    }

    async fn insert_alert(&self, alert: BudgetAlert) -> BudgetResult<()> {
        let mut store = self.store.write().await;
        if !store.budgets.contains_key(&alert.budget_id) {
            return Err(BudgetError::NotFound(alert.budget_id));
        }
        store
            .alerts
            .entry(alert.budget_id.clone())
            .or_default()
            .push(alert);
        Ok(())
    }

    async fn alerts(&self, budget_id: &str) -> BudgetResult<Vec<BudgetAlert>> {
        Ok(self
            .store
            .read()
            .await
            .alerts
            .get(budget_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_alert(&self, alert: BudgetAlert) -> BudgetResult<()> {
        let mut store = self.store.write().await;
        let alerts = store
            .alerts
            .get_mut(&alert.budget_id)
            .ok_or_else(|| BudgetError::NotFound(alert.budget_id.clone()))?;
        let slot = alerts
            .iter_mut()
            .find(|a| a.id == alert.id)
            .ok_or(BudgetError::AlertNotFound(alert.id))?;
        *slot = alert;
        Ok(())
    }

    async fn get_alert(&self, alert_id: Uuid) -> BudgetResult<Option<BudgetAlert>> {
        Ok(self
            .store
            .read()
            .await
            .alerts
            .values()
            .flatten()
            .find(|a| a.id == alert_id)
            .cloned())
    }

    async fn append_sample(&self, budget_id: &str, sample: SpendingSample) -> BudgetResult<()> {
        let mut store = self.store.write().await;
        if !store.budgets.contains_key(budget_id) {
            return Err(BudgetError::NotFound(budget_id.to_string()));
        }
        store
            .samples
            .entry(budget_id.to_string())
            .or_default()
            .push(sample);
        Ok(())
    }

    async fn samples(&self, budget_id: &str) -> BudgetResult<Vec<SpendingSample>> {
        Ok(self
            .store
            .read()
            .await
            .samples
            .get(budget_id)
            .cloned()
            .unwrap_or_default())
    }
}
