//! The provider selection engine.
//!
//! Combines comparison output with capability filters, budget,
//! performance, and compliance scoring into a weighted ranking, producing
//! a primary placement plus alternatives.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use core_config::EngineConfig;
use domain_comparison::{
    ComparisonFilter, EngineOptions, NetworkComparisonEngine, RankableEstimate,
    StorageComparisonEngine, VmComparisonEngine,
};
use domain_costs::CloudProvider;
use observability::SelectionMetrics;
use provider_adapters::AdapterRegistry;
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::capabilities::fetch_capability;
use crate::error::{SelectionError, SelectionResult};
use crate::models::{
    ProviderCapability, ProviderCost, ProviderOption, RankingFactors, ResourceClassRequirements,
    SelectionOutcome, SelectionPolicy, SelectionRequirements, SelectionRule, SelectionWeights,
};
use crate::scoring::{
    budget_cost_score, compliance_score, performance_score, preference_score, relative_cost_score,
};

struct CachedSelection {
    outcome: SelectionOutcome,
    stored_at: Instant,
}

/// Engine for selecting optimal cloud providers for resources.
pub struct SelectionEngine {
    registry: Arc<AdapterRegistry>,
    vm_engine: VmComparisonEngine,
    storage_engine: StorageComparisonEngine,
    network_engine: NetworkComparisonEngine,
    selection_timeout: Duration,
    cache_ttl: Duration,
    max_concurrent_evaluations: usize,
    active_evaluations: Arc<Mutex<HashSet<String>>>,
    cache: Mutex<HashMap<u64, CachedSelection>>,
}

/// Removes the evaluation name from the active set when the evaluation
/// ends, on every exit path.
struct EvaluationGuard {
    active: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl EvaluationGuard {
    fn acquire(
        active: &Arc<Mutex<HashSet<String>>>,
        name: &str,
        limit: usize,
    ) -> SelectionResult<Self> {
        let mut set = active.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if set.len() >= limit {
            return Err(SelectionError::Concurrency {
                resource_name: name.to_string(),
                limit,
            });
        }
        set.insert(name.to_string());
        SelectionMetrics::set_active_evaluations(set.len());
        Ok(Self {
            active: active.clone(),
            name: name.to_string(),
        })
    }
}

impl Drop for EvaluationGuard {
    fn drop(&mut self) {
        let mut set = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        set.remove(&self.name);
        SelectionMetrics::set_active_evaluations(set.len());
    }
}

impl SelectionEngine {
    pub fn new(registry: Arc<AdapterRegistry>, config: &EngineConfig) -> Self {
        let options = EngineOptions::from_config(config);
        Self {
            vm_engine: VmComparisonEngine::new(registry.clone(), options.clone()),
            storage_engine: StorageComparisonEngine::new(registry.clone(), options.clone()),
            network_engine: NetworkComparisonEngine::new(registry.clone(), options),
            registry,
            selection_timeout: config.selection_timeout,
            cache_ttl: config.cache_ttl,
            max_concurrent_evaluations: config.max_concurrent_evaluations,
            active_evaluations: Arc::new(Mutex::new(HashSet::new())),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Select the optimal provider for the requirements under an optional
    /// policy.
    pub async fn select(
        &self,
        requirements: &SelectionRequirements,
        policy: Option<&SelectionPolicy>,
    ) -> SelectionResult<SelectionOutcome> {
        let started = Instant::now();
        validate_requirements(requirements)?;
        let weights = policy
            .and_then(|p| p.weights)
            .unwrap_or_default();
        weights.validate()?;

        let _guard = EvaluationGuard::acquire(
            &self.active_evaluations,
            &requirements.name,
            self.max_concurrent_evaluations,
        )?;

        let cache_key = selection_cache_key(requirements, policy);
        if let Some(cached) = self.cached(cache_key) {
            info!(name = %requirements.name, "Selection served from cache");
            SelectionMetrics::record_selection("cache", started.elapsed().as_secs_f64());
            return Ok(cached);
        }

        let outcome = tokio::time::timeout(
            self.selection_timeout,
            self.evaluate(requirements, policy, weights),
        )
        .await
        .map_err(|_| SelectionError::Timeout {
            timeout_secs: self.selection_timeout.as_secs(),
        })??;

        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                cache_key,
                CachedSelection {
                    outcome: outcome.clone(),
                    stored_at: Instant::now(),
                },
            );

        info!(
            name = %requirements.name,
            selected = %outcome.selected_option.provider,
            score = outcome.selected_option.total_score,
            "Provider selected"
        );
        SelectionMetrics::record_selection("ok", started.elapsed().as_secs_f64());
        Ok(outcome)
    }

    fn cached(&self, key: u64) -> Option<SelectionOutcome> {
        let cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(&key).and_then(|entry| {
            if entry.stored_at.elapsed() < self.cache_ttl {
                Some(entry.outcome.clone())
            } else {
                None
            }
        })
    }

    async fn evaluate(
        &self,
        requirements: &SelectionRequirements,
        policy: Option<&SelectionPolicy>,
        weights: SelectionWeights,
    ) -> SelectionResult<SelectionOutcome> {
        // Capability fetch per required (provider, region) tuple. A
        // provider must cover every region to stay in the running.
        let mut capabilities: Vec<ProviderCapability> = Vec::new();
        let mut checked: Vec<CloudProvider> = Vec::new();

        'providers: for adapter in self.registry.configured() {
            let provider = adapter.provider();
            checked.push(provider);
            if requirements.excluded_providers.contains(&provider) {
                continue;
            }

            let mut first_capability = None;
            for region in &requirements.regions {
                match fetch_capability(&adapter, &requirements.class, region).await {
                    Ok(capability) => {
                        first_capability.get_or_insert(capability);
                    }
                    Err(err) => {
                        warn!(
                            provider = %provider,
                            region = %region,
                            error = %err,
                            "Provider lacks region coverage, dropping"
                        );
                        continue 'providers;
                    }
                }
            }
            if let Some(capability) = first_capability {
                capabilities.push(capability);
            }
        }

        let capabilities: Vec<ProviderCapability> = capabilities
            .into_iter()
            .filter(|c| meets_requirements(c, requirements))
            .filter(|c| satisfies_policy_rules(c, policy))
            .collect();

        if capabilities.is_empty() {
            return Err(SelectionError::NoMatchingProviders { checked });
        }

        // Cost estimates come from the comparison engine, restricted to
        // the surviving providers.
        let providers: Vec<CloudProvider> = capabilities.iter().map(|c| c.provider).collect();
        let costs = self.cost_estimates(requirements, &providers).await?;

        // Budget floor.
        let (capabilities, costs) = if let Some(budget) = requirements.max_monthly_budget {
            let min_observed = costs
                .values()
                .map(|c| c.monthly_cost.amount)
                .min()
                .unwrap_or(Decimal::ZERO);
            let kept: Vec<ProviderCapability> = capabilities
                .into_iter()
                .filter(|c| {
                    costs
                        .get(&c.provider)
                        .is_some_and(|cost| cost.monthly_cost.amount <= budget)
                })
                .collect();
            if kept.is_empty() {
                return Err(SelectionError::Budget {
                    min_observed,
                    budget,
                });
            }
            let kept_costs = costs
                .into_iter()
                .filter(|(provider, _)| kept.iter().any(|c| c.provider == *provider))
                .collect();
            (kept, kept_costs)
        } else {
            (capabilities, costs)
        };

        // Providers with a capability but no estimate dropped inside the
        // comparison; keep the sets aligned.
        let capabilities: Vec<ProviderCapability> = capabilities
            .into_iter()
            .filter(|c| costs.contains_key(&c.provider))
            .collect();
        if capabilities.is_empty() {
            return Err(SelectionError::NoMatchingProviders { checked });
        }

        let min_cost = costs
            .values()
            .map(|c| c.monthly_cost.amount)
            .min()
            .unwrap_or(Decimal::ZERO);
        let max_cost = costs
            .values()
            .map(|c| c.monthly_cost.amount)
            .max()
            .unwrap_or(Decimal::ZERO);

        let mut performance_comparison = HashMap::new();
        let mut compliance_comparison = HashMap::new();
        let mut options: Vec<ProviderOption> = Vec::with_capacity(capabilities.len());

        for capability in capabilities {
            let provider = capability.provider;
            let cost = costs[&provider].clone();
            let performance = performance_score(provider);
            let compliance = compliance_score(&capability, requirements);

            let cost_score = match requirements.max_monthly_budget {
                Some(budget) => budget_cost_score(cost.monthly_cost.amount, budget),
                None => relative_cost_score(cost.monthly_cost.amount, min_cost, max_cost),
            };
            let pref_score = preference_score(provider, &requirements.preferred_providers);

            let total_score = cost_score * weights.cost
                + performance.overall_score * weights.performance
                + compliance.overall_score * weights.compliance
                + pref_score * weights.preference;

            let ranking_factors = RankingFactors {
                cost_score,
                performance_score: performance.overall_score,
                compliance_score: compliance.overall_score,
                preference_score: pref_score,
                weights,
            };

            performance_comparison.insert(provider, performance.clone());
            compliance_comparison.insert(provider, compliance.clone());

            options.push(ProviderOption {
                provider,
                region: capability.region.clone(),
                capability,
                cost,
                performance_score: performance,
                compliance_score: compliance,
                total_score,
                ranking_factors,
            });
        }

        sort_options(&mut options, &requirements.preferred_providers);

        let selected = options.remove(0);
        Ok(SelectionOutcome {
            requirements: requirements.clone(),
            selection_factors: selected.ranking_factors.clone(),
            cost_comparison: costs,
            performance_comparison,
            compliance_comparison,
            valid_until: Utc::now() + self.cache_ttl,
            selected_option: selected,
            alternative_options: options,
        })
    }

    /// Best estimate per provider for the requirement's resource class.
    async fn cost_estimates(
        &self,
        requirements: &SelectionRequirements,
        providers: &[CloudProvider],
    ) -> SelectionResult<HashMap<CloudProvider, ProviderCost>> {
        let region = requirements
            .regions
            .iter()
            .next()
            .cloned()
            .unwrap_or_default();
        let filter = ComparisonFilter::for_providers(providers.iter().copied());

        fn best_per_provider<E: RankableEstimate>(
            estimates: &[E],
            region: &str,
        ) -> HashMap<CloudProvider, ProviderCost> {
            let mut best: HashMap<CloudProvider, ProviderCost> = HashMap::new();
            for estimate in estimates {
                let entry = best.entry(estimate.provider()).or_insert_with(|| ProviderCost {
                    provider: estimate.provider(),
                    region: region.to_string(),
                    option_name: estimate.option_name(),
                    monthly_cost: estimate.monthly_cost(),
                });
                if estimate.monthly_cost().amount < entry.monthly_cost.amount {
                    entry.option_name = estimate.option_name();
                    entry.monthly_cost = estimate.monthly_cost();
                }
            }
            best
        }

        let costs = match &requirements.class {
            ResourceClassRequirements::Compute(vm) => {
                let mut vm = vm.clone();
                vm.region = region.clone();
                let result = self.vm_engine.compare(&vm, Some(&filter)).await?;
                best_per_provider(&result.comparison.estimates, &region)
            }
            ResourceClassRequirements::Storage(storage) => {
                let mut storage = storage.clone();
                storage.region = region.clone();
                let result = self.storage_engine.compare(&storage, Some(&filter)).await?;
                best_per_provider(&result.comparison.estimates, &region)
            }
            ResourceClassRequirements::Network(network) => {
                let mut network = network.clone();
                network.region = region.clone();
                let result = self.network_engine.compare(&network, Some(&filter)).await?;
                best_per_provider(&result.comparison.estimates, &region)
            }
        };

        Ok(costs)
    }

    /// Number of evaluations currently in flight.
    pub fn active_evaluation_count(&self) -> usize {
        self.active_evaluations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn validate_requirements(requirements: &SelectionRequirements) -> SelectionResult<()> {
    if requirements.name.is_empty() {
        return Err(SelectionError::Validation {
            field: "name".into(),
            message: "evaluation name must not be empty".into(),
        });
    }
    if requirements.regions.is_empty() {
        return Err(SelectionError::Validation {
            field: "regions".into(),
            message: "at least one region must be specified".into(),
        });
    }
    if !(0.0..=100.0).contains(&requirements.min_availability_pct) {
        return Err(SelectionError::Validation {
            field: "min_availability_pct".into(),
            message: "availability must be between 0 and 100".into(),
        });
    }
    if let Some(budget) = requirements.max_monthly_budget {
        if budget <= Decimal::ZERO {
            return Err(SelectionError::Validation {
                field: "max_monthly_budget".into(),
                message: "budget must be greater than 0".into(),
            });
        }
    }
    Ok(())
}

fn meets_requirements(
    capability: &ProviderCapability,
    requirements: &SelectionRequirements,
) -> bool {
    capability.availability_sla_pct >= requirements.min_availability_pct
        && requirements
            .required_features
            .iter()
            .all(|f| capability.features.contains(f))
        && requirements
            .required_certifications
            .iter()
            .all(|c| capability.certifications.contains(c))
        && requirements
            .compliance_frameworks
            .iter()
            .all(|f| capability.compliance_frameworks.contains(f))
}

fn satisfies_policy_rules(
    capability: &ProviderCapability,
    policy: Option<&SelectionPolicy>,
) -> bool {
    let Some(policy) = policy else {
        return true;
    };
    policy.rules.iter().all(|rule| match rule {
        SelectionRule::RequireFeature { feature } => capability.features.contains(feature),
        SelectionRule::RequireCertification { certification } => {
            capability.certifications.contains(certification)
        }
        SelectionRule::ExcludeProvider { provider } => capability.provider != *provider,
        SelectionRule::MinAvailability { pct } => capability.availability_sla_pct >= *pct,
    })
}

/// Descending by total score; ties by lowest monthly cost, then provider
/// preference order, then provider name.
fn sort_options(options: &mut [ProviderOption], preferred: &[CloudProvider]) {
    let preference_index = |provider: CloudProvider| -> usize {
        preferred
            .iter()
            .position(|p| *p == provider)
            .unwrap_or(preferred.len())
    };
    options.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cost.monthly_cost.amount.cmp(&b.cost.monthly_cost.amount))
            .then_with(|| preference_index(a.provider).cmp(&preference_index(b.provider)))
            .then_with(|| a.provider.to_string().cmp(&b.provider.to_string()))
    });
}

fn selection_cache_key(
    requirements: &SelectionRequirements,
    policy: Option<&SelectionPolicy>,
) -> u64 {
    let serialized = serde_json::to_string(&(requirements, policy)).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    serialized.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComplianceFramework;
    use std::collections::BTreeSet;

    use domain_comparison::{VmRequirements, VmSize};
    use provider_adapters::{OperatingSystem, PurchaseOption};

    fn requirements() -> SelectionRequirements {
        SelectionRequirements {
            name: "api-tier".into(),
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
        }
    }

    #[test]
    fn test_validation_rejects_empty_regions() {
        let mut req = requirements();
        req.regions.clear();
        assert!(matches!(
            validate_requirements(&req).unwrap_err(),
            SelectionError::Validation { .. }
        ));
    }

    #[test]
    fn test_validation_rejects_out_of_range_availability() {
        let mut req = requirements();
        req.min_availability_pct = 101.0;
        assert!(validate_requirements(&req).is_err());
    }

    #[test]
    fn test_policy_rules_filter_capabilities() {
        let capability = ProviderCapability {
            provider: CloudProvider::Aws,
            region: "us-east-1".into(),
            features: BTreeSet::from(["nitro".to_string()]),
            certifications: BTreeSet::from(["soc2".to_string()]),
            compliance_frameworks: BTreeSet::from([ComplianceFramework::Soc2]),
            availability_sla_pct: 99.99,
        };

        let policy = SelectionPolicy {
            weights: None,
            rules: vec![
                SelectionRule::RequireFeature {
                    feature: "nitro".into(),
                },
                SelectionRule::MinAvailability { pct: 99.9 },
            ],
        };
        assert!(satisfies_policy_rules(&capability, Some(&policy)));

        let excluding = SelectionPolicy {
            weights: None,
            rules: vec![SelectionRule::ExcludeProvider {
                provider: CloudProvider::Aws,
            }],
        };
        assert!(!satisfies_policy_rules(&capability, Some(&excluding)));
    }

    #[test]
    fn test_cache_key_is_stable_and_input_sensitive() {
        let req = requirements();
        let a = selection_cache_key(&req, None);
        let b = selection_cache_key(&req, None);
        assert_eq!(a, b);

        let mut other = requirements();
        other.name = "batch-tier".into();
        assert_ne!(a, selection_cache_key(&other, None));
    }
}
