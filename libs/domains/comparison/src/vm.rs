//! VM cost comparison engine.

use std::sync::Arc;
use std::time::Instant;

use domain_costs::{Currency, Money};
use observability::ComparisonMetrics;
use provider_adapters::{
    AdapterRegistry, CacheKey, CatalogCache, CloudAdapter, StorageClass, StorageType,
    VmInstanceType,
};
use tracing::info;

use crate::error::{ComparisonError, ComparisonEngineResult};
use crate::fanout::fan_out;
use crate::models::{
    rank_estimates, Comparison, ComparisonFilter, ComparisonResult, VmCostEstimate,
    VmRequirements,
};
use crate::EngineOptions;

/// Per-provider yield of the fan-out stage.
struct ProviderEstimates {
    estimates: Vec<VmCostEstimate>,
    total_considered: usize,
    from_cache: bool,
}

/// Engine for comparing VM costs across cloud providers.
pub struct VmComparisonEngine {
    registry: Arc<AdapterRegistry>,
    options: EngineOptions,
    catalog_cache: CatalogCache<Vec<VmInstanceType>>,
}

impl VmComparisonEngine {
    pub fn new(registry: Arc<AdapterRegistry>, options: EngineOptions) -> Self {
        let catalog_cache = CatalogCache::new(options.cache_ttl);
        Self {
            registry,
            options,
            catalog_cache,
        }
    }

    /// Compare VM costs across providers based on requirements.
    pub async fn compare(
        &self,
        requirements: &VmRequirements,
        filters: Option<&ComparisonFilter>,
    ) -> ComparisonEngineResult<ComparisonResult<VmRequirements, VmCostEstimate>> {
        let started = Instant::now();
        validate_requirements(requirements)?;

        let adapters = self.options.eligible_adapters(&self.registry, filters);
        let providers: Vec<_> = adapters.iter().map(|a| a.provider()).collect();

        let outcome = fan_out(
            "vm",
            adapters,
            self.options.comparison_timeout,
            |adapter| self.provider_estimates(adapter, requirements, filters),
        )
        .await?;

        let mut total_options = 0;
        let mut estimates = Vec::new();
        let mut all_from_cache = true;
        for success in &outcome.successes {
            total_options += success.value.total_considered;
            all_from_cache &= success.value.from_cache;
            estimates.extend(success.value.estimates.iter().cloned());
        }

        let estimates = apply_cost_filters(estimates, filters);
        let filtered_count = estimates.len();

        if estimates.is_empty() {
            ComparisonMetrics::record_comparison(
                "vm",
                "no_match",
                started.elapsed().as_secs_f64(),
            );
            return Err(ComparisonError::NoMatchingOptions {
                requirements: format!("{requirements:?}"),
                providers,
                regions: vec![requirements.region.clone()],
            });
        }

        let ranked = rank_estimates(estimates, &self.options.provider_preference);
        let recommended = ranked[0].clone();

        info!(
            region = %requirements.region,
            candidates = filtered_count,
            recommended_provider = %recommended.provider,
            recommended_instance = %recommended.instance_type,
            "VM comparison complete"
        );
        ComparisonMetrics::record_comparison("vm", "ok", started.elapsed().as_secs_f64());

        Ok(ComparisonResult {
            comparison: Comparison {
                requirements: requirements.clone(),
                estimates: ranked,
                recommended_option: recommended,
            },
            filters_applied: filters.cloned().unwrap_or_default(),
            total_options_considered: total_options,
            filtered_options_count: filtered_count,
            processing_time_ms: started.elapsed().as_millis() as u64,
            cache_hit: all_from_cache,
        })
    }

    async fn provider_estimates(
        &self,
        adapter: Arc<dyn CloudAdapter>,
        requirements: &VmRequirements,
        filters: Option<&ComparisonFilter>,
    ) -> Result<ProviderEstimates, provider_adapters::AdapterError> {
        let key = CacheKey::new(adapter.provider(), &requirements.region, "instance_types");
        let cached = {
            let adapter = adapter.clone();
            let region = requirements.region.clone();
            self.catalog_cache
                .get_or_fetch(key, || async move {
                    adapter.list_instance_types(&region).await
                })
                .await?
        };

        let total_considered = cached.value.len();
        let matching: Vec<VmInstanceType> = cached
            .value
            .into_iter()
            .filter(|i| matches_requirements(i, requirements))
            .filter(|i| matches_filters(i, filters))
            .collect();

        let mut estimates = Vec::with_capacity(matching.len());
        for instance in matching {
            estimates.push(self.estimate_instance(&adapter, &instance, requirements).await?);
        }

        Ok(ProviderEstimates {
            estimates,
            total_considered,
            from_cache: cached.from_cache,
        })
    }

    async fn estimate_instance(
        &self,
        adapter: &Arc<dyn CloudAdapter>,
        instance: &VmInstanceType,
        requirements: &VmRequirements,
    ) -> Result<VmCostEstimate, provider_adapters::AdapterError> {
        let compute = adapter
            .get_compute_costs(
                &instance.instance_type,
                &requirements.region,
                requirements.operating_system,
                requirements.purchase_option,
            )
            .await?;

        let mut components = vec![compute];

        // Instances with local disk carry a storage component too.
        if instance.local_disk_gb > 0 {
            let storage = adapter
                .get_storage_costs(
                    StorageType::Block,
                    StorageClass::Standard,
                    provider_adapters::ReplicationType::Lrs,
                    &requirements.region,
                    instance.local_disk_gb,
                )
                .await?;
            components.push(storage);
        }

        let currency = components[0].monthly_cost.currency;
        let monthly = sum_monthly(&components, currency);
        let hourly = components
            .iter()
            .filter_map(|c| c.hourly_cost.as_ref())
            .fold(Money::zero(currency), |acc, h| {
                Money::new(acc.amount + h.amount, currency)
            });

        Ok(VmCostEstimate {
            provider: instance.provider,
            region: requirements.region.clone(),
            instance_type: instance.instance_type.clone(),
            operating_system: requirements.operating_system,
            purchase_option: requirements.purchase_option,
            hourly_cost: hourly,
            monthly_cost: monthly,
            cost_components: components,
        })
    }
}

fn sum_monthly(components: &[domain_costs::CostComponent], currency: Currency) -> Money {
    components.iter().fold(Money::zero(currency), |acc, c| {
        Money::new(acc.amount + c.monthly_cost.amount, currency)
    })
}

fn validate_requirements(requirements: &VmRequirements) -> ComparisonEngineResult<()> {
    if requirements.region.is_empty() {
        return Err(ComparisonError::validation(
            "region",
            "",
            "region must be specified",
            &[("required", "true")],
        ));
    }
    if requirements.size.vcpus < 1 {
        return Err(ComparisonError::validation(
            "size.vcpus",
            requirements.size.vcpus,
            "vCPUs must be at least 1",
            &[("min", "1")],
        ));
    }
    if requirements.size.memory_gb < 0.5 {
        return Err(ComparisonError::validation(
            "size.memory_gb",
            requirements.size.memory_gb,
            "memory must be at least 0.5 GB",
            &[("min", "0.5")],
        ));
    }
    if requirements.size.gpu_count == Some(0) {
        return Err(ComparisonError::validation(
            "size.gpu_count",
            0,
            "GPU count must be positive when specified",
            &[("min", "1")],
        ));
    }
    if requirements.size.local_disk_gb == Some(0) {
        return Err(ComparisonError::validation(
            "size.local_disk_gb",
            0,
            "local disk size must be positive when specified",
            &[("min", "1")],
        ));
    }
    Ok(())
}

fn matches_requirements(instance: &VmInstanceType, requirements: &VmRequirements) -> bool {
    instance.vcpus >= requirements.size.vcpus
        && instance.memory_gb >= requirements.size.memory_gb
        && requirements
            .size
            .gpu_count
            .is_none_or(|g| instance.gpu_count >= g)
        && requirements
            .size
            .local_disk_gb
            .is_none_or(|d| instance.local_disk_gb >= d)
        && requirements
            .required_features
            .iter()
            .all(|f| instance.features.contains(f))
        && requirements
            .required_certifications
            .iter()
            .all(|c| instance.certifications.contains(c))
}

fn matches_filters(instance: &VmInstanceType, filters: Option<&ComparisonFilter>) -> bool {
    let Some(filters) = filters else {
        return true;
    };
    filters.min_vcpus.is_none_or(|v| instance.vcpus >= v)
        && filters.max_vcpus.is_none_or(|v| instance.vcpus <= v)
        && filters.min_memory_gb.is_none_or(|m| instance.memory_gb >= m)
        && filters.max_memory_gb.is_none_or(|m| instance.memory_gb <= m)
}

fn apply_cost_filters(
    estimates: Vec<VmCostEstimate>,
    filters: Option<&ComparisonFilter>,
) -> Vec<VmCostEstimate> {
    let Some(filters) = filters else {
        return estimates;
    };
    estimates
        .into_iter()
        .filter(|e| {
            filters
                .max_hourly_cost
                .is_none_or(|max| e.hourly_cost.amount <= max)
                && filters
                    .max_monthly_cost
                    .is_none_or(|max| e.monthly_cost.amount <= max)
        })
        .collect()
}
