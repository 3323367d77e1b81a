//! Storage cost comparison engine.

use std::sync::Arc;
use std::time::Instant;

use domain_costs::Money;
use observability::ComparisonMetrics;
use provider_adapters::{
    AdapterRegistry, CacheKey, CatalogCache, CloudAdapter, StorageOption, StorageType,
};
use tracing::info;

use crate::error::{ComparisonError, ComparisonEngineResult};
use crate::fanout::fan_out;
use crate::models::{
    rank_estimates, Comparison, ComparisonFilter, ComparisonResult, StorageCostEstimate,
    StorageRequirements,
};
use crate::EngineOptions;

struct ProviderEstimates {
    estimates: Vec<StorageCostEstimate>,
    total_considered: usize,
    from_cache: bool,
}

/// Engine for comparing storage costs across cloud providers.
pub struct StorageComparisonEngine {
    registry: Arc<AdapterRegistry>,
    options: EngineOptions,
    catalog_cache: CatalogCache<Vec<StorageOption>>,
}

impl StorageComparisonEngine {
    pub fn new(registry: Arc<AdapterRegistry>, options: EngineOptions) -> Self {
        let catalog_cache = CatalogCache::new(options.cache_ttl);
        Self {
            registry,
            options,
            catalog_cache,
        }
    }

    /// Compare storage costs across providers based on requirements.
    pub async fn compare(
        &self,
        requirements: &StorageRequirements,
        filters: Option<&ComparisonFilter>,
    ) -> ComparisonEngineResult<ComparisonResult<StorageRequirements, StorageCostEstimate>> {
        let started = Instant::now();
        validate_requirements(requirements)?;

        let adapters = self.options.eligible_adapters(&self.registry, filters);
        let providers: Vec<_> = adapters.iter().map(|a| a.provider()).collect();

        let outcome = fan_out(
            "storage",
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
                "storage",
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
            storage_type = %requirements.storage_type,
            candidates = filtered_count,
            recommended_provider = %recommended.provider,
            "Storage comparison complete"
        );
        ComparisonMetrics::record_comparison("storage", "ok", started.elapsed().as_secs_f64());

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
        requirements: &StorageRequirements,
        filters: Option<&ComparisonFilter>,
    ) -> Result<ProviderEstimates, provider_adapters::AdapterError> {
        let key = CacheKey::new(
            adapter.provider(),
            &requirements.region,
            format!("storage_options:{}", requirements.storage_type),
        );
        let cached = {
            let adapter = adapter.clone();
            let storage_type = requirements.storage_type;
            let region = requirements.region.clone();
            self.catalog_cache
                .get_or_fetch(key, || async move {
                    adapter.list_storage_options(storage_type, &region).await
                })
                .await?
        };

        let total_considered = cached.value.len();
        let matching: Vec<StorageOption> = cached
            .value
            .into_iter()
            .filter(|o| matches_requirements(o, requirements))
            .filter(|o| matches_filters(o, filters))
            .collect();

        let mut estimates = Vec::with_capacity(matching.len());
        for option in matching {
            estimates.push(self.estimate_option(&adapter, &option, requirements).await?);
        }

        Ok(ProviderEstimates {
            estimates,
            total_considered,
            from_cache: cached.from_cache,
        })
    }

    async fn estimate_option(
        &self,
        adapter: &Arc<dyn CloudAdapter>,
        option: &StorageOption,
        requirements: &StorageRequirements,
    ) -> Result<StorageCostEstimate, provider_adapters::AdapterError> {
        let base = adapter
            .get_storage_costs(
                option.storage_type,
                option.storage_class,
                option.replication_type,
                &requirements.region,
                requirements.capacity_gb,
            )
            .await?;
        let mut components = vec![base];

        if let Some(iops) = requirements.iops {
            let iops_cost = adapter
                .get_iops_costs(
                    option.storage_type,
                    option.storage_class,
                    &requirements.region,
                    iops,
                )
                .await?;
            components.push(iops_cost);
        }

        if let Some(throughput) = requirements.throughput_mbps {
            let throughput_cost = adapter
                .get_throughput_costs(
                    option.storage_type,
                    option.storage_class,
                    &requirements.region,
                    throughput,
                )
                .await?;
            components.push(throughput_cost);
        }

        let currency = components[0].monthly_cost.currency;
        let monthly = components.iter().fold(Money::zero(currency), |acc, c| {
            Money::new(acc.amount + c.monthly_cost.amount, currency)
        });

        Ok(StorageCostEstimate {
            provider: option.provider,
            storage_type: option.storage_type,
            storage_class: option.storage_class,
            replication_type: option.replication_type,
            region: requirements.region.clone(),
            capacity_gb: requirements.capacity_gb,
            monthly_cost: monthly,
            cost_components: components,
            features: option.features.clone(),
        })
    }
}

fn validate_requirements(requirements: &StorageRequirements) -> ComparisonEngineResult<()> {
    if requirements.region.is_empty() {
        return Err(ComparisonError::validation(
            "region",
            "",
            "region must be specified",
            &[("required", "true")],
        ));
    }
    if requirements.capacity_gb == 0 {
        return Err(ComparisonError::validation(
            "capacity_gb",
            0,
            "capacity must be greater than 0",
            &[("min", "1")],
        ));
    }
    if requirements.iops == Some(0) {
        return Err(ComparisonError::validation(
            "iops",
            0,
            "IOPS must be positive when specified",
            &[("min", "1")],
        ));
    }
    if requirements.throughput_mbps == Some(0) {
        return Err(ComparisonError::validation(
            "throughput_mbps",
            0,
            "throughput must be positive when specified",
            &[("min", "1")],
        ));
    }
    if requirements.storage_type == StorageType::Block && requirements.performance_tier.is_none() {
        return Err(ComparisonError::validation(
            "performance_tier",
            "none",
            "performance tier is required for block storage",
            &[("required", "true")],
        ));
    }
    Ok(())
}

fn matches_requirements(option: &StorageOption, requirements: &StorageRequirements) -> bool {
    let capacity_ok = option.min_capacity_gb <= requirements.capacity_gb
        && option
            .max_capacity_gb
            .is_none_or(|max| requirements.capacity_gb <= max);

    // The requested rate must fall inside the option's supported range.
    let iops_ok = requirements.iops.is_none_or(|iops| {
        option.min_iops.is_none_or(|min| iops >= min) && option.max_iops.is_none_or(|max| iops <= max)
    });
    let throughput_ok = requirements.throughput_mbps.is_none_or(|mbps| {
        option.min_throughput_mbps.is_none_or(|min| mbps >= min)
            && option.max_throughput_mbps.is_none_or(|max| mbps <= max)
    });

    let tier_ok = requirements
        .performance_tier
        .is_none_or(|tier| option.performance_tier == Some(tier));

    capacity_ok
        && iops_ok
        && throughput_ok
        && tier_ok
        && requirements
            .required_features
            .iter()
            .all(|f| option.features.contains(f))
        && requirements
            .required_certifications
            .iter()
            .all(|c| option.certifications.contains(c))
}

fn matches_filters(option: &StorageOption, filters: Option<&ComparisonFilter>) -> bool {
    let Some(filters) = filters else {
        return true;
    };
    (filters.storage_classes.is_empty() || filters.storage_classes.contains(&option.storage_class))
        && (filters.replication_types.is_empty()
            || filters.replication_types.contains(&option.replication_type))
        && filters
            .min_capacity_gb
            .is_none_or(|min| option.min_capacity_gb >= min)
        && filters
            .max_capacity_gb
            .is_none_or(|max| option.max_capacity_gb.is_some_and(|m| m <= max))
}

fn apply_cost_filters(
    estimates: Vec<StorageCostEstimate>,
    filters: Option<&ComparisonFilter>,
) -> Vec<StorageCostEstimate> {
    let Some(filters) = filters else {
        return estimates;
    };
    estimates
        .into_iter()
        .filter(|e| {
            filters
                .max_monthly_cost
                .is_none_or(|max| e.monthly_cost.amount <= max)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_adapters::PerformanceTier;

    fn requirements() -> StorageRequirements {
        StorageRequirements {
            region: "us-east-1".into(),
            storage_type: StorageType::Object,
            capacity_gb: 500,
            iops: None,
            throughput_mbps: None,
            performance_tier: None,
            required_features: Default::default(),
            required_certifications: Default::default(),
        }
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let mut req = requirements();
        req.capacity_gb = 0;
        assert!(validate_requirements(&req).is_err());
    }

    #[test]
    fn test_block_storage_requires_performance_tier() {
        let mut req = requirements();
        req.storage_type = StorageType::Block;
        assert!(validate_requirements(&req).is_err());

        req.performance_tier = Some(PerformanceTier::GeneralPurpose);
        assert!(validate_requirements(&req).is_ok());
    }

    #[test]
    fn test_present_zero_iops_rejected() {
        let mut req = requirements();
        req.iops = Some(0);
        assert!(validate_requirements(&req).is_err());
    }
}
