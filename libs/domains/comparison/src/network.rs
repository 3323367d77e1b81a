//! Network cost comparison engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use observability::ComparisonMetrics;
use provider_adapters::{
    AdapterRegistry, CacheKey, CatalogCache, CloudAdapter, NetworkCostQuery, NetworkOption,
    NetworkServiceType,
};
use tracing::info;

use crate::error::{ComparisonError, ComparisonEngineResult};
use crate::fanout::fan_out;
use crate::models::{
    rank_estimates, Comparison, ComparisonFilter, ComparisonResult, NetworkCostEstimate,
    NetworkRequirements, PartialResult,
};
use crate::EngineOptions;

struct ProviderEstimates {
    estimates: Vec<NetworkCostEstimate>,
    total_considered: usize,
    from_cache: bool,
}

/// Engine for comparing network service costs across cloud providers.
pub struct NetworkComparisonEngine {
    registry: Arc<AdapterRegistry>,
    options: EngineOptions,
    catalog_cache: CatalogCache<Vec<NetworkOption>>,
}

impl NetworkComparisonEngine {
    pub fn new(registry: Arc<AdapterRegistry>, options: EngineOptions) -> Self {
        let catalog_cache = CatalogCache::new(options.cache_ttl);
        Self {
            registry,
            options,
            catalog_cache,
        }
    }

    /// Compare network service costs across providers based on
    /// requirements.
    pub async fn compare(
        &self,
        requirements: &NetworkRequirements,
        filters: Option<&ComparisonFilter>,
    ) -> ComparisonEngineResult<ComparisonResult<NetworkRequirements, NetworkCostEstimate>> {
        let started = Instant::now();
        validate_requirements(requirements)?;

        let adapters = self.options.eligible_adapters(&self.registry, filters);
        let providers: Vec<_> = adapters.iter().map(|a| a.provider()).collect();

        let outcome = fan_out(
            "network",
            adapters,
            self.options.comparison_timeout,
            |adapter| self.provider_estimates(adapter, requirements),
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
                "network",
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
            service_type = %requirements.service_type,
            candidates = filtered_count,
            recommended_provider = %recommended.provider,
            "Network comparison complete"
        );
        ComparisonMetrics::record_comparison("network", "ok", started.elapsed().as_secs_f64());

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

    /// Per-provider availability of network services in a region.
    ///
    /// Partial outages are surfaced explicitly: callers always see which
    /// providers answered and which failed, never a silent union.
    pub async fn network_state(
        &self,
        region: &str,
    ) -> PartialResult<Vec<NetworkOption>> {
        let mut successes = HashMap::new();
        let mut failures = HashMap::new();

        for adapter in self.registry.configured() {
            let provider = adapter.provider();
            match adapter
                .list_network_options(NetworkServiceType::Vpc, region)
                .await
            {
                Ok(options) => {
                    successes.insert(provider, options);
                }
                Err(err) => {
                    failures.insert(provider, err.to_string());
                }
            }
        }

        PartialResult {
            successes,
            failures,
        }
    }

    async fn provider_estimates(
        &self,
        adapter: Arc<dyn CloudAdapter>,
        requirements: &NetworkRequirements,
    ) -> Result<ProviderEstimates, provider_adapters::AdapterError> {
        let key = CacheKey::new(
            adapter.provider(),
            &requirements.region,
            format!("network_options:{}", requirements.service_type),
        );
        let cached = {
            let adapter = adapter.clone();
            let service_type = requirements.service_type;
            let region = requirements.region.clone();
            self.catalog_cache
                .get_or_fetch(key, || async move {
                    adapter.list_network_options(service_type, &region).await
                })
                .await?
        };

        let total_considered = cached.value.len();
        let matching: Vec<NetworkOption> = cached
            .value
            .into_iter()
            .filter(|o| matches_requirements(o, requirements))
            .collect();

        let mut estimates = Vec::with_capacity(matching.len());
        for option in matching {
            let query = NetworkCostQuery {
                service_type: option.service_type,
                region: requirements.region.clone(),
                bandwidth_gbps: requirements.bandwidth_gbps,
                data_transfer_gb: requirements.data_transfer_gb,
                requests_per_second: requirements.requests_per_second,
                high_availability: requirements.high_availability,
                cross_region: requirements.cross_region,
                load_balancer_type: option.load_balancer_type,
                dns_type: option.dns_type,
                vpn_type: option.vpn_type,
                transit_type: option.transit_type,
                nat_type: option.nat_type,
            };
            let quote = adapter.get_network_costs(&query).await?;

            estimates.push(NetworkCostEstimate {
                provider: option.provider,
                service_type: option.service_type,
                region: requirements.region.clone(),
                option_name: option.display_name(),
                monthly_cost: quote.monthly_cost,
                cost_components: quote.components,
                features: option.features.clone(),
            });
        }

        Ok(ProviderEstimates {
            estimates,
            total_considered,
            from_cache: cached.from_cache,
        })
    }
}

fn validate_requirements(requirements: &NetworkRequirements) -> ComparisonEngineResult<()> {
    if requirements.region.is_empty() {
        return Err(ComparisonError::validation(
            "region",
            "",
            "region must be specified",
            &[("required", "true")],
        ));
    }
    if requirements.bandwidth_gbps <= 0.0 {
        return Err(ComparisonError::validation(
            "bandwidth_gbps",
            requirements.bandwidth_gbps,
            "bandwidth must be greater than 0",
            &[("min", "0")],
        ));
    }
    if requirements.service_type == NetworkServiceType::Vpn && requirements.vpn_type.is_none() {
        return Err(ComparisonError::validation(
            "vpn_type",
            "none",
            "VPN type is required for VPN service comparisons",
            &[("required", "true")],
        ));
    }
    if requirements.requests_per_second == Some(0) {
        return Err(ComparisonError::validation(
            "requests_per_second",
            0,
            "request rate must be positive when specified",
            &[("min", "1")],
        ));
    }
    if requirements.data_transfer_gb == Some(0) {
        return Err(ComparisonError::validation(
            "data_transfer_gb",
            0,
            "data transfer must be positive when specified",
            &[("min", "1")],
        ));
    }
    Ok(())
}

fn matches_requirements(option: &NetworkOption, requirements: &NetworkRequirements) -> bool {
    let bandwidth_ok = requirements.bandwidth_gbps >= option.min_bandwidth_gbps
        && option
            .max_bandwidth_gbps
            .is_none_or(|max| requirements.bandwidth_gbps <= max);

    let rps_ok = requirements.requests_per_second.is_none_or(|rps| {
        option.min_requests_per_second.is_none_or(|min| rps >= min)
            && option.max_requests_per_second.is_none_or(|max| rps <= max)
    });

    let ha_ok = !requirements.high_availability || option.high_availability;
    let cross_region_ok = !requirements.cross_region || option.cross_region;

    let discriminators_ok = requirements
        .load_balancer_type
        .is_none_or(|t| option.load_balancer_type == Some(t))
        && requirements.dns_type.is_none_or(|t| option.dns_type == Some(t))
        && requirements.vpn_type.is_none_or(|t| option.vpn_type == Some(t))
        && requirements
            .transit_type
            .is_none_or(|t| option.transit_type == Some(t))
        && requirements.nat_type.is_none_or(|t| option.nat_type == Some(t));

    bandwidth_ok
        && rps_ok
        && ha_ok
        && cross_region_ok
        && discriminators_ok
        && requirements
            .required_features
            .iter()
            .all(|f| option.features.contains(f))
        && requirements
            .required_certifications
            .iter()
            .all(|c| option.certifications.contains(c))
}

fn apply_cost_filters(
    estimates: Vec<NetworkCostEstimate>,
    filters: Option<&ComparisonFilter>,
) -> Vec<NetworkCostEstimate> {
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
    use provider_adapters::VpnType;

    fn requirements() -> NetworkRequirements {
        NetworkRequirements {
            region: "us-east-1".into(),
            service_type: NetworkServiceType::LoadBalancer,
            bandwidth_gbps: 1.0,
            data_transfer_gb: None,
            requests_per_second: None,
            high_availability: false,
            cross_region: false,
            load_balancer_type: None,
            dns_type: None,
            vpn_type: None,
            transit_type: None,
            nat_type: None,
            required_features: Default::default(),
            required_certifications: Default::default(),
        }
    }

    #[test]
    fn test_vpn_comparison_requires_vpn_type() {
        let mut req = requirements();
        req.service_type = NetworkServiceType::Vpn;
        assert!(validate_requirements(&req).is_err());

        req.vpn_type = Some(VpnType::SiteToSite);
        assert!(validate_requirements(&req).is_ok());
    }

    #[test]
    fn test_zero_bandwidth_rejected() {
        let mut req = requirements();
        req.bandwidth_gbps = 0.0;
        assert!(validate_requirements(&req).is_err());
    }

    #[test]
    fn test_present_zero_requests_rejected() {
        let mut req = requirements();
        req.requests_per_second = Some(0);
        assert!(validate_requirements(&req).is_err());
    }
}
