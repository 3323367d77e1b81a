//! Parallel per-provider fan-out under a single deadline.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain_costs::CloudProvider;
use futures::future::join_all;
use observability::ComparisonMetrics;
use provider_adapters::{AdapterError, CloudAdapter};
use tracing::warn;

use crate::error::{ComparisonError, ComparisonEngineResult};

/// What one provider contributed to a fan-out.
#[derive(Debug)]
pub struct ProviderOutcome<T> {
    pub provider: CloudProvider,
    pub value: T,
}

/// Results of a deadline-bounded fan-out across providers.
#[derive(Debug)]
pub struct FanOutOutcome<T> {
    pub successes: Vec<ProviderOutcome<T>>,
    pub failures: HashMap<CloudProvider, String>,
}

/// Issue `per_provider` against every adapter concurrently and join under
/// one deadline.
///
/// A missed deadline cancels all in-flight work (the futures are dropped)
/// and surfaces as a timeout; no partial results escape. Individual
/// provider errors drop that provider from the candidate set; the
/// fan-out fails only when every provider drops.
pub async fn fan_out<T, F, Fut>(
    resource_class: &'static str,
    adapters: Vec<Arc<dyn CloudAdapter>>,
    deadline: Duration,
    per_provider: F,
) -> ComparisonEngineResult<FanOutOutcome<T>>
where
    F: Fn(Arc<dyn CloudAdapter>) -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    if adapters.is_empty() {
        return Err(ComparisonError::NoProvidersConfigured);
    }

    let tasks = adapters.into_iter().map(|adapter| {
        let provider = adapter.provider();
        let fut = per_provider(adapter);
        async move { (provider, fut.await) }
    });

    let joined = tokio::time::timeout(deadline, join_all(tasks))
        .await
        .map_err(|_| ComparisonError::Timeout {
            timeout_secs: deadline.as_secs(),
        })?;

    let mut successes = Vec::new();
    let mut failures = HashMap::new();
    for (provider, result) in joined {
        match result {
            Ok(value) => successes.push(ProviderOutcome { provider, value }),
            Err(err) => {
                warn!(
                    class = resource_class,
                    provider = %provider,
                    error = %err,
                    "Provider dropped from comparison"
                );
                ComparisonMetrics::record_provider_dropped(resource_class, provider.to_string());
                failures.insert(provider, err.to_string());
            }
        }
    }

    if successes.is_empty() {
        return Err(ComparisonError::AllProvidersFailed { failures });
    }

    Ok(FanOutOutcome {
        successes,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain_costs::{CostComponent, Currency, ResourceType};
    use provider_adapters::{
        AdapterResult, NetworkCostQuery, NetworkCostQuote, NetworkOption, NetworkServiceType,
        OperatingSystem, PricingData, PurchaseOption, ReplicationType, ResourceConfiguration,
        ResourceCost, ResourceMetrics, StorageClass, StorageOption, StorageType, VmInstanceType,
    };

    /// Adapter stub whose list call either blocks forever or fails.
    struct StubAdapter {
        provider: CloudProvider,
        behavior: Behavior,
    }

    enum Behavior {
        Succeed,
        Fail,
        Hang,
    }

    #[async_trait]
    impl CloudAdapter for StubAdapter {
        fn provider(&self) -> CloudProvider {
            self.provider
        }
        fn is_configured(&self) -> bool {
            true
        }
        async fn list_instance_types(&self, _region: &str) -> AdapterResult<Vec<VmInstanceType>> {
            match self.behavior {
                Behavior::Succeed => Ok(vec![]),
                Behavior::Fail => Err(AdapterError::Api {
                    provider: self.provider.to_string(),
                    message: "boom".into(),
                }),
                Behavior::Hang => {
                    futures::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
        async fn list_storage_options(
            &self,
            _storage_type: StorageType,
            _region: &str,
        ) -> AdapterResult<Vec<StorageOption>> {
            Ok(vec![])
        }
        async fn list_network_options(
            &self,
            _service_type: NetworkServiceType,
            _region: &str,
        ) -> AdapterResult<Vec<NetworkOption>> {
            Ok(vec![])
        }
        async fn get_compute_costs(
            &self,
            _instance_type: &str,
            _region: &str,
            _operating_system: OperatingSystem,
            _purchase_option: PurchaseOption,
        ) -> AdapterResult<CostComponent> {
            Ok(CostComponent::monthly(
                "Compute",
                domain_costs::Money::zero(Currency::Usd),
            ))
        }
        async fn get_storage_costs(
            &self,
            _storage_type: StorageType,
            _storage_class: StorageClass,
            _replication: ReplicationType,
            _region: &str,
            _capacity_gb: u64,
        ) -> AdapterResult<CostComponent> {
            Ok(CostComponent::monthly(
                "Storage",
                domain_costs::Money::zero(Currency::Usd),
            ))
        }
        async fn get_iops_costs(
            &self,
            _storage_type: StorageType,
            _storage_class: StorageClass,
            _region: &str,
            _iops: u32,
        ) -> AdapterResult<CostComponent> {
            Ok(CostComponent::monthly(
                "IOPS",
                domain_costs::Money::zero(Currency::Usd),
            ))
        }
        async fn get_throughput_costs(
            &self,
            _storage_type: StorageType,
            _storage_class: StorageClass,
            _region: &str,
            _throughput_mbps: u32,
        ) -> AdapterResult<CostComponent> {
            Ok(CostComponent::monthly(
                "Throughput",
                domain_costs::Money::zero(Currency::Usd),
            ))
        }
        async fn get_network_costs(
            &self,
            _query: &NetworkCostQuery,
        ) -> AdapterResult<NetworkCostQuote> {
            Ok(NetworkCostQuote {
                monthly_cost: domain_costs::Money::zero(Currency::Usd),
                components: vec![],
            })
        }
        async fn get_pricing_data(
            &self,
            _region: &str,
            _currency: Currency,
        ) -> AdapterResult<Vec<PricingData>> {
            Ok(vec![])
        }
        async fn get_resources(
            &self,
            _ids: Option<&[String]>,
            _types: Option<&[ResourceType]>,
        ) -> AdapterResult<Vec<ResourceConfiguration>> {
            Ok(vec![])
        }
        async fn get_metrics(&self, _resource_id: &str) -> AdapterResult<ResourceMetrics> {
            Err(AdapterError::NotFound {
                provider: self.provider.to_string(),
                what: "metrics".into(),
            })
        }
        async fn get_cost(&self, _resource_id: &str) -> AdapterResult<ResourceCost> {
            Err(AdapterError::NotFound {
                provider: self.provider.to_string(),
                what: "cost".into(),
            })
        }
    }

    fn stub(provider: CloudProvider, behavior: Behavior) -> Arc<dyn CloudAdapter> {
        Arc::new(StubAdapter { provider, behavior })
    }

    #[tokio::test]
    async fn test_empty_adapter_set_is_configuration_error() {
        let result = fan_out("vm", vec![], Duration::from_secs(1), |adapter| async move {
            adapter.list_instance_types("us-east-1").await
        })
        .await;
        assert!(matches!(
            result.unwrap_err(),
            ComparisonError::NoProvidersConfigured
        ));
    }

    #[tokio::test]
    async fn test_failed_provider_drops_but_others_survive() {
        let outcome = fan_out(
            "vm",
            vec![
                stub(CloudProvider::Aws, Behavior::Succeed),
                stub(CloudProvider::Azure, Behavior::Fail),
            ],
            Duration::from_secs(1),
            |adapter| async move { adapter.list_instance_types("us-east-1").await },
        )
        .await
        .unwrap();

        assert_eq!(outcome.successes.len(), 1);
        assert_eq!(outcome.successes[0].provider, CloudProvider::Aws);
        assert!(outcome.failures.contains_key(&CloudProvider::Azure));
    }

    #[tokio::test]
    async fn test_all_providers_failing_is_fatal() {
        let result = fan_out(
            "vm",
            vec![
                stub(CloudProvider::Aws, Behavior::Fail),
                stub(CloudProvider::Azure, Behavior::Fail),
            ],
            Duration::from_secs(1),
            |adapter| async move { adapter.list_instance_types("us-east-1").await },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            ComparisonError::AllProvidersFailed { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_miss_discards_partial_results() {
        let result = fan_out(
            "vm",
            vec![
                stub(CloudProvider::Aws, Behavior::Succeed),
                stub(CloudProvider::Azure, Behavior::Hang),
            ],
            Duration::from_secs(5),
            |adapter| async move { adapter.list_instance_types("us-east-1").await },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            ComparisonError::Timeout { timeout_secs: 5 }
        ));
    }
}
