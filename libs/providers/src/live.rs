//! Live adapters backed by the providers' public pricing endpoints.
//!
//! Catalog shapes (which storage classes exist, which network services are
//! offered) are stable, so they are served from the bundled catalogs; unit
//! prices are refreshed from the public APIs where one exists. When a
//! pricing endpoint is unreachable the bundled rates are served instead,
//! with a warning. Account-scoped operations (deployed resources, metrics,
//! per-resource cost) require credentials this layer does not hold and
//! surface as configuration errors.

use std::collections::HashMap;

use async_trait::async_trait;
use domain_costs::{CloudProvider, CostComponent, Currency, Money, ResourceType};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::{
    NetworkCostQuery, NetworkCostQuote, NetworkOption, NetworkServiceType, OperatingSystem,
    PricingData, PricingUnit, PurchaseOption, ReplicationType, ResourceConfiguration, ResourceCost,
    ResourceMetrics, StorageClass, StorageOption, StorageType, VmInstanceType,
};
use crate::error::{AdapterError, AdapterResult};
use crate::retry::RetryPolicy;
use crate::simulated::SimulatedAdapter;
use crate::CloudAdapter;

/// AWS Price List bulk API base URL
const AWS_PRICING_API: &str = "https://pricing.us-east-1.amazonaws.com";

/// Azure Retail Prices API endpoint
const AZURE_PRICING_API: &str = "https://prices.azure.com/api/retail/prices";

/// GCP Cloud Billing API endpoint
const GCP_BILLING_API: &str = "https://cloudbilling.googleapis.com/v1";

/// Compute Engine service id in the Cloud Billing catalog
const GCP_COMPUTE_SERVICE: &str = "services/6F81-5844-456A";

/// Adapter that refreshes prices from public endpoints.
pub struct LiveAdapter {
    provider: CloudProvider,
    client: Client,
    catalog: SimulatedAdapter,
    retry: RetryPolicy,
    /// API key for endpoints that require one (GCP Cloud Billing)
    api_key: Option<String>,
}

impl LiveAdapter {
    pub fn new(provider: CloudProvider, retry: RetryPolicy, api_key: Option<String>) -> Self {
        let catalog = match provider {
            CloudProvider::Aws => SimulatedAdapter::aws(),
            CloudProvider::Azure => SimulatedAdapter::azure(),
            CloudProvider::Gcp => SimulatedAdapter::gcp(),
        };
        Self {
            provider,
            client: Client::new(),
            catalog,
            retry,
            api_key,
        }
    }

    fn provider_name(&self) -> String {
        self.provider.to_string()
    }

    fn not_configured(&self, what: &str) -> AdapterError {
        AdapterError::NotConfigured {
            provider: self.provider_name(),
            message: format!("{what} requires account credentials, which the live pricing adapter does not hold"),
        }
    }

    async fn fetch_live_prices(&self, region: &str) -> AdapterResult<Vec<PricingData>> {
        match self.provider {
            CloudProvider::Aws => self.fetch_aws_prices(region).await,
            CloudProvider::Azure => self.fetch_azure_prices(region).await,
            CloudProvider::Gcp => self.fetch_gcp_prices(region).await,
        }
    }

    /// Fetch EC2 offers from the Price List bulk API.
    async fn fetch_aws_prices(&self, region: &str) -> AdapterResult<Vec<PricingData>> {
        let url = format!(
            "{}/offers/v1.0/aws/AmazonEC2/current/{}/index.json",
            AWS_PRICING_API, region
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AdapterError::Http {
                provider: self.provider_name(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(AdapterError::Api {
                provider: self.provider_name(),
                message: format!("price list returned {}", response.status()),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AdapterError::Http {
            provider: self.provider_name(),
            source: e,
        })?;

        let mut prices = Vec::new();
        let products = body
            .get("products")
            .and_then(|p| p.as_object())
            .ok_or_else(|| AdapterError::Parse {
                provider: self.provider_name(),
                message: "missing products map".to_string(),
            })?;
        let terms = body
            .get("terms")
            .and_then(|t| t.get("OnDemand"))
            .and_then(|t| t.as_object());

        for (sku, product) in products.iter().take(200) {
            let Some(attributes) = product.get("attributes") else {
                continue;
            };
            let Some(instance_type) = attributes.get("instanceType").and_then(|v| v.as_str())
            else {
                continue;
            };
            let vcpu = attributes.get("vcpu").and_then(|v| v.as_str()).unwrap_or("");
            let memory = attributes
                .get("memory")
                .and_then(|v| v.as_str())
                .unwrap_or("");

            let unit_price = terms
                .and_then(|t| t.get(sku))
                .and_then(on_demand_rate)
                .unwrap_or(Decimal::ZERO);

            prices.push(PricingData {
                provider: CloudProvider::Aws,
                sku: sku.clone(),
                service_name: "Amazon EC2".to_string(),
                resource_type: ResourceType::Compute,
                region: region.to_string(),
                unit_price: Money::new(unit_price, Currency::Usd),
                pricing_unit: PricingUnit::Hour,
                description: format!("{} - {} vCPU, {} memory", instance_type, vcpu, memory),
                attributes: HashMap::from([
                    ("instance_type".to_string(), instance_type.to_string()),
                    ("vcpu".to_string(), vcpu.to_string()),
                    ("memory".to_string(), memory.to_string()),
                ]),
                effective_date: chrono::Utc::now(),
            });
        }

        Ok(prices)
    }

    /// Fetch VM prices from the Azure Retail Prices API (no auth needed).
    async fn fetch_azure_prices(&self, region: &str) -> AdapterResult<Vec<PricingData>> {
        let filter = format!(
            "serviceName eq 'Virtual Machines' and armRegionName eq '{}' and priceType eq 'Consumption'",
            region
        );
        let response = self
            .client
            .get(AZURE_PRICING_API)
            .query(&[("api-version", "2023-01-01-preview"), ("$filter", filter.as_str())])
            .send()
            .await
            .map_err(|e| AdapterError::Http {
                provider: self.provider_name(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(AdapterError::Api {
                provider: self.provider_name(),
                message: format!("retail prices returned {}", response.status()),
            });
        }

        let body: AzurePriceResponse = response.json().await.map_err(|e| AdapterError::Http {
            provider: self.provider_name(),
            source: e,
        })?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                let unit_price = Decimal::try_from(item.retail_price).ok()?;
                Some(PricingData {
                    provider: CloudProvider::Azure,
                    sku: item.sku_id,
                    service_name: item.service_name,
                    resource_type: ResourceType::Compute,
                    region: region.to_string(),
                    unit_price: Money::new(unit_price, Currency::Usd),
                    pricing_unit: PricingUnit::Hour,
                    description: item.product_name,
                    attributes: HashMap::from([
                        ("sku_name".to_string(), item.sku_name),
                        ("meter_name".to_string(), item.meter_name),
                    ]),
                    effective_date: chrono::Utc::now(),
                })
            })
            .collect())
    }

    /// Fetch Compute Engine SKUs from the Cloud Billing catalog.
    async fn fetch_gcp_prices(&self, region: &str) -> AdapterResult<Vec<PricingData>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AdapterError::NotConfigured {
                provider: self.provider_name(),
                message: "GCP Cloud Billing API requires an API key".to_string(),
            })?;

        let url = format!("{}/{}/skus", GCP_BILLING_API, GCP_COMPUTE_SERVICE);
        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| AdapterError::Http {
                provider: self.provider_name(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(AdapterError::Api {
                provider: self.provider_name(),
                message: format!("billing catalog returned {}", response.status()),
            });
        }

        let body: GcpSkuListResponse = response.json().await.map_err(|e| AdapterError::Http {
            provider: self.provider_name(),
            source: e,
        })?;

        Ok(body
            .skus
            .unwrap_or_default()
            .into_iter()
            .filter(|sku| {
                sku.service_regions
                    .as_ref()
                    .is_some_and(|regions| regions.iter().any(|r| r == region))
            })
            .filter_map(|sku| {
                let unit_price = sku.nanos_price()?;
                Some(PricingData {
                    provider: CloudProvider::Gcp,
                    sku: sku.sku_id,
                    service_name: "Compute Engine".to_string(),
                    resource_type: ResourceType::Compute,
                    region: region.to_string(),
                    unit_price: Money::new(unit_price, Currency::Usd),
                    pricing_unit: PricingUnit::Hour,
                    description: sku.description,
                    attributes: HashMap::new(),
                    effective_date: chrono::Utc::now(),
                })
            })
            .collect())
    }
}

/// Walk an AWS on-demand term block down to its USD rate.
fn on_demand_rate(term: &serde_json::Value) -> Option<Decimal> {
    let offers = term.as_object()?;
    let (_, offer) = offers.iter().next()?;
    let dimensions = offer.get("priceDimensions")?.as_object()?;
    let (_, dimension) = dimensions.iter().next()?;
    let usd = dimension.get("pricePerUnit")?.get("USD")?.as_str()?;
    usd.parse().ok()
}

#[derive(Debug, Deserialize)]
struct AzurePriceResponse {
    #[serde(rename = "Items")]
    items: Vec<AzurePriceItem>,
}

#[derive(Debug, Deserialize)]
struct AzurePriceItem {
    #[serde(rename = "retailPrice")]
    retail_price: f64,
    #[serde(rename = "skuId")]
    sku_id: String,
    #[serde(rename = "skuName")]
    sku_name: String,
    #[serde(rename = "productName")]
    product_name: String,
    #[serde(rename = "serviceName")]
    service_name: String,
    #[serde(rename = "meterName")]
    meter_name: String,
}

#[derive(Debug, Deserialize)]
struct GcpSkuListResponse {
    skus: Option<Vec<GcpSku>>,
}

#[derive(Debug, Deserialize)]
struct GcpSku {
    #[serde(rename = "skuId")]
    sku_id: String,
    description: String,
    #[serde(rename = "serviceRegions")]
    service_regions: Option<Vec<String>>,
    #[serde(rename = "pricingInfo")]
    pricing_info: Option<Vec<GcpPricingInfo>>,
}

impl GcpSku {
    /// First tiered rate, converted from (units, nanos) to a decimal USD
    /// amount.
    fn nanos_price(&self) -> Option<Decimal> {
        let info = self.pricing_info.as_ref()?.first()?;
        let rate = info.pricing_expression.tiered_rates.first()?;
        let units: i64 = rate.unit_price.units.as_deref().unwrap_or("0").parse().ok()?;
        let nanos = Decimal::new(rate.unit_price.nanos, 9);
        Some(Decimal::from(units) + nanos)
    }
}

#[derive(Debug, Deserialize)]
struct GcpPricingInfo {
    #[serde(rename = "pricingExpression")]
    pricing_expression: GcpPricingExpression,
}

#[derive(Debug, Deserialize)]
struct GcpPricingExpression {
    #[serde(rename = "tieredRates")]
    tiered_rates: Vec<GcpTieredRate>,
}

#[derive(Debug, Deserialize)]
struct GcpTieredRate {
    #[serde(rename = "unitPrice")]
    unit_price: GcpUnitPrice,
}

#[derive(Debug, Deserialize)]
struct GcpUnitPrice {
    units: Option<String>,
    nanos: i64,
}

#[async_trait]
impl CloudAdapter for LiveAdapter {
    fn provider(&self) -> CloudProvider {
        self.provider
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn list_instance_types(&self, region: &str) -> AdapterResult<Vec<VmInstanceType>> {
        self.catalog.list_instance_types(region).await
    }

    async fn list_storage_options(
        &self,
        storage_type: StorageType,
        region: &str,
    ) -> AdapterResult<Vec<StorageOption>> {
        self.catalog.list_storage_options(storage_type, region).await
    }

    async fn list_network_options(
        &self,
        service_type: NetworkServiceType,
        region: &str,
    ) -> AdapterResult<Vec<NetworkOption>> {
        self.catalog
            .list_network_options(service_type, region)
            .await
    }

    async fn get_compute_costs(
        &self,
        instance_type: &str,
        region: &str,
        operating_system: OperatingSystem,
        purchase_option: PurchaseOption,
    ) -> AdapterResult<CostComponent> {
        self.catalog
            .get_compute_costs(instance_type, region, operating_system, purchase_option)
            .await
    }

    async fn get_storage_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        replication: ReplicationType,
        region: &str,
        capacity_gb: u64,
    ) -> AdapterResult<CostComponent> {
        self.catalog
            .get_storage_costs(storage_type, storage_class, replication, region, capacity_gb)
            .await
    }

    async fn get_iops_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        region: &str,
        iops: u32,
    ) -> AdapterResult<CostComponent> {
        self.catalog
            .get_iops_costs(storage_type, storage_class, region, iops)
            .await
    }

    async fn get_throughput_costs(
        &self,
        storage_type: StorageType,
        storage_class: StorageClass,
        region: &str,
        throughput_mbps: u32,
    ) -> AdapterResult<CostComponent> {
        self.catalog
            .get_throughput_costs(storage_type, storage_class, region, throughput_mbps)
            .await
    }

    async fn get_network_costs(&self, query: &NetworkCostQuery) -> AdapterResult<NetworkCostQuote> {
        self.catalog.get_network_costs(query).await
    }

    async fn get_pricing_data(
        &self,
        region: &str,
        currency: Currency,
    ) -> AdapterResult<Vec<PricingData>> {
        let fetched = self
            .retry
            .run("get_pricing_data", || self.fetch_live_prices(region))
            .await;

        match fetched {
            Ok(prices) if !prices.is_empty() => {
                info!(
                    provider = %self.provider,
                    region = region,
                    count = prices.len(),
                    "Fetched live pricing data"
                );
                Ok(prices)
            }
            Ok(_) => {
                warn!(
                    provider = %self.provider,
                    region = region,
                    "Live pricing endpoint returned no records, serving bundled rates"
                );
                self.catalog.get_pricing_data(region, currency).await
            }
            Err(err) => {
                warn!(
                    provider = %self.provider,
                    region = region,
                    error = %err,
                    "Live pricing fetch failed, serving bundled rates"
                );
                self.catalog.get_pricing_data(region, currency).await
            }
        }
    }

    async fn get_resources(
        &self,
        _ids: Option<&[String]>,
        _types: Option<&[ResourceType]>,
    ) -> AdapterResult<Vec<ResourceConfiguration>> {
        Err(self.not_configured("get_resources"))
    }

    async fn get_metrics(&self, _resource_id: &str) -> AdapterResult<ResourceMetrics> {
        Err(self.not_configured("get_metrics"))
    }

    async fn get_cost(&self, _resource_id: &str) -> AdapterResult<ResourceCost> {
        Err(self.not_configured("get_cost"))
    }
}
