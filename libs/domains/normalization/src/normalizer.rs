//! The normalization engine.
//!
//! Maps each provider's native billing payload into canonical
//! `NormalizedCostEntry` values: mapping-table lookup, metadata
//! projection, single-bucket cost placement, deterministic ids, and
//! currency conversion into the target currency. Normalization is
//! idempotent: the same input always yields the same ids and amounts.

use std::collections::HashMap;

use domain_costs::{CloudProvider, Currency, CurrencyService, Money};
use observability::NormalizationMetrics;
use rust_decimal::Decimal;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{info, warn};

use crate::error::{NormalizationError, NormalizationResult};
use crate::mapping::resource_mapping;
use crate::models::{
    CostAllocation, CostBreakdown, NormalizedCostEntry, ResourceMetadata, TimeWindow,
};
use domain_costs::BillingType;

/// Per-batch failure handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationMode {
    /// Any record failure aborts the batch; nothing is emitted.
    #[default]
    FailFast,
    /// Failing records are skipped and reported alongside the survivors.
    ContinueOnError,
}

/// Entries plus the per-record failures collected in
/// `ContinueOnError` mode.
#[derive(Debug)]
pub struct NormalizationReport {
    pub entries: Vec<NormalizedCostEntry>,
    pub soft_errors: Vec<NormalizationError>,
}

/// One record lifted out of a provider payload, before mapping.
struct RawRecord {
    resource_id: String,
    resource_type: String,
    name: String,
    region: String,
    account_id: String,
    cost: Decimal,
    currency: String,
    project: Option<String>,
    cost_center: Option<String>,
    tags: HashMap<String, String>,
    /// Source fields available to the projection rules
    fields: JsonMap<String, JsonValue>,
}

/// Service for normalizing cloud costs across providers.
pub struct CostNormalizer {
    currency_service: CurrencyService,
    target_currency: Currency,
}

impl CostNormalizer {
    pub fn new(currency_service: CurrencyService, target_currency: Currency) -> Self {
        Self {
            currency_service,
            target_currency,
        }
    }

    /// Normalize a raw provider payload, failing fast on the first record
    /// error.
    pub fn normalize(
        &self,
        provider: CloudProvider,
        window: TimeWindow,
        raw: &JsonValue,
    ) -> NormalizationResult<Vec<NormalizedCostEntry>> {
        let report = self.normalize_with_mode(provider, window, raw, NormalizationMode::FailFast)?;
        Ok(report.entries)
    }

    /// Normalize a raw provider payload under an explicit failure mode.
    pub fn normalize_with_mode(
        &self,
        provider: CloudProvider,
        window: TimeWindow,
        raw: &JsonValue,
        mode: NormalizationMode,
    ) -> NormalizationResult<NormalizationReport> {
        let records = match provider {
            CloudProvider::Aws => parse_aws_records(raw),
            CloudProvider::Azure => parse_azure_records(raw),
            CloudProvider::Gcp => parse_gcp_records(raw),
        }?;

        let mut entries = Vec::with_capacity(records.len());
        let mut soft_errors = Vec::new();

        for record in records {
            match self.build_entry(provider, &window, record) {
                Ok(entry) => entries.push(entry),
                Err(err) => match mode {
                    NormalizationMode::FailFast => {
                        NormalizationMetrics::record_error(provider.to_string(), "record");
                        return Err(err);
                    }
                    NormalizationMode::ContinueOnError => {
                        warn!(provider = %provider, error = %err, "Skipping record");
                        NormalizationMetrics::record_error(provider.to_string(), "record");
                        soft_errors.push(err);
                    }
                },
            }
        }

        info!(
            provider = %provider,
            entries = entries.len(),
            skipped = soft_errors.len(),
            "Normalized cost batch"
        );
        NormalizationMetrics::record_entries(provider.to_string(), entries.len());

        Ok(NormalizationReport {
            entries,
            soft_errors,
        })
    }

    fn build_entry(
        &self,
        provider: CloudProvider,
        window: &TimeWindow,
        record: RawRecord,
    ) -> NormalizationResult<NormalizedCostEntry> {
        let mapping = resource_mapping(provider, &record.resource_type)?;

        let mut specifications = JsonMap::new();
        for (src, dest) in mapping.metadata_mapping {
            if let Some(value) = record.fields.get(*src) {
                write_dotted_path(&mut specifications, dest, value.clone());
            }
        }

        let resource = ResourceMetadata {
            provider,
            provider_id: record.resource_id.clone(),
            name: record.name,
            resource_type: mapping.normalized_type,
            region: record.region,
            billing_type: BillingType::OnDemand,
            specifications,
        };

        let source_currency = CurrencyService::parse_currency(&record.currency)?;
        let breakdown = CostBreakdown::from_single_bucket(
            mapping.normalized_type,
            Money::new(record.cost, source_currency),
        );

        let entry = NormalizedCostEntry::try_new(
            format!(
                "{}-{}-{}",
                provider,
                record.resource_id,
                window.start_time.format("%Y-%m-%dT%H:%M:%S")
            ),
            record.account_id,
            resource,
            CostAllocation {
                project: record.project,
                cost_center: record.cost_center,
                environment: record.tags.get("environment").cloned(),
                custom_tags: record.tags,
            },
            breakdown,
            source_currency,
            *window,
        )?;

        self.convert_entry(entry)
    }

    /// Convert every non-zero bucket into the target currency.
    ///
    /// On failure the error propagates and no partial entry is emitted.
    fn convert_entry(
        &self,
        mut entry: NormalizedCostEntry,
    ) -> NormalizationResult<NormalizedCostEntry> {
        if entry.currency == self.target_currency {
            return Ok(entry);
        }

        for bucket in [
            &mut entry.cost_breakdown.compute,
            &mut entry.cost_breakdown.storage,
            &mut entry.cost_breakdown.network,
            &mut entry.cost_breakdown.other,
        ] {
            *bucket = if bucket.is_zero() {
                Money::zero(self.target_currency)
            } else {
                self.currency_service.convert(*bucket, self.target_currency)?
            };
        }
        entry.currency = self.target_currency;
        Ok(entry)
    }
}

/// Write `value` into `map` at a dotted path, creating intermediate
/// objects.
fn write_dotted_path(map: &mut JsonMap<String, JsonValue>, path: &str, value: JsonValue) {
    let mut parts = path.split('.').peekable();
    let mut current = map;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), value);
            return;
        }
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| JsonValue::Object(JsonMap::new()));
        if !slot.is_object() {
            // A later rule may deepen a path an earlier rule wrote a
            // scalar to; the deeper rule wins.
            *slot = JsonValue::Object(JsonMap::new());
        }
        let JsonValue::Object(next) = slot else {
            return;
        };
        current = next;
    }
}

/// Extract a cost amount as exact decimal, never passing through a float.
fn decimal_from_value(value: Option<&JsonValue>) -> Decimal {
    match value {
        Some(JsonValue::String(s)) => s.parse().unwrap_or(Decimal::ZERO),
        Some(JsonValue::Number(n)) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn string_field(map: &JsonMap<String, JsonValue>, key: &str) -> Option<String> {
    map.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn tags_field(map: &JsonMap<String, JsonValue>, key: &str) -> HashMap<String, String> {
    map.get(key)
        .and_then(|v| v.as_object())
        .map(|tags| {
            tags.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn payload_error(provider: &str, message: impl Into<String>) -> NormalizationError {
    NormalizationError::DataNormalization {
        provider: provider.to_string(),
        message: message.into(),
        details: HashMap::new(),
    }
}

/// AWS Cost Explorer shape: `ResultsByTime[].Groups[].{Keys, Metrics}`.
fn parse_aws_records(raw: &JsonValue) -> NormalizationResult<Vec<RawRecord>> {
    let account_id = raw
        .get("AccountId")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let batch_currency = raw
        .get("Currency")
        .and_then(|v| v.as_str())
        .unwrap_or("USD")
        .to_string();

    let results = raw
        .get("ResultsByTime")
        .and_then(|v| v.as_array())
        .ok_or_else(|| payload_error("aws", "missing ResultsByTime"))?;

    let mut records = Vec::new();
    for item in results {
        let groups = item.get("Groups").and_then(|v| v.as_array());
        for group in groups.into_iter().flatten() {
            let metrics = group
                .get("Metrics")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();
            let resource_id = group
                .get("Keys")
                .and_then(|v| v.as_array())
                .and_then(|keys| keys.first())
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            records.push(RawRecord {
                resource_id: resource_id.clone(),
                resource_type: string_field(&metrics, "ResourceType").unwrap_or_default(),
                name: string_field(&metrics, "ResourceName").unwrap_or_else(|| resource_id.clone()),
                region: string_field(&metrics, "Region").unwrap_or_else(|| "unknown".to_string()),
                account_id: account_id.clone(),
                cost: decimal_from_value(metrics.get("UnblendedCost")),
                currency: batch_currency.clone(),
                project: string_field(&metrics, "Project"),
                cost_center: string_field(&metrics, "CostCenter"),
                tags: tags_field(&metrics, "Tags"),
                fields: metrics,
            });
        }
    }
    Ok(records)
}

/// Azure cost details shape: `properties.rows[]`.
fn parse_azure_records(raw: &JsonValue) -> NormalizationResult<Vec<RawRecord>> {
    let rows = raw
        .get("properties")
        .and_then(|v| v.get("rows"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| payload_error("azure", "missing properties.rows"))?;

    let mut records = Vec::new();
    for row in rows {
        let fields = row
            .as_object()
            .cloned()
            .ok_or_else(|| payload_error("azure", "row is not an object"))?;
        let resource_id = string_field(&fields, "resourceId").unwrap_or_default();

        records.push(RawRecord {
            resource_id: resource_id.clone(),
            resource_type: string_field(&fields, "resourceType").unwrap_or_default(),
            name: string_field(&fields, "resourceName").unwrap_or_else(|| resource_id.clone()),
            region: string_field(&fields, "location").unwrap_or_else(|| "unknown".to_string()),
            account_id: string_field(&fields, "subscriptionId")
                .unwrap_or_else(|| "unknown".to_string()),
            cost: decimal_from_value(fields.get("cost")),
            currency: string_field(&fields, "currency").unwrap_or_else(|| "USD".to_string()),
            project: string_field(&fields, "project"),
            cost_center: string_field(&fields, "costCenter"),
            tags: tags_field(&fields, "tags"),
            fields,
        });
    }
    Ok(records)
}

/// GCP billing export shape: `billing_data[]`.
fn parse_gcp_records(raw: &JsonValue) -> NormalizationResult<Vec<RawRecord>> {
    let items = raw
        .get("billing_data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| payload_error("gcp", "missing billing_data"))?;

    let mut records = Vec::new();
    for item in items {
        let fields = item
            .as_object()
            .cloned()
            .ok_or_else(|| payload_error("gcp", "billing item is not an object"))?;
        let resource_id = item
            .get("resource")
            .and_then(|v| v.get("id"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let labels = tags_field(&fields, "labels");

        records.push(RawRecord {
            resource_id: resource_id.clone(),
            resource_type: item
                .get("service")
                .and_then(|v| v.get("description"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            name: item
                .get("resource")
                .and_then(|v| v.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or(&resource_id)
                .to_string(),
            region: item
                .get("location")
                .and_then(|v| v.get("region"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            account_id: string_field(&fields, "billing_account_id")
                .unwrap_or_else(|| "unknown".to_string()),
            cost: decimal_from_value(item.get("cost").and_then(|v| v.get("amount"))),
            currency: item
                .get("cost")
                .and_then(|v| v.get("currency"))
                .and_then(|v| v.as_str())
                .unwrap_or("USD")
                .to_string(),
            project: item
                .get("project")
                .and_then(|v| v.get("id"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            cost_center: labels.get("cost_center").cloned(),
            tags: labels,
            fields,
        });
    }
    Ok(records)
}
