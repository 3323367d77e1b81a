//! The aggregation engine.
//!
//! Groups normalized entries by dotted-path keys for reporting. Paths are
//! compiled once into field extractors, so the per-entry hot path is a
//! plain function call rather than a reflective walk. An unresolvable
//! path yields the empty string, a stable sentinel.

use std::collections::HashMap;

use domain_costs::{Currency, Money};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{NormalizationError, NormalizationResult};
use crate::models::{CostAggregation, NormalizedCostEntry};

type Extractor = Box<dyn Fn(&NormalizedCostEntry) -> String + Send + Sync>;

fn constant_empty() -> Extractor {
    Box::new(|_| String::new())
}

fn json_to_key(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Compile one dotted path into an extractor over the entry schema.
fn compile_path(path: &str) -> Extractor {
    let segments: Vec<String> = path.split('.').map(str::to_string).collect();

    match segments.first().map(String::as_str) {
        Some("id") if segments.len() == 1 => Box::new(|e| e.id.clone()),
        Some("account_id") if segments.len() == 1 => Box::new(|e| e.account_id.clone()),
        Some("currency") if segments.len() == 1 => Box::new(|e| e.currency.to_string()),
        Some("resource") if segments.len() >= 2 => match segments[1].as_str() {
            "provider" if segments.len() == 2 => {
                Box::new(|e| e.resource.provider.to_string())
            }
            "provider_id" if segments.len() == 2 => {
                Box::new(|e| e.resource.provider_id.clone())
            }
            "name" if segments.len() == 2 => Box::new(|e| e.resource.name.clone()),
            "type" if segments.len() == 2 => {
                Box::new(|e| e.resource.resource_type.to_string())
            }
            "region" if segments.len() == 2 => Box::new(|e| e.resource.region.clone()),
            "billing_type" if segments.len() == 2 => {
                Box::new(|e| e.resource.billing_type.to_string())
            }
            "specifications" if segments.len() > 2 => {
                let tail: Vec<String> = segments[2..].to_vec();
                Box::new(move |e| {
                    let mut value: Option<&JsonValue> = None;
                    let mut current = &e.resource.specifications;
                    for (i, segment) in tail.iter().enumerate() {
                        match current.get(segment) {
                            Some(v) if i + 1 == tail.len() => value = Some(v),
                            Some(JsonValue::Object(next)) => current = next,
                            _ => return String::new(),
                        }
                    }
                    value.map(json_to_key).unwrap_or_default()
                })
            }
            _ => constant_empty(),
        },
        Some("allocation") if segments.len() >= 2 => match segments[1].as_str() {
            "project" if segments.len() == 2 => {
                Box::new(|e| e.allocation.project.clone().unwrap_or_default())
            }
            "cost_center" if segments.len() == 2 => {
                Box::new(|e| e.allocation.cost_center.clone().unwrap_or_default())
            }
            "environment" if segments.len() == 2 => {
                Box::new(|e| e.allocation.environment.clone().unwrap_or_default())
            }
            "tags" if segments.len() == 3 => {
                let tag = segments[2].clone();
                Box::new(move |e| e.allocation.custom_tags.get(&tag).cloned().unwrap_or_default())
            }
            _ => constant_empty(),
        },
        _ => constant_empty(),
    }
}

/// Aggregator over normalized cost entries.
pub struct CostAggregator {
    target_currency: Currency,
}

impl CostAggregator {
    pub fn new(target_currency: Currency) -> Self {
        Self { target_currency }
    }

    /// Group entries by the dotted paths, totalling cost per group key.
    ///
    /// Keys join their parts with `:`; an empty `group_by` folds
    /// everything under `total`.
    pub fn aggregate(
        &self,
        entries: &[NormalizedCostEntry],
        group_by: &[String],
        time_period: &str,
    ) -> NormalizationResult<CostAggregation> {
        if entries.is_empty() {
            return Err(NormalizationError::EmptyAggregation);
        }

        let extractors: Vec<Extractor> = group_by.iter().map(|p| compile_path(p)).collect();

        let mut costs: HashMap<String, Decimal> = HashMap::new();
        let mut resource_counts: HashMap<String, usize> = HashMap::new();
        let mut total = Decimal::ZERO;
        let mut start_time = entries[0].start_time;
        let mut end_time = entries[0].end_time;

        for entry in entries {
            let key = if extractors.is_empty() {
                "total".to_string()
            } else {
                extractors
                    .iter()
                    .map(|extract| extract(entry))
                    .collect::<Vec<_>>()
                    .join(":")
            };

            let amount = entry.total_cost().amount;
            *costs.entry(key.clone()).or_insert(Decimal::ZERO) += amount;
            *resource_counts.entry(key).or_insert(0) += 1;
            total += amount;
            start_time = start_time.min(entry.start_time);
            end_time = end_time.max(entry.end_time);
        }

        debug!(
            groups = costs.len(),
            entries = entries.len(),
            "Aggregated cost entries"
        );

        Ok(CostAggregation {
            group_by: group_by.to_vec(),
            time_period: time_period.to_string(),
            costs: costs
                .into_iter()
                .map(|(k, v)| (k, Money::new(v, self.target_currency)))
                .collect(),
            resource_counts,
            total_cost: Money::new(total, self.target_currency),
            currency: self.target_currency,
            start_time,
            end_time,
        })
    }
}
