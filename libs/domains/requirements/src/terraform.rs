//! Terraform plan parser.
//!
//! Consumes `terraform show -json` plan output: resources come from
//! `planned_values.root_module`, recursing into child modules. Resource
//! types outside the supported set produce warnings, not errors.

use domain_costs::CloudProvider;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::models::{
    ComputeSpec, DatabaseSpec, InfrastructureRequirements, NetworkSpec, ParsedResource,
    ResourceCategory, SourceType, StorageSpec,
};

/// Parser for Terraform plan JSON.
pub struct TerraformPlanParser;

impl TerraformPlanParser {
    /// Extract normalized requirements from plan JSON text.
    pub fn parse(input: &str) -> ParseResult<InfrastructureRequirements> {
        let document: JsonValue = serde_json::from_str(input)?;
        let root_module = document
            .get("planned_values")
            .and_then(|v| v.get("root_module"))
            .ok_or_else(|| {
                ParseError::UnexpectedShape(
                    "missing planned_values.root_module; is this `terraform show -json` output?"
                        .to_string(),
                )
            })?;

        let mut resources = Vec::new();
        let mut warnings = Vec::new();
        collect_module(root_module, &mut resources, &mut warnings);

        debug!(
            resources = resources.len(),
            warnings = warnings.len(),
            "Parsed Terraform plan"
        );
        Ok(InfrastructureRequirements {
            source: SourceType::TerraformPlan,
            resources,
            warnings,
        })
    }
}

fn collect_module(
    module: &JsonValue,
    resources: &mut Vec<ParsedResource>,
    warnings: &mut Vec<String>,
) {
    if let Some(entries) = module.get("resources").and_then(|v| v.as_array()) {
        for entry in entries {
            match parse_resource(entry) {
                Some(resource) => resources.push(resource),
                None => {
                    if let Some(address) = entry.get("address").and_then(|v| v.as_str()) {
                        warnings.push(format!("unsupported resource type for '{address}'"));
                    }
                }
            }
        }
    }
    if let Some(children) = module.get("child_modules").and_then(|v| v.as_array()) {
        for child in children {
            collect_module(child, resources, warnings);
        }
    }
}

fn provider_hint(resource_type: &str) -> Option<CloudProvider> {
    if resource_type.starts_with("aws_") {
        Some(CloudProvider::Aws)
    } else if resource_type.starts_with("azurerm_") {
        Some(CloudProvider::Azure)
    } else if resource_type.starts_with("google_") {
        Some(CloudProvider::Gcp)
    } else {
        None
    }
}

fn str_value(values: &JsonValue, key: &str) -> Option<String> {
    values.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn u64_value(values: &JsonValue, key: &str) -> Option<u64> {
    values.get(key).and_then(|v| v.as_u64())
}

fn bool_value(values: &JsonValue, key: &str) -> Option<bool> {
    values.get(key).and_then(|v| v.as_bool())
}

fn parse_resource(entry: &JsonValue) -> Option<ParsedResource> {
    let resource_type = entry.get("type")?.as_str()?;
    let name = entry
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or(resource_type)
        .to_string();
    let values = entry.get("values").cloned().unwrap_or(JsonValue::Null);
    let depends_on = entry
        .get("depends_on")
        .and_then(|v| v.as_array())
        .map(|deps| {
            deps.iter()
                .filter_map(|d| d.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let hint = provider_hint(resource_type);
    let region = str_value(&values, "availability_zone")
        .or_else(|| str_value(&values, "location"))
        .or_else(|| str_value(&values, "zone"));

    let mut resource = ParsedResource {
        name,
        source_type: resource_type.to_string(),
        category: ResourceCategory::Compute,
        provider_hint: hint,
        region,
        compute: None,
        storage: None,
        network: None,
        database: None,
        depends_on,
    };

    match resource_type {
        "aws_instance" | "azurerm_linux_virtual_machine" | "azurerm_windows_virtual_machine"
        | "google_compute_instance" => {
            resource.category = ResourceCategory::Compute;
            resource.compute = Some(ComputeSpec {
                instance_type: str_value(&values, "instance_type")
                    .or_else(|| str_value(&values, "size"))
                    .or_else(|| str_value(&values, "machine_type")),
                vcpus: None,
                memory_gb: None,
                count: u64_value(&values, "count").unwrap_or(1) as u32,
            });
        }
        "aws_ebs_volume" | "azurerm_managed_disk" | "google_compute_disk" => {
            resource.category = ResourceCategory::Storage;
            resource.storage = Some(StorageSpec {
                capacity_gb: u64_value(&values, "size")
                    .or_else(|| u64_value(&values, "disk_size_gb")),
                storage_class: str_value(&values, "type")
                    .or_else(|| str_value(&values, "storage_account_type")),
                encrypted: bool_value(&values, "encrypted"),
            });
        }
        "aws_s3_bucket" | "azurerm_storage_account" | "google_storage_bucket" => {
            resource.category = ResourceCategory::Storage;
            resource.storage = Some(StorageSpec {
                capacity_gb: None,
                storage_class: str_value(&values, "storage_class")
                    .or_else(|| str_value(&values, "account_tier")),
                encrypted: None,
            });
        }
        "aws_db_instance" | "azurerm_postgresql_server" | "google_sql_database_instance" => {
            resource.category = ResourceCategory::Database;
            resource.database = Some(DatabaseSpec {
                engine: str_value(&values, "engine")
                    .or_else(|| str_value(&values, "database_version")),
                instance_class: str_value(&values, "instance_class")
                    .or_else(|| str_value(&values, "sku_name"))
                    .or_else(|| str_value(&values, "tier")),
                allocated_storage_gb: u64_value(&values, "allocated_storage"),
                multi_az: bool_value(&values, "multi_az"),
            });
        }
        "aws_lb" | "aws_elb" | "azurerm_lb" | "google_compute_forwarding_rule" => {
            resource.category = ResourceCategory::Network;
            resource.network = Some(NetworkSpec {
                service: Some("load_balancer".to_string()),
                cidr_block: None,
                internet_facing: bool_value(&values, "internal").map(|internal| !internal),
            });
        }
        "aws_vpc" | "azurerm_virtual_network" | "google_compute_network" => {
            resource.category = ResourceCategory::Network;
            resource.network = Some(NetworkSpec {
                service: Some("vpc".to_string()),
                cidr_block: str_value(&values, "cidr_block"),
                internet_facing: None,
            });
        }
        "aws_nat_gateway" | "azurerm_nat_gateway" | "google_compute_router_nat" => {
            resource.category = ResourceCategory::Network;
            resource.network = Some(NetworkSpec {
                service: Some("nat".to_string()),
                cidr_block: None,
                internet_facing: None,
            });
        }
        _ => return None,
    }

    Some(resource)
}
