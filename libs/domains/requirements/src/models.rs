use domain_costs::CloudProvider;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where a requirement set was extracted from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceType {
    TerraformPlan,
    CloudFormation,
}

/// Broad category a template resource falls into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceCategory {
    Compute,
    Storage,
    Network,
    Database,
}

/// Compute sizing extracted from a template resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<f64>,
    pub count: u32,
}

/// Storage sizing extracted from a template resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

/// Network shape extracted from a template resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internet_facing: Option<bool>,
}

/// Database shape extracted from a template resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_storage_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_az: Option<bool>,
}

/// One resource lifted out of an IaC input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResource {
    /// Logical name within the template
    pub name: String,
    /// The template's native type string (e.g. `aws_instance`)
    pub source_type: String,
    pub category: ResourceCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_hint: Option<CloudProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<ComputeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseSpec>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// Everything extracted from one IaC input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureRequirements {
    pub source: SourceType,
    pub resources: Vec<ParsedResource>,
    /// Resource types the parser recognized but could not fully size, or
    /// skipped entirely
    pub warnings: Vec<String>,
}

impl InfrastructureRequirements {
    pub fn resource_by_name(&self, name: &str) -> Option<&ParsedResource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn resources_in_category(&self, category: ResourceCategory) -> Vec<&ParsedResource> {
        self.resources
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Validation pass: report resources missing the fields a cost
    /// estimate would need.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for resource in &self.resources {
            match resource.category {
                ResourceCategory::Compute => {
                    let sized = resource
                        .compute
                        .as_ref()
                        .is_some_and(|c| c.instance_type.is_some() || c.vcpus.is_some());
                    if !sized {
                        problems.push(format!(
                            "compute resource '{}' has no instance type or vCPU count",
                            resource.name
                        ));
                    }
                }
                ResourceCategory::Storage => {
                    let sized = resource
                        .storage
                        .as_ref()
                        .is_some_and(|s| s.capacity_gb.is_some());
                    if !sized {
                        problems.push(format!(
                            "storage resource '{}' has no capacity",
                            resource.name
                        ));
                    }
                }
                ResourceCategory::Database => {
                    let has_engine = resource
                        .database
                        .as_ref()
                        .is_some_and(|d| d.engine.is_some());
                    if !has_engine {
                        problems.push(format!(
                            "database resource '{}' has no engine",
                            resource.name
                        ));
                    }
                }
                ResourceCategory::Network => {}
            }
        }
        problems
    }
}
