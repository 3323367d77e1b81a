use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use domain_costs::{CloudProvider, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A tracked cloud resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub provider: CloudProvider,
    pub resource_type: ResourceType,
    pub region: String,
    pub name: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub group_ids: BTreeSet<String>,
    #[serde(default)]
    pub specifications: serde_json::Map<String, JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named grouping of resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// Criteria for querying tracked resources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<CloudProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    /// Match a tag by key and exact value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl ResourceQuery {
    pub fn matches(&self, resource: &Resource) -> bool {
        self.provider.is_none_or(|p| resource.provider == p)
            && self
                .resource_type
                .is_none_or(|t| resource.resource_type == t)
            && self
                .region
                .as_ref()
                .is_none_or(|r| &resource.region == r)
            && self
                .name_contains
                .as_ref()
                .is_none_or(|needle| resource.name.contains(needle.as_str()))
            && self
                .tag
                .as_ref()
                .is_none_or(|(key, value)| resource.tags.get(key) == Some(value))
            && self
                .group_id
                .as_ref()
                .is_none_or(|g| resource.group_ids.contains(g))
    }
}

/// Aggregate counts over the tracked inventory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_resources: usize,
    pub by_provider: HashMap<CloudProvider, usize>,
    pub by_type: HashMap<ResourceType, usize>,
    pub by_region: HashMap<String, usize>,
}
