//! Provider-specific to canonical resource type mappings.
//!
//! Tables are built once at startup and immutable for the engine's
//! lifetime. An unmapped `(provider, provider_type)` pair is a hard error
//! that lists the mappings that do exist.

use std::collections::HashMap;

use domain_costs::{CloudProvider, ResourceType};
use once_cell::sync::Lazy;

use crate::error::{NormalizationError, NormalizationResult};

/// How one provider service name maps into the canonical model.
#[derive(Debug, Clone)]
pub struct ResourceMapping {
    pub provider: CloudProvider,
    pub provider_type: &'static str,
    pub normalized_type: ResourceType,
    /// `source field -> dotted path` projection rules into `specifications`
    pub metadata_mapping: &'static [(&'static str, &'static str)],
}

static MAPPINGS: Lazy<HashMap<CloudProvider, Vec<ResourceMapping>>> = Lazy::new(|| {
    let mut tables = HashMap::new();

    tables.insert(
        CloudProvider::Aws,
        vec![
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Amazon Elastic Compute Cloud",
                normalized_type: ResourceType::Compute,
                metadata_mapping: &[
                    ("instanceType", "instance_type"),
                    ("operatingSystem", "os"),
                ],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Amazon Simple Storage Service",
                normalized_type: ResourceType::Storage,
                metadata_mapping: &[("storageClass", "storage_class")],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Amazon Relational Database Service",
                normalized_type: ResourceType::Database,
                metadata_mapping: &[("engine", "engine"), ("instanceType", "instance_type")],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Amazon Virtual Private Cloud",
                normalized_type: ResourceType::Network,
                metadata_mapping: &[],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Elastic Load Balancing",
                normalized_type: ResourceType::LoadBalancer,
                metadata_mapping: &[("loadBalancerType", "load_balancer.type")],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Amazon ElastiCache",
                normalized_type: ResourceType::Cache,
                metadata_mapping: &[("engine", "engine"), ("instanceType", "instance_type")],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "AWS Lambda",
                normalized_type: ResourceType::Serverless,
                metadata_mapping: &[("memorySize", "memory_mb")],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Amazon Simple Queue Service",
                normalized_type: ResourceType::Queue,
                metadata_mapping: &[],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Amazon CloudFront",
                normalized_type: ResourceType::Cdn,
                metadata_mapping: &[],
            },
            ResourceMapping {
                provider: CloudProvider::Aws,
                provider_type: "Amazon Route 53",
                normalized_type: ResourceType::Dns,
                metadata_mapping: &[],
            },
        ],
    );

    tables.insert(
        CloudProvider::Azure,
        vec![
            ResourceMapping {
                provider: CloudProvider::Azure,
                provider_type: "Microsoft.Compute",
                normalized_type: ResourceType::Compute,
                metadata_mapping: &[("size", "instance_type"), ("os", "os")],
            },
            ResourceMapping {
                provider: CloudProvider::Azure,
                provider_type: "Microsoft.Storage",
                normalized_type: ResourceType::Storage,
                metadata_mapping: &[("tier", "storage_class")],
            },
            ResourceMapping {
                provider: CloudProvider::Azure,
                provider_type: "Microsoft.Sql",
                normalized_type: ResourceType::Database,
                metadata_mapping: &[("tier", "tier")],
            },
            ResourceMapping {
                provider: CloudProvider::Azure,
                provider_type: "Microsoft.Network",
                normalized_type: ResourceType::Network,
                metadata_mapping: &[],
            },
            ResourceMapping {
                provider: CloudProvider::Azure,
                provider_type: "Microsoft.Cache",
                normalized_type: ResourceType::Cache,
                metadata_mapping: &[("size", "instance_type")],
            },
            ResourceMapping {
                provider: CloudProvider::Azure,
                provider_type: "Microsoft.Web",
                normalized_type: ResourceType::Serverless,
                metadata_mapping: &[],
            },
            ResourceMapping {
                provider: CloudProvider::Azure,
                provider_type: "Microsoft.Cdn",
                normalized_type: ResourceType::Cdn,
                metadata_mapping: &[],
            },
        ],
    );

    tables.insert(
        CloudProvider::Gcp,
        vec![
            ResourceMapping {
                provider: CloudProvider::Gcp,
                provider_type: "Compute Engine",
                normalized_type: ResourceType::Compute,
                metadata_mapping: &[("machine_type", "instance_type"), ("os", "os")],
            },
            ResourceMapping {
                provider: CloudProvider::Gcp,
                provider_type: "Cloud Storage",
                normalized_type: ResourceType::Storage,
                metadata_mapping: &[("storage_class", "storage_class")],
            },
            ResourceMapping {
                provider: CloudProvider::Gcp,
                provider_type: "Cloud SQL",
                normalized_type: ResourceType::Database,
                metadata_mapping: &[("database_version", "engine"), ("tier", "instance_type")],
            },
            ResourceMapping {
                provider: CloudProvider::Gcp,
                provider_type: "Cloud Load Balancing",
                normalized_type: ResourceType::LoadBalancer,
                metadata_mapping: &[],
            },
            ResourceMapping {
                provider: CloudProvider::Gcp,
                provider_type: "Cloud Functions",
                normalized_type: ResourceType::Serverless,
                metadata_mapping: &[("memory_mb", "memory_mb")],
            },
            ResourceMapping {
                provider: CloudProvider::Gcp,
                provider_type: "Cloud CDN",
                normalized_type: ResourceType::Cdn,
                metadata_mapping: &[],
            },
            ResourceMapping {
                provider: CloudProvider::Gcp,
                provider_type: "Cloud DNS",
                normalized_type: ResourceType::Dns,
                metadata_mapping: &[],
            },
        ],
    );

    tables
});

/// Look up the mapping for a provider-specific resource type.
pub fn resource_mapping(
    provider: CloudProvider,
    provider_type: &str,
) -> NormalizationResult<&'static ResourceMapping> {
    let mappings = MAPPINGS.get(&provider).map(Vec::as_slice).unwrap_or(&[]);
    mappings
        .iter()
        .find(|m| m.provider_type == provider_type)
        .ok_or_else(|| NormalizationError::ResourceMapping {
            provider: provider.to_string(),
            provider_type: provider_type.to_string(),
            available_mappings: mappings.iter().map(|m| m.provider_type.to_string()).collect(),
        })
}
