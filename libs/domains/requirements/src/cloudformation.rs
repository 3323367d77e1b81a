//! CloudFormation template parser.
//!
//! Accepts JSON or YAML templates. Short-form intrinsic functions
//! (`!Ref`, `!GetAtt`) only appear in YAML and are not YAML-standard;
//! templates using them should be converted to long form first.

use domain_costs::CloudProvider;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::models::{
    ComputeSpec, DatabaseSpec, InfrastructureRequirements, NetworkSpec, ParsedResource,
    ResourceCategory, SourceType, StorageSpec,
};

/// Parser for CloudFormation templates.
pub struct CloudFormationParser;

impl CloudFormationParser {
    /// Parse a JSON template.
    pub fn parse_json(input: &str) -> ParseResult<InfrastructureRequirements> {
        let document: JsonValue = serde_json::from_str(input)?;
        Self::from_document(document)
    }

    /// Parse a YAML template.
    pub fn parse_yaml(input: &str) -> ParseResult<InfrastructureRequirements> {
        let document: JsonValue = serde_yaml::from_str(input)?;
        Self::from_document(document)
    }

    fn from_document(document: JsonValue) -> ParseResult<InfrastructureRequirements> {
        let entries = document
            .get("Resources")
            .and_then(|v| v.as_object())
            .ok_or_else(|| {
                ParseError::UnexpectedShape(
                    "missing Resources section; is this a CloudFormation template?".to_string(),
                )
            })?;

        let mut resources = Vec::new();
        let mut warnings = Vec::new();

        for (name, body) in entries {
            let Some(resource_type) = body.get("Type").and_then(|v| v.as_str()) else {
                warnings.push(format!("resource '{name}' has no Type"));
                continue;
            };
            match parse_resource(name, resource_type, body) {
                Some(resource) => resources.push(resource),
                None => warnings.push(format!(
                    "unsupported resource type '{resource_type}' for '{name}'"
                )),
            }
        }

        debug!(
            resources = resources.len(),
            warnings = warnings.len(),
            "Parsed CloudFormation template"
        );
        Ok(InfrastructureRequirements {
            source: SourceType::CloudFormation,
            resources,
            warnings,
        })
    }
}

fn str_prop(properties: &JsonValue, key: &str) -> Option<String> {
    properties
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn u64_prop(properties: &JsonValue, key: &str) -> Option<u64> {
    let value = properties.get(key)?;
    // CloudFormation numbers are often written as strings.
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn bool_prop(properties: &JsonValue, key: &str) -> Option<bool> {
    let value = properties.get(key)?;
    value
        .as_bool()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn parse_resource(name: &str, resource_type: &str, body: &JsonValue) -> Option<ParsedResource> {
    let properties = body.get("Properties").cloned().unwrap_or(JsonValue::Null);
    let depends_on = match body.get("DependsOn") {
        Some(JsonValue::String(single)) => vec![single.clone()],
        Some(JsonValue::Array(many)) => many
            .iter()
            .filter_map(|d| d.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    let mut resource = ParsedResource {
        name: name.to_string(),
        source_type: resource_type.to_string(),
        category: ResourceCategory::Compute,
        provider_hint: Some(CloudProvider::Aws),
        region: str_prop(&properties, "AvailabilityZone"),
        compute: None,
        storage: None,
        network: None,
        database: None,
        depends_on,
    };

    match resource_type {
        "AWS::EC2::Instance" => {
            resource.category = ResourceCategory::Compute;
            resource.compute = Some(ComputeSpec {
                instance_type: str_prop(&properties, "InstanceType"),
                vcpus: None,
                memory_gb: None,
                count: 1,
            });
        }
        "AWS::EC2::Volume" => {
            resource.category = ResourceCategory::Storage;
            resource.storage = Some(StorageSpec {
                capacity_gb: u64_prop(&properties, "Size"),
                storage_class: str_prop(&properties, "VolumeType"),
                encrypted: bool_prop(&properties, "Encrypted"),
            });
        }
        "AWS::S3::Bucket" => {
            resource.category = ResourceCategory::Storage;
            resource.storage = Some(StorageSpec {
                capacity_gb: None,
                storage_class: None,
                encrypted: None,
            });
        }
        "AWS::RDS::DBInstance" => {
            resource.category = ResourceCategory::Database;
            resource.database = Some(DatabaseSpec {
                engine: str_prop(&properties, "Engine"),
                instance_class: str_prop(&properties, "DBInstanceClass"),
                allocated_storage_gb: u64_prop(&properties, "AllocatedStorage"),
                multi_az: bool_prop(&properties, "MultiAZ"),
            });
        }
        "AWS::ElasticLoadBalancingV2::LoadBalancer" => {
            resource.category = ResourceCategory::Network;
            resource.network = Some(NetworkSpec {
                service: Some("load_balancer".to_string()),
                cidr_block: None,
                internet_facing: str_prop(&properties, "Scheme")
                    .map(|scheme| scheme == "internet-facing"),
            });
        }
        "AWS::EC2::VPC" => {
            resource.category = ResourceCategory::Network;
            resource.network = Some(NetworkSpec {
                service: Some("vpc".to_string()),
                cidr_block: str_prop(&properties, "CidrBlock"),
                internet_facing: None,
            });
        }
        "AWS::EC2::NatGateway" => {
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

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_TEMPLATE: &str = r#"{
        "AWSTemplateFormatVersion": "2010-09-09",
        "Resources": {
            "ApiServer": {
                "Type": "AWS::EC2::Instance",
                "Properties": {"InstanceType": "t3.medium", "AvailabilityZone": "us-east-1a"}
            },
            "DataVolume": {
                "Type": "AWS::EC2::Volume",
                "Properties": {"Size": "500", "VolumeType": "gp3", "Encrypted": "true"},
                "DependsOn": "ApiServer"
            },
            "MetricsTopic": {
                "Type": "AWS::SNS::Topic"
            }
        }
    }"#;

    const YAML_TEMPLATE: &str = r#"
AWSTemplateFormatVersion: "2010-09-09"
Resources:
  OrdersDb:
    Type: AWS::RDS::DBInstance
    Properties:
      Engine: postgres
      DBInstanceClass: db.m5.large
      AllocatedStorage: 200
      MultiAZ: true
  PublicLb:
    Type: AWS::ElasticLoadBalancingV2::LoadBalancer
    Properties:
      Scheme: internet-facing
    DependsOn:
      - OrdersDb
"#;

    #[test]
    fn test_parses_json_template() {
        let requirements = CloudFormationParser::parse_json(JSON_TEMPLATE).unwrap();
        assert_eq!(requirements.source, SourceType::CloudFormation);
        assert_eq!(requirements.resources.len(), 2);

        let api = requirements.resource_by_name("ApiServer").unwrap();
        assert_eq!(
            api.compute.as_ref().unwrap().instance_type.as_deref(),
            Some("t3.medium")
        );

        // Stringly-typed numbers and booleans still parse.
        let volume = requirements.resource_by_name("DataVolume").unwrap();
        assert_eq!(volume.storage.as_ref().unwrap().capacity_gb, Some(500));
        assert_eq!(volume.storage.as_ref().unwrap().encrypted, Some(true));
        assert_eq!(volume.depends_on, vec!["ApiServer".to_string()]);

        assert_eq!(requirements.warnings.len(), 1);
        assert!(requirements.warnings[0].contains("AWS::SNS::Topic"));
    }

    #[test]
    fn test_parses_yaml_template() {
        let requirements = CloudFormationParser::parse_yaml(YAML_TEMPLATE).unwrap();
        assert_eq!(requirements.resources.len(), 2);

        let db = requirements.resource_by_name("OrdersDb").unwrap();
        assert_eq!(db.category, ResourceCategory::Database);
        assert_eq!(
            db.database.as_ref().unwrap().allocated_storage_gb,
            Some(200)
        );

        let lb = requirements.resource_by_name("PublicLb").unwrap();
        assert_eq!(lb.network.as_ref().unwrap().internet_facing, Some(true));
        assert_eq!(lb.depends_on, vec!["OrdersDb".to_string()]);
    }

    #[test]
    fn test_template_without_resources_is_rejected() {
        let err = CloudFormationParser::parse_json(r#"{"Parameters": {}}"#).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedShape(_)));
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let err = CloudFormationParser::parse_yaml(":\n  - not valid").unwrap_err();
        assert!(matches!(err, ParseError::Yaml(_)));
    }
}
