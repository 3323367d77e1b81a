//! Requirements extraction from infrastructure-as-code inputs.
//!
//! Alternate entry into the comparison/selection pipeline: Terraform plan
//! JSON and CloudFormation templates are parsed into normalized
//! per-resource requirement blocks.

pub mod cloudformation;
pub mod error;
pub mod models;
pub mod terraform;

pub use cloudformation::CloudFormationParser;
pub use error::{ParseError, ParseResult};
pub use models::{
    ComputeSpec, DatabaseSpec, InfrastructureRequirements, NetworkSpec, ParsedResource,
    ResourceCategory, SourceType, StorageSpec,
};
pub use terraform::TerraformPlanParser;
