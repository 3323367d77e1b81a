//! Provider selection engine.
//!
//! Merges capability, cost, performance, and compliance signals into a
//! weighted ranking over providers, with policy overrides, a budget
//! floor, a result cache, and a concurrency cap on in-flight
//! evaluations.

pub mod capabilities;
pub mod engine;
pub mod error;
pub mod models;
pub mod scoring;

pub use capabilities::{availability_sla_pct, compliance_frameworks, fetch_capability};
pub use engine::SelectionEngine;
pub use error::{SelectionError, SelectionResult};
pub use models::{
    ComplianceFramework, ComplianceScore, PerformanceScore, ProviderCapability, ProviderCost,
    ProviderOption, RankingFactors, ResourceClassRequirements, SelectionOutcome, SelectionPolicy,
    SelectionRequirements, SelectionRule, SelectionWeights,
};
