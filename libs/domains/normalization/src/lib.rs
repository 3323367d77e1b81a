//! Cost normalization and aggregation.
//!
//! Turns heterogeneous provider billing payloads into canonical
//! `NormalizedCostEntry` values and groups them by dotted-path keys for
//! reporting.

pub mod aggregation;
pub mod error;
pub mod mapping;
pub mod models;
pub mod normalizer;

pub use aggregation::CostAggregator;
pub use error::{NormalizationError, NormalizationResult};
pub use mapping::{resource_mapping, ResourceMapping};
pub use models::{
    CostAggregation, CostAllocation, CostBreakdown, NormalizedCostEntry, ResourceMetadata,
    TimeWindow,
};
pub use normalizer::{CostNormalizer, NormalizationMode, NormalizationReport};
