//! Recommendation engine.
//!
//! Turns selection output and inventory state into cost-optimization,
//! performance-optimization, placement, and migration recommendations,
//! each stamped with a validity window.

pub mod engine;
pub mod error;
pub mod models;
pub mod ports;

pub use engine::RecommendationEngine;
pub use error::{PortError, RecommendationError, RecommendationResult};
pub use models::{
    CostOptimizationRecommendation, MigrationComplexity, MigrationRecommendation,
    PerformanceOptimizationRecommendation, PlacementRecommendation,
};
pub use ports::{
    CostOptimizerPort, InventoryPort, InventoryResource, MetricsPort, OptimizationOpportunity,
    PerformanceOpportunity, ResourceCostSummary, ResourcePerformance,
};
