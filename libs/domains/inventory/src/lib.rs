//! Resource inventory.
//!
//! Tracks deployed resources with tagging and grouping, behind a
//! repository trait with an in-memory implementation.

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{InventoryError, InventoryResult};
pub use models::{InventorySummary, Resource, ResourceGroup, ResourceQuery};
pub use repository::{InMemoryInventoryRepository, InventoryRepository};
pub use service::InventoryService;
