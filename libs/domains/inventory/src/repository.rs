use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{Resource, ResourceGroup};

/// Repository trait for inventory persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn insert(&self, resource: Resource) -> InventoryResult<()>;

    async fn get(&self, id: &str) -> InventoryResult<Option<Resource>>;

    async fn update(&self, resource: Resource) -> InventoryResult<()>;

    async fn delete(&self, id: &str) -> InventoryResult<()>;

    async fn list(&self) -> InventoryResult<Vec<Resource>>;

    async fn insert_group(&self, group: ResourceGroup) -> InventoryResult<()>;

    async fn get_group(&self, id: &str) -> InventoryResult<Option<ResourceGroup>>;

    async fn update_group(&self, group: ResourceGroup) -> InventoryResult<()>;
}

#[derive(Default)]
struct Store {
    resources: HashMap<String, Resource>,
    groups: HashMap<String, ResourceGroup>,
}

/// In-memory repository with multi-reader/single-writer discipline.
#[derive(Default)]
pub struct InMemoryInventoryRepository {
    store: RwLock<Store>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn insert(&self, resource: Resource) -> InventoryResult<()> {
        let mut store = self.store.write().await;
        if store.resources.contains_key(&resource.id) {
            return Err(InventoryError::AlreadyExists(resource.id));
        }
        store.resources.insert(resource.id.clone(), resource);
        Ok(())
    }

    async fn get(&self, id: &str) -> InventoryResult<Option<Resource>> {
        Ok(self.store.read().await.resources.get(id).cloned())
    }

    async fn update(&self, resource: Resource) -> InventoryResult<()> {
        let mut store = self.store.write().await;
        if !store.resources.contains_key(&resource.id) {
            return Err(InventoryError::NotFound(resource.id));
        }
        store.resources.insert(resource.id.clone(), resource);
        Ok(())
    }

    async fn delete(&self, id: &str) -> InventoryResult<()> {
        let mut store = self.store.write().await;
        if store.resources.remove(id).is_none() {
            return Err(InventoryError::NotFound(id.to_string()));
        }
        for group in store.groups.values_mut() {
            group.member_ids.remove(id);
        }
        Ok(())
    }

    async fn list(&self) -> InventoryResult<Vec<Resource>> {
        Ok(self.store.read().await.resources.values().cloned().collect())
    }

    async fn insert_group(&self, group: ResourceGroup) -> InventoryResult<()> {
        let mut store = self.store.write().await;
        if store.groups.contains_key(&group.id) {
            return Err(InventoryError::AlreadyExists(group.id));
        }
        store.groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, id: &str) -> InventoryResult<Option<ResourceGroup>> {
        Ok(self.store.read().await.groups.get(id).cloned())
    }

    async fn update_group(&self, group: ResourceGroup) -> InventoryResult<()> {
        let mut store = self.store.write().await;
        if !store.groups.contains_key(&group.id) {
            return Err(InventoryError::GroupNotFound(group.id));
        }
        store.groups.insert(group.id.clone(), group);
        Ok(())
    }
}
