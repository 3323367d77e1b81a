//! Inventory service: business rules over the repository.

use std::collections::HashMap;

use chrono::Utc;
use domain_costs::ResourceType;
use tracing::info;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{InventorySummary, Resource, ResourceGroup, ResourceQuery};
use crate::repository::InventoryRepository;

const MAX_TAG_KEY_LEN: usize = 128;
const MAX_TAG_VALUE_LEN: usize = 256;

/// Service for tracking deployed resources and their grouping/tagging.
pub struct InventoryService<R: InventoryRepository> {
    repository: R,
}

impl<R: InventoryRepository> InventoryService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Register a newly discovered resource.
    pub async fn register(&self, resource: Resource) -> InventoryResult<Resource> {
        if resource.id.is_empty() {
            return Err(InventoryError::Validation {
                field: "id".into(),
                message: "resource id must not be empty".into(),
            });
        }
        for (key, value) in &resource.tags {
            validate_tag(key, value)?;
        }
        self.repository.insert(resource.clone()).await?;
        info!(resource_id = %resource.id, provider = %resource.provider, "Registered resource");
        Ok(resource)
    }

    /// List resources, optionally narrowed by type and region.
    pub async fn list_resources(
        &self,
        resource_type: Option<ResourceType>,
        region: Option<&str>,
    ) -> InventoryResult<Vec<Resource>> {
        let query = ResourceQuery {
            resource_type,
            region: region.map(str::to_string),
            ..Default::default()
        };
        self.query_resources(&query).await
    }

    pub async fn get_resource(&self, id: &str) -> InventoryResult<Resource> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    pub async fn update_resource(&self, mut resource: Resource) -> InventoryResult<Resource> {
        resource.updated_at = Utc::now();
        self.repository.update(resource.clone()).await?;
        Ok(resource)
    }

    pub async fn delete_resource(&self, id: &str) -> InventoryResult<()> {
        self.repository.delete(id).await?;
        info!(resource_id = id, "Deleted resource");
        Ok(())
    }

    /// Merge tags into a resource after validating each pair.
    pub async fn tag_resource(
        &self,
        id: &str,
        tags: HashMap<String, String>,
    ) -> InventoryResult<Resource> {
        for (key, value) in &tags {
            validate_tag(key, value)?;
        }
        let mut resource = self.get_resource(id).await?;
        resource.tags.extend(tags);
        resource.updated_at = Utc::now();
        self.repository.update(resource.clone()).await?;
        Ok(resource)
    }

    pub async fn create_group(&self, group: ResourceGroup) -> InventoryResult<ResourceGroup> {
        if group.id.is_empty() {
            return Err(InventoryError::Validation {
                field: "id".into(),
                message: "group id must not be empty".into(),
            });
        }
        self.repository.insert_group(group.clone()).await?;
        Ok(group)
    }

    /// Add a resource to a group, updating both sides of the membership.
    pub async fn add_to_group(&self, group_id: &str, resource_id: &str) -> InventoryResult<()> {
        let mut group = self
            .repository
            .get_group(group_id)
            .await?
            .ok_or_else(|| InventoryError::GroupNotFound(group_id.to_string()))?;
        let mut resource = self.get_resource(resource_id).await?;

        group.member_ids.insert(resource_id.to_string());
        resource.group_ids.insert(group_id.to_string());
        resource.updated_at = Utc::now();

        self.repository.update_group(group).await?;
        self.repository.update(resource).await?;
        Ok(())
    }

    pub async fn query_resources(&self, query: &ResourceQuery) -> InventoryResult<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .repository
            .list()
            .await?
            .into_iter()
            .filter(|r| query.matches(r))
            .collect();
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(resources)
    }

    /// Aggregate counts by provider, type, and region.
    pub async fn summary(&self) -> InventoryResult<InventorySummary> {
        let resources = self.repository.list().await?;
        let mut summary = InventorySummary {
            total_resources: resources.len(),
            ..Default::default()
        };
        for resource in &resources {
            *summary.by_provider.entry(resource.provider).or_insert(0) += 1;
            *summary.by_type.entry(resource.resource_type).or_insert(0) += 1;
            *summary
                .by_region
                .entry(resource.region.clone())
                .or_insert(0) += 1;
        }
        Ok(summary)
    }
}

fn validate_tag(key: &str, value: &str) -> InventoryResult<()> {
    if key.is_empty() || key.len() > MAX_TAG_KEY_LEN {
        return Err(InventoryError::InvalidTag {
            key: key.to_string(),
            message: format!("key length must be within 1..={MAX_TAG_KEY_LEN}"),
        });
    }
    if key.chars().any(char::is_whitespace) {
        return Err(InventoryError::InvalidTag {
            key: key.to_string(),
            message: "key must not contain whitespace".to_string(),
        });
    }
    if value.len() > MAX_TAG_VALUE_LEN {
        return Err(InventoryError::InvalidTag {
            key: key.to_string(),
            message: format!("value length must be at most {MAX_TAG_VALUE_LEN}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryInventoryRepository;
    use domain_costs::CloudProvider;
    use std::collections::BTreeSet;

    fn resource(id: &str, provider: CloudProvider, region: &str) -> Resource {
        Resource {
            id: id.into(),
            provider,
            resource_type: ResourceType::Compute,
            region: region.into(),
            name: format!("{id}-name"),
            tags: HashMap::new(),
            group_ids: BTreeSet::new(),
            specifications: serde_json::Map::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service() -> InventoryService<InMemoryInventoryRepository> {
        InventoryService::new(InMemoryInventoryRepository::new())
    }

    #[tokio::test]
    async fn test_register_and_list_with_filters() {
        let service = service();
        service
            .register(resource("i-1", CloudProvider::Aws, "us-east-1"))
            .await
            .unwrap();
        service
            .register(resource("i-2", CloudProvider::Gcp, "us-central1"))
            .await
            .unwrap();

        let all = service.list_resources(None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let east = service
            .list_resources(Some(ResourceType::Compute), Some("us-east-1"))
            .await
            .unwrap();
        assert_eq!(east.len(), 1);
        assert_eq!(east[0].id, "i-1");
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let service = service();
        service
            .register(resource("i-1", CloudProvider::Aws, "us-east-1"))
            .await
            .unwrap();
        let err = service
            .register(resource("i-1", CloudProvider::Aws, "us-east-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_tagging_merges_and_validates() {
        let service = service();
        service
            .register(resource("i-1", CloudProvider::Aws, "us-east-1"))
            .await
            .unwrap();

        let tagged = service
            .tag_resource(
                "i-1",
                HashMap::from([("environment".to_string(), "production".to_string())]),
            )
            .await
            .unwrap();
        assert_eq!(
            tagged.tags.get("environment").map(String::as_str),
            Some("production")
        );

        let err = service
            .tag_resource(
                "i-1",
                HashMap::from([("bad key".to_string(), "value".to_string())]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidTag { .. }));
    }

    #[tokio::test]
    async fn test_group_membership_is_bidirectional() {
        let service = service();
        service
            .register(resource("i-1", CloudProvider::Aws, "us-east-1"))
            .await
            .unwrap();
        service
            .create_group(ResourceGroup {
                id: "g-1".into(),
                name: "frontend".into(),
                description: None,
                member_ids: BTreeSet::new(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        service.add_to_group("g-1", "i-1").await.unwrap();

        let by_group = service
            .query_resources(&ResourceQuery {
                group_id: Some("g-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_group.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_group_membership() {
        let service = service();
        service
            .register(resource("i-1", CloudProvider::Aws, "us-east-1"))
            .await
            .unwrap();
        service
            .create_group(ResourceGroup {
                id: "g-1".into(),
                name: "frontend".into(),
                description: None,
                member_ids: BTreeSet::new(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        service.add_to_group("g-1", "i-1").await.unwrap();

        service.delete_resource("i-1").await.unwrap();
        assert!(matches!(
            service.get_resource("i-1").await.unwrap_err(),
            InventoryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let service = service();
        service
            .register(resource("i-1", CloudProvider::Aws, "us-east-1"))
            .await
            .unwrap();
        service
            .register(resource("i-2", CloudProvider::Aws, "eu-west-1"))
            .await
            .unwrap();

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.total_resources, 2);
        assert_eq!(summary.by_provider[&CloudProvider::Aws], 2);
        assert_eq!(summary.by_region["us-east-1"], 1);
    }
}
