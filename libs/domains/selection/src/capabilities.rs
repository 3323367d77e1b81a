//! Provider capability derivation.
//!
//! Capabilities are assembled from the adapter catalogs (feature and
//! certification sets) plus per-provider attestations (SLA, compliance
//! frameworks) that do not vary by catalog entry.

use std::collections::BTreeSet;
use std::sync::Arc;

use domain_costs::CloudProvider;
use provider_adapters::{AdapterError, CloudAdapter};

use crate::models::{ComplianceFramework, ProviderCapability, ResourceClassRequirements};

/// Published availability SLA, percent.
pub fn availability_sla_pct(provider: CloudProvider) -> f64 {
    match provider {
        CloudProvider::Aws => 99.99,
        CloudProvider::Azure => 99.95,
        CloudProvider::Gcp => 99.95,
    }
}

/// Frameworks the provider attests to platform-wide.
pub fn compliance_frameworks(provider: CloudProvider) -> BTreeSet<ComplianceFramework> {
    use ComplianceFramework::*;
    match provider {
        CloudProvider::Aws => [Hipaa, PciDss, Soc2, Iso27001, Fedramp].into_iter().collect(),
        CloudProvider::Azure => [Hipaa, PciDss, Soc2, Iso27001, Fedramp, Gdpr]
            .into_iter()
            .collect(),
        CloudProvider::Gcp => [Hipaa, Soc2, Iso27001, Gdpr].into_iter().collect(),
    }
}

/// Fetch one provider's capability for a class in a region.
///
/// Features and certifications are the union across the provider's
/// catalog options for that class.
pub async fn fetch_capability(
    adapter: &Arc<dyn CloudAdapter>,
    class: &ResourceClassRequirements,
    region: &str,
) -> Result<ProviderCapability, AdapterError> {
    let provider = adapter.provider();
    let mut features = BTreeSet::new();
    let mut certifications = BTreeSet::new();

    match class {
        ResourceClassRequirements::Compute(_) => {
            for option in adapter.list_instance_types(region).await? {
                features.extend(option.features);
                certifications.extend(option.certifications);
            }
        }
        ResourceClassRequirements::Storage(req) => {
            for option in adapter.list_storage_options(req.storage_type, region).await? {
                features.extend(option.features);
                certifications.extend(option.certifications);
            }
        }
        ResourceClassRequirements::Network(req) => {
            for option in adapter.list_network_options(req.service_type, region).await? {
                features.extend(option.features);
                certifications.extend(option.certifications);
            }
        }
    }

    Ok(ProviderCapability {
        provider,
        region: region.to_string(),
        features,
        certifications,
        compliance_frameworks: compliance_frameworks(provider),
        availability_sla_pct: availability_sla_pct(provider),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sla_table_covers_all_providers() {
        for provider in [CloudProvider::Aws, CloudProvider::Azure, CloudProvider::Gcp] {
            assert!(availability_sla_pct(provider) > 99.0);
            assert!(!compliance_frameworks(provider).is_empty());
        }
    }

    #[test]
    fn test_only_azure_and_gcp_attest_gdpr() {
        assert!(!compliance_frameworks(CloudProvider::Aws).contains(&ComplianceFramework::Gdpr));
        assert!(compliance_frameworks(CloudProvider::Azure).contains(&ComplianceFramework::Gdpr));
        assert!(compliance_frameworks(CloudProvider::Gcp).contains(&ComplianceFramework::Gdpr));
    }
}
