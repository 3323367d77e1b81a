//! Catalog records returned by provider adapters.
//!
//! Options carry provider-neutral capability ranges and feature sets; the
//! string discriminators (OS, storage class, service type, ...) are core
//! enumerations that each adapter translates to provider-native values
//! internally.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use domain_costs::{CloudProvider, CostComponent, Money, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strum::{Display, EnumIter, EnumString};

/// Guest operating system for compute pricing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperatingSystem {
    #[default]
    Linux,
    Windows,
}

/// Purchase commitment for compute pricing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseOption {
    #[default]
    OnDemand,
    Reserved,
    Spot,
}

/// Broad storage medium
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageType {
    #[default]
    Object,
    Block,
    File,
}

/// Provider-neutral storage class
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StorageClass {
    #[default]
    Standard,
    Infrequent,
    OneZone,
    Intelligent,
    Archive,
    DeepArchive,
    Premium,
}

/// Replication scope for stored data
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReplicationType {
    /// Locally redundant (single zone)
    #[default]
    Lrs,
    /// Zone redundant (multi-AZ within a region)
    Zrs,
    /// Geo redundant (cross-region)
    Grs,
}

/// Performance tier for block storage
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PerformanceTier {
    #[default]
    GeneralPurpose,
    HighPerformance,
}

/// Network service class
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NetworkServiceType {
    #[default]
    Vpc,
    LoadBalancer,
    Cdn,
    Dns,
    Vpn,
    Transit,
    Waf,
    Ddos,
    Nat,
}

/// Load balancer flavor
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LoadBalancerType {
    #[default]
    Application,
    Network,
    Gateway,
}

/// DNS zone visibility
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DnsType {
    #[default]
    Public,
    Private,
}

/// VPN topology
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VpnType {
    #[default]
    SiteToSite,
    PointToSite,
}

/// Transit topology
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransitType {
    #[default]
    HubSpoke,
    Mesh,
}

/// NAT flavor
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NatType {
    #[default]
    Gateway,
    Instance,
}

/// Unit a catalog price is quoted in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PricingUnit {
    #[default]
    Hour,
    Month,
    GbMonth,
    MillionRequests,
    Unit,
}

/// A virtual machine offering in one (provider, region).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmInstanceType {
    pub provider: CloudProvider,
    pub instance_type: String,
    pub region: String,
    pub vcpus: u32,
    pub memory_gb: f64,
    pub gpu_count: u32,
    pub local_disk_gb: u64,
    pub features: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
}

/// A storage offering in one (provider, region, storage type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageOption {
    pub provider: CloudProvider,
    pub storage_type: StorageType,
    pub storage_class: StorageClass,
    pub replication_type: ReplicationType,
    pub performance_tier: Option<PerformanceTier>,
    pub region: String,
    pub min_capacity_gb: u64,
    pub max_capacity_gb: Option<u64>,
    pub min_iops: Option<u32>,
    pub max_iops: Option<u32>,
    pub min_throughput_mbps: Option<u32>,
    pub max_throughput_mbps: Option<u32>,
    pub features: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
}

/// A network service offering in one (provider, region, service type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkOption {
    pub provider: CloudProvider,
    pub service_type: NetworkServiceType,
    pub region: String,
    pub min_bandwidth_gbps: f64,
    pub max_bandwidth_gbps: Option<f64>,
    pub min_requests_per_second: Option<u64>,
    pub max_requests_per_second: Option<u64>,
    pub features: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
    pub high_availability: bool,
    pub cross_region: bool,
    pub load_balancer_type: Option<LoadBalancerType>,
    pub dns_type: Option<DnsType>,
    pub vpn_type: Option<VpnType>,
    pub transit_type: Option<TransitType>,
    pub nat_type: Option<NatType>,
}

impl NetworkOption {
    /// Human-readable name used for deterministic tie-breaking.
    pub fn display_name(&self) -> String {
        let discriminator = self
            .load_balancer_type
            .map(|t| t.to_string())
            .or_else(|| self.dns_type.map(|t| t.to_string()))
            .or_else(|| self.vpn_type.map(|t| t.to_string()))
            .or_else(|| self.transit_type.map(|t| t.to_string()))
            .or_else(|| self.nat_type.map(|t| t.to_string()));

        match discriminator {
            Some(d) => format!("{}-{}", self.service_type, d),
            None => self.service_type.to_string(),
        }
    }
}

/// Parameters for a network cost query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCostQuery {
    pub service_type: NetworkServiceType,
    pub region: String,
    pub bandwidth_gbps: f64,
    pub data_transfer_gb: Option<u64>,
    pub requests_per_second: Option<u64>,
    pub high_availability: bool,
    pub cross_region: bool,
    pub load_balancer_type: Option<LoadBalancerType>,
    pub dns_type: Option<DnsType>,
    pub vpn_type: Option<VpnType>,
    pub transit_type: Option<TransitType>,
    pub nat_type: Option<NatType>,
}

/// Result of a network cost query: total plus its additive components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCostQuote {
    pub monthly_cost: Money,
    pub components: Vec<CostComponent>,
}

/// One raw catalog price record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingData {
    pub provider: CloudProvider,
    pub sku: String,
    pub service_name: String,
    pub resource_type: ResourceType,
    pub region: String,
    pub unit_price: Money,
    pub pricing_unit: PricingUnit,
    pub description: String,
    pub attributes: HashMap<String, String>,
    pub effective_date: DateTime<Utc>,
}

/// A deployed resource as reported by a provider's inventory surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfiguration {
    pub id: String,
    pub provider: CloudProvider,
    pub name: String,
    pub resource_type: ResourceType,
    pub region: String,
    pub specifications: serde_json::Map<String, JsonValue>,
    pub tags: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time utilization metrics for a deployed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub resource_id: String,
    pub cpu_utilization_pct: f64,
    pub memory_utilization_pct: f64,
    pub network_in_gb: f64,
    pub network_out_gb: f64,
    pub collected_at: DateTime<Utc>,
}

/// Current cost attribution for a deployed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub resource_id: String,
    pub monthly_cost: Money,
    pub components: Vec<CostComponent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_option_display_name_includes_discriminator() {
        let option = NetworkOption {
            provider: CloudProvider::Aws,
            service_type: NetworkServiceType::LoadBalancer,
            region: "us-east-1".into(),
            min_bandwidth_gbps: 1.0,
            max_bandwidth_gbps: None,
            min_requests_per_second: Some(1),
            max_requests_per_second: None,
            features: BTreeSet::new(),
            certifications: BTreeSet::new(),
            high_availability: true,
            cross_region: false,
            load_balancer_type: Some(LoadBalancerType::Application),
            dns_type: None,
            vpn_type: None,
            transit_type: None,
            nat_type: None,
        };
        assert_eq!(option.display_name(), "load_balancer-application");
    }

    #[test]
    fn test_service_type_strings() {
        assert_eq!(NetworkServiceType::LoadBalancer.to_string(), "load_balancer");
        assert_eq!(
            "vpn".parse::<NetworkServiceType>().unwrap(),
            NetworkServiceType::Vpn
        );
    }
}
