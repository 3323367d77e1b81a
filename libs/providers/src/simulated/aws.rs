//! AWS fixture catalog.
//!
//! Deterministic offline stand-in for the AWS catalog and pricing
//! surfaces. Rates are USD; instances the end-to-end scenarios depend on
//! keep their pinned prices.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use domain_costs::{CloudProvider, CostComponent, Currency, Money, PricingTier, ResourceType};
use rust_decimal::Decimal;
use serde_json::json;

use crate::catalog::{
    DnsType, LoadBalancerType, NatType, NetworkOption, NetworkServiceType, PerformanceTier,
    ReplicationType, ResourceConfiguration, ResourceCost, ResourceMetrics, StorageClass,
    StorageOption, StorageType, TransitType, VmInstanceType, VpnType,
};

use super::{
    BaseCharge, NetworkFixture, ProviderFixtures, ResourceFixture, StorageFixture, VmFixture,
};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn certifications() -> BTreeSet<String> {
    set(&["iso-27001", "soc2", "hipaa", "pci-dss"])
}

fn vm(
    instance_type: &str,
    vcpus: u32,
    memory_gb: f64,
    gpu_count: u32,
    local_disk_gb: u64,
    hourly_usd: Decimal,
) -> VmFixture {
    let mut features = set(&["ebs-optimized", "enhanced-networking", "nitro"]);
    if gpu_count > 0 {
        features.insert("gpu".to_string());
    }
    if local_disk_gb > 0 {
        features.insert("local-nvme".to_string());
    }
    VmFixture {
        spec: VmInstanceType {
            provider: CloudProvider::Aws,
            instance_type: instance_type.to_string(),
            region: String::new(),
            vcpus,
            memory_gb,
            gpu_count,
            local_disk_gb,
            features,
            certifications: certifications(),
        },
        hourly_usd,
    }
}

#[allow(clippy::too_many_arguments)]
fn storage(
    storage_type: StorageType,
    storage_class: StorageClass,
    replication_type: ReplicationType,
    performance_tier: Option<PerformanceTier>,
    capacity_bounds: (u64, Option<u64>),
    iops_bounds: Option<(u32, u32)>,
    throughput_bounds: Option<(u32, u32)>,
    features: &[&str],
    capacity_tiers: Vec<PricingTier>,
    free_iops: u32,
    iops_rate: Decimal,
    free_throughput_mbps: u32,
    throughput_rate: Decimal,
) -> StorageFixture {
    StorageFixture {
        spec: StorageOption {
            provider: CloudProvider::Aws,
            storage_type,
            storage_class,
            replication_type,
            performance_tier,
            region: String::new(),
            min_capacity_gb: capacity_bounds.0,
            max_capacity_gb: capacity_bounds.1,
            min_iops: iops_bounds.map(|(min, _)| min),
            max_iops: iops_bounds.map(|(_, max)| max),
            min_throughput_mbps: throughput_bounds.map(|(min, _)| min),
            max_throughput_mbps: throughput_bounds.map(|(_, max)| max),
            features: set(features),
            certifications: certifications(),
        },
        capacity_tiers,
        free_iops,
        iops_rate,
        free_throughput_mbps,
        throughput_rate,
    }
}

fn flat(rate: Decimal) -> Vec<PricingTier> {
    vec![PricingTier::new(Decimal::ZERO, None, rate)]
}

fn network(
    service_type: NetworkServiceType,
    features: &[&str],
    high_availability: bool,
    cross_region: bool,
    base: BaseCharge,
) -> NetworkFixture {
    NetworkFixture {
        spec: NetworkOption {
            provider: CloudProvider::Aws,
            service_type,
            region: String::new(),
            min_bandwidth_gbps: 0.1,
            max_bandwidth_gbps: None,
            min_requests_per_second: Some(1),
            max_requests_per_second: None,
            features: set(features),
            certifications: certifications(),
            high_availability,
            cross_region,
            load_balancer_type: None,
            dns_type: None,
            vpn_type: None,
            transit_type: None,
            nat_type: None,
        },
        base,
    }
}

pub fn fixtures() -> ProviderFixtures {
    let vms = vec![
        vm("t3.micro", 2, 1.0, 0, 0, Decimal::new(104, 4)),
        vm("t3.small", 2, 2.0, 0, 0, Decimal::new(208, 4)),
        vm("t3.medium", 2, 4.0, 0, 0, Decimal::new(10, 2)),
        vm("t3.large", 2, 8.0, 0, 0, Decimal::new(1664, 4)),
        vm("m5.large", 2, 8.0, 0, 0, Decimal::new(112, 3)),
        vm("m5.xlarge", 4, 16.0, 0, 0, Decimal::new(192, 3)),
        vm("m5d.large", 2, 8.0, 0, 75, Decimal::new(113, 3)),
        vm("c5.xlarge", 4, 8.0, 0, 0, Decimal::new(17, 2)),
        vm("r5.large", 2, 16.0, 0, 0, Decimal::new(126, 3)),
        vm("p3.2xlarge", 8, 61.0, 1, 0, Decimal::new(306, 2)),
    ];

    let object_features = &["versioning", "encryption", "lifecycle-policies", "replication"][..];
    let storage_fixtures = vec![
        storage(
            StorageType::Object,
            StorageClass::Standard,
            ReplicationType::Zrs,
            None,
            (0, None),
            None,
            None,
            object_features,
            vec![
                PricingTier::new(Decimal::ZERO, Some(Decimal::from(51_200u32)), Decimal::new(23, 3)),
                PricingTier::new(
                    Decimal::from(51_200u32),
                    Some(Decimal::from(512_000u32)),
                    Decimal::new(22, 3),
                ),
                PricingTier::new(Decimal::from(512_000u32), None, Decimal::new(21, 3)),
            ],
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::Object,
            StorageClass::Infrequent,
            ReplicationType::Zrs,
            None,
            (0, None),
            None,
            None,
            object_features,
            flat(Decimal::new(125, 4)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::Object,
            StorageClass::OneZone,
            ReplicationType::Lrs,
            None,
            (0, None),
            None,
            None,
            object_features,
            flat(Decimal::new(10, 3)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::Object,
            StorageClass::Intelligent,
            ReplicationType::Zrs,
            None,
            (0, None),
            None,
            None,
            &["versioning", "encryption", "auto-tiering"],
            flat(Decimal::new(23, 3)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::Object,
            StorageClass::Archive,
            ReplicationType::Zrs,
            None,
            (0, None),
            None,
            None,
            &["encryption", "retrieval-tiers"],
            flat(Decimal::new(4, 3)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::Object,
            StorageClass::DeepArchive,
            ReplicationType::Zrs,
            None,
            (0, None),
            None,
            None,
            &["encryption", "retrieval-tiers"],
            flat(Decimal::new(99, 5)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        // gp3
        storage(
            StorageType::Block,
            StorageClass::Standard,
            ReplicationType::Lrs,
            Some(PerformanceTier::GeneralPurpose),
            (1, Some(16_384)),
            Some((3_000, 16_000)),
            Some((125, 1_000)),
            &["encryption", "snapshots", "elastic-volumes"],
            flat(Decimal::new(8, 2)),
            3_000,
            Decimal::new(5, 3),
            125,
            Decimal::new(4, 2),
        ),
        // io2
        storage(
            StorageType::Block,
            StorageClass::Premium,
            ReplicationType::Lrs,
            Some(PerformanceTier::HighPerformance),
            (4, Some(16_384)),
            Some((100, 64_000)),
            Some((125, 4_000)),
            &["encryption", "snapshots", "multi-attach"],
            flat(Decimal::new(125, 3)),
            0,
            Decimal::new(65, 3),
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::File,
            StorageClass::Standard,
            ReplicationType::Zrs,
            None,
            (0, None),
            None,
            None,
            &["encryption", "posix", "lifecycle-policies"],
            flat(Decimal::new(30, 2)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::File,
            StorageClass::OneZone,
            ReplicationType::Lrs,
            None,
            (0, None),
            None,
            None,
            &["encryption", "posix"],
            flat(Decimal::new(16, 2)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
    ];

    let mut lb_app = network(
        NetworkServiceType::LoadBalancer,
        &["ssl-termination", "path-routing", "health-checks", "websockets", "http2"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(1643, 2)),
    );
    lb_app.spec.load_balancer_type = Some(LoadBalancerType::Application);

    let mut lb_net = network(
        NetworkServiceType::LoadBalancer,
        &["tcp-udp", "tls-termination", "preserve-source-ip", "static-ip", "cross-zone"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(1643, 2)),
    );
    lb_net.spec.load_balancer_type = Some(LoadBalancerType::Network);

    let mut lb_gw = network(
        NetworkServiceType::LoadBalancer,
        &["third-party-appliances", "preserve-source-ip", "health-checks"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(1825, 2)),
    );
    lb_gw.spec.load_balancer_type = Some(LoadBalancerType::Gateway);

    let mut dns_public = network(
        NetworkServiceType::Dns,
        &["health-checks", "dnssec", "geo-routing", "latency-routing", "failover-routing"],
        true,
        true,
        BaseCharge::Monthly(Decimal::new(50, 2)),
    );
    dns_public.spec.dns_type = Some(DnsType::Public);

    let mut dns_private = network(
        NetworkServiceType::Dns,
        &["health-checks", "private-zones"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(50, 2)),
    );
    dns_private.spec.dns_type = Some(DnsType::Private);

    let mut vpn = network(
        NetworkServiceType::Vpn,
        &["ipsec", "bgp", "route-propagation", "accelerated"],
        true,
        true,
        BaseCharge::Hourly(Decimal::new(5, 2)),
    );
    vpn.spec.vpn_type = Some(VpnType::SiteToSite);
    vpn.spec.min_bandwidth_gbps = 0.5;
    vpn.spec.max_bandwidth_gbps = Some(1.25);

    let mut transit = network(
        NetworkServiceType::Transit,
        &["vpc-attachments", "vpn-attachments", "peering", "route-tables"],
        true,
        true,
        BaseCharge::Hourly(Decimal::new(5, 2)),
    );
    transit.spec.transit_type = Some(TransitType::HubSpoke);
    transit.spec.max_bandwidth_gbps = Some(50.0);

    let mut nat = network(
        NetworkServiceType::Nat,
        &["elastic-ip", "flow-logs", "cross-zone-failover"],
        true,
        false,
        BaseCharge::Hourly(Decimal::new(45, 3)),
    );
    nat.spec.nat_type = Some(NatType::Gateway);
    nat.spec.max_bandwidth_gbps = Some(45.0);

    let network_fixtures = vec![
        network(
            NetworkServiceType::Vpc,
            &["flow-logs", "endpoints", "peering", "ipv6", "security-groups"],
            true,
            true,
            BaseCharge::Monthly(Decimal::ZERO),
        ),
        lb_app,
        lb_net,
        lb_gw,
        network(
            NetworkServiceType::Cdn,
            &["ssl", "waf-integration", "origin-shield", "real-time-logs"],
            true,
            true,
            BaseCharge::Monthly(Decimal::ZERO),
        ),
        dns_public,
        dns_private,
        vpn,
        transit,
        nat,
        network(
            NetworkServiceType::Waf,
            &["ip-blocking", "rate-limiting", "geo-blocking", "managed-rules"],
            true,
            true,
            BaseCharge::Monthly(Decimal::new(500, 2)),
        ),
        network(
            NetworkServiceType::Ddos,
            &["layer3-protection", "layer4-protection", "layer7-protection"],
            true,
            true,
            BaseCharge::Monthly(Decimal::from(3_000u32)),
        ),
    ];

    let transfer_tiers = vec![
        PricingTier::new(Decimal::ZERO, Some(Decimal::from(1_024u32)), Decimal::new(9, 2)),
        PricingTier::new(
            Decimal::from(1_024u32),
            Some(Decimal::from(10_240u32)),
            Decimal::new(85, 3),
        ),
        PricingTier::new(Decimal::from(10_240u32), None, Decimal::new(7, 2)),
    ];

    let request_prices = HashMap::from([
        (NetworkServiceType::LoadBalancer, Decimal::new(25, 3)),
        (NetworkServiceType::Cdn, Decimal::new(1, 2)),
        (NetworkServiceType::Dns, Decimal::new(40, 2)),
        (NetworkServiceType::Waf, Decimal::new(60, 2)),
    ]);

    let resources = vec![
        ResourceFixture {
            configuration: ResourceConfiguration {
                id: "i-0a1b2c3d4e5f6a7b8".to_string(),
                provider: CloudProvider::Aws,
                name: "api-server-1".to_string(),
                resource_type: ResourceType::Compute,
                region: "us-east-1".to_string(),
                specifications: serde_json::Map::from_iter([
                    ("instance_type".to_string(), json!("m5.xlarge")),
                    ("vcpus".to_string(), json!(4)),
                    ("memory_gb".to_string(), json!(16)),
                ]),
                tags: HashMap::from([
                    ("environment".to_string(), "production".to_string()),
                    ("team".to_string(), "platform".to_string()),
                ]),
                created_at: Utc::now(),
            },
            metrics: ResourceMetrics {
                resource_id: "i-0a1b2c3d4e5f6a7b8".to_string(),
                cpu_utilization_pct: 11.5,
                memory_utilization_pct: 34.0,
                network_in_gb: 120.0,
                network_out_gb: 340.0,
                collected_at: Utc::now(),
            },
            cost: ResourceCost {
                resource_id: "i-0a1b2c3d4e5f6a7b8".to_string(),
                monthly_cost: Money::new(Decimal::new(14016, 2), Currency::Usd),
                components: vec![CostComponent::monthly(
                    "Compute",
                    Money::new(Decimal::new(14016, 2), Currency::Usd),
                )],
            },
        },
        ResourceFixture {
            configuration: ResourceConfiguration {
                id: "vol-0f1e2d3c4b5a69788".to_string(),
                provider: CloudProvider::Aws,
                name: "api-server-1-data".to_string(),
                resource_type: ResourceType::Storage,
                region: "us-east-1".to_string(),
                specifications: serde_json::Map::from_iter([
                    ("volume_type".to_string(), json!("gp3")),
                    ("capacity_gb".to_string(), json!(500)),
                ]),
                tags: HashMap::from([("environment".to_string(), "production".to_string())]),
                created_at: Utc::now(),
            },
            metrics: ResourceMetrics {
                resource_id: "vol-0f1e2d3c4b5a69788".to_string(),
                cpu_utilization_pct: 0.0,
                memory_utilization_pct: 0.0,
                network_in_gb: 0.0,
                network_out_gb: 0.0,
                collected_at: Utc::now(),
            },
            cost: ResourceCost {
                resource_id: "vol-0f1e2d3c4b5a69788".to_string(),
                monthly_cost: Money::new(Decimal::new(40, 0), Currency::Usd),
                components: vec![CostComponent::monthly(
                    "Storage",
                    Money::new(Decimal::new(40, 0), Currency::Usd),
                )],
            },
        },
    ];

    ProviderFixtures {
        provider: CloudProvider::Aws,
        regions: vec![
            "us-east-1".to_string(),
            "us-west-2".to_string(),
            "eu-west-1".to_string(),
        ],
        vms,
        storage: storage_fixtures,
        network: network_fixtures,
        transfer_tiers,
        request_prices,
        resources,
    }
}
