//! Azure fixture catalog.

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
    set(&["iso-27001", "soc2", "hipaa", "fedramp"])
}

fn vm(
    instance_type: &str,
    vcpus: u32,
    memory_gb: f64,
    gpu_count: u32,
    local_disk_gb: u64,
    hourly_usd: Decimal,
) -> VmFixture {
    let mut features = set(&["premium-storage", "accelerated-networking", "availability-sets"]);
    if gpu_count > 0 {
        features.insert("gpu".to_string());
    }
    if local_disk_gb > 0 {
        features.insert("local-temp-disk".to_string());
    }
    VmFixture {
        spec: VmInstanceType {
            provider: CloudProvider::Azure,
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

fn flat(rate: Decimal) -> Vec<PricingTier> {
    vec![PricingTier::new(Decimal::ZERO, None, rate)]
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
            provider: CloudProvider::Azure,
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

fn network(
    service_type: NetworkServiceType,
    features: &[&str],
    high_availability: bool,
    cross_region: bool,
    base: BaseCharge,
) -> NetworkFixture {
    NetworkFixture {
        spec: NetworkOption {
            provider: CloudProvider::Azure,
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
        vm("Standard_B1s", 1, 1.0, 0, 0, Decimal::new(104, 4)),
        vm("Standard_B2s", 2, 4.0, 0, 0, Decimal::new(12, 2)),
        vm("Standard_D2s_v3", 2, 8.0, 0, 0, Decimal::new(13, 2)),
        vm("Standard_D4s_v3", 4, 16.0, 0, 0, Decimal::new(192, 3)),
        vm("Standard_D2ads_v5", 2, 8.0, 0, 75, Decimal::new(131, 3)),
        vm("Standard_F4s_v2", 4, 8.0, 0, 0, Decimal::new(169, 3)),
        vm("Standard_E2s_v3", 2, 16.0, 0, 0, Decimal::new(126, 3)),
        vm("Standard_NC6", 6, 56.0, 1, 340, Decimal::new(90, 2)),
    ];

    let blob_features = &["versioning", "encryption", "soft-delete", "immutable-storage"][..];
    let storage_fixtures = vec![
        storage(
            StorageType::Object,
            StorageClass::Standard,
            ReplicationType::Lrs,
            None,
            (0, None),
            None,
            None,
            blob_features,
            vec![
                PricingTier::new(Decimal::ZERO, Some(Decimal::from(51_200u32)), Decimal::new(184, 4)),
                PricingTier::new(
                    Decimal::from(51_200u32),
                    Some(Decimal::from(512_000u32)),
                    Decimal::new(177, 4),
                ),
                PricingTier::new(Decimal::from(512_000u32), None, Decimal::new(17, 3)),
            ],
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::Object,
            StorageClass::Standard,
            ReplicationType::Grs,
            None,
            (0, None),
            None,
            None,
            blob_features,
            flat(Decimal::new(368, 4)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::Object,
            StorageClass::Infrequent,
            ReplicationType::Lrs,
            None,
            (0, None),
            None,
            None,
            blob_features,
            flat(Decimal::new(10, 3)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::Object,
            StorageClass::Archive,
            ReplicationType::Lrs,
            None,
            (0, None),
            None,
            None,
            &["encryption", "rehydration-tiers"],
            flat(Decimal::new(99, 5)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        // Standard SSD managed disk
        storage(
            StorageType::Block,
            StorageClass::Standard,
            ReplicationType::Lrs,
            Some(PerformanceTier::GeneralPurpose),
            (1, Some(32_767)),
            Some((500, 6_000)),
            Some((60, 750)),
            &["encryption", "snapshots", "disk-bursting"],
            flat(Decimal::new(75, 3)),
            500,
            Decimal::new(6, 3),
            60,
            Decimal::new(42, 3),
        ),
        // Premium SSD managed disk
        storage(
            StorageType::Block,
            StorageClass::Premium,
            ReplicationType::Lrs,
            Some(PerformanceTier::HighPerformance),
            (4, Some(32_767)),
            Some((1_200, 20_000)),
            Some((125, 900)),
            &["encryption", "snapshots", "shared-disks"],
            flat(Decimal::new(135, 3)),
            1_200,
            Decimal::new(55, 3),
            125,
            Decimal::new(4, 2),
        ),
        storage(
            StorageType::File,
            StorageClass::Standard,
            ReplicationType::Zrs,
            None,
            (0, Some(102_400)),
            None,
            None,
            &["encryption", "smb", "snapshots"],
            flat(Decimal::new(16, 2)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        storage(
            StorageType::File,
            StorageClass::Premium,
            ReplicationType::Lrs,
            None,
            (100, Some(102_400)),
            None,
            None,
            &["encryption", "smb", "nfs"],
            flat(Decimal::new(24, 2)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
    ];

    let mut lb_app = network(
        NetworkServiceType::LoadBalancer,
        &["ssl-termination", "url-routing", "health-probes", "websockets", "autoscaling"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(1825, 2)),
    );
    lb_app.spec.load_balancer_type = Some(LoadBalancerType::Application);

    let mut lb_net = network(
        NetworkServiceType::LoadBalancer,
        &["tcp-udp", "ha-ports", "cross-zone", "outbound-rules"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(1825, 2)),
    );
    lb_net.spec.load_balancer_type = Some(LoadBalancerType::Network);

    let mut lb_gw = network(
        NetworkServiceType::LoadBalancer,
        &["third-party-appliances", "chaining"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(1314, 2)),
    );
    lb_gw.spec.load_balancer_type = Some(LoadBalancerType::Gateway);

    let mut dns_public = network(
        NetworkServiceType::Dns,
        &["alias-records", "dnssec", "traffic-manager-integration"],
        true,
        true,
        BaseCharge::Monthly(Decimal::new(50, 2)),
    );
    dns_public.spec.dns_type = Some(DnsType::Public);

    let mut dns_private = network(
        NetworkServiceType::Dns,
        &["private-zones", "auto-registration"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(50, 2)),
    );
    dns_private.spec.dns_type = Some(DnsType::Private);

    let mut vpn = network(
        NetworkServiceType::Vpn,
        &["ipsec", "bgp", "active-active", "point-to-site"],
        true,
        true,
        BaseCharge::Hourly(Decimal::new(4, 2)),
    );
    vpn.spec.vpn_type = Some(VpnType::SiteToSite);
    vpn.spec.min_bandwidth_gbps = 0.5;
    vpn.spec.max_bandwidth_gbps = Some(1.25);

    let mut vpn_p2s = network(
        NetworkServiceType::Vpn,
        &["openvpn", "certificate-auth", "entra-auth"],
        true,
        false,
        BaseCharge::Hourly(Decimal::new(3, 2)),
    );
    vpn_p2s.spec.vpn_type = Some(VpnType::PointToSite);

    let mut transit = network(
        NetworkServiceType::Transit,
        &["vnet-peering", "branch-connectivity", "route-tables"],
        true,
        true,
        BaseCharge::Hourly(Decimal::new(65, 3)),
    );
    transit.spec.transit_type = Some(TransitType::HubSpoke);

    let mut nat = network(
        NetworkServiceType::Nat,
        &["static-egress-ip", "metrics"],
        true,
        false,
        BaseCharge::Hourly(Decimal::new(45, 3)),
    );
    nat.spec.nat_type = Some(NatType::Gateway);

    let network_fixtures = vec![
        network(
            NetworkServiceType::Vpc,
            &["flow-logs", "service-endpoints", "peering", "ipv6", "nsg"],
            true,
            true,
            BaseCharge::Monthly(Decimal::ZERO),
        ),
        lb_app,
        lb_net,
        lb_gw,
        network(
            NetworkServiceType::Cdn,
            &["ssl", "rules-engine", "compression", "geo-filtering"],
            true,
            true,
            BaseCharge::Monthly(Decimal::ZERO),
        ),
        dns_public,
        dns_private,
        vpn,
        vpn_p2s,
        transit,
        nat,
        network(
            NetworkServiceType::Waf,
            &["ip-blocking", "rate-limiting", "managed-rules", "bot-protection"],
            true,
            true,
            BaseCharge::Monthly(Decimal::new(500, 2)),
        ),
        network(
            NetworkServiceType::Ddos,
            &["layer3-protection", "layer4-protection", "adaptive-tuning"],
            true,
            true,
            BaseCharge::Monthly(Decimal::from(2_944u32)),
        ),
    ];

    let transfer_tiers = vec![
        PricingTier::new(Decimal::ZERO, Some(Decimal::from(1_024u32)), Decimal::new(87, 3)),
        PricingTier::new(
            Decimal::from(1_024u32),
            Some(Decimal::from(10_240u32)),
            Decimal::new(83, 3),
        ),
        PricingTier::new(Decimal::from(10_240u32), None, Decimal::new(5, 2)),
    ];

    let request_prices = HashMap::from([
        (NetworkServiceType::LoadBalancer, Decimal::new(25, 3)),
        (NetworkServiceType::Cdn, Decimal::new(9, 3)),
        (NetworkServiceType::Dns, Decimal::new(40, 2)),
        (NetworkServiceType::Waf, Decimal::new(72, 2)),
    ]);

    let resources = vec![ResourceFixture {
        configuration: ResourceConfiguration {
            id: "/subscriptions/000/resourceGroups/prod/providers/Microsoft.Compute/virtualMachines/worker-1".to_string(),
            provider: CloudProvider::Azure,
            name: "worker-1".to_string(),
            resource_type: ResourceType::Compute,
            region: "eastus".to_string(),
            specifications: serde_json::Map::from_iter([
                ("size".to_string(), json!("Standard_D4s_v3")),
                ("vcpus".to_string(), json!(4)),
                ("memory_gb".to_string(), json!(16)),
            ]),
            tags: HashMap::from([("environment".to_string(), "production".to_string())]),
            created_at: Utc::now(),
        },
        metrics: ResourceMetrics {
            resource_id: "/subscriptions/000/resourceGroups/prod/providers/Microsoft.Compute/virtualMachines/worker-1".to_string(),
            cpu_utilization_pct: 58.0,
            memory_utilization_pct: 71.0,
            network_in_gb: 85.0,
            network_out_gb: 110.0,
            collected_at: Utc::now(),
        },
        cost: ResourceCost {
            resource_id: "/subscriptions/000/resourceGroups/prod/providers/Microsoft.Compute/virtualMachines/worker-1".to_string(),
            monthly_cost: Money::new(Decimal::new(14016, 2), Currency::Usd),
            components: vec![CostComponent::monthly(
                "Compute",
                Money::new(Decimal::new(14016, 2), Currency::Usd),
            )],
        },
    }];

    ProviderFixtures {
        provider: CloudProvider::Azure,
        regions: vec![
            "eastus".to_string(),
            "westus2".to_string(),
            "westeurope".to_string(),
        ],
        vms,
        storage: storage_fixtures,
        network: network_fixtures,
        transfer_tiers,
        request_prices,
        resources,
    }
}
