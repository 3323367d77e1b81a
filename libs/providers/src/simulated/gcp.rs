//! GCP fixture catalog.

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
    set(&["iso-27001", "soc2", "hipaa"])
}

fn vm(
    instance_type: &str,
    vcpus: u32,
    memory_gb: f64,
    gpu_count: u32,
    local_disk_gb: u64,
    hourly_usd: Decimal,
) -> VmFixture {
    let mut features = set(&["live-migration", "custom-machine-types", "sole-tenancy"]);
    if gpu_count > 0 {
        features.insert("gpu".to_string());
    }
    if local_disk_gb > 0 {
        features.insert("local-ssd".to_string());
    }
    VmFixture {
        spec: VmInstanceType {
            provider: CloudProvider::Gcp,
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
            provider: CloudProvider::Gcp,
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
            provider: CloudProvider::Gcp,
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
        vm("e2-micro", 2, 1.0, 0, 0, Decimal::new(84, 4)),
        vm("e2-small", 2, 2.0, 0, 0, Decimal::new(168, 4)),
        vm("n1-standard-2", 2, 7.5, 0, 0, Decimal::new(11, 2)),
        vm("n2-standard-2", 2, 8.0, 0, 0, Decimal::new(118, 3)),
        vm("n2-standard-4", 4, 16.0, 0, 0, Decimal::new(194, 3)),
        vm("c2-standard-4", 4, 16.0, 0, 0, Decimal::new(208, 3)),
        vm("n2-highmem-2", 2, 16.0, 0, 0, Decimal::new(13, 2)),
        vm("c3-standard-4-lssd", 4, 16.0, 0, 375, Decimal::new(23, 2)),
        vm("a2-highgpu-1g", 12, 85.0, 1, 0, Decimal::new(367, 2)),
    ];

    let gcs_features = &["versioning", "encryption", "lifecycle-policies", "uniform-access"][..];
    let storage_fixtures = vec![
        storage(
            StorageType::Object,
            StorageClass::Standard,
            ReplicationType::Zrs,
            None,
            (0, None),
            None,
            None,
            gcs_features,
            vec![
                PricingTier::new(Decimal::ZERO, Some(Decimal::from(51_200u32)), Decimal::new(20, 3)),
                PricingTier::new(
                    Decimal::from(51_200u32),
                    Some(Decimal::from(512_000u32)),
                    Decimal::new(19, 3),
                ),
                PricingTier::new(Decimal::from(512_000u32), None, Decimal::new(18, 3)),
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
            gcs_features,
            flat(Decimal::new(26, 3)),
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
            gcs_features,
            flat(Decimal::new(10, 3)),
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
            &["encryption", "instant-retrieval"],
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
            &["encryption", "instant-retrieval"],
            flat(Decimal::new(12, 4)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
        // pd-balanced
        storage(
            StorageType::Block,
            StorageClass::Standard,
            ReplicationType::Lrs,
            Some(PerformanceTier::GeneralPurpose),
            (10, Some(65_536)),
            Some((3_000, 15_000)),
            Some((140, 1_200)),
            &["encryption", "snapshots", "regional-disks"],
            flat(Decimal::new(10, 2)),
            3_000,
            Decimal::new(4, 3),
            140,
            Decimal::new(4, 2),
        ),
        // pd-ssd
        storage(
            StorageType::Block,
            StorageClass::Premium,
            ReplicationType::Lrs,
            Some(PerformanceTier::HighPerformance),
            (10, Some(65_536)),
            Some((6_000, 100_000)),
            Some((240, 1_200)),
            &["encryption", "snapshots", "regional-disks"],
            flat(Decimal::new(17, 2)),
            6_000,
            Decimal::new(48, 3),
            240,
            Decimal::ZERO,
        ),
        storage(
            StorageType::File,
            StorageClass::Standard,
            ReplicationType::Lrs,
            None,
            (1_024, Some(65_536)),
            None,
            None,
            &["encryption", "nfs", "snapshots"],
            flat(Decimal::new(20, 2)),
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
            (2_560, Some(65_536)),
            None,
            None,
            &["encryption", "nfs", "snapshots"],
            flat(Decimal::new(30, 2)),
            0,
            Decimal::ZERO,
            0,
            Decimal::ZERO,
        ),
    ];

    let mut lb_app = network(
        NetworkServiceType::LoadBalancer,
        &["ssl-termination", "url-maps", "cdn-integration", "global-anycast"],
        true,
        true,
        BaseCharge::Monthly(Decimal::new(1827, 2)),
    );
    lb_app.spec.load_balancer_type = Some(LoadBalancerType::Application);

    let mut lb_net = network(
        NetworkServiceType::LoadBalancer,
        &["tcp-udp", "preserve-source-ip", "regional"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(1827, 2)),
    );
    lb_net.spec.load_balancer_type = Some(LoadBalancerType::Network);

    let mut dns_public = network(
        NetworkServiceType::Dns,
        &["dnssec", "geo-routing", "anycast"],
        true,
        true,
        BaseCharge::Monthly(Decimal::new(20, 2)),
    );
    dns_public.spec.dns_type = Some(DnsType::Public);

    let mut dns_private = network(
        NetworkServiceType::Dns,
        &["private-zones", "forwarding"],
        true,
        false,
        BaseCharge::Monthly(Decimal::new(20, 2)),
    );
    dns_private.spec.dns_type = Some(DnsType::Private);

    let mut vpn = network(
        NetworkServiceType::Vpn,
        &["ipsec", "bgp", "ha-vpn"],
        true,
        true,
        BaseCharge::Hourly(Decimal::new(5, 2)),
    );
    vpn.spec.vpn_type = Some(VpnType::SiteToSite);
    vpn.spec.min_bandwidth_gbps = 0.5;
    vpn.spec.max_bandwidth_gbps = Some(3.0);

    let mut transit = network(
        NetworkServiceType::Transit,
        &["vpc-spokes", "hybrid-spokes", "mesh"],
        true,
        true,
        BaseCharge::Hourly(Decimal::new(10, 2)),
    );
    transit.spec.transit_type = Some(TransitType::Mesh);

    let mut nat = network(
        NetworkServiceType::Nat,
        &["auto-ip-allocation", "logging"],
        true,
        false,
        BaseCharge::Hourly(Decimal::new(44, 3)),
    );
    nat.spec.nat_type = Some(NatType::Gateway);

    let network_fixtures = vec![
        network(
            NetworkServiceType::Vpc,
            &["flow-logs", "shared-vpc", "peering", "ipv6", "firewall-rules"],
            true,
            true,
            BaseCharge::Monthly(Decimal::ZERO),
        ),
        lb_app,
        lb_net,
        network(
            NetworkServiceType::Cdn,
            &["ssl", "cache-modes", "signed-urls", "negative-caching"],
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
            &["ip-blocking", "rate-limiting", "preconfigured-rules", "adaptive-protection"],
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
        PricingTier::new(Decimal::ZERO, Some(Decimal::from(1_024u32)), Decimal::new(12, 2)),
        PricingTier::new(
            Decimal::from(1_024u32),
            Some(Decimal::from(10_240u32)),
            Decimal::new(11, 2),
        ),
        PricingTier::new(Decimal::from(10_240u32), None, Decimal::new(8, 2)),
    ];

    let request_prices = HashMap::from([
        (NetworkServiceType::LoadBalancer, Decimal::new(3, 2)),
        (NetworkServiceType::Cdn, Decimal::new(75, 4)),
        (NetworkServiceType::Dns, Decimal::new(40, 2)),
        (NetworkServiceType::Waf, Decimal::new(75, 2)),
    ]);

    let resources = vec![ResourceFixture {
        configuration: ResourceConfiguration {
            id: "projects/demo/zones/us-central1-a/instances/batch-runner".to_string(),
            provider: CloudProvider::Gcp,
            name: "batch-runner".to_string(),
            resource_type: ResourceType::Compute,
            region: "us-central1".to_string(),
            specifications: serde_json::Map::from_iter([
                ("machine_type".to_string(), json!("n2-standard-4")),
                ("vcpus".to_string(), json!(4)),
                ("memory_gb".to_string(), json!(16)),
            ]),
            tags: HashMap::from([("environment".to_string(), "staging".to_string())]),
            created_at: Utc::now(),
        },
        metrics: ResourceMetrics {
            resource_id: "projects/demo/zones/us-central1-a/instances/batch-runner".to_string(),
            cpu_utilization_pct: 7.0,
            memory_utilization_pct: 22.0,
            network_in_gb: 12.0,
            network_out_gb: 30.0,
            collected_at: Utc::now(),
        },
        cost: ResourceCost {
            resource_id: "projects/demo/zones/us-central1-a/instances/batch-runner".to_string(),
            monthly_cost: Money::new(Decimal::new(14162, 2), Currency::Usd),
            components: vec![CostComponent::monthly(
                "Compute",
                Money::new(Decimal::new(14162, 2), Currency::Usd),
            )],
        },
    }];

    ProviderFixtures {
        provider: CloudProvider::Gcp,
        regions: vec![
            "us-central1".to_string(),
            "us-east1".to_string(),
            "europe-west1".to_string(),
        ],
        vms,
        storage: storage_fixtures,
        network: network_fixtures,
        transfer_tiers,
        request_prices,
        resources,
    }
}
