//! Selection engine tests against the fixture-backed adapters.

use std::collections::BTreeSet;
use std::sync::Arc;

use core_config::EngineConfig;
use domain_comparison::{VmRequirements, VmSize};
use domain_costs::CloudProvider;
use domain_selection::{
    ComplianceFramework, ResourceClassRequirements, SelectionEngine, SelectionError,
    SelectionPolicy, SelectionRequirements, SelectionWeights,
};
use provider_adapters::{AdapterFactory, OperatingSystem, PurchaseOption};
use rust_decimal_macros::dec;

fn engine() -> SelectionEngine {
    let registry = Arc::new(AdapterFactory::simulated().build_registry());
    SelectionEngine::new(registry, &EngineConfig::default())
}

fn engine_with(config: EngineConfig) -> SelectionEngine {
    let registry = Arc::new(AdapterFactory::simulated().build_registry());
    SelectionEngine::new(registry, &config)
}

fn compute_requirements(name: &str) -> SelectionRequirements {
    SelectionRequirements {
        name: name.into(),
        regions: BTreeSet::from(["us-east-1".to_string()]),
        min_availability_pct: 99.9,
        required_features: BTreeSet::new(),
        required_certifications: BTreeSet::new(),
        compliance_frameworks: BTreeSet::new(),
        preferred_providers: vec![],
        excluded_providers: BTreeSet::new(),
        max_monthly_budget: None,
        class: ResourceClassRequirements::Compute(VmRequirements {
            region: String::new(),
            size: VmSize {
                vcpus: 2,
                memory_gb: 4.0,
                gpu_count: None,
                local_disk_gb: None,
            },
            operating_system: OperatingSystem::Linux,
            purchase_option: PurchaseOption::OnDemand,
            required_features: BTreeSet::new(),
            required_certifications: BTreeSet::new(),
        }),
    }
}

#[tokio::test]
async fn selects_a_provider_with_scores_in_unit_interval() {
    let outcome = engine()
        .select(&compute_requirements("api-tier"), None)
        .await
        .unwrap();

    let selected = &outcome.selected_option;
    assert!(selected.total_score >= 0.0 && selected.total_score <= 1.0);
    assert_eq!(
        outcome.cost_comparison.len(),
        1 + outcome.alternative_options.len()
    );
    // AWS wins the compute scenario on both cost and performance.
    assert_eq!(selected.provider, CloudProvider::Aws);
    assert_eq!(selected.cost.monthly_cost.amount, dec!(73.00));

    // Alternatives are the rest of the candidate set, ranked.
    assert_eq!(outcome.alternative_options.len(), 2);
    for pair in outcome.alternative_options.windows(2) {
        assert!(pair[0].total_score >= pair[1].total_score);
    }
}

#[tokio::test]
async fn warm_cache_returns_identical_selection() {
    let engine = engine();
    let requirements = compute_requirements("cache-check");

    let first = engine.select(&requirements, None).await.unwrap();
    let second = engine.select(&requirements, None).await.unwrap();

    assert_eq!(
        first.selected_option.provider,
        second.selected_option.provider
    );
    assert_eq!(
        first.selected_option.total_score,
        second.selected_option.total_score
    );
}

#[tokio::test]
async fn budget_floor_rejects_all_candidates_with_min_observed() {
    let mut requirements = compute_requirements("tight-budget");
    requirements.max_monthly_budget = Some(dec!(50));

    let err = engine().select(&requirements, None).await.unwrap_err();
    match err {
        SelectionError::Budget {
            min_observed,
            budget,
        } => {
            assert_eq!(min_observed, dec!(73.00));
            assert_eq!(budget, dec!(50));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn budget_keeps_candidates_below_the_line() {
    let mut requirements = compute_requirements("roomy-budget");
    requirements.max_monthly_budget = Some(dec!(80));

    let outcome = engine().select(&requirements, None).await.unwrap();
    // Only AWS (73.00) fits under 80; Azure (87.60) and GCP (80.30) do not.
    assert_eq!(outcome.selected_option.provider, CloudProvider::Aws);
    assert!(outcome.alternative_options.is_empty());
}

#[tokio::test]
async fn gdpr_requirement_excludes_non_attesting_providers() {
    let mut requirements = compute_requirements("gdpr-workload");
    requirements
        .compliance_frameworks
        .insert(ComplianceFramework::Gdpr);

    let outcome = engine().select(&requirements, None).await.unwrap();
    let candidates: Vec<CloudProvider> = std::iter::once(outcome.selected_option.provider)
        .chain(outcome.alternative_options.iter().map(|o| o.provider))
        .collect();
    assert!(!candidates.contains(&CloudProvider::Aws));
    assert_eq!(candidates.len(), 2);
}

#[tokio::test]
async fn excluded_provider_never_appears() {
    let mut requirements = compute_requirements("no-aws");
    requirements.excluded_providers.insert(CloudProvider::Aws);

    let outcome = engine().select(&requirements, None).await.unwrap();
    assert_ne!(outcome.selected_option.provider, CloudProvider::Aws);
    assert!(outcome
        .alternative_options
        .iter()
        .all(|o| o.provider != CloudProvider::Aws));
}

#[tokio::test]
async fn preference_weighting_can_overturn_cost() {
    let mut requirements = compute_requirements("prefer-gcp");
    requirements.preferred_providers = vec![CloudProvider::Gcp];

    // Stack the ranking heavily on preference.
    let policy = SelectionPolicy {
        weights: Some(SelectionWeights {
            cost: 0.1,
            performance: 0.1,
            compliance: 0.1,
            preference: 0.7,
        }),
        rules: vec![],
    };

    let outcome = engine().select(&requirements, Some(&policy)).await.unwrap();
    assert_eq!(outcome.selected_option.provider, CloudProvider::Gcp);
    assert_eq!(outcome.selected_option.ranking_factors.preference_score, 1.0);
}

#[tokio::test]
async fn invalid_policy_weights_are_rejected() {
    let policy = SelectionPolicy {
        weights: Some(SelectionWeights {
            cost: 0.9,
            performance: 0.9,
            compliance: 0.1,
            preference: 0.1,
        }),
        rules: vec![],
    };
    let err = engine()
        .select(&compute_requirements("bad-policy"), Some(&policy))
        .await
        .unwrap_err();
    assert!(matches!(err, SelectionError::PolicyValidation { .. }));
}

#[tokio::test]
async fn concurrency_cap_rejects_before_starting_work() {
    let mut config = EngineConfig::default();
    config.max_concurrent_evaluations = 0;
    let engine = engine_with(config);

    let err = engine
        .select(&compute_requirements("capped"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SelectionError::Concurrency { limit: 0, .. }));
    assert_eq!(engine.active_evaluation_count(), 0);
}

#[tokio::test]
async fn unknown_region_yields_no_matching_providers() {
    let mut requirements = compute_requirements("nowhere");
    requirements.regions = BTreeSet::from(["atlantis-north-1".to_string()]);

    let err = engine().select(&requirements, None).await.unwrap_err();
    assert!(matches!(err, SelectionError::NoMatchingProviders { .. }));
}
