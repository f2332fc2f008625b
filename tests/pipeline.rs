//! End-to-end scoring and matching through the engine.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use dealscope::application::services::{
    EngineConfig, EntityStatus, FallbackSignalProvider, MatchRequest, PipelineConfig,
    ScoringEngine, ScoringRequest,
};
use dealscope::domain::entities::{
    BusinessEntity, BusinessEntityBuilder, BuyBoxCriteria, EntitySignals, PriceRange,
};
use dealscope::domain::value_objects::{
    ConcentrationLabel, MetricDomain, RiskLevel, ScoringIntent, Timestamp,
};
use dealscope::infrastructure::providers::{SeededSignalProvider, StaticSignalProvider};
use rust_decimal::Decimal;
use std::sync::Arc;

fn as_of() -> Timestamp {
    Timestamp::from_secs(1_717_200_000).unwrap()
}

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

fn seeded_engine() -> ScoringEngine {
    ScoringEngine::with_defaults(Arc::new(SeededSignalProvider::new(2024))).unwrap()
}

fn portfolio(n: usize) -> Vec<BusinessEntity> {
    let industries = ["HVAC", "Plumbing", "Security", "Landscaping", "Dental"];
    (0..n)
        .map(|i| {
            BusinessEntityBuilder::new(
                format!("biz-{i:03}"),
                industries[i % industries.len()],
                dec(500_000 + 250_000 * i as i64),
            )
            .region(if i % 2 == 0 { "Austin" } else { "Dallas" })
            .owner_age(40 + (i as u32 * 7) % 35)
            .years_in_business(3 + (i as u32 * 5) % 30)
            .build()
        })
        .collect()
}

#[tokio::test]
async fn every_metric_respects_its_domain() {
    let report = seeded_engine()
        .score_batch(ScoringRequest::new(portfolio(40)).as_of(as_of()))
        .await
        .unwrap();

    assert_eq!(report.scored_count, 40);
    for row in &report.entities {
        let metrics = row.metrics.as_ref().unwrap();
        for metric in [
            &metrics.fs_ms,
            &metrics.hhi_local,
            &metrics.sri,
            &metrics.mros,
            &metrics.aas,
            &metrics.pcvs,
        ] {
            assert!(metric.is_consistent_with(MetricDomain::UNIT), "{metric}");
            assert_eq!(metric.timestamp(), as_of());
        }
        assert!(metrics.d2.is_consistent_with(MetricDomain::COMPLEXITY));
        assert!(metrics.lambda1.is_consistent_with(MetricDomain::NON_NEGATIVE));

        let valuation = row.valuation.as_ref().unwrap();
        assert!(valuation.ev_low <= valuation.ev_high);
        assert!(valuation.ev_low >= valuation.ebitda * Decimal::TWO);
        assert!(valuation.seller_propensity <= 100);
    }
}

#[tokio::test]
async fn ranking_is_sorted_by_intent_score() {
    let engine = seeded_engine();
    for intent in [
        ScoringIntent::Rollup,
        ScoringIntent::Acquisition,
        ScoringIntent::Portfolio,
    ] {
        let report = engine
            .score_batch(
                ScoringRequest::new(portfolio(25))
                    .with_intent(intent)
                    .as_of(as_of()),
            )
            .await
            .unwrap();

        let scores: Vec<f64> = report
            .ranking
            .iter()
            .map(|id| {
                let row = report.entities.iter().find(|r| &r.entity_id == id).unwrap();
                row.metrics.as_ref().unwrap().composite(intent).value()
            })
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{intent}: {scores:?}");
    }
}

#[tokio::test]
async fn seeded_reports_are_idempotent() {
    let request = ScoringRequest::new(portfolio(30)).as_of(as_of());
    let small_pool = ScoringEngine::new(
        Arc::new(SeededSignalProvider::new(2024)),
        EngineConfig {
            pipeline: PipelineConfig::default().with_max_concurrency(1),
            ..Default::default()
        },
    )
    .unwrap();

    let first = seeded_engine().score_batch(request.clone()).await.unwrap();
    let second = small_pool.score_batch(request).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn security_example_through_pipeline() {
    let entity = BusinessEntityBuilder::new("sec-1", "Security", dec(6_000_000))
        .ebitda(dec(1_000_000))
        .risk_factor("succession")
        .build();
    let provider = StaticSignalProvider::new().with_default(EntitySignals::default());
    let engine = ScoringEngine::with_defaults(Arc::new(provider)).unwrap();

    let report = engine
        .score_batch(ScoringRequest::new(vec![entity]).as_of(as_of()))
        .await
        .unwrap();
    let valuation = report.entities[0].valuation.as_ref().unwrap();

    assert_eq!(valuation.ev_low, dec(2_500_000));
    assert_eq!(valuation.ev_high, dec(5_500_000));
    assert_eq!(valuation.risk_level, RiskLevel::Medium);
}

#[tokio::test]
async fn equal_revenues_give_equal_share_hhi() {
    let entities: Vec<_> = (0..5)
        .map(|i| BusinessEntityBuilder::new(format!("e-{i}"), "HVAC", dec(1_000_000)).build())
        .collect();
    let report = seeded_engine()
        .score_batch(ScoringRequest::new(entities).as_of(as_of()))
        .await
        .unwrap();

    let market = &report.market_metrics;
    assert_eq!(market.entity_count, 5);
    assert_eq!(market.total_revenue, dec(5_000_000));
    assert!((market.hhi - 0.2).abs() < 1e-12);
    assert!((market.fragmentation_index - 0.8).abs() < 1e-12);
    assert_eq!(market.concentration, ConcentrationLabel::Moderate);
}

#[tokio::test]
async fn missing_fixture_fails_only_that_entity() {
    let provider = StaticSignalProvider::new().with_fixture("known", EntitySignals::default());
    let engine = ScoringEngine::with_defaults(Arc::new(provider)).unwrap();

    let report = engine
        .score_batch(
            ScoringRequest::new(vec![
                BusinessEntityBuilder::new("known", "HVAC", dec(1_000_000)).build(),
                BusinessEntityBuilder::new("unknown", "HVAC", dec(9_000_000)).build(),
            ])
            .as_of(as_of()),
        )
        .await
        .unwrap();

    assert_eq!(report.entities[0].status, EntityStatus::Scored);
    assert_eq!(report.entities[1].status, EntityStatus::Failed);
    assert!(report.entities[1].error.as_ref().unwrap().contains("unknown"));
    assert_eq!(report.market_metrics.total_revenue, dec(1_000_000));
}

#[tokio::test]
async fn fallback_chain_fills_gaps() {
    let fixtures = StaticSignalProvider::new().with_fixture("known", EntitySignals::default());
    let provider = FallbackSignalProvider::new(vec![
        Arc::new(fixtures),
        Arc::new(SeededSignalProvider::new(1)),
    ]);
    let engine = ScoringEngine::with_defaults(Arc::new(provider)).unwrap();

    let report = engine
        .score_batch(
            ScoringRequest::new(vec![
                BusinessEntityBuilder::new("known", "HVAC", dec(1_000_000)).build(),
                BusinessEntityBuilder::new("unknown", "HVAC", dec(9_000_000)).build(),
            ])
            .as_of(as_of()),
        )
        .await
        .unwrap();
    assert_eq!(report.failed_count, 0);
}

#[tokio::test]
async fn buy_box_screening() {
    let entities = vec![
        BusinessEntityBuilder::new("hvac-big", "HVAC", dec(5_000_000))
            .ebitda(dec(900_000))
            .recurring_revenue(true)
            .seller_financing(true)
            .build(),
        BusinessEntityBuilder::new("hvac-small", "HVAC", dec(800_000))
            .recurring_revenue(true)
            .build(),
        BusinessEntityBuilder::new("hvac-partial", "HVAC", dec(3_000_000))
            .ebitda(dec(600_000))
            .recurring_revenue(true)
            .build(),
        BusinessEntityBuilder::new("dental", "Dental", dec(4_000_000)).build(),
    ];
    let criteria = BuyBoxCriteria {
        industries: ["hvac".to_string()].into_iter().collect(),
        min_revenue: Some(dec(1_000_000)),
        ebitda_multiple: Some(dec(4)),
        purchase_price: PriceRange {
            min: None,
            max: Some(dec(5_000_000)),
        },
        recurring_revenue: true,
        seller_financing: true,
        ..Default::default()
    };

    let report = seeded_engine()
        .match_batch(MatchRequest {
            criteria,
            entities,
            as_of: Some(as_of()),
        })
        .await
        .unwrap();

    let ids: Vec<_> = report.matches.iter().map(|m| m.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["hvac-big", "hvac-partial"]);
    assert_eq!(report.matches[0].match_score, 100);
    assert_eq!(report.matches[0].estimated_purchase_price, dec(3_600_000));
    assert_eq!(report.matches[1].match_score, 50);
    assert_eq!(
        report.matches[1].satisfied_criteria,
        vec!["recurring_revenue".to_string()]
    );
    assert_eq!(report.evaluated_count, 4);
    assert!(report.failures.is_empty());
}
