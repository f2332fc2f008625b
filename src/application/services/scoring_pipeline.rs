//! # Scoring Pipeline
//!
//! Orchestrates per-entity metric computation, composite scoring, valuation,
//! market aggregation and buy-box matching for a batch of entities.
//!
//! ```text
//! ScoringRequest ─┬─► filter (region, industry) ─► validate batch
//!                 │
//!                 └─► worker pool (max_concurrency, per-entity timeout)
//!                        entity ─► DataProvider ─► MetricComputer
//!                                               ─► ScoreAggregator
//!                                               ─► ValuationEstimator
//!                 ◄── barrier: reorder by input position
//!                 ─► MarketAggregator ─► ranking by intent ─► ScoringReport
//! ```
//!
//! A failing entity is reported with status `failed` and excluded from
//! market aggregates; it never cancels its siblings. Entities still running
//! when the batch deadline passes are reported as failed.
//!
//! Reports are a pure function of the request and the provider's signals:
//! pass `as_of` to make a request idempotent.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::data_provider::DataProvider;
use crate::domain::entities::{
    BusinessEntity, BuyBoxCriteria, EntitySignals, MarketSnapshot, MatchResult, Valuation,
};
use crate::domain::services::metric_computer::{
    SuccessionInputs, hhi_from_revenues, succession_risk,
};
use crate::domain::services::{
    BuyBoxMatcher, MarketAggregator, MarketObservation, MatchCandidate, MetricComputer,
    MetricConfig, ScoreAggregator, ScoringConfig, ScoringInputs, ValuationConfig,
    ValuationEstimator, ValuationInputs,
};
use crate::domain::services::weighted_factor::FactorInput;
use crate::domain::value_objects::{EntityId, MetricDomain, MetricResult, ScoringIntent, Timestamp};
use futures::StreamExt;
use futures::stream;
use rust_decimal::prelude::ToPrimitive;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

/// Worker pool and batch limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum entities evaluated concurrently.
    pub max_concurrency: usize,
    /// Per-entity deadline in milliseconds.
    pub entity_timeout_ms: u64,
    /// Whole-batch deadline in milliseconds.
    pub batch_timeout_ms: u64,
    /// Maximum entities accepted in one request.
    pub max_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
            entity_timeout_ms: 2_000,
            batch_timeout_ms: 30_000,
            max_batch_size: 10_000,
        }
    }
}

impl PipelineConfig {
    /// Sets the worker pool size.
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Sets the per-entity timeout.
    #[must_use]
    pub fn with_entity_timeout(mut self, timeout_ms: u64) -> Self {
        self.entity_timeout_ms = timeout_ms;
        self
    }

    /// Sets the batch timeout.
    #[must_use]
    pub fn with_batch_timeout(mut self, timeout_ms: u64) -> Self {
        self.batch_timeout_ms = timeout_ms;
        self
    }

    /// Sets the maximum batch size.
    #[must_use]
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    /// Validates the limits.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if any limit is zero.
    pub fn validate(&self) -> ApplicationResult<()> {
        if self.max_concurrency == 0 {
            return Err(ApplicationError::configuration("max_concurrency must be >= 1"));
        }
        if self.entity_timeout_ms == 0 || self.batch_timeout_ms == 0 {
            return Err(ApplicationError::configuration("timeouts must be > 0"));
        }
        if self.max_batch_size == 0 {
            return Err(ApplicationError::configuration("max_batch_size must be >= 1"));
        }
        Ok(())
    }

    fn entity_timeout(&self) -> Duration {
        Duration::from_millis(self.entity_timeout_ms)
    }

    fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }
}

/// Configuration of every stage of the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    /// Worker pool and batch limits.
    pub pipeline: PipelineConfig,
    /// Metric tunables.
    pub metrics: MetricConfig,
    /// Composite score weights.
    pub scoring: ScoringConfig,
    /// Valuation tables.
    pub valuation: ValuationConfig,
}

/// A batch scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringRequest {
    /// Entities to score.
    pub entities: Vec<BusinessEntity>,
    /// Only score entities in this region (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Only score entities in this industry (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Which composite score ranks the batch.
    #[serde(default)]
    pub intent: ScoringIntent,
    /// Evaluation time; defaults to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<Timestamp>,
}

impl ScoringRequest {
    /// Creates an unfiltered request with the default intent.
    #[must_use]
    pub fn new(entities: Vec<BusinessEntity>) -> Self {
        Self {
            entities,
            region: None,
            industry: None,
            intent: ScoringIntent::default(),
            as_of: None,
        }
    }

    /// Restricts the batch to a region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Restricts the batch to an industry.
    #[must_use]
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Sets the ranking intent.
    #[must_use]
    pub fn with_intent(mut self, intent: ScoringIntent) -> Self {
        self.intent = intent;
        self
    }

    /// Pins the evaluation time.
    #[must_use]
    pub fn as_of(mut self, as_of: Timestamp) -> Self {
        self.as_of = Some(as_of);
        self
    }

    fn accepts(&self, entity: &BusinessEntity) -> bool {
        let region_ok = self.region.as_deref().is_none_or(|wanted| {
            entity
                .region()
                .is_some_and(|r| r.trim().eq_ignore_ascii_case(wanted.trim()))
        });
        let industry_ok = self
            .industry
            .as_deref()
            .is_none_or(|wanted| entity.industry_matches(wanted));
        region_ok && industry_ok
    }
}

/// A batch buy-box matching request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchRequest {
    /// Buy-box criteria.
    pub criteria: BuyBoxCriteria,
    /// Entities to screen.
    pub entities: Vec<BusinessEntity>,
    /// Evaluation time; defaults to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<Timestamp>,
}

/// Outcome of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    /// Every metric was computed.
    Scored,
    /// Validation, provider or timeout failure.
    Failed,
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scored => write!(f, "scored"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The eight per-entity metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityMetrics {
    /// Multi-scale fragmentation.
    #[serde(rename = "FS_ms")]
    pub fs_ms: MetricResult,
    /// HHI of the entity and its local competitors.
    #[serde(rename = "HHI_local")]
    pub hhi_local: MetricResult,
    /// Activity complexity estimate.
    #[serde(rename = "D2")]
    pub d2: MetricResult,
    /// Succession risk index.
    #[serde(rename = "SRI")]
    pub sri: MetricResult,
    /// Market event intensity.
    pub lambda1: MetricResult,
    /// Market rollup opportunity score.
    #[serde(rename = "MROS")]
    pub mros: MetricResult,
    /// Acquisition attractiveness score.
    #[serde(rename = "AAS")]
    pub aas: MetricResult,
    /// Portfolio construction value score.
    #[serde(rename = "PCVS")]
    pub pcvs: MetricResult,
}

impl EntityMetrics {
    /// Returns the composite score that ranks entities for `intent`.
    #[must_use]
    pub fn composite(&self, intent: ScoringIntent) -> &MetricResult {
        match intent {
            ScoringIntent::Rollup => &self.mros,
            ScoringIntent::Acquisition => &self.aas,
            ScoringIntent::Portfolio => &self.pcvs,
        }
    }
}

/// Per-entity row of a scoring report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityScore {
    /// Entity identifier.
    pub entity_id: EntityId,
    /// Entity display name.
    pub entity_name: String,
    /// Outcome.
    pub status: EntityStatus,
    /// Metrics, present when scored.
    #[serde(flatten)]
    pub metrics: Option<EntityMetrics>,
    /// Valuation, present when scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuation: Option<Valuation>,
    /// Failure reason, present when failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntityScore {
    fn failed(entity: &BusinessEntity, error: String) -> Self {
        Self {
            entity_id: entity.id().clone(),
            entity_name: entity.display_name().to_string(),
            status: EntityStatus::Failed,
            metrics: None,
            valuation: None,
            error: Some(error),
        }
    }

    /// Returns true if the entity was scored.
    #[must_use]
    pub fn is_scored(&self) -> bool {
        self.status == EntityStatus::Scored
    }
}

/// Result of a scoring batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringReport {
    /// Evaluation time used for every metric.
    pub as_of: Timestamp,
    /// Intent that ordered `ranking`.
    pub intent: ScoringIntent,
    /// Per-entity rows in input order.
    pub entities: Vec<EntityScore>,
    /// Aggregates over scored entities.
    pub market_metrics: MarketSnapshot,
    /// Scored entity ids, best first.
    pub ranking: Vec<EntityId>,
    /// Number of scored entities.
    pub scored_count: usize,
    /// Number of failed entities.
    pub failed_count: usize,
    /// Entities removed by the region/industry filters.
    pub excluded_count: usize,
}

/// An entity that could not be evaluated for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntityFailure {
    /// Entity identifier.
    pub entity_id: EntityId,
    /// Failure reason.
    pub error: String,
}

/// Result of a matching batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchReport {
    /// Evaluation time.
    pub as_of: Timestamp,
    /// Matches, best first.
    pub matches: Vec<MatchResult>,
    /// Number of entities that reached the matcher.
    pub evaluated_count: usize,
    /// Entities that failed before matching.
    pub failures: Vec<EntityFailure>,
}

/// Per-entity work product of a scoring task.
#[derive(Debug)]
struct ScoredEntity {
    score: EntityScore,
    observation: MarketObservation,
}

/// Per-entity work product of a matching task.
#[derive(Debug)]
struct MatchInputs {
    signals: EntitySignals,
    succession_risk: FactorInput,
}

/// Batch scoring and matching engine.
///
/// Cheap to clone: every stage is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    provider: Arc<dyn DataProvider>,
    metrics: Arc<MetricComputer>,
    scores: Arc<ScoreAggregator>,
    valuation: Arc<ValuationEstimator>,
    matcher: BuyBoxMatcher,
    market: MarketAggregator,
    config: PipelineConfig,
}

impl ScoringEngine {
    /// Builds every stage from `config`, validating all weight tables.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if any stage rejects its
    /// configuration.
    pub fn new(provider: Arc<dyn DataProvider>, config: EngineConfig) -> ApplicationResult<Self> {
        let invalid = |stage: &str, e: &dyn fmt::Display| {
            ApplicationError::configuration(format!("{stage}: {e}"))
        };

        config.pipeline.validate()?;
        let metrics = MetricComputer::new(config.metrics).map_err(|e| invalid("metrics", &e))?;
        let scores = ScoreAggregator::new(&config.scoring).map_err(|e| invalid("scoring", &e))?;
        let valuation =
            ValuationEstimator::new(config.valuation).map_err(|e| invalid("valuation", &e))?;
        let valuation = Arc::new(valuation);

        Ok(Self {
            provider,
            metrics: Arc::new(metrics),
            scores: Arc::new(scores),
            matcher: BuyBoxMatcher::new(Arc::clone(&valuation)),
            valuation,
            market: MarketAggregator::new(),
            config: config.pipeline,
        })
    }

    /// Builds an engine with default configuration.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in defaults; the `Result` mirrors
    /// [`ScoringEngine::new`].
    pub fn with_defaults(provider: Arc<dyn DataProvider>) -> ApplicationResult<Self> {
        Self::new(provider, EngineConfig::default())
    }

    /// Returns the pipeline configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the signal provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Scores a batch.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` if the filtered batch exceeds
    /// `max_batch_size` or contains duplicate entity ids. Per-entity failures
    /// are reported in the result, not as errors.
    pub async fn score_batch(&self, request: ScoringRequest) -> ApplicationResult<ScoringReport> {
        let started = std::time::Instant::now();
        let as_of = request.as_of.unwrap_or_else(Timestamp::now);
        let intent = request.intent;

        let total = request.entities.len();
        let entities: Vec<BusinessEntity> = request
            .entities
            .iter()
            .filter(|e| request.accepts(e))
            .cloned()
            .collect();
        let excluded_count = total - entities.len();
        self.validate_batch(&entities)?;

        debug!(
            entities = entities.len(),
            excluded = excluded_count,
            %intent,
            %as_of,
            "Scoring batch"
        );

        let outcomes = self.run_pool(&entities, as_of, Self::score_entity).await;

        let mut rows = Vec::with_capacity(entities.len());
        let mut observations = Vec::new();
        for (entity, outcome) in entities.iter().zip(outcomes) {
            match outcome {
                Ok(scored) => {
                    observations.push(scored.observation);
                    rows.push(scored.score);
                }
                Err(error) => {
                    warn!(entity_id = %entity.id(), %error, "Entity failed scoring");
                    rows.push(EntityScore::failed(entity, error.to_string()));
                }
            }
        }

        let market_metrics = self.market.aggregate(&observations, as_of);
        let ranking = rank(&rows, intent);
        let scored_count = observations.len();
        let failed_count = rows.len() - scored_count;

        info!(
            scored = scored_count,
            failed = failed_count,
            excluded = excluded_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scoring batch complete"
        );

        Ok(ScoringReport {
            as_of,
            intent,
            entities: rows,
            market_metrics,
            ranking,
            scored_count,
            failed_count,
            excluded_count,
        })
    }

    /// Screens a batch against a buy box.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` for invalid criteria, an
    /// oversized batch, or duplicate entity ids.
    pub async fn match_batch(&self, request: MatchRequest) -> ApplicationResult<MatchReport> {
        let started = std::time::Instant::now();
        let as_of = request.as_of.unwrap_or_else(Timestamp::now);

        BuyBoxMatcher::validate_criteria(&request.criteria)
            .map_err(|e| ApplicationError::validation(e.to_string()))?;
        self.validate_batch(&request.entities)?;

        let outcomes = self
            .run_pool(&request.entities, as_of, Self::match_inputs)
            .await;

        let mut evaluated = Vec::new();
        let mut failures = Vec::new();
        for (entity, outcome) in request.entities.iter().zip(outcomes) {
            match outcome {
                Ok(inputs) => evaluated.push((entity, inputs)),
                Err(error) => {
                    warn!(entity_id = %entity.id(), %error, "Entity failed matching");
                    failures.push(EntityFailure {
                        entity_id: entity.id().clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        let candidates: Vec<MatchCandidate<'_>> = evaluated
            .iter()
            .map(|(entity, inputs)| MatchCandidate {
                entity,
                succession_risk: inputs.succession_risk,
                factors: inputs.signals.factors,
                signal_confidence: MetricDomain::UNIT.clamp(inputs.signals.signal_confidence),
            })
            .collect();
        let matches = self.matcher.match_entities(&request.criteria, &candidates);

        info!(
            evaluated = candidates.len(),
            matched = matches.len(),
            failed = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Match batch complete"
        );

        Ok(MatchReport {
            as_of,
            matches,
            evaluated_count: candidates.len(),
            failures,
        })
    }

    fn validate_batch(&self, entities: &[BusinessEntity]) -> ApplicationResult<()> {
        if entities.len() > self.config.max_batch_size {
            return Err(ApplicationError::validation(format!(
                "batch of {} entities exceeds the limit of {}",
                entities.len(),
                self.config.max_batch_size
            )));
        }
        let mut seen = HashSet::with_capacity(entities.len());
        if let Some(duplicate) = entities.iter().find(|e| !seen.insert(e.id())) {
            return Err(ApplicationError::validation(format!(
                "duplicate entity id {}",
                duplicate.id()
            )));
        }
        Ok(())
    }

    /// Runs `work` for every entity on the bounded worker pool.
    ///
    /// Results come back in input order. Each task runs under the entity
    /// timeout. Tasks unfinished at the batch deadline are aborted and
    /// reported as timed out.
    async fn run_pool<T, F, Fut>(
        &self,
        entities: &[BusinessEntity],
        as_of: Timestamp,
        work: F,
    ) -> Vec<ApplicationResult<T>>
    where
        T: Send + 'static,
        F: Fn(Self, BusinessEntity, Timestamp) -> Fut + Copy + Send + 'static,
        Fut: Future<Output = ApplicationResult<T>> + Send + 'static,
    {
        let deadline = Instant::now() + self.config.batch_timeout();
        let entity_timeout = self.config.entity_timeout();
        let entity_timeout_ms = self.config.entity_timeout_ms;

        let mut slots: Vec<Option<ApplicationResult<T>>> =
            std::iter::repeat_with(|| None).take(entities.len()).collect();
        let mut abort_handles: Vec<AbortHandle> = Vec::with_capacity(entities.len());

        let mut results = stream::iter(entities.iter().cloned().enumerate())
            .map(|(index, entity)| {
                let engine = self.clone();
                let handle = tokio::spawn(async move {
                    match timeout(entity_timeout, work(engine, entity, as_of)).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(ApplicationError::timeout(format!(
                            "entity exceeded {entity_timeout_ms}ms"
                        ))),
                    }
                });
                abort_handles.push(handle.abort_handle());
                async move {
                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(ApplicationError::internal(format!(
                            "entity task failed: {e}"
                        ))),
                    };
                    (index, outcome)
                }
            })
            .buffer_unordered(self.config.max_concurrency.max(1));

        loop {
            match timeout_at(deadline, results.next()).await {
                Ok(Some((index, outcome))) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(outcome);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        batch_timeout_ms = self.config.batch_timeout_ms,
                        pending = slots.iter().filter(|s| s.is_none()).count(),
                        "Batch deadline exceeded"
                    );
                    break;
                }
            }
        }

        // no-op for finished tasks
        drop(results);
        for handle in &abort_handles {
            handle.abort();
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(ApplicationError::timeout("batch deadline exceeded")))
            })
            .collect()
    }

    async fn fetch_signals(
        &self,
        entity: &BusinessEntity,
        as_of: Timestamp,
    ) -> ApplicationResult<EntitySignals> {
        entity.validate()?;
        Ok(self.provider.signals(entity, as_of).await?)
    }

    async fn score_entity(
        self,
        entity: BusinessEntity,
        as_of: Timestamp,
    ) -> ApplicationResult<ScoredEntity> {
        let signals = self.fetch_signals(&entity, as_of).await?;
        self.compute_scores(&entity, &signals, as_of)
    }

    async fn match_inputs(
        self,
        entity: BusinessEntity,
        as_of: Timestamp,
    ) -> ApplicationResult<MatchInputs> {
        let signals = self.fetch_signals(&entity, as_of).await?;
        let sri = succession_risk(&SuccessionInputs::from_entity(&entity), as_of);
        Ok(MatchInputs {
            signals,
            succession_risk: FactorInput::from_metric(&sri),
        })
    }

    fn compute_scores(
        &self,
        entity: &BusinessEntity,
        signals: &EntitySignals,
        as_of: Timestamp,
    ) -> ApplicationResult<ScoredEntity> {
        let revenue = entity.revenue().to_f64().unwrap_or(0.0);
        let signal_confidence = MetricDomain::UNIT.clamp(signals.signal_confidence);

        let fs_ms = self.metrics.fragmentation_for(&signals.competitor_counts, as_of);
        let local_revenues: Vec<f64> = std::iter::once(revenue)
            .chain(signals.competitor_revenues.iter().copied())
            .collect();
        let hhi_local = hhi_from_revenues(&local_revenues, as_of);
        let d2 = self.metrics.complexity_for(&signals.activity_series, as_of);
        let sri = succession_risk(&SuccessionInputs::from_entity(entity), as_of);
        let lambda1 = self
            .metrics
            .intensity_for(signals.base_intensity, &signals.event_dates, as_of);

        let composites = self.scores.score(
            &ScoringInputs {
                fragmentation: FactorInput::from_metric(&fs_ms),
                revenue: entity.revenue(),
                succession_risk: FactorInput::from_metric(&sri),
                factors: signals.factors,
                signal_confidence,
            },
            as_of,
        );

        let ebitda = self.valuation.estimate_ebitda(entity, None)?;
        let valuation = self.valuation.estimate(
            entity,
            &ValuationInputs {
                ebitda,
                succession_risk: FactorInput::from_metric(&sri),
                factors: signals.factors,
                signal_confidence,
            },
        )?;

        let observation = MarketObservation {
            revenue: entity.revenue(),
            succession_risk: sri.value(),
            rollup_score: composites.rollup.value(),
        };

        Ok(ScoredEntity {
            score: EntityScore {
                entity_id: entity.id().clone(),
                entity_name: entity.display_name().to_string(),
                status: EntityStatus::Scored,
                metrics: Some(EntityMetrics {
                    fs_ms,
                    hhi_local,
                    d2,
                    sri,
                    lambda1,
                    mros: composites.rollup,
                    aas: composites.acquisition,
                    pcvs: composites.portfolio,
                }),
                valuation: Some(valuation),
                error: None,
            },
            observation,
        })
    }
}

/// Scored entity ids ordered by the intent's composite score (desc), then id.
fn rank(rows: &[EntityScore], intent: ScoringIntent) -> Vec<EntityId> {
    let mut scored: Vec<(&EntityId, f64)> = rows
        .iter()
        .filter_map(|row| {
            row.metrics
                .as_ref()
                .map(|m| (&row.entity_id, m.composite(intent).value()))
        })
        .collect();
    scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    scored.into_iter().map(|(id, _)| id.clone()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::application::services::data_provider::{ProviderError, ProviderResult};
    use crate::domain::entities::{BusinessEntityBuilder, FactorSignals};
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    /// Returns signals keyed off the entity id; ids starting with `fail`
    /// error, ids starting with `slow` never answer.
    #[derive(Debug)]
    struct ScriptedProvider;

    #[async_trait]
    impl DataProvider for ScriptedProvider {
        async fn signals(
            &self,
            entity: &BusinessEntity,
            _as_of: Timestamp,
        ) -> ProviderResult<EntitySignals> {
            let id = entity.id().as_str();
            if id.starts_with("fail") {
                return Err(ProviderError::unavailable("scripted failure"));
            }
            if id.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
            }
            let synergy = if id.starts_with("top") { 0.95 } else { 0.2 };
            Ok(EntitySignals {
                competitor_counts: vec![8, 20, 60],
                competitor_revenues: vec![1_000_000.0; 5],
                factors: FactorSignals {
                    synergy,
                    market_position: synergy,
                    diversification_benefit: synergy,
                    ..Default::default()
                },
                signal_confidence: 0.6,
                ..Default::default()
            })
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::with_defaults(Arc::new(ScriptedProvider)).unwrap()
    }

    fn as_of() -> Timestamp {
        Timestamp::from_secs(1_700_000_000).unwrap()
    }

    fn entity(id: &str, region: &str, industry: &str) -> BusinessEntity {
        BusinessEntityBuilder::new(id, industry, Decimal::new(2_000_000, 0))
            .region(region)
            .owner_age(62)
            .build()
    }

    mod configuration {
        use super::*;

        #[test]
        fn zero_concurrency_rejected() {
            let config = EngineConfig {
                pipeline: PipelineConfig::default().with_max_concurrency(0),
                ..Default::default()
            };
            let err = ScoringEngine::new(Arc::new(ScriptedProvider), config).unwrap_err();
            assert!(err.is_configuration());
        }

        #[test]
        fn bad_weights_rejected() {
            let mut config = EngineConfig::default();
            config.scoring.rollup.synergy = 0.9;
            let err = ScoringEngine::new(Arc::new(ScriptedProvider), config).unwrap_err();
            assert!(err.is_configuration());
            assert!(err.to_string().contains("scoring"));
        }
    }

    mod scoring {
        use super::*;

        #[tokio::test]
        async fn scores_every_entity_in_input_order() {
            let request = ScoringRequest::new(vec![
                entity("b", "TX", "HVAC"),
                entity("top-a", "TX", "HVAC"),
                entity("c", "CA", "Plumbing"),
            ])
            .as_of(as_of());

            let report = engine().score_batch(request).await.unwrap();
            let ids: Vec<_> = report.entities.iter().map(|e| e.entity_id.as_str()).collect();
            assert_eq!(ids, vec!["b", "top-a", "c"]);
            assert_eq!(report.scored_count, 3);
            assert_eq!(report.failed_count, 0);
            assert_eq!(report.market_metrics.entity_count, 3);
            assert!(report.entities.iter().all(EntityScore::is_scored));
        }

        #[tokio::test]
        async fn ranking_follows_intent_score() {
            let request = ScoringRequest::new(vec![
                entity("b", "TX", "HVAC"),
                entity("top-a", "TX", "HVAC"),
                entity("a", "TX", "HVAC"),
            ])
            .with_intent(ScoringIntent::Acquisition)
            .as_of(as_of());

            let report = engine().score_batch(request).await.unwrap();
            let ranking: Vec<_> = report.ranking.iter().map(EntityId::as_str).collect();
            // equal scores fall back to id order
            assert_eq!(ranking, vec!["top-a", "a", "b"]);
        }

        #[tokio::test]
        async fn failed_entity_isolated() {
            let request = ScoringRequest::new(vec![
                entity("a", "TX", "HVAC"),
                entity("fail-1", "TX", "HVAC"),
            ])
            .as_of(as_of());

            let report = engine().score_batch(request).await.unwrap();
            assert_eq!(report.scored_count, 1);
            assert_eq!(report.failed_count, 1);
            assert_eq!(report.entities[1].status, EntityStatus::Failed);
            assert!(report.entities[1].metrics.is_none());
            assert!(report.entities[1].error.as_ref().unwrap().contains("scripted"));
            assert_eq!(report.market_metrics.entity_count, 1);
            assert_eq!(report.ranking.len(), 1);
        }

        #[tokio::test]
        async fn invalid_entity_fails_without_provider_call() {
            let bad = BusinessEntityBuilder::new("bad", "HVAC", Decimal::new(-5, 0)).build();
            let report = engine()
                .score_batch(ScoringRequest::new(vec![bad]).as_of(as_of()))
                .await
                .unwrap();
            assert_eq!(report.failed_count, 1);
            assert_eq!(report.market_metrics, MarketSnapshot::empty());
        }

        #[tokio::test]
        async fn region_and_industry_filters() {
            let request = ScoringRequest::new(vec![
                entity("a", "TX", "HVAC"),
                entity("b", "tx", "Plumbing"),
                entity("c", "CA", "HVAC"),
            ])
            .with_region("TX")
            .with_industry("hvac")
            .as_of(as_of());

            let report = engine().score_batch(request).await.unwrap();
            assert_eq!(report.entities.len(), 1);
            assert_eq!(report.entities[0].entity_id.as_str(), "a");
            assert_eq!(report.excluded_count, 2);
        }

        #[tokio::test]
        async fn empty_batch_yields_empty_snapshot() {
            let report = engine()
                .score_batch(ScoringRequest::new(vec![]).as_of(as_of()))
                .await
                .unwrap();
            assert!(report.entities.is_empty());
            assert_eq!(report.market_metrics, MarketSnapshot::empty());
        }

        #[tokio::test]
        async fn duplicate_ids_rejected() {
            let request =
                ScoringRequest::new(vec![entity("a", "TX", "HVAC"), entity("a", "TX", "HVAC")]);
            let err = engine().score_batch(request).await.unwrap_err();
            assert!(err.is_validation());
        }

        #[tokio::test]
        async fn oversized_batch_rejected() {
            let config = EngineConfig {
                pipeline: PipelineConfig::default().with_max_batch_size(1),
                ..Default::default()
            };
            let engine = ScoringEngine::new(Arc::new(ScriptedProvider), config).unwrap();
            let request =
                ScoringRequest::new(vec![entity("a", "TX", "HVAC"), entity("b", "TX", "HVAC")]);
            assert!(engine.score_batch(request).await.unwrap_err().is_validation());
        }

        #[tokio::test]
        async fn identical_requests_give_identical_reports() {
            let request = ScoringRequest::new(vec![
                entity("a", "TX", "HVAC"),
                entity("top-b", "TX", "Security"),
            ])
            .as_of(as_of());
            let engine = engine();
            let first = engine.score_batch(request.clone()).await.unwrap();
            let second = engine.score_batch(request).await.unwrap();
            assert_eq!(first, second);
        }

        #[tokio::test(start_paused = true)]
        async fn slow_entity_times_out() {
            let config = EngineConfig {
                pipeline: PipelineConfig::default().with_entity_timeout(50),
                ..Default::default()
            };
            let engine = ScoringEngine::new(Arc::new(ScriptedProvider), config).unwrap();
            let request = ScoringRequest::new(vec![
                entity("a", "TX", "HVAC"),
                entity("slow-1", "TX", "HVAC"),
            ])
            .as_of(as_of());

            let report = engine.score_batch(request).await.unwrap();
            assert_eq!(report.scored_count, 1);
            assert_eq!(
                report.entities[1].error.as_deref(),
                Some("timeout: entity exceeded 50ms")
            );
        }

        #[tokio::test(start_paused = true)]
        async fn batch_deadline_marks_pending_failed() {
            let config = EngineConfig {
                pipeline: PipelineConfig::default()
                    .with_entity_timeout(600_000)
                    .with_batch_timeout(100),
                ..Default::default()
            };
            let engine = ScoringEngine::new(Arc::new(ScriptedProvider), config).unwrap();
            let request = ScoringRequest::new(vec![
                entity("slow-1", "TX", "HVAC"),
                entity("a", "TX", "HVAC"),
            ])
            .as_of(as_of());

            let report = engine.score_batch(request).await.unwrap();
            assert_eq!(report.entities[0].status, EntityStatus::Failed);
            assert_eq!(
                report.entities[0].error.as_deref(),
                Some("timeout: batch deadline exceeded")
            );
            assert_eq!(report.entities[1].status, EntityStatus::Scored);
        }

        /// Counts calls that ran to completion after a long delay.
        #[derive(Debug, Default)]
        struct DelayedProvider {
            completed: Arc<std::sync::atomic::AtomicUsize>,
        }

        #[async_trait]
        impl DataProvider for DelayedProvider {
            async fn signals(
                &self,
                _entity: &BusinessEntity,
                _as_of: Timestamp,
            ) -> ProviderResult<EntitySignals> {
                tokio::time::sleep(Duration::from_secs(10)).await;
                self.completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(EntitySignals::default())
            }

            fn name(&self) -> &'static str {
                "delayed"
            }
        }

        #[tokio::test(start_paused = true)]
        async fn batch_deadline_aborts_pending_tasks() {
            let provider = DelayedProvider::default();
            let completed = Arc::clone(&provider.completed);
            let config = EngineConfig {
                pipeline: PipelineConfig::default()
                    .with_entity_timeout(600_000)
                    .with_batch_timeout(100),
                ..Default::default()
            };
            let engine = ScoringEngine::new(Arc::new(provider), config).unwrap();
            let request = ScoringRequest::new(vec![
                entity("a", "TX", "HVAC"),
                entity("b", "TX", "HVAC"),
            ])
            .as_of(as_of());

            let report = engine.score_batch(request).await.unwrap();
            assert_eq!(report.failed_count, 2);

            tokio::time::sleep(Duration::from_secs(60)).await;
            assert_eq!(completed.load(std::sync::atomic::Ordering::SeqCst), 0);
        }

        #[derive(Debug)]
        struct PanickingProvider;

        #[async_trait]
        impl DataProvider for PanickingProvider {
            #[allow(clippy::panic)]
            async fn signals(
                &self,
                entity: &BusinessEntity,
                _as_of: Timestamp,
            ) -> ProviderResult<EntitySignals> {
                if entity.id().as_str() == "boom" {
                    panic!("provider bug");
                }
                Ok(EntitySignals::default())
            }

            fn name(&self) -> &'static str {
                "panicking"
            }
        }

        #[tokio::test]
        async fn panicking_task_is_internal_failure() {
            let engine = ScoringEngine::with_defaults(Arc::new(PanickingProvider)).unwrap();
            let request = ScoringRequest::new(vec![
                entity("boom", "TX", "HVAC"),
                entity("a", "TX", "HVAC"),
            ])
            .as_of(as_of());

            let report = engine.score_batch(request).await.unwrap();
            assert_eq!(report.entities[0].status, EntityStatus::Failed);
            assert!(
                report.entities[0]
                    .error
                    .as_deref()
                    .unwrap()
                    .starts_with("internal error: entity task failed")
            );
            assert_eq!(report.entities[1].status, EntityStatus::Scored);
        }
    }

    mod matching {
        use super::*;

        #[tokio::test]
        async fn matches_ordered_and_failures_reported() {
            let criteria = BuyBoxCriteria {
                industries: ["HVAC".to_string()].into_iter().collect(),
                retiring_owner: true,
                ..Default::default()
            };
            let young = BusinessEntityBuilder::new("young", "HVAC", Decimal::new(2_000_000, 0))
                .owner_age(35)
                .has_succession_plan(true)
                .build();
            let request = MatchRequest {
                criteria,
                entities: vec![
                    young,
                    entity("retiring", "TX", "HVAC"),
                    entity("plumber", "TX", "Plumbing"),
                    entity("fail-x", "TX", "HVAC"),
                ],
                as_of: Some(as_of()),
            };

            let report = engine().match_batch(request).await.unwrap();
            let ids: Vec<_> = report.matches.iter().map(|m| m.entity_id.as_str()).collect();
            assert_eq!(ids, vec!["retiring", "young"]);
            assert_eq!(report.matches[0].match_score, 100);
            assert_eq!(report.matches[1].match_score, 0);
            assert_eq!(report.evaluated_count, 3);
            assert_eq!(report.failures.len(), 1);
            assert_eq!(report.failures[0].entity_id.as_str(), "fail-x");
        }

        #[tokio::test]
        async fn invalid_criteria_rejected() {
            let request = MatchRequest {
                criteria: BuyBoxCriteria {
                    max_customer_concentration: Some(1.5),
                    ..Default::default()
                },
                entities: vec![],
                as_of: None,
            };
            assert!(engine().match_batch(request).await.unwrap_err().is_validation());
        }
    }

    mod serialization {
        use super::*;

        #[tokio::test]
        async fn metric_keys_use_report_names() {
            let report = engine()
                .score_batch(ScoringRequest::new(vec![entity("a", "TX", "HVAC")]).as_of(as_of()))
                .await
                .unwrap();
            let json = serde_json::to_value(&report).unwrap();
            let row = &json["entities"][0];
            for key in ["FS_ms", "HHI_local", "D2", "SRI", "lambda1", "MROS", "AAS", "PCVS"] {
                assert!(row.get(key).is_some(), "missing {key}");
            }
            assert_eq!(row["status"], "scored");
            assert!(row.get("error").is_none());
        }
    }
}
