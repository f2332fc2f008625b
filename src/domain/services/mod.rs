//! # Domain Services
//!
//! Pure, stateless scoring math. Every service is built once from validated
//! configuration and is safe to share across tasks.
//!
//! ## Services
//!
//! - [`metric_computer::MetricComputer`]: Per-entity market and risk metrics
//! - [`weighted_factor::WeightedFactorModel`]: Table-driven composite scoring
//! - [`score_aggregator::ScoreAggregator`]: MROS, AAS and PCVS
//! - [`valuation_estimator::ValuationEstimator`]: EV ranges and seller propensity
//! - [`market_aggregator::MarketAggregator`]: Population concentration statistics
//! - [`buy_box_matcher::BuyBoxMatcher`]: Buy-box screening and ranking

pub mod buy_box_matcher;
pub mod market_aggregator;
pub mod metric_computer;
pub mod score_aggregator;
pub mod valuation_estimator;
pub mod weighted_factor;

pub use buy_box_matcher::{BuyBoxMatcher, MatchCandidate};
pub use market_aggregator::{MarketAggregator, MarketObservation};
pub use metric_computer::{MetricComputer, MetricConfig, SuccessionInputs};
pub use score_aggregator::{CompositeScores, ScoreAggregator, ScoringConfig, ScoringInputs};
pub use valuation_estimator::{ValuationConfig, ValuationEstimator, ValuationInputs};
pub use weighted_factor::{FactorInput, FactorScore, Polarity, WeightedFactorModel};
