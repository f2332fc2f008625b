//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! This module provides application-level services including:
//! - [`ScoringEngine`]: Concurrent batch scoring, valuation and matching
//! - [`DataProvider`]: Capability trait for market signals

pub mod data_provider;
pub mod scoring_pipeline;

pub use data_provider::{DataProvider, FallbackSignalProvider, ProviderError, ProviderResult};
pub use scoring_pipeline::{
    EngineConfig, EntityFailure, EntityMetrics, EntityScore, EntityStatus, MatchReport,
    MatchRequest, PipelineConfig, ScoringEngine, ScoringReport, ScoringRequest,
};
