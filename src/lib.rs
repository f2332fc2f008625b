//! # dealscope
//!
//! Quantitative scoring, valuation and buy-box matching for small-business
//! acquisition targets.
//!
//! The engine turns a batch of [`BusinessEntity`](domain::entities::BusinessEntity)
//! records into bounded, confidence-annotated metrics, three composite
//! opportunity scores, an EBITDA-multiple valuation range and market-level
//! concentration statistics. A second entry point screens entities against a
//! declarative buy box.
//!
//! # Layers
//!
//! - [`domain`]: Entities, value objects and the pure scoring math
//! - [`application`]: The concurrent [`ScoringEngine`](application::services::ScoringEngine)
//! - [`infrastructure`]: Configuration, tracing and signal providers
//! - [`api`]: axum REST endpoints
//!
//! # Examples
//!
//! ```
//! use dealscope::application::services::{ScoringEngine, ScoringRequest};
//! use dealscope::domain::entities::BusinessEntityBuilder;
//! use dealscope::domain::value_objects::Timestamp;
//! use dealscope::infrastructure::providers::SeededSignalProvider;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let engine = ScoringEngine::with_defaults(Arc::new(SeededSignalProvider::new(7))).unwrap();
//! let request = ScoringRequest::new(vec![
//!     BusinessEntityBuilder::new("biz-1", "HVAC", Decimal::new(2_400_000, 0))
//!         .owner_age(67)
//!         .build(),
//! ])
//! .as_of(Timestamp::from_secs(1_700_000_000).unwrap());
//!
//! let report = tokio_test::block_on(engine.score_batch(request)).unwrap();
//! assert_eq!(report.scored_count, 1);
//! assert_eq!(report.ranking.len(), 1);
//! ```

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
