//! # Application Layer
//!
//! Use cases built on the domain: batch scoring and buy-box matching.
//!
//! - [`services::ScoringEngine`]: Bounded, concurrent scoring pipeline
//! - [`services::DataProvider`]: Source of per-entity market signals
//! - [`error::ApplicationError`]: Errors surfaced to the API layer

pub mod error;
pub mod services;
