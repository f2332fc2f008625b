//! # Infrastructure
//!
//! Adapters around the engine: layered configuration, tracing setup and
//! signal providers.

pub mod config;
pub mod logging;
pub mod providers;
