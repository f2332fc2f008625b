//! # Signal Providers
//!
//! [`DataProvider`](crate::application::services::DataProvider)
//! implementations.
//!
//! - [`SeededSignalProvider`]: Deterministic synthetic placeholders
//! - [`StaticSignalProvider`]: Caller-supplied fixtures

pub mod fixture;
pub mod seeded;

pub use fixture::StaticSignalProvider;
pub use seeded::{DEFAULT_SEED, SYNTHETIC_CONFIDENCE, SeededSignalProvider};
