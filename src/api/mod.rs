//! # API Layer
//!
//! External interfaces of the engine.
//!
//! - [`rest`]: axum JSON endpoints

pub mod rest;
