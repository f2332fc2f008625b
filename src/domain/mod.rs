//! # Domain Layer
//!
//! Entities, value objects and the pure scoring services. Nothing in this
//! layer performs I/O or holds state between calls.

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;
