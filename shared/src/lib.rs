//! Shared types and models for the custom metric provider
//!
//! This crate holds everything that can be computed without talking to
//! OpenScale: request parsing, subscription field extraction, payload row
//! shaping, metric averaging and the local readability scores.

pub mod error;
pub mod models;
pub mod readability;
pub mod validation;

pub use error::*;
pub use models::*;
pub use readability::*;
pub use validation::*;
