//! HTTP handlers

pub mod compute;
pub mod health;

pub use compute::compute_custom_metric;
pub use health::{health_check, index};
