//! Domain models for the custom metric provider

pub mod measurement;
pub mod metrics;
pub mod payload;
pub mod run;
pub mod scoring;
pub mod subscription;

pub use measurement::*;
pub use metrics::*;
pub use payload::*;
pub use run::*;
pub use scoring::*;
pub use subscription::*;
