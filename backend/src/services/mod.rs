//! Business logic services for the custom metric provider

pub mod evaluation;
pub mod monitor;

pub use evaluation::EvaluationService;
pub use monitor::MonitorService;
