//! Validation of run identifiers before any OpenScale call is made

use crate::error::{ModelError, ModelResult};
use crate::models::MonitorRunContext;

/// Run identifiers once every required value is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentifiers {
    pub subscription_id: String,
    pub monitor_instance_id: String,
    pub payload_dataset_id: String,
    pub run_id: String,
}

/// Ensure the identifiers needed for a run are present and non-blank
pub fn validate_run_context(ctx: &MonitorRunContext) -> ModelResult<RunIdentifiers> {
    Ok(RunIdentifiers {
        subscription_id: require(&ctx.subscription_id, "subscription_id")?,
        monitor_instance_id: require(&ctx.custom_monitor_instance_id, "custom_monitor_instance_id")?,
        payload_dataset_id: require(&ctx.payload_dataset_id, "payload_dataset_id")?,
        run_id: require(&ctx.custom_monitor_run_id, "custom_monitor_run_id")?,
    })
}

fn require(value: &Option<String>, key: &str) -> ModelResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ModelError::InvalidRequest(format!(
            "'{}' is required in 'input_data[0].values'.",
            key
        ))),
    }
}
